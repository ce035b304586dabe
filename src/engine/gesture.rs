use crate::core::models::Response;

/// One trajectory sample: total offset from the gesture's start point, in
/// logical points. Positive x is rightward, positive y is downward.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GestureSample {
    pub dx: f32,
    pub dy: f32,
}

impl GestureSample {
    pub fn new(dx: f32, dy: f32) -> Self {
        Self { dx, dy }
    }
}

/// Pointer velocity at release, in points per second. Not part of outcome
/// selection; echoed back to the caller for the exit animation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ReleaseVelocity {
    pub vx: f32,
    pub vy: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeOutcome {
    Affirm,
    Reject,
    Defer,
    Cancel,
}

impl SwipeOutcome {
    pub fn response(&self) -> Option<Response> {
        match self {
            SwipeOutcome::Affirm => Some(Response::Affirmative),
            SwipeOutcome::Reject => Some(Response::Negative),
            SwipeOutcome::Defer => Some(Response::Deferred),
            SwipeOutcome::Cancel => None,
        }
    }
}

/// Turns a drag trajectory into a discrete outcome at release.
///
/// Crossing the horizontal commit distance wins over the vertical one when
/// both are crossed in the same gesture. Values exactly at a threshold count
/// as not crossed. Only upward travel can commit on the vertical axis; a
/// downward drag always snaps back.
pub struct GestureClassifier {
    threshold_x: f32,
    threshold_y: f32,
    cue_fired: bool,
}

impl GestureClassifier {
    pub const DEFAULT_THRESHOLD_X: f32 = 110.0;
    pub const DEFAULT_THRESHOLD_Y: f32 = 140.0;

    pub fn new(threshold_x: f32, threshold_y: f32) -> Self {
        Self { threshold_x, threshold_y, cue_fired: false }
    }

    pub fn threshold_x(&self) -> f32 {
        self.threshold_x
    }

    pub fn threshold_y(&self) -> f32 {
        self.threshold_y
    }

    /// Arms the one-shot threshold cue for a fresh gesture.
    pub fn begin_gesture(&mut self) {
        self.cue_fired = false;
    }

    /// Feeds an in-progress sample. Returns true exactly once per gesture:
    /// the first time the trajectory becomes committable.
    pub fn update(&mut self, sample: GestureSample) -> bool {
        if self.cue_fired || !self.is_committable(sample) {
            return false;
        }
        self.cue_fired = true;
        true
    }

    pub fn classify(&self, release: GestureSample) -> SwipeOutcome {
        if release.dx > self.threshold_x {
            SwipeOutcome::Affirm
        } else if -release.dx > self.threshold_x {
            SwipeOutcome::Reject
        } else if -release.dy > self.threshold_y {
            SwipeOutcome::Defer
        } else {
            SwipeOutcome::Cancel
        }
    }

    fn is_committable(&self, sample: GestureSample) -> bool {
        sample.dx.abs() > self.threshold_x || -sample.dy > self.threshold_y
    }
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::new(Self::DEFAULT_THRESHOLD_X, Self::DEFAULT_THRESHOLD_Y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> GestureClassifier {
        GestureClassifier::new(100.0, 120.0)
    }

    #[test]
    fn test_horizontal_outcomes() {
        let c = classifier();
        assert_eq!(c.classify(GestureSample::new(150.0, 0.0)), SwipeOutcome::Affirm);
        assert_eq!(c.classify(GestureSample::new(-150.0, 0.0)), SwipeOutcome::Reject);

        // Vertical offset is irrelevant once the horizontal threshold is crossed.
        assert_eq!(c.classify(GestureSample::new(150.0, -500.0)), SwipeOutcome::Affirm);
        assert_eq!(c.classify(GestureSample::new(-150.0, 300.0)), SwipeOutcome::Reject);
    }

    #[test]
    fn test_defer_requires_upward_travel() {
        let c = classifier();
        assert_eq!(c.classify(GestureSample::new(0.0, -200.0)), SwipeOutcome::Defer);
        assert_eq!(c.classify(GestureSample::new(50.0, -200.0)), SwipeOutcome::Defer);

        // Downward travel never commits.
        assert_eq!(c.classify(GestureSample::new(0.0, 200.0)), SwipeOutcome::Cancel);
    }

    #[test]
    fn test_horizontal_wins_over_vertical() {
        let c = classifier();
        assert_eq!(c.classify(GestureSample::new(150.0, -200.0)), SwipeOutcome::Affirm);
        assert_eq!(c.classify(GestureSample::new(-150.0, -200.0)), SwipeOutcome::Reject);
    }

    #[test]
    fn test_threshold_is_strict() {
        let c = classifier();
        assert_eq!(c.classify(GestureSample::new(100.0, 0.0)), SwipeOutcome::Cancel);
        assert_eq!(c.classify(GestureSample::new(-100.0, 0.0)), SwipeOutcome::Cancel);
        assert_eq!(c.classify(GestureSample::new(0.0, -120.0)), SwipeOutcome::Cancel);
        assert_eq!(c.classify(GestureSample::new(100.1, 0.0)), SwipeOutcome::Affirm);
    }

    #[test]
    fn test_cancel_inside_both_thresholds() {
        let c = classifier();
        assert_eq!(c.classify(GestureSample::new(40.0, -60.0)), SwipeOutcome::Cancel);
        assert_eq!(c.classify(GestureSample::new(0.0, 0.0)), SwipeOutcome::Cancel);
    }

    #[test]
    fn test_cue_fires_once_per_gesture() {
        let mut c = classifier();
        c.begin_gesture();

        assert!(!c.update(GestureSample::new(50.0, 0.0)));
        assert!(c.update(GestureSample::new(130.0, 0.0)));
        assert!(!c.update(GestureSample::new(160.0, 0.0)));
        // Dipping back under and out again does not re-fire.
        assert!(!c.update(GestureSample::new(20.0, 0.0)));
        assert!(!c.update(GestureSample::new(140.0, 0.0)));

        // A new gesture re-arms the cue.
        c.begin_gesture();
        assert!(c.update(GestureSample::new(0.0, -130.0)));
    }

    #[test]
    fn test_cue_ignores_downward_travel() {
        let mut c = classifier();
        c.begin_gesture();
        assert!(!c.update(GestureSample::new(0.0, 300.0)));
    }
}
