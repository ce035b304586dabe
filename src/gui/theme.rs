use eframe::egui::{
    self,
    RichText,
};
use egui::{
    epaint::Shadow,
    style::{
        Selection,
        WidgetVisuals,
        Widgets,
    },
    Color32,
    Stroke,
    Visuals,
};

/// App palette with a dark and a light variant, installed on both egui theme
/// slots so the global theme switch just works.
#[derive(Clone)]
pub struct Theme {
    dark: ThemeDetails,
    light: ThemeDetails,
}

impl Default for Theme {
    fn default() -> Self {
        Self::ember()
    }
}

impl Theme {
    pub fn ember() -> Self {
        Theme { dark: ThemeDetails::ember_dark(), light: ThemeDetails::ember_light() }
    }

    pub fn heading(&self, content: &str) -> RichText {
        RichText::new(content).color(self.dark.purple)
    }

    pub fn bold(&self, content: &str) -> RichText {
        RichText::new(content).color(self.dark.orange)
    }

    pub fn affirm(&self) -> Color32 {
        self.dark.green
    }

    pub fn reject(&self) -> Color32 {
        self.dark.red
    }

    pub fn defer(&self) -> Color32 {
        self.dark.cyan
    }

    pub fn accent(&self) -> Color32 {
        self.dark.pink
    }

    pub fn category(&self) -> Color32 {
        self.dark.yellow
    }

    pub fn muted(&self) -> Color32 {
        self.dark.comment
    }
}

#[derive(Clone)]
pub struct ThemeDetails {
    background: Color32,
    foreground: Color32,
    selection: Color32,
    comment: Color32,
    red: Color32,
    orange: Color32,
    yellow: Color32,
    green: Color32,
    purple: Color32,
    cyan: Color32,
    pink: Color32,
    background_darker: Color32,
    background_dark: Color32,
    background_light: Color32,
    background_lighter: Color32,
}

impl ThemeDetails {
    fn ember_dark() -> Self {
        Self {
            background: Color32::from_rgb(36, 26, 32),
            foreground: Color32::from_rgb(242, 233, 236),
            selection: Color32::from_rgb(74, 51, 64),
            comment: Color32::from_rgb(155, 130, 145),
            red: Color32::from_rgb(232, 93, 117),
            orange: Color32::from_rgb(232, 152, 93),
            yellow: Color32::from_rgb(232, 198, 108),
            green: Color32::from_rgb(108, 198, 146),
            purple: Color32::from_rgb(176, 138, 224),
            cyan: Color32::from_rgb(111, 179, 210),
            pink: Color32::from_rgb(232, 125, 168),
            background_darker: Color32::from_rgb(26, 18, 23),
            background_dark: Color32::from_rgb(31, 22, 27),
            background_light: Color32::from_rgb(46, 34, 41),
            background_lighter: Color32::from_rgb(58, 43, 52),
        }
    }

    fn ember_light() -> Self {
        Self {
            background: Color32::from_rgb(250, 244, 246),
            foreground: Color32::from_rgb(54, 40, 48),
            selection: Color32::from_rgb(230, 212, 220),
            comment: Color32::from_rgb(150, 130, 140),
            red: Color32::from_rgb(200, 70, 95),
            orange: Color32::from_rgb(205, 130, 70),
            yellow: Color32::from_rgb(210, 180, 90),
            green: Color32::from_rgb(70, 170, 115),
            purple: Color32::from_rgb(140, 110, 190),
            cyan: Color32::from_rgb(80, 150, 185),
            pink: Color32::from_rgb(205, 95, 145),
            background_darker: Color32::from_rgb(235, 226, 230),
            background_dark: Color32::from_rgb(242, 234, 238),
            background_light: Color32::from_rgb(252, 248, 250),
            background_lighter: Color32::from_rgb(255, 255, 255),
        }
    }
}

pub fn set_theme(ctx: &egui::Context, theme: Theme) {
    set_theme_variant(ctx, &theme.dark, true);
    set_theme_variant(ctx, &theme.light, false);
}

pub fn blend_colors(color_a: Color32, color_b: Color32, t: f32) -> Color32 {
    let blend_channel = |a: u8, b: u8| ((1.0 - t) * (a as f32) + t * (b as f32)).round() as u8;
    Color32::from_rgba_unmultiplied(
        blend_channel(color_a.r(), color_b.r()),
        blend_channel(color_a.g(), color_b.g()),
        blend_channel(color_a.b(), color_b.b()),
        blend_channel(color_a.a(), color_b.a()),
    )
}

fn set_theme_variant(ctx: &egui::Context, theme: &ThemeDetails, is_dark: bool) {
    let (default, variant) = match is_dark {
        true => (Visuals::dark(), egui::Theme::Dark),
        false => (Visuals::light(), egui::Theme::Light),
    };

    ctx.set_visuals_of(
        variant,
        Visuals {
            dark_mode: is_dark,
            widgets: Widgets {
                noninteractive: WidgetVisuals {
                    bg_fill: theme.background,
                    weak_bg_fill: theme.background_lighter,
                    bg_stroke: Stroke {
                        color: theme.background_dark,
                        ..default.widgets.noninteractive.bg_stroke
                    },
                    fg_stroke: Stroke {
                        color: theme.foreground,
                        ..default.widgets.noninteractive.fg_stroke
                    },
                    ..default.widgets.noninteractive
                },
                inactive: WidgetVisuals {
                    bg_fill: theme.background_light,
                    weak_bg_fill: theme.background_lighter,
                    bg_stroke: Stroke {
                        color: theme.background_dark,
                        ..default.widgets.inactive.bg_stroke
                    },
                    fg_stroke: Stroke {
                        color: theme.foreground,
                        ..default.widgets.inactive.fg_stroke
                    },
                    ..default.widgets.inactive
                },
                hovered: WidgetVisuals {
                    bg_fill: theme.selection,
                    weak_bg_fill: theme.background_lighter,
                    bg_stroke: Stroke { color: theme.pink, ..default.widgets.hovered.bg_stroke },
                    fg_stroke: Stroke {
                        color: theme.foreground,
                        ..default.widgets.hovered.fg_stroke
                    },
                    ..default.widgets.hovered
                },
                active: WidgetVisuals {
                    bg_fill: theme.selection,
                    weak_bg_fill: theme.background_light,
                    bg_stroke: Stroke { color: theme.pink, ..default.widgets.active.bg_stroke },
                    fg_stroke: Stroke {
                        color: theme.foreground,
                        ..default.widgets.active.fg_stroke
                    },
                    ..default.widgets.active
                },
                open: WidgetVisuals {
                    bg_fill: theme.background_dark,
                    weak_bg_fill: theme.background_lighter,
                    bg_stroke: Stroke { color: theme.purple, ..default.widgets.open.bg_stroke },
                    fg_stroke: Stroke { color: theme.foreground, ..default.widgets.open.fg_stroke },
                    ..default.widgets.open
                },
            },
            selection: Selection {
                bg_fill: theme.selection,
                stroke: Stroke { color: theme.foreground, ..default.selection.stroke },
            },
            hyperlink_color: theme.cyan,
            faint_bg_color: match is_dark {
                true => theme.background_darker,
                false => theme.background_light,
            },
            extreme_bg_color: theme.background_darker,
            code_bg_color: theme.background_dark,
            error_fg_color: theme.red,
            warn_fg_color: theme.orange,
            window_shadow: Shadow { color: theme.background_darker, ..default.window_shadow },
            window_fill: theme.background,
            window_stroke: Stroke { color: theme.background_light, ..default.window_stroke },
            panel_fill: theme.background_dark,
            popup_shadow: Shadow { color: theme.background_dark, ..default.popup_shadow },
            collapsing_header_frame: true,
            ..default
        },
    );

    ctx.all_styles_mut(|style| {
        style.interaction.tooltip_delay = 0.0;
        style.interaction.show_tooltips_only_when_still = false;
    });
}
