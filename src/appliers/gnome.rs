use super::{PlanContext, Step};

const INTERFACE: &str = "org.gnome.desktop.interface";
const WM_PREFERENCES: &str = "org.gnome.desktop.wm.preferences";
const USER_THEME: &str = "org.gnome.shell.extensions.user-theme";

const MAC_BUTTON_LAYOUT: &str = "close,minimize,maximize:";
const WINDOWS_BUTTON_LAYOUT: &str = ":minimize,maximize,close";

fn gsettings_set(schema: &str, key: &str, value: impl Into<String>) -> Step {
    Step::run(
        "gsettings",
        vec!["set".to_string(), schema.to_string(), key.to_string(), value.into()],
    )
}

/// Buttons on the leading side for `mac-os`, trailing side for anything else
pub fn button_layout(ordering_style: &str) -> &'static str {
    if ordering_style == "mac-os" {
        MAC_BUTTON_LAYOUT
    } else {
        WINDOWS_BUTTON_LAYOUT
    }
}

pub fn color_scheme(prefer_dark: bool) -> &'static str {
    if prefer_dark {
        "prefer-dark"
    } else {
        "default"
    }
}

pub fn plan(ctx: &PlanContext) -> Vec<Step> {
    let theme = ctx.theme;
    vec![
        gsettings_set(INTERFACE, "gtk-theme", theme.text("gtk-theme")),
        gsettings_set(WM_PREFERENCES, "theme", theme.text("window-decoration-theme")),
        gsettings_set(INTERFACE, "font-name", theme.font_spec()),
        gsettings_set(INTERFACE, "color-scheme", color_scheme(ctx.dark.gnome)),
        gsettings_set(INTERFACE, "icon-theme", theme.text("icon-theme")),
        gsettings_set(INTERFACE, "cursor-theme", theme.text("cursor-theme")),
        gsettings_set(INTERFACE, "cursor-size", theme.text("cursor-size")),
        gsettings_set(USER_THEME, "name", theme.text("gtk-theme")),
        gsettings_set(
            WM_PREFERENCES,
            "button-layout",
            button_layout(&theme.text("window-button-ordering-style")),
        ),
        Step::Notice("Finished updating gnome theme settings".to_string()),
    ]
}
