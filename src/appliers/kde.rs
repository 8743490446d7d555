use super::{PlanContext, Step};
use crate::theme::DECORATION_LIBRARY_KEY;

const KWRITECONFIG: &str = "kwriteconfig6";
const APPLY_DECORATION: &str = "/usr/lib/kwin-applywindowdecoration";

fn kwriteconfig(file: &str, group: &str, key: &str, value: String) -> Step {
    Step::run(
        KWRITECONFIG,
        vec![
            "--file".to_string(),
            file.to_string(),
            "--group".to_string(),
            group.to_string(),
            "--key".to_string(),
            key.to_string(),
            value,
        ],
    )
}

pub fn plan(ctx: &PlanContext) -> Vec<Step> {
    let theme = ctx.theme;
    let kcminputrc = ctx.home.join(".config/kcminputrc").display().to_string();
    let ksplashrc = ctx.home.join(".config/ksplashrc").display().to_string();

    let mut steps = vec![
        Step::run("lookandfeeltool", ["-a".to_string(), theme.text("kde-global-theme")]),
        kwriteconfig("kdeglobals", "General", "ColorScheme", theme.text("kde-color-scheme")),
        kwriteconfig("kdeglobals", "KDE", "widgetStyle", theme.text("widget-style")),
        kwriteconfig("kdeglobals", "Icons", "Theme", theme.text("icon-theme")),
        kwriteconfig(&kcminputrc, "Mouse", "cursorTheme", theme.text("cursor-theme")),
        kwriteconfig(&kcminputrc, "Mouse", "cursorSize", theme.text("cursor-size")),
        kwriteconfig(&ksplashrc, "KSplash", "Theme", theme.text("kde-splash")),
        kwriteconfig("kdeglobals", "Sounds", "Theme", theme.text("sound-theme")),
    ];

    // Aurorae decorations only; opt-in via the optional library key
    if theme.has(DECORATION_LIBRARY_KEY) {
        steps.push(Step::run(
            APPLY_DECORATION,
            [format!("__aurorae__svg__{}", theme.text("window-decoration-theme"))],
        ));
    }

    steps.push(Step::Notice("Finished updating KDE theme settings!".to_string()));
    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appliers::tests::{invocations, plan_for};
    use crate::appliers::Subsystem;
    use crate::theme::tests::{sample_json, sample_theme, theme_from};
    use std::path::Path;

    #[test]
    fn test_command_order() {
        let theme = sample_theme();
        let steps = plan_for(Subsystem::Kde, &theme, Path::new("/home/u"));
        let runs = invocations(&steps);
        assert_eq!(runs.len(), 8);
        assert_eq!(runs[0].program, "lookandfeeltool");
        assert_eq!(runs[0].args, vec!["-a", "org.kde.breezedark.desktop"]);
        assert!(runs[1..].iter().all(|r| r.program == KWRITECONFIG));
        assert_eq!(
            runs[1].args,
            vec!["--file", "kdeglobals", "--group", "General", "--key", "ColorScheme", "BreezeDark"]
        );
    }

    #[test]
    fn test_cursor_settings_use_home_paths() {
        let theme = sample_theme();
        let steps = plan_for(Subsystem::Kde, &theme, Path::new("/home/u"));
        let runs = invocations(&steps);
        assert_eq!(
            runs[5].args,
            vec!["--file", "/home/u/.config/kcminputrc", "--group", "Mouse", "--key", "cursorSize", "24"]
        );
        assert_eq!(runs[6].args[1], "/home/u/.config/ksplashrc");
    }

    #[test]
    fn test_widget_style_with_spaces_is_one_argument() {
        let mut value = sample_json();
        value["widget-style"] = "Breeze Classic".into();
        let theme = theme_from(value);
        let steps = plan_for(Subsystem::Kde, &theme, Path::new("/home/u"));
        assert_eq!(invocations(&steps)[2].args.last().unwrap(), "Breeze Classic");
    }

    #[test]
    fn test_decoration_step_is_opt_in() {
        let theme = sample_theme();
        let steps = plan_for(Subsystem::Kde, &theme, Path::new("/home/u"));
        assert!(invocations(&steps).iter().all(|r| r.program != APPLY_DECORATION));

        let mut value = sample_json();
        value[DECORATION_LIBRARY_KEY] = "aurorae".into();
        let theme = theme_from(value);
        let steps = plan_for(Subsystem::Kde, &theme, Path::new("/home/u"));
        let last = invocations(&steps).pop().unwrap().clone();
        assert_eq!(last.program, APPLY_DECORATION);
        assert_eq!(last.args, vec!["__aurorae__svg__Nordic"]);
    }
}
