use super::{ConfigFile, LineEdit, PlanContext, Step};

const QT_FILES: [ConfigFile; 2] = [ConfigFile::Qt5ct, ConfigFile::Qt6ct];

pub fn plan(ctx: &PlanContext) -> Vec<Step> {
    let theme = ctx.theme;
    let mut steps = Vec::new();

    // custom_palette only takes effect when color_scheme_path points at a dark scheme
    // in both qt5ct.conf and qt6ct.conf
    if ctx.dark.qt {
        steps.push(Step::Notice("Dark theme is preferred. Enabling QT dark mode".to_string()));
    } else {
        steps.push(Step::Notice("Light theme is preferred. Enabling QT light mode".to_string()));
    }
    for file in QT_FILES {
        steps.push(Step::Edit(LineEdit::set(file, "custom_palette=", ctx.dark.qt)));
    }
    for file in QT_FILES {
        steps.push(Step::Edit(LineEdit::set(file, "icon_theme=", theme.text("icon-theme"))));
    }
    for file in QT_FILES {
        steps.push(Step::Edit(LineEdit::set(file, "style=", theme.text("qt-style"))));
    }

    let font = theme.qt_font_descriptor();
    for file in QT_FILES {
        steps.push(Step::Edit(LineEdit::set(file, "fixed=", &font)));
        steps.push(Step::Edit(LineEdit::set(file, "general=", &font)));
    }

    steps.push(Step::run("kvantummanager", ["--set".to_string(), theme.text("kvantum-theme")]));
    steps.push(Step::Notice("Updated QT config!".to_string()));
    steps
}
