use super::{ConfigFile, LineEdit, PlanContext, Step};

pub fn plan(ctx: &PlanContext) -> Vec<Step> {
    let theme = ctx.theme;
    let font = theme.font_spec();
    let mut steps = Vec::new();

    // gtk-2.0
    let gtk2 = ConfigFile::Gtk2;
    steps.push(Step::Notice("Updating GTK2.0 configs...".to_string()));
    steps.extend([
        LineEdit::set(gtk2, "gtk-theme-name=", theme.text("gtk-theme")),
        LineEdit::set(gtk2, "gtk-icon-theme-name=", theme.text("icon-theme")),
        LineEdit::set(gtk2, "gtk-font-name=", &font),
        LineEdit::set(gtk2, "gtk-cursor-theme-name=", theme.text("cursor-theme")),
        LineEdit::set(gtk2, "gtk-cursor-theme-size=", theme.text("cursor-size")),
    ]
    .map(Step::Edit));

    // gtk-3.0 and gtk-4.0 share the settings.ini layout
    for (file, label) in [(ConfigFile::Gtk3, "GTK3"), (ConfigFile::Gtk4, "GTK4")] {
        steps.push(Step::Notice(format!("Updating {} configs...", label)));
        steps.extend([
            LineEdit::set(file, "gtk-application-prefer-dark-theme=", &ctx.dark.gtk_value),
            LineEdit::set(file, "gtk-cursor-theme-name=", theme.text("cursor-theme")),
            LineEdit::set(file, "gtk-cursor-theme-size=", theme.text("cursor-size")),
            LineEdit::set(file, "gtk-font-name=", &font),
            LineEdit::set(file, "gtk-icon-theme-name=", theme.text("icon-theme")),
            LineEdit::set(file, "gtk-sound-theme-name=", theme.text("sound-theme")),
            LineEdit::set(file, "gtk-theme-name=", theme.text("gtk-theme")),
            LineEdit::set(file, "gtk-xft-dpi=", ctx.dpi.gtk),
        ]
        .map(Step::Edit));
    }

    steps.push(Step::Notice("Finished updating GTK configs.".to_string()));
    steps
}
