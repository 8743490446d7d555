use super::{ConfigFile, LineEdit, PlanContext, Step};

pub fn plan(ctx: &PlanContext) -> Vec<Step> {
    let theme = ctx.theme;
    let file = ConfigFile::Xresources;
    vec![
        Step::Edit(LineEdit::set(file, "Xcursor.theme: ", theme.text("cursor-theme"))),
        Step::Edit(LineEdit::set(file, "Xcursor.size: ", theme.text("cursor-size"))),
        Step::Edit(LineEdit::set(file, "Xft.dpi: ", ctx.dpi.base)),
        Step::Notice("Finished updating xresources!".to_string()),
    ]
}
