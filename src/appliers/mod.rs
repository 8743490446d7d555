//! Per-subsystem appliers.
//!
//! Each applier turns a validated theme into an ordered plan of [`Step`]s.
//! Planning is pure; [`Executor`] runs a plan against the real system (or
//! only prints it in dry-run mode). A failing step never stops the steps
//! after it.

pub mod gnome;
pub mod gtk;
pub mod kde;
pub mod qt;
pub mod xresources;

use std::fmt;
use std::path::{Path, PathBuf};

use crate::services::line_edit;
use crate::services::process::{run_checked, CommandRunner, Invocation, StepError};
use crate::theme::{DarkPreference, DerivedDpi, ValidatedTheme};

// ─── Subsystems ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subsystem {
    XResources,
    Kde,
    Gnome,
    Gtk,
    Qt,
}

impl Subsystem {
    /// Application order
    pub const ALL: [Subsystem; 5] = [
        Subsystem::XResources,
        Subsystem::Kde,
        Subsystem::Gnome,
        Subsystem::Gtk,
        Subsystem::Qt,
    ];

    /// Name used in settings.json
    pub fn key(&self) -> &'static str {
        match self {
            Self::XResources => "xresources",
            Self::Kde => "kde",
            Self::Gnome => "gnome",
            Self::Gtk => "gtk",
            Self::Qt => "qt",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim().to_lowercase();
        Self::ALL.into_iter().find(|s| s.key() == key)
    }

    pub fn plan(&self, ctx: &PlanContext) -> Vec<Step> {
        match self {
            Self::XResources => xresources::plan(ctx),
            Self::Kde => kde::plan(ctx),
            Self::Gnome => gnome::plan(ctx),
            Self::Gtk => gtk::plan(ctx),
            Self::Qt => qt::plan(ctx),
        }
    }
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::XResources => "X resources",
            Self::Kde => "KDE",
            Self::Gnome => "GNOME",
            Self::Gtk => "GTK",
            Self::Qt => "Qt",
        };
        f.write_str(name)
    }
}

/// Everything an applier may read while planning
pub struct PlanContext<'a> {
    pub theme: &'a ValidatedTheme,
    pub dpi: DerivedDpi,
    pub dark: DarkPreference,
    pub home: &'a Path,
}

// ─── Config files ──────────────────────────────────────────────────────

/// Text config files edited in place, relative to the home directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFile {
    Xresources,
    Gtk2,
    Gtk3,
    Gtk4,
    Qt5ct,
    Qt6ct,
}

impl ConfigFile {
    pub fn relative_path(&self) -> &'static str {
        match self {
            Self::Xresources => ".Xresources",
            Self::Gtk2 => ".gtkrc-2.0",
            Self::Gtk3 => ".config/gtk-3.0/settings.ini",
            Self::Gtk4 => ".config/gtk-4.0/settings.ini",
            Self::Qt5ct => ".config/qt5ct/qt5ct.conf",
            Self::Qt6ct => ".config/qt6ct/qt6ct.conf",
        }
    }

    pub fn path(&self, home: &Path) -> PathBuf {
        home.join(self.relative_path())
    }
}

// ─── Steps ─────────────────────────────────────────────────────────────

/// Replace every line starting with `key` in `file` by `line`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineEdit {
    pub file: ConfigFile,
    pub key: String,
    pub line: String,
}

impl LineEdit {
    /// The new line is `key` immediately followed by `value`.
    pub fn set(file: ConfigFile, key: &str, value: impl fmt::Display) -> Self {
        Self {
            file,
            key: key.to_string(),
            line: format!("{}{}", key, value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Edit(LineEdit),
    Run(Invocation),
    /// Progress line for the user
    Notice(String),
}

impl Step {
    pub fn run<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Run(Invocation::new(program, args))
    }

    pub fn describe(&self, home: &Path) -> String {
        match self {
            Self::Edit(edit) => format!("edit {}: {}", edit.file.path(home).display(), edit.line),
            Self::Run(invocation) => format!("run {}", invocation),
            Self::Notice(message) => message.clone(),
        }
    }
}

#[derive(Debug)]
pub struct StepOutcome {
    pub description: String,
    pub error: Option<StepError>,
}

impl StepOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug)]
pub struct SubsystemReport {
    pub subsystem: Subsystem,
    pub skipped: bool,
    pub outcomes: Vec<StepOutcome>,
}

impl SubsystemReport {
    pub fn failures(&self) -> impl Iterator<Item = &StepOutcome> {
        self.outcomes.iter().filter(|o| !o.is_ok())
    }
}

// ─── Executor ──────────────────────────────────────────────────────────

/// Runs plans step by step, recording one outcome per edit or command.
pub struct Executor<'a> {
    runner: &'a mut dyn CommandRunner,
    home: &'a Path,
    dry_run: bool,
}

impl<'a> Executor<'a> {
    pub fn new(runner: &'a mut dyn CommandRunner, home: &'a Path, dry_run: bool) -> Self {
        Self { runner, home, dry_run }
    }

    pub fn execute(&mut self, steps: &[Step]) -> Vec<StepOutcome> {
        steps.iter().filter_map(|step| self.execute_step(step)).collect()
    }

    /// Notices are printed and produce no outcome.
    pub fn execute_step(&mut self, step: &Step) -> Option<StepOutcome> {
        let description = step.describe(self.home);
        if let Step::Notice(message) = step {
            println!("{}", message);
            return None;
        }
        if self.dry_run {
            println!("  [dry-run] {}", description);
            return Some(StepOutcome { description, error: None });
        }

        let error = match step {
            Step::Edit(edit) => {
                let path = edit.file.path(self.home);
                line_edit::edit_file(&path, &edit.key, &edit.line)
                    .map(|_| ())
                    .map_err(|source| {
                        log::warn!("Failed to edit {}: {}", path.display(), source);
                        StepError::Edit {
                            path: path.display().to_string(),
                            source,
                        }
                    })
                    .err()
            }
            Step::Run(invocation) => run_checked(&mut *self.runner, invocation).err(),
            Step::Notice(_) => None,
        };
        Some(StepOutcome { description, error })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::services::process::tests::RecordingRunner;
    use crate::theme::tests::sample_theme;
    use std::fs;

    pub(crate) fn plan_for(subsystem: Subsystem, theme: &ValidatedTheme, home: &Path) -> Vec<Step> {
        let ctx = PlanContext {
            theme,
            dpi: theme.derive_dpi().unwrap(),
            dark: theme.dark_preference(false),
            home,
        };
        subsystem.plan(&ctx)
    }

    pub(crate) fn edits(steps: &[Step]) -> Vec<&LineEdit> {
        steps
            .iter()
            .filter_map(|s| match s {
                Step::Edit(e) => Some(e),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn invocations(steps: &[Step]) -> Vec<&Invocation> {
        steps
            .iter()
            .filter_map(|s| match s {
                Step::Run(i) => Some(i),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_subsystem_from_key() {
        assert_eq!(Subsystem::from_key("KDE"), Some(Subsystem::Kde));
        assert_eq!(Subsystem::from_key(" gtk "), Some(Subsystem::Gtk));
        assert_eq!(Subsystem::from_key("xfce"), None);
    }

    #[test]
    fn test_line_edit_set() {
        let edit = LineEdit::set(ConfigFile::Xresources, "Xft.dpi: ", 96);
        assert_eq!(edit.line, "Xft.dpi: 96");
    }

    #[test]
    fn test_executor_continues_after_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut runner = RecordingRunner::default();
        runner.missing.push("lookandfeeltool".to_string());
        let steps = vec![
            Step::run("lookandfeeltool", ["-a", "org.kde.breeze.desktop"]),
            Step::Edit(LineEdit::set(ConfigFile::Xresources, "Xft.dpi: ", 96)),
            Step::Notice("done".to_string()),
            Step::run("xrdb", ["x"]),
        ];
        let outcomes = Executor::new(&mut runner, dir.path(), false).execute(&steps);
        assert_eq!(outcomes.len(), 3);
        assert!(matches!(outcomes[0].error, Some(StepError::Spawn { .. })));
        // ~/.Xresources does not exist
        assert!(matches!(outcomes[1].error, Some(StepError::Edit { .. })));
        assert!(outcomes[2].is_ok());
        assert_eq!(runner.programs(), vec!["lookandfeeltool", "xrdb"]);
    }

    #[test]
    fn test_executor_dry_run_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let xres = ConfigFile::Xresources.path(dir.path());
        fs::write(&xres, "Xft.dpi: 192\n").unwrap();
        let mut runner = RecordingRunner::default();
        let theme = sample_theme();
        let steps = plan_for(Subsystem::XResources, &theme, dir.path());
        let outcomes = Executor::new(&mut runner, dir.path(), true).execute(&steps);
        assert!(outcomes.iter().all(|o| o.is_ok()));
        assert!(runner.calls.is_empty());
        assert_eq!(fs::read_to_string(&xres).unwrap(), "Xft.dpi: 192\n");
    }

    #[test]
    fn test_every_subsystem_plans_steps() {
        let theme = sample_theme();
        let home = Path::new("/home/user");
        for subsystem in Subsystem::ALL {
            assert!(!plan_for(subsystem, &theme, home).is_empty(), "{} has no steps", subsystem);
        }
    }
}
