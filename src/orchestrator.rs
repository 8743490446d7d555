use std::fmt;
use std::path::Path;

use crate::appliers::{ConfigFile, Executor, PlanContext, Step, StepOutcome, Subsystem, SubsystemReport};
use crate::config::Settings;
use crate::services::process::CommandRunner;
use crate::theme::error::ThemeError;
use crate::theme::{DerivedDpi, ThemeDocument, ValidatedTheme};

/// Run stages, in order. A failure before `DpiDerived` aborts the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    Loaded,
    Validated,
    DpiDerived,
    Applied(Subsystem),
    ReloadIssued,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Applied(subsystem) => write!(f, "{}Applied", subsystem.key()),
            other => write!(f, "{:?}", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub dry_run: bool,
    pub skip: Vec<Subsystem>,
    pub reload_xresources: bool,
    pub consistent_dark_preference: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            skip: Vec::new(),
            reload_xresources: true,
            consistent_dark_preference: false,
        }
    }
}

impl RunOptions {
    pub fn from_settings(settings: &Settings, dry_run: bool) -> Self {
        Self {
            dry_run,
            skip: settings.skipped_subsystems(),
            reload_xresources: settings.reload_xresources,
            consistent_dark_preference: settings.consistent_dark_preference,
        }
    }
}

#[derive(Debug)]
pub struct RunReport {
    pub theme_name: String,
    pub dpi: DerivedDpi,
    pub subsystems: Vec<SubsystemReport>,
    pub reload: Option<StepOutcome>,
}

impl RunReport {
    pub fn step_count(&self) -> usize {
        self.subsystems.iter().map(|s| s.outcomes.len()).sum::<usize>() + usize::from(self.reload.is_some())
    }

    /// Failed steps with the subsystem they belong to (None for the reload)
    pub fn failures(&self) -> Vec<(Option<Subsystem>, &StepOutcome)> {
        let mut failed: Vec<(Option<Subsystem>, &StepOutcome)> = self
            .subsystems
            .iter()
            .flat_map(|s| s.failures().map(move |o| (Some(s.subsystem), o)))
            .collect();
        if let Some(reload) = self.reload.as_ref().filter(|r| !r.is_ok()) {
            failed.push((None, reload));
        }
        failed
    }
}

fn enter(stage: Stage) {
    log::debug!("stage: {}", stage);
}

/// Loads, validates and derives DPI. Has no side effects beyond reading `path`.
pub fn prepare(path: &Path) -> Result<(ValidatedTheme, DerivedDpi), ThemeError> {
    enter(Stage::Start);
    let document = ThemeDocument::load(path)?;
    enter(Stage::Loaded);
    let theme = document.validate()?;
    enter(Stage::Validated);
    let dpi = theme.derive_dpi()?;
    enter(Stage::DpiDerived);
    Ok((theme, dpi))
}

pub fn reload_step(home: &Path) -> Step {
    Step::run("xrdb", [ConfigFile::Xresources.path(home).display().to_string()])
}

/// Applies the theme at `path` to every enabled subsystem, then reloads X resources.
/// Only loading and validation errors are returned; step failures end up in the report.
pub fn run(
    path: &Path,
    home: &Path,
    runner: &mut dyn CommandRunner,
    options: &RunOptions,
) -> Result<RunReport, ThemeError> {
    let (theme, dpi) = prepare(path)?;

    let theme_name = theme.name();
    println!("Applying theme: {}", theme_name);
    log::info!("Applying theme {:?} from {} (dpi {}, gtk dpi {})", theme_name, path.display(), dpi.base, dpi.gtk);

    let dark = theme.dark_preference(options.consistent_dark_preference);
    if dark.rules_disagree() {
        log::warn!(
            "prefer-dark-theme = {} means dark for GNOME but light for Qt; \
             set consistent_dark_preference in settings.json to use one rule",
            theme.raw("prefer-dark-theme").map(|v| v.to_string()).unwrap_or_default()
        );
    }

    let ctx = PlanContext {
        theme: &theme,
        dpi,
        dark,
        home,
    };
    let mut executor = Executor::new(runner, home, options.dry_run);

    let mut subsystems = Vec::with_capacity(Subsystem::ALL.len());
    for subsystem in Subsystem::ALL {
        if options.skip.contains(&subsystem) {
            println!("Skipping {} (disabled in settings)", subsystem);
            subsystems.push(SubsystemReport {
                subsystem,
                skipped: true,
                outcomes: Vec::new(),
            });
            continue;
        }
        let outcomes = executor.execute(&subsystem.plan(&ctx));
        enter(Stage::Applied(subsystem));
        subsystems.push(SubsystemReport {
            subsystem,
            skipped: false,
            outcomes,
        });
    }

    let reload = if options.reload_xresources {
        let outcome = executor.execute_step(&reload_step(home));
        enter(Stage::ReloadIssued);
        outcome
    } else {
        None
    };

    enter(Stage::Done);
    Ok(RunReport {
        theme_name,
        dpi,
        subsystems,
        reload,
    })
}
