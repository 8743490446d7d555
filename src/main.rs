mod appliers;
mod config;
mod logger;
mod orchestrator;
mod services;
mod theme;

use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::config::Settings;
use crate::orchestrator::{RunOptions, RunReport};
use crate::services::process::SystemRunner;
use crate::theme::error::ThemeError;
use crate::theme::ValidationReport;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_help() {
    println!("desktheme {} - Apply a desktop theme description", VERSION);
    println!();
    println!("USAGE:");
    println!("    desktheme [OPTIONS] <THEME.json>");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help              Print help information");
    println!("    -v, --version           Print version information");
    println!("    --dry-run               Print planned commands and edits without applying them");
    println!("    --init-config           Write default settings to ~/.desktheme/settings.json");
    println!();
    println!("Applies the theme to X resources, KDE, GNOME, GTK 2/3/4 and Qt (qt5ct/qt6ct/Kvantum).");
}

fn print_version() {
    println!("desktheme {}", VERSION);
}

fn init_config() -> ExitCode {
    if let Some(path) = Settings::config_path().filter(|p| p.exists()) {
        eprintln!("Error: {} already exists", path.display());
        return ExitCode::FAILURE;
    }
    match Settings::default().save() {
        Ok(path) => {
            println!("Wrote default settings to {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: Failed to write settings: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Lines printed for a document that failed validation, every problem at once
fn invalid_document_lines(report: &ValidationReport) -> Vec<String> {
    let mut lines: Vec<String> = report
        .missing
        .iter()
        .map(|key| format!("Value: {} not specified in json file.", key))
        .collect();
    lines.extend(
        report
            .non_scalar
            .iter()
            .map(|key| format!("Value: {} must be a string, number or boolean.", key)),
    );
    lines.extend(
        report
            .control_chars
            .iter()
            .map(|key| format!("Value: {} contains a line break or control character.", key)),
    );
    lines.push("JSON file is not valid.".to_string());
    lines.push("Exiting...".to_string());
    lines
}

/// Prints a load/validation failure the way users of the tool expect it
fn report_fatal(err: &ThemeError) {
    match err {
        ThemeError::InvalidDocument(report) => {
            for line in invalid_document_lines(report) {
                println!("{}", line);
            }
        }
        other => eprintln!("Error: {}", other),
    }
}

fn summary_lines(report: &RunReport, dry_run: bool) -> Vec<String> {
    let mut lines = Vec::new();
    let skipped: Vec<String> = report
        .subsystems
        .iter()
        .filter(|s| s.skipped)
        .map(|s| s.subsystem.to_string())
        .collect();
    if !skipped.is_empty() {
        lines.push(format!("Skipped: {}", skipped.join(", ")));
    }
    lines.push(format!("DPI: {} (gtk-xft-dpi {})", report.dpi.base, report.dpi.gtk));
    if dry_run {
        lines.push(format!(
            "Dry run: {} step(s) planned, nothing was changed.",
            report.step_count()
        ));
        return lines;
    }

    let failures = report.failures();
    if failures.is_empty() {
        lines.push(format!(
            "Theme \"{}\" applied ({} steps).",
            report.theme_name,
            report.step_count()
        ));
        return lines;
    }
    lines.push(format!(
        "Theme \"{}\" applied with {} of {} step(s) failing:",
        report.theme_name,
        failures.len(),
        report.step_count()
    ));
    for (subsystem, outcome) in failures {
        let scope = subsystem.map(|s| s.to_string()).unwrap_or_else(|| "reload".to_string());
        let reason = outcome.error.as_ref().map(|e| e.to_string()).unwrap_or_default();
        lines.push(format!("  [{}] {}: {}", scope, outcome.description, reason));
    }
    lines
}

fn apply(theme_path: &Path, dry_run: bool) -> ExitCode {
    let settings = Settings::load();
    if let Err(e) = logger::setup_logger(&settings) {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }

    let Some(home) = dirs::home_dir() else {
        report_fatal(&ThemeError::NoHomeDir);
        return ExitCode::FAILURE;
    };

    let options = RunOptions::from_settings(&settings, dry_run);
    let mut runner = SystemRunner;
    match orchestrator::run(theme_path, &home, &mut runner, &options) {
        Ok(report) => {
            for line in summary_lines(&report, dry_run) {
                println!("{}", line);
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("Aborted before applying anything: {}", err);
            report_fatal(&err);
            ExitCode::FAILURE
        }
    }
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    let mut dry_run = false;
    let mut theme_path: Option<PathBuf> = None;

    for arg in &args {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                return ExitCode::SUCCESS;
            }
            "-v" | "--version" => {
                print_version();
                return ExitCode::SUCCESS;
            }
            "--init-config" => return init_config(),
            "--dry-run" => dry_run = true,
            other if other.starts_with('-') => {
                eprintln!("Unknown option: {}", other);
                eprintln!("Use --help for usage information");
                return ExitCode::FAILURE;
            }
            path => {
                if theme_path.is_some() {
                    eprintln!("Error: only one theme file may be given");
                    return ExitCode::FAILURE;
                }
                theme_path = Some(PathBuf::from(path));
            }
        }
    }

    let Some(theme_path) = theme_path else {
        eprintln!("Error: missing theme file");
        eprintln!("Usage: desktheme [--dry-run] <THEME.json>");
        return ExitCode::FAILURE;
    };

    apply(&theme_path, dry_run)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appliers::{StepOutcome, Subsystem, SubsystemReport};
    use crate::services::process::StepError;
    use crate::theme::DerivedDpi;

    fn report_with(outcomes: Vec<StepOutcome>) -> RunReport {
        RunReport {
            theme_name: "Nordic Night".to_string(),
            dpi: DerivedDpi::from_scale(1.25).unwrap(),
            subsystems: vec![
                SubsystemReport {
                    subsystem: Subsystem::Gnome,
                    skipped: false,
                    outcomes,
                },
                SubsystemReport {
                    subsystem: Subsystem::Kde,
                    skipped: true,
                    outcomes: Vec::new(),
                },
            ],
            reload: None,
        }
    }

    fn ok(description: &str) -> StepOutcome {
        StepOutcome {
            description: description.to_string(),
            error: None,
        }
    }

    #[test]
    fn test_invalid_document_lists_every_problem() {
        let report = ValidationReport {
            missing: vec!["icon-theme".to_string()],
            non_scalar: vec!["font".to_string()],
            control_chars: vec!["gtk-theme".to_string()],
        };
        assert_eq!(
            invalid_document_lines(&report),
            vec![
                "Value: icon-theme not specified in json file.",
                "Value: font must be a string, number or boolean.",
                "Value: gtk-theme contains a line break or control character.",
                "JSON file is not valid.",
                "Exiting...",
            ]
        );
    }

    #[test]
    fn test_dry_run_summary_shows_dpi() {
        let lines = summary_lines(&report_with(vec![ok("run gsettings")]), true);
        assert_eq!(
            lines,
            vec![
                "Skipped: KDE",
                "DPI: 120 (gtk-xft-dpi 122880)",
                "Dry run: 1 step(s) planned, nothing was changed.",
            ]
        );
    }

    #[test]
    fn test_summary_lists_failed_steps() {
        let failed = StepOutcome {
            description: "run gsettings set a b c".to_string(),
            error: Some(StepError::Spawn {
                program: "gsettings".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
            }),
        };
        let lines = summary_lines(&report_with(vec![ok("run gsettings"), failed]), false);
        assert_eq!(lines[2], "Theme \"Nordic Night\" applied with 1 of 2 step(s) failing:");
        assert!(lines[3].starts_with("  [GNOME] run gsettings set a b c: "));
    }
}
