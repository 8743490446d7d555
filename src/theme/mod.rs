pub mod error;

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use serde_json::{Map, Value};

use error::ThemeError;

/// Keys every theme document must define with a non-null value.
pub const REQUIRED_KEYS: [&str; 19] = [
    "name",
    "dpi",
    "font",
    "font-size",
    "window-button-ordering-style",
    "prefer-dark-theme",
    "gtk-theme",
    "sound-theme",
    "icon-theme",
    "cursor-theme",
    "cursor-size",
    "kde-global-theme",
    "kde-splash",
    "widget-style",
    "kde-color-scheme",
    "window-decoration-theme",
    "kvantum-theme",
    "qt-style",
    "qt-dark-mode",
];

/// Optional key that enables the KWin window decoration step.
pub const DECORATION_LIBRARY_KEY: &str = "window-decoration-library";

/// Base DPI that a scale factor of 1 maps to
const BASE_DPI: f64 = 96.0;
/// GTK stores gtk-xft-dpi in 1024ths of a dot
const GTK_DPI_FACTOR: u64 = 1024;

// ─── Loaded document ───────────────────────────────────────────────────

/// A parsed but not yet validated theme document.
#[derive(Debug, Clone)]
pub struct ThemeDocument {
    values: Map<String, Value>,
}

/// Result of checking a document against [`REQUIRED_KEYS`].
/// Both lists keep the declaration order of [`REQUIRED_KEYS`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub missing: Vec<String>,
    pub non_scalar: Vec<String>,
    /// String values holding line breaks or other control characters,
    /// which would split a keyed config line in two
    pub control_chars: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.missing.is_empty() && self.non_scalar.is_empty() && self.control_chars.is_empty()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if !self.missing.is_empty() {
            parts.push(format!("missing required keys: {}", self.missing.join(", ")));
        }
        if !self.non_scalar.is_empty() {
            parts.push(format!("not a string, number or boolean: {}", self.non_scalar.join(", ")));
        }
        if !self.control_chars.is_empty() {
            parts.push(format!("control characters in: {}", self.control_chars.join(", ")));
        }
        f.write_str(&parts.join("; "))
    }
}

impl ThemeDocument {
    /// Reads and parses a theme file. Nothing else is touched.
    pub fn load(path: &Path) -> Result<Self, ThemeError> {
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ThemeError::FileNotFound(path.to_path_buf()),
            _ => ThemeError::Io(e),
        })?;
        Self::parse(&content, path)
    }

    /// Parses document text; `path` is only used for diagnostics.
    pub fn parse(content: &str, path: &Path) -> Result<Self, ThemeError> {
        let value: Value = serde_json::from_str(content).map_err(|source| ThemeError::InvalidJson {
            path: path.to_path_buf(),
            source,
        })?;
        match value {
            Value::Object(values) => Ok(Self { values }),
            _ => Err(ThemeError::NotAnObject),
        }
    }

    /// Checks every required key and reports all problems at once.
    pub fn validation_report(&self) -> ValidationReport {
        let mut report = ValidationReport::default();
        for key in REQUIRED_KEYS {
            match self.values.get(key) {
                None | Some(Value::Null) => report.missing.push(key.to_string()),
                Some(Value::Array(_)) | Some(Value::Object(_)) => report.non_scalar.push(key.to_string()),
                Some(Value::String(s)) if s.chars().any(char::is_control) => {
                    report.control_chars.push(key.to_string())
                }
                Some(_) => {}
            }
        }
        report
    }

    pub fn validate(self) -> Result<ValidatedTheme, ThemeError> {
        let report = self.validation_report();
        if report.is_valid() {
            Ok(ValidatedTheme { values: self.values })
        } else {
            Err(ThemeError::InvalidDocument(report))
        }
    }
}

// ─── Validated document ────────────────────────────────────────────────

/// A theme document whose required keys are all present and scalar.
/// Read-only for the rest of the run.
#[derive(Debug, Clone)]
pub struct ValidatedTheme {
    values: Map<String, Value>,
}

impl ValidatedTheme {
    pub fn name(&self) -> String {
        self.text("name")
    }

    /// Renders a value as it is written into config files and command arguments.
    /// Unknown keys render as an empty string.
    pub fn text(&self, key: &str) -> String {
        self.values.get(key).map(render_scalar).unwrap_or_default()
    }

    pub fn raw(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// True when the key is present with a non-null value.
    pub fn has(&self, key: &str) -> bool {
        !matches!(self.values.get(key), None | Some(Value::Null))
    }

    /// `"<family>, <size>"` as used by GTK and gsettings
    pub fn font_spec(&self) -> String {
        format!("{}, {}", self.text("font"), self.text("font-size"))
    }

    /// Quoted qt5ct/qt6ct font descriptor
    pub fn qt_font_descriptor(&self) -> String {
        format!(
            "\"{},{},-1,5,50,0,0,0,0,0,Regular\"",
            self.text("font"),
            self.text("font-size")
        )
    }

    pub fn derive_dpi(&self) -> Result<DerivedDpi, ThemeError> {
        let raw = self.values.get("dpi").unwrap_or(&Value::Null);
        let scale = parse_scale(raw).ok_or_else(|| ThemeError::InvalidValue {
            key: "dpi".to_string(),
            reason: format!("expected a number, got {}", raw),
        })?;
        DerivedDpi::from_scale(scale)
    }

    pub fn dark_preference(&self, consistent: bool) -> DarkPreference {
        let raw = self.values.get("prefer-dark-theme").unwrap_or(&Value::Null);
        DarkPreference::resolve(raw, consistent)
    }
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn parse_scale(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

// ─── DPI ───────────────────────────────────────────────────────────────

/// DPI values computed once from the document's scale factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedDpi {
    /// `round(scale * 96)`, used by X resources
    pub base: u64,
    /// `base * 1024`, used by gtk-xft-dpi
    pub gtk: u64,
}

impl DerivedDpi {
    pub fn from_scale(scale: f64) -> Result<Self, ThemeError> {
        let invalid = |reason: &str| ThemeError::InvalidValue {
            key: "dpi".to_string(),
            reason: reason.to_string(),
        };
        if !scale.is_finite() || scale <= 0.0 {
            return Err(invalid("scale factor must be a positive number"));
        }
        let base = (scale * BASE_DPI).round();
        // u64::MAX as f64 rounds up to 2^64, so anything at or above it saturates
        if base < 1.0 || base >= u64::MAX as f64 {
            return Err(invalid("scale factor out of range"));
        }
        let base = base as u64;
        let gtk = base
            .checked_mul(GTK_DPI_FACTOR)
            .ok_or_else(|| invalid("scale factor out of range"))?;
        Ok(Self { base, gtk })
    }
}

// ─── Dark preference ───────────────────────────────────────────────────

/// How `prefer-dark-theme` is interpreted by each consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DarkPreference {
    /// GNOME color-scheme: prefer-dark vs default
    pub gnome: bool,
    /// qt5ct/qt6ct custom_palette flag
    pub qt: bool,
    /// Value written to gtk-application-prefer-dark-theme
    pub gtk_value: String,
}

impl DarkPreference {
    /// Without `consistent`, GNOME uses truthiness and Qt requires the exact
    /// string `"true"`. With it, both use [`parse_flag`].
    pub fn resolve(raw: &Value, consistent: bool) -> Self {
        if consistent {
            let flag = parse_flag(raw);
            Self {
                gnome: flag,
                qt: flag,
                gtk_value: flag.to_string(),
            }
        } else {
            Self {
                gnome: is_truthy(raw),
                qt: raw.as_str() == Some("true"),
                gtk_value: render_scalar(raw),
            }
        }
    }

    pub fn rules_disagree(&self) -> bool {
        self.gnome != self.qt
    }
}

/// Loose truthiness: `true`, any non-zero number, any non-empty string.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::Null => false,
    }
}

/// Strict flag parsing: `true`, `"true"`/`"1"`/`"yes"`/`"on"` (any case), or a non-zero number.
pub fn parse_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes" | "on"),
        _ => false,
    }
}
