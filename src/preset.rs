//! Export preset: the per-project settings that drive an export.

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

/// Settings for one Wii export, as stored in a JSON preset file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportPreset {
    pub template_debug: String,
    pub template_release: String,
    /// Path of the executable on the SD card, passed as the first launch argument.
    pub exec_path: String,
    pub name: String,
    pub coder: String,
    pub version: String,
    /// `YYYYmmddHHMMSS`
    pub release_date: String,
    pub short_description: String,
    pub long_description: String,
    /// Extra launch arguments, split with [`crate::args::tokenize`].
    pub arguments: String,
    pub ahb_access: bool,
    pub embed_pack: bool,
}

impl Default for ExportPreset {
    fn default() -> Self {
        Self {
            template_debug: String::new(),
            template_release: String::new(),
            exec_path: String::new(),
            name: String::new(),
            coder: String::new(),
            version: "1".to_string(),
            release_date: String::new(),
            short_description: String::new(),
            long_description: String::new(),
            arguments: String::new(),
            ahb_access: false,
            embed_pack: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    String,
    Bool,
}

/// Description of one preset option, for hosts that render a settings form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOption {
    pub key: &'static str,
    pub kind: OptionKind,
    pub default: &'static str,
    /// Placeholder text, or a file filter for template paths.
    pub hint: Option<&'static str>,
}

const fn option(
    key: &'static str,
    kind: OptionKind,
    default: &'static str,
    hint: Option<&'static str>,
) -> ExportOption {
    ExportOption {
        key,
        kind,
        default,
        hint,
    }
}

const OPTIONS: &[ExportOption] = &[
    option("custom_template/debug", OptionKind::String, "", Some("*.elf,*.dol")),
    option("custom_template/release", OptionKind::String, "", Some("*.elf,*.dol")),
    option("application/exec_path", OptionKind::String, "", Some("apps/your_app/boot.elf")),
    option("application/name", OptionKind::String, "", Some("Game Name")),
    option("application/coder", OptionKind::String, "", Some("Your Name")),
    option("application/version", OptionKind::String, "1", None),
    option("application/release_date", OptionKind::String, "", Some("YYYYmmddHHMMSS")),
    option("application/short_description", OptionKind::String, "", None),
    option("application/long_description", OptionKind::String, "", None),
    option("application/arguments", OptionKind::String, "", None),
    option("application/ahb_access", OptionKind::Bool, "false", None),
    option("binary_format/embed_pck", OptionKind::Bool, "false", None),
];

/// Outcome of [`ExportPreset::can_export`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReadiness {
    pub valid: bool,
    pub missing_templates: bool,
    pub errors: Vec<String>,
}

impl ExportPreset {
    /// Load a preset from a JSON file. Missing keys take their defaults.
    pub fn from_file(path: impl AsRef<Utf8Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read preset {}", path))?;
        serde_json::from_str(&text).with_context(|| format!("Failed to parse preset {}", path))
    }

    /// All options a preset recognises, in display order.
    pub fn options() -> &'static [ExportOption] {
        OPTIONS
    }

    /// Template for the requested build, falling back to the other one when
    /// the requested path is not set. `None` when neither is set.
    pub fn template_path(&self, debug: bool) -> Option<Utf8PathBuf> {
        let (wanted, other) = if debug {
            (&self.template_debug, &self.template_release)
        } else {
            (&self.template_release, &self.template_debug)
        };
        [wanted.trim(), other.trim()]
            .into_iter()
            .find(|p| !p.is_empty())
            .map(Utf8PathBuf::from)
    }

    /// Check that at least one configured template exists.
    pub fn can_export(&self) -> ExportReadiness {
        let mut errors = Vec::new();
        let mut check = |path: &str, message: &str| {
            let path = path.trim();
            if path.is_empty() {
                return false;
            }
            let exists = Utf8Path::new(path).is_file();
            if !exists {
                errors.push(message.to_string());
            }
            exists
        };
        let debug_valid = check(&self.template_debug, "Custom debug template not found.");
        let release_valid = check(&self.template_release, "Custom release template not found.");

        let valid = debug_valid || release_valid;
        ExportReadiness {
            valid,
            missing_templates: !valid,
            errors,
        }
    }
}
