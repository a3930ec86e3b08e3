//! The export pipeline: turn an export template and project resources into a
//! Homebrew Channel bundle.
//!
//! A bundle directory contains:
//!
//! - `boot.elf` or `boot.dol`, copied from the export template;
//! - `icon.png`, if the project has an icon;
//! - `boot.pck`, unless the pack is embedded in `boot.elf`;
//! - `meta.xml`, the application manifest.
//!
//! Steps run in that order and the first failure aborts the export. Files
//! written by earlier steps are left in place.

use crate::error::{ExportError, Result};
use crate::manifest::{self, MANIFEST_FILE};
use crate::pack::{ArchivePacker, EmbedSpec};
use crate::patcher::{self, ContainerFormat};
use crate::preset::ExportPreset;
use anyhow::anyhow;
use camino::{Utf8Path, Utf8PathBuf};

/// Host services available to an export.
pub struct ExportContext<'a> {
    pub packer: &'a dyn ArchivePacker,
    /// Project icon, copied into the bundle as `icon.png`.
    pub icon_path: Option<Utf8PathBuf>,
    /// Messages meant for the operator, in the order they were raised.
    pub warnings: Vec<String>,
}

impl<'a> ExportContext<'a> {
    pub fn new(packer: &'a dyn ArchivePacker) -> Self {
        Self {
            packer,
            icon_path: None,
            warnings: Vec::new(),
        }
    }

    pub fn with_icon(mut self, icon_path: impl Into<Utf8PathBuf>) -> Self {
        self.icon_path = Some(icon_path.into());
        self
    }

    fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{}", message);
        self.warnings.push(message);
    }
}

/// Files produced by a successful export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedBundle {
    pub boot: Utf8PathBuf,
    pub icon: Option<Utf8PathBuf>,
    /// Sidecar pack file; `None` when the pack is embedded.
    pub pack: Option<Utf8PathBuf>,
    pub embedded: Option<EmbedSpec>,
    pub manifest: Utf8PathBuf,
}

/// Export `preset` into the directory containing `output_path`.
pub fn export(
    ctx: &mut ExportContext<'_>,
    preset: &ExportPreset,
    debug: bool,
    output_path: impl AsRef<Utf8Path>,
) -> Result<ExportedBundle> {
    let output_path = output_path.as_ref();
    let base_dir = match output_path.parent() {
        Some(dir) if !dir.as_str().is_empty() => dir.to_path_buf(),
        _ => Utf8PathBuf::from("."),
    };
    if !base_dir.is_dir() {
        return Err(ExportError::BadPath(base_dir));
    }

    // Template and icon
    let template = select_template(ctx, preset, debug)?;
    let format = ContainerFormat::from_path(&template);
    if format == ContainerFormat::Dol && preset.embed_pack {
        ctx.warn("\"Embed Pck\" is currently not supported for .DOL templates.");
        return Err(ExportError::UnsupportedCombination(template));
    }

    let boot = base_dir.join(format!("boot.{}", template.extension().unwrap_or("elf")));
    if is_same_file(&template, &boot) {
        return Err(ExportError::BadPath(boot));
    }
    log::info!("Copying template {} to {}", template, boot);
    copy(&template, &boot)?;

    let icon = match ctx.icon_path.as_deref().map(|p| p.as_str().trim()) {
        Some(icon) if !icon.is_empty() => {
            let icon = Utf8Path::new(icon);
            if icon.is_file() {
                let dest = base_dir.join("icon.png");
                copy(icon, &dest)?;
                Some(dest)
            } else {
                log::warn!("Project icon {} does not exist, skipping", icon);
                None
            }
        }
        _ => None,
    };

    // Pack
    let pack_target = if preset.embed_pack {
        boot.clone()
    } else {
        boot.with_extension("pck")
    };
    log::info!(
        "Saving pack to {}{}",
        pack_target,
        if preset.embed_pack { " (embedded)" } else { "" }
    );
    let embedded = ctx
        .packer
        .pack(&pack_target, preset.embed_pack)
        .map_err(|source| ExportError::ArchivePackingFailed {
            path: pack_target.clone(),
            source: source.into(),
        })?;

    if preset.embed_pack {
        let spec = embedded.ok_or_else(|| ExportError::ArchivePackingFailed {
            path: pack_target.clone(),
            source: anyhow!("packer did not report where the pack was embedded").into(),
        })?;
        log::info!("Recording embedded pack at {:#x} ({} bytes)", spec.start, spec.size);
        patcher::patch(&boot, spec.start, spec.size)?;
    }

    // Manifest
    let manifest_path = base_dir.join(MANIFEST_FILE);
    let xml = manifest::build(preset, &manifest::argument_list(preset));
    std::fs::write(&manifest_path, xml).map_err(|source| ExportError::ManifestWriteFailed {
        path: manifest_path.clone(),
        source,
    })?;
    log::info!("Wrote {}", manifest_path);

    Ok(ExportedBundle {
        boot,
        icon,
        pack: (!preset.embed_pack).then_some(pack_target),
        embedded: if preset.embed_pack { embedded } else { None },
        manifest: manifest_path,
    })
}

fn select_template(
    ctx: &mut ExportContext<'_>,
    preset: &ExportPreset,
    debug: bool,
) -> Result<Utf8PathBuf> {
    let Some(template) = preset.template_path(debug) else {
        ctx.warn("No export template configured.");
        return Err(ExportError::TemplateMissing("(none configured)".to_string()));
    };
    if !template.is_file() {
        ctx.warn(format!("Template file not found:\n{}", template));
        return Err(ExportError::TemplateMissing(template.into_string()));
    }
    Ok(template)
}

fn copy(from: &Utf8Path, to: &Utf8Path) -> Result<()> {
    std::fs::copy(from, to).map_err(|source| ExportError::CopyFailed {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    })?;
    Ok(())
}

fn is_same_file(a: &Utf8Path, b: &Utf8Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
