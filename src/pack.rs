//! Resource archive packing.
//!
//! The exporter does not care how project resources are serialised; it only
//! needs an [`ArchivePacker`] that writes the archive next to the boot binary
//! or appends it to it. [`ZipPacker`] is the packer used by the command line
//! tool: it stores a project directory as a ZIP archive.

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs::OpenOptions;
use std::io::{Cursor, Seek, SeekFrom, Write};
use walkdir::{DirEntry, WalkDir};

/// Where an embedded archive was written inside the boot binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbedSpec {
    pub start: i64,
    pub size: i64,
}

pub trait ArchivePacker {
    /// Write the archive to `target`.
    ///
    /// With `embed` set, `target` is the boot binary and the archive is
    /// appended to it; the returned [`EmbedSpec`] locates the appended bytes.
    /// Otherwise the archive replaces `target` and `None` is returned.
    fn pack(&self, target: &Utf8Path, embed: bool) -> Result<Option<EmbedSpec>>;
}

/// Embedded archives start on this boundary inside the boot binary.
const EMBED_ALIGNMENT: u64 = 8;

/// Packs every regular file below a project directory into a ZIP archive.
#[derive(Debug, Clone)]
pub struct ZipPacker {
    project_dir: Utf8PathBuf,
    excluded: Vec<Utf8PathBuf>,
}

impl ZipPacker {
    pub fn new(project_dir: impl AsRef<Utf8Path>) -> Self {
        Self {
            project_dir: project_dir.as_ref().to_path_buf(),
            excluded: Vec::new(),
        }
    }

    /// Skip everything below `path`, e.g. a bundle directory inside the project.
    pub fn exclude(mut self, path: impl AsRef<Utf8Path>) -> Self {
        self.excluded.push(path.as_ref().to_path_buf());
        self
    }

    /// Build the archive in memory.
    pub fn build_archive(&self) -> Result<Vec<u8>> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::FileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);

        let root = self
            .project_dir
            .canonicalize_utf8()
            .with_context(|| format!("Project directory {} not found", self.project_dir))?;
        let excluded: Vec<Utf8PathBuf> = self
            .excluded
            .iter()
            .filter_map(|p| p.canonicalize_utf8().ok())
            .collect();

        let walker = WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_skipped(e, &excluded));
        let mut count = 0usize;
        for entry in walker {
            let entry = entry.with_context(|| format!("Failed to walk {}", root))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = Utf8Path::from_path(entry.path())
                .with_context(|| format!("Non-UTF8 path in {}", root))?;
            let rel = path.strip_prefix(&root)?;
            let name = rel.components().map(|c| c.as_str()).collect::<Vec<_>>().join("/");
            let data = std::fs::read(path).with_context(|| format!("Failed to read {}", path))?;
            zip.start_file(name, options)?;
            zip.write_all(&data)?;
            count += 1;
        }

        let bytes = zip.finish()?.into_inner();
        log::debug!("Packed {} files from {} ({} bytes)", count, self.project_dir, bytes.len());
        Ok(bytes)
    }
}

fn is_skipped(entry: &DirEntry, excluded: &[Utf8PathBuf]) -> bool {
    if entry.depth() == 0 {
        return false;
    }
    let hidden = entry.file_name().to_str().is_some_and(|n| n.starts_with('.'));
    let old_pack =
        entry.file_type().is_file() && entry.path().extension().is_some_and(|e| e == "pck");
    let excluded = excluded.iter().any(|p| entry.path().starts_with(p));
    hidden || old_pack || excluded
}

impl ArchivePacker for ZipPacker {
    fn pack(&self, target: &Utf8Path, embed: bool) -> Result<Option<EmbedSpec>> {
        let archive = self.build_archive()?;
        if !embed {
            std::fs::write(target, &archive).with_context(|| format!("Failed to write {}", target))?;
            return Ok(None);
        }

        let mut file = OpenOptions::new()
            .write(true)
            .open(target)
            .with_context(|| format!("Failed to open {}", target))?;
        let end = file.seek(SeekFrom::End(0))?;
        let padding = (EMBED_ALIGNMENT - end % EMBED_ALIGNMENT) % EMBED_ALIGNMENT;
        file.write_all(&vec![0u8; padding as usize])?;
        file.write_all(&archive)
            .with_context(|| format!("Failed to append pack to {}", target))?;
        file.flush()?;

        Ok(Some(EmbedSpec {
            start: i64::try_from(end + padding)?,
            size: i64::try_from(archive.len())?,
        }))
    }
}
