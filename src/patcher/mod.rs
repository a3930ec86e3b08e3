//! In-place patching of the boot executable's `pck` section.
//!
//! When the pack is embedded, it is appended after the executable's own bytes
//! and the template's (initially empty) `pck` section header is rewritten to
//! point at it, so the runtime can find its data inside its own binary.
//!
//! - [`elf`] – ELF header and section header table access

pub mod elf;

pub use elf::{AddressWidth, ElfImage, SectionHeaderRef, SectionTable, ELF_MAGIC};

use crate::error::{ExportError, Result};
use byteorder::BigEndian;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs::{File, OpenOptions};

/// Name of the section that records the embedded pack's location.
pub const PCK_SECTION: &str = "pck";

/// Executable container of an export template, decided by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerFormat {
    Elf,
    /// `.dol`, the Wii's native loader format. Cannot be patched.
    Dol,
}

impl ContainerFormat {
    pub fn from_path(path: &Utf8Path) -> Self {
        match path.extension() {
            Some(ext) if ext.eq_ignore_ascii_case("dol") => ContainerFormat::Dol,
            _ => ContainerFormat::Elf,
        }
    }
}

/// A boot executable on disk. Wii binaries are always big-endian.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryArtifact {
    pub path: Utf8PathBuf,
    pub format: ContainerFormat,
    /// `None` for `.dol` files, which carry no ELF class.
    pub width: Option<AddressWidth>,
}

impl BinaryArtifact {
    /// Identify the container format and, for ELF files, read the address width.
    pub fn identify(path: impl AsRef<Utf8Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = ContainerFormat::from_path(path);
        let width = match format {
            ContainerFormat::Dol => None,
            ContainerFormat::Elf => Some(open_read(path)?.width()),
        };
        Ok(Self {
            path: path.to_path_buf(),
            format,
            width,
        })
    }
}

/// Header index and current `(offset, size)` of a named section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionRecord {
    pub index: u16,
    pub offset: u64,
    pub size: u64,
}

/// Record `(embed_start, embed_size)` in the `pck` section header of the ELF at `path`.
///
/// The file is left untouched unless the section is found and the location
/// fits the image's address width.
pub fn patch(path: impl AsRef<Utf8Path>, embed_start: i64, embed_size: i64) -> Result<()> {
    let path = path.as_ref();
    if ContainerFormat::from_path(path) == ContainerFormat::Dol {
        return Err(ExportError::UnsupportedFormat(path.to_path_buf()));
    }

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .map_err(|source| ExportError::CannotOpen {
            path: path.to_path_buf(),
            source,
        })?;
    let mut image = ElfImage::new(file, path)?;
    let (start, size) = check_embed_location(image.width(), embed_start, embed_size)?;

    let table = image.section_table::<BigEndian>()?;
    let names = image.section_names::<BigEndian>(&table)?;
    let section = image
        .find_section::<BigEndian>(&table, &names, PCK_SECTION)?
        .ok_or_else(|| ExportError::SectionNotFound(path.to_path_buf()))?;

    log::debug!(
        "{}: patching section {} at {:#x} with offset {:#x}, size {:#x}",
        path,
        section.index,
        section.header_pos,
        start,
        size
    );
    image.write_location::<BigEndian>(&section, start, size)
}

/// Look up a section by name in the ELF at `path` without modifying it.
pub fn read_section(path: impl AsRef<Utf8Path>, name: &str) -> Result<Option<SectionRecord>> {
    let path = path.as_ref();
    if ContainerFormat::from_path(path) == ContainerFormat::Dol {
        return Err(ExportError::UnsupportedFormat(path.to_path_buf()));
    }
    let mut image = open_read(path)?;
    let table = image.section_table::<BigEndian>()?;
    let names = image.section_names::<BigEndian>(&table)?;
    let Some(section) = image.find_section::<BigEndian>(&table, &names, name)? else {
        return Ok(None);
    };
    let (offset, size) = image.read_location::<BigEndian>(&section)?;
    Ok(Some(SectionRecord {
        index: section.index,
        offset,
        size,
    }))
}

fn open_read(path: &Utf8Path) -> Result<ElfImage<File>> {
    let file = File::open(path).map_err(|source| ExportError::CannotOpen {
        path: path.to_path_buf(),
        source,
    })?;
    ElfImage::new(file, path)
}

/// Validate an embed location against the width of the target's fields.
fn check_embed_location(width: AddressWidth, start: i64, size: i64) -> Result<(u64, u64)> {
    let start = u64::try_from(start)
        .map_err(|_| ExportError::InvalidData(format!("negative embed start {}", start)))?;
    let size = u64::try_from(size)
        .map_err(|_| ExportError::InvalidData(format!("negative embed size {}", size)))?;
    if size > width.max_word() {
        return Err(ExportError::InvalidData(format!(
            "{}-bit executables cannot have embedded data >= 4 GiB (got {} bytes)",
            width.bits(),
            size
        )));
    }
    if start > width.max_word() {
        return Err(ExportError::InvalidData(format!(
            "{}-bit executables cannot have embedded data starting at {:#x}",
            width.bits(),
            start
        )));
    }
    Ok((start, size))
}
