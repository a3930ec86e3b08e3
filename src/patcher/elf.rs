//! Minimal ELF header and section header table access.
//!
//! Only the fields needed to find a section by name and to rewrite its file
//! offset and size are read. The byte order is passed to every multi-byte
//! access as a [`ByteOrder`] type parameter; Wii executables are always
//! big-endian.

use crate::error::{ExportError, Result};
use byteorder::{ByteOrder, ReadBytesExt, WriteBytesExt};
use camino::{Utf8Path, Utf8PathBuf};
use std::io::{ErrorKind as IoErrorKind, Read, Seek, SeekFrom, Write};

/// `0x7F 'E' 'L' 'F'`
pub const ELF_MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];

/// Offset of `EI_CLASS` in the identification bytes.
const CLASS_OFFSET: u64 = 4;

/// Address-width class of an ELF image, read from `EI_CLASS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressWidth {
    Bits32,
    Bits64,
}

impl AddressWidth {
    pub fn from_class(class: u8) -> Option<Self> {
        match class {
            1 => Some(AddressWidth::Bits32),
            2 => Some(AddressWidth::Bits64),
            _ => None,
        }
    }

    pub fn bits(self) -> u32 {
        match self {
            AddressWidth::Bits32 => 32,
            AddressWidth::Bits64 => 64,
        }
    }

    /// Size of one section header table entry.
    pub fn section_header_size(self) -> u64 {
        match self {
            AddressWidth::Bits32 => 40,
            AddressWidth::Bits64 => 64,
        }
    }

    /// Largest value an address-sized field can hold.
    pub fn max_word(self) -> u64 {
        match self {
            AddressWidth::Bits32 => u32::MAX as u64,
            AddressWidth::Bits64 => u64::MAX,
        }
    }

    /// Position of `e_shoff` in the file header.
    fn section_table_field(self) -> u64 {
        match self {
            AddressWidth::Bits32 => 0x20,
            AddressWidth::Bits64 => 0x28,
        }
    }

    /// Position of `e_shnum` in the file header; `e_shstrndx` follows it.
    fn section_count_field(self) -> u64 {
        match self {
            AddressWidth::Bits32 => 0x30,
            AddressWidth::Bits64 => 0x3c,
        }
    }

    /// Position of `sh_offset` inside a section header; `sh_size` follows it.
    fn section_offset_field(self) -> u64 {
        match self {
            AddressWidth::Bits32 => 0x10,
            AddressWidth::Bits64 => 0x18,
        }
    }

    fn word_size(self) -> u64 {
        match self {
            AddressWidth::Bits32 => 4,
            AddressWidth::Bits64 => 8,
        }
    }

    fn read_word<B: ByteOrder, R: Read>(self, reader: &mut R) -> std::io::Result<u64> {
        match self {
            AddressWidth::Bits32 => reader.read_u32::<B>().map(u64::from),
            AddressWidth::Bits64 => reader.read_u64::<B>(),
        }
    }

    fn write_word<B: ByteOrder, W: Write>(self, writer: &mut W, value: u64) -> std::io::Result<()> {
        match self {
            AddressWidth::Bits32 => writer.write_u32::<B>(value as u32),
            AddressWidth::Bits64 => writer.write_u64::<B>(value),
        }
    }
}

/// Location of the section header table, read from the file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionTable {
    pub offset: u64,
    pub entry_size: u64,
    pub count: u16,
    pub names_index: u16,
}

impl SectionTable {
    /// File position of a section header; `None` if it overflows `u64`.
    pub fn header_pos(&self, index: u16) -> Option<u64> {
        (index as u64)
            .checked_mul(self.entry_size)
            .and_then(|rel| self.offset.checked_add(rel))
    }

    /// First byte past the table; `None` if it overflows `u64`.
    pub fn end(&self) -> Option<u64> {
        self.header_pos(self.count)
    }
}

/// A section header found in the table: its index, name offset, and where
/// its file-offset and size fields live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionHeaderRef {
    pub index: u16,
    pub name_offset: u32,
    pub header_pos: u64,
    pub width: AddressWidth,
}

impl SectionHeaderRef {
    pub fn offset_field_pos(&self) -> u64 {
        self.header_pos + self.width.section_offset_field()
    }

    pub fn size_field_pos(&self) -> u64 {
        self.offset_field_pos() + self.width.word_size()
    }
}

/// Resolve a null-terminated name from a string table. Offsets past the end
/// of the table resolve to nothing.
pub fn name_at(names: &[u8], offset: u32) -> Option<&[u8]> {
    let tail = names.get(offset as usize..)?;
    let end = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
    Some(&tail[..end])
}

/// An open ELF image whose identification bytes have been validated.
pub struct ElfImage<F> {
    inner: F,
    path: Utf8PathBuf,
    width: AddressWidth,
}

impl<F: Read + Seek> ElfImage<F> {
    /// Check the magic and read the address-width class.
    pub fn new(mut inner: F, path: impl AsRef<Utf8Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut ident = [0u8; 5];
        if let Err(err) = inner.read_exact(&mut ident) {
            return Err(match err.kind() {
                IoErrorKind::UnexpectedEof => corrupt(&path, "file is shorter than the ELF identification"),
                _ => err.into(),
            });
        }
        if ident[..4] != ELF_MAGIC {
            return Err(corrupt(&path, "bad magic"));
        }
        let class = ident[CLASS_OFFSET as usize];
        let width = AddressWidth::from_class(class)
            .ok_or_else(|| corrupt(&path, format!("unknown ELF class {}", class)))?;
        Ok(Self { inner, path, width })
    }

    pub fn width(&self) -> AddressWidth {
        self.width
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Read `e_shoff`, `e_shnum` and `e_shstrndx`.
    pub fn section_table<B: ByteOrder>(&mut self) -> Result<SectionTable> {
        self.inner.seek(SeekFrom::Start(self.width.section_table_field()))?;
        let offset = self.width.read_word::<B, _>(&mut self.inner)?;
        self.inner.seek(SeekFrom::Start(self.width.section_count_field()))?;
        let count = self.inner.read_u16::<B>()?;
        let names_index = self.inner.read_u16::<B>()?;
        log::debug!(
            "{}: ELF{} section table at {:#x}, {} entries, names in section {}",
            self.path,
            self.width.bits(),
            offset,
            count,
            names_index
        );
        let table = SectionTable {
            offset,
            entry_size: self.width.section_header_size(),
            count,
            names_index,
        };
        let file_len = self.inner.seek(SeekFrom::End(0))?;
        if table.end().is_none_or(|end| end > file_len) {
            return Err(corrupt(&self.path, "section header table extends past end of file"));
        }
        Ok(table)
    }

    /// Read a section's `(sh_offset, sh_size)` pair.
    pub fn read_location<B: ByteOrder>(&mut self, section: &SectionHeaderRef) -> Result<(u64, u64)> {
        self.inner.seek(SeekFrom::Start(section.offset_field_pos()))?;
        let offset = self.width.read_word::<B, _>(&mut self.inner)?;
        let size = self.width.read_word::<B, _>(&mut self.inner)?;
        Ok((offset, size))
    }

    /// Load the raw bytes of the section name string table.
    pub fn section_names<B: ByteOrder>(&mut self, table: &SectionTable) -> Result<Vec<u8>> {
        if table.names_index >= table.count {
            return Err(corrupt(
                &self.path,
                format!("name table index {} out of {} sections", table.names_index, table.count),
            ));
        }
        let header = self.header_ref::<B>(table, table.names_index)?;
        let (offset, size) = self.read_location::<B>(&header)?;
        let file_len = self.inner.seek(SeekFrom::End(0))?;
        if offset.checked_add(size).is_none_or(|end| end > file_len) {
            return Err(corrupt(&self.path, "section name table extends past end of file"));
        }
        let mut names = vec![0u8; size as usize];
        self.inner.seek(SeekFrom::Start(offset))?;
        self.inner.read_exact(&mut names)?;
        Ok(names)
    }

    fn header_ref<B: ByteOrder>(&mut self, table: &SectionTable, index: u16) -> Result<SectionHeaderRef> {
        let header_pos = table
            .header_pos(index)
            .ok_or_else(|| corrupt(&self.path, "section header position overflows"))?;
        self.inner.seek(SeekFrom::Start(header_pos))?;
        let name_offset = self.inner.read_u32::<B>()?;
        Ok(SectionHeaderRef {
            index,
            name_offset,
            header_pos,
            width: self.width,
        })
    }

    /// Scan the section headers in index order for the first one called `name`.
    pub fn find_section<B: ByteOrder>(
        &mut self,
        table: &SectionTable,
        names: &[u8],
        name: &str,
    ) -> Result<Option<SectionHeaderRef>> {
        for index in 0..table.count {
            let header = self.header_ref::<B>(table, index)?;
            if name_at(names, header.name_offset) == Some(name.as_bytes()) {
                return Ok(Some(header));
            }
        }
        Ok(None)
    }
}

impl<F: Read + Write + Seek> ElfImage<F> {
    /// Overwrite a section's `(sh_offset, sh_size)` pair.
    pub fn write_location<B: ByteOrder>(
        &mut self,
        section: &SectionHeaderRef,
        offset: u64,
        size: u64,
    ) -> Result<()> {
        self.inner.seek(SeekFrom::Start(section.offset_field_pos()))?;
        self.width.write_word::<B, _>(&mut self.inner, offset)?;
        self.width.write_word::<B, _>(&mut self.inner, size)?;
        self.inner.flush()?;
        Ok(())
    }
}

fn corrupt(path: &Utf8Path, reason: impl Into<String>) -> ExportError {
    ExportError::CorruptFormat {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_at_stops_at_nul() {
        let names = b"\0.text\0pck\0";
        assert_eq!(name_at(names, 1), Some(&b".text"[..]));
        assert_eq!(name_at(names, 7), Some(&b"pck"[..]));
        assert_eq!(name_at(names, 0), Some(&b""[..]));
    }

    #[test]
    fn test_name_at_handles_unterminated_and_out_of_range() {
        let names = b"\0pck";
        assert_eq!(name_at(names, 1), Some(&b"pck"[..]));
        assert_eq!(name_at(names, 4), Some(&b""[..]));
        assert_eq!(name_at(names, 5), None);
    }

    #[test]
    fn test_field_positions() {
        let h32 = SectionHeaderRef {
            index: 3,
            name_offset: 0,
            header_pos: 0x100,
            width: AddressWidth::Bits32,
        };
        assert_eq!(h32.offset_field_pos(), 0x110);
        assert_eq!(h32.size_field_pos(), 0x114);

        let h64 = SectionHeaderRef {
            width: AddressWidth::Bits64,
            ..h32
        };
        assert_eq!(h64.offset_field_pos(), 0x118);
        assert_eq!(h64.size_field_pos(), 0x120);
    }

    #[test]
    fn test_header_pos_overflow() {
        let table = SectionTable {
            offset: u64::MAX - 8,
            entry_size: 64,
            count: 4,
            names_index: 3,
        };
        assert_eq!(table.header_pos(0), Some(u64::MAX - 8));
        assert_eq!(table.header_pos(1), None);
        assert_eq!(table.end(), None);
    }

    #[test]
    fn test_unknown_class_is_corrupt() {
        let mut bytes = ELF_MAGIC.to_vec();
        bytes.push(3);
        bytes.resize(64, 0);
        let err = ElfImage::new(std::io::Cursor::new(bytes), "x.elf").err();
        assert!(matches!(err, Some(ExportError::CorruptFormat { .. })));
    }
}
