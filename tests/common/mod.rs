//! Synthetic big-endian ELF images for patcher and export tests.

#![allow(dead_code)]

use byteorder::{BigEndian, WriteBytesExt};
use camino::{Utf8Path, Utf8PathBuf};
use std::io::Write;

pub struct SyntheticElf {
    pub bytes: Vec<u8>,
    pub bits: u32,
    /// File position of each section header, index 0 being the null section.
    pub header_pos: Vec<usize>,
    pub names: Vec<String>,
}

impl SyntheticElf {
    pub fn header_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name).map(|i| self.header_pos[i])
    }

    /// Byte range of the `(sh_offset, sh_size)` pair of a section.
    pub fn location_range(&self, name: &str) -> Option<std::ops::Range<usize>> {
        let (field, word) = if self.bits == 32 { (0x10, 4) } else { (0x18, 8) };
        self.header_of(name).map(|pos| pos + field..pos + field + 2 * word)
    }

    pub fn write_to(&self, path: &Utf8Path) {
        std::fs::write(path, &self.bytes).unwrap();
    }
}

fn word(out: &mut Vec<u8>, bits: u32, value: u64) {
    if bits == 32 {
        out.write_u32::<BigEndian>(value as u32).unwrap();
    } else {
        out.write_u64::<BigEndian>(value).unwrap();
    }
}

/// Build an executable with a null section, the given sections, and a
/// trailing `.shstrtab`. Each named section gets a distinct non-zero
/// offset and size so untouched headers can be told apart.
pub fn build_elf(bits: u32, sections: &[&str]) -> SyntheticElf {
    let ehsize: usize = if bits == 32 { 0x34 } else { 0x40 };
    let shentsize: usize = if bits == 32 { 40 } else { 64 };

    let mut names = vec![String::new()];
    names.extend(sections.iter().map(|s| s.to_string()));
    names.push(".shstrtab".to_string());

    let mut strtab = vec![0u8];
    let mut name_offsets = vec![0u32];
    for name in &names[1..] {
        name_offsets.push(strtab.len() as u32);
        strtab.extend_from_slice(name.as_bytes());
        strtab.push(0);
    }

    let strtab_pos = ehsize;
    let mut table_pos = strtab_pos + strtab.len();
    table_pos += (8 - table_pos % 8) % 8;
    let count = names.len();

    let mut out = Vec::new();
    out.write_all(&[0x7f, b'E', b'L', b'F']).unwrap();
    out.push(if bits == 32 { 1 } else { 2 });
    out.push(2); // big-endian
    out.push(1);
    out.resize(16, 0);
    out.write_u16::<BigEndian>(2).unwrap(); // ET_EXEC
    out.write_u16::<BigEndian>(20).unwrap(); // EM_PPC
    out.write_u32::<BigEndian>(1).unwrap();
    word(&mut out, bits, 0x8000_4000); // e_entry
    word(&mut out, bits, 0); // e_phoff
    word(&mut out, bits, table_pos as u64); // e_shoff
    out.write_u32::<BigEndian>(0).unwrap();
    out.write_u16::<BigEndian>(ehsize as u16).unwrap();
    out.write_u16::<BigEndian>(0).unwrap();
    out.write_u16::<BigEndian>(0).unwrap();
    out.write_u16::<BigEndian>(shentsize as u16).unwrap();
    out.write_u16::<BigEndian>(count as u16).unwrap();
    out.write_u16::<BigEndian>((count - 1) as u16).unwrap();
    assert_eq!(out.len(), ehsize);

    out.extend_from_slice(&strtab);
    out.resize(table_pos, 0);

    let mut header_pos = Vec::new();
    for (i, name_offset) in name_offsets.iter().enumerate() {
        header_pos.push(out.len());
        let start = out.len();
        let (offset, size) = if i == 0 {
            (0, 0)
        } else if i == count - 1 {
            (strtab_pos as u64, strtab.len() as u64)
        } else {
            (0x1000 + i as u64 * 0x100, 0x20 + i as u64)
        };
        out.write_u32::<BigEndian>(*name_offset).unwrap();
        out.write_u32::<BigEndian>(if i == count - 1 { 3 } else { 1 }).unwrap(); // sh_type
        word(&mut out, bits, 0); // sh_flags
        word(&mut out, bits, 0); // sh_addr
        word(&mut out, bits, offset);
        word(&mut out, bits, size);
        out.resize(start + shentsize, 0);
    }

    SyntheticElf {
        bytes: out,
        bits,
        header_pos,
        names,
    }
}

pub fn utf8(path: &std::path::Path) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(path.to_path_buf()).unwrap()
}

pub fn read_be(bytes: &[u8], pos: usize, bits: u32) -> u64 {
    if bits == 32 {
        u32::from_be_bytes(bytes[pos..pos + 4].try_into().unwrap()) as u64
    } else {
        u64::from_be_bytes(bytes[pos..pos + 8].try_into().unwrap())
    }
}
