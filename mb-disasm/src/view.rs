//! A byte-oriented, endian-aware view over a 32-bit ELF image.
//!
//! `ElfView` owns (or borrows) the raw bytes of an ELF file and a cached
//! [`Endian`] read from the file's own header. All further reads go through
//! `ElfView`'s bounds-checked accessors, which are transparent to the host's
//! native byte order: callers never see a byte-swap decision, regardless of
//! which endianness the file declares.

use alloc::vec::Vec;

use crate::endian::{read_u8, Endian};
use crate::Error;

const MAGIC: [u8; 4] = [0x7F, 0x45, 0x4C, 0x46];
const EI_CLASS: usize = 0x04;
const EI_DATA: usize = 0x05;
const ELFCLASS32: u8 = 1;

const OFF_E_ENTRY: usize = 0x18;
const OFF_E_PHOFF: usize = 0x1C;
const OFF_E_SHOFF: usize = 0x20;
const OFF_E_SHENTSIZE: usize = 0x2E;
const OFF_E_SHNUM: usize = 0x30;
const OFF_E_SHSTRNDX: usize = 0x32;

const SH_NAME: usize = 0x00;
const SH_ADDR: usize = 0x0C;
const SH_OFFSET: usize = 0x10;
const SH_SIZE: usize = 0x14;

const SYM_ENTRY_SIZE: u32 = 0x10;
const GLOBAL_FUNC_INFO: u8 = 0x12;

/// Minimum byte length accepted at load: the original's `size > 0x10` check.
/// Header fields beyond this are read through the bounds-checked accessors,
/// which already degrade out-of-range reads to zero, so a shorter-than-full-
/// header file is a valid (if mostly empty) image rather than a rejection.
const MIN_ELF_SIZE: usize = 0x11;

enum Buffer<'a> {
    Owned(Vec<u8>),
    Borrowed(&'a [u8]),
}

impl<'a> Buffer<'a> {
    fn bytes(&self) -> &[u8] {
        match self {
            Buffer::Owned(v) => v.as_slice(),
            Buffer::Borrowed(b) => b,
        }
    }
}

/// Address/offset/size triple for a single section header entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SectionInfo {
    pub addr: u32,
    pub offset: u32,
    pub size: u32,
}

/// A global `FUNC`-typed symbol table entry: name borrowed from `.strtab`,
/// virtual start address, and byte size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FuncSym<'v> {
    pub name: &'v str,
    pub addr: u32,
    pub size: u32,
}

/// An immutable, endian-aware view over a 32-bit ELF image.
pub struct ElfView<'a> {
    buf: Buffer<'a>,
    endian: Endian,
}

impl<'a> ElfView<'a> {
    /// Magic + class validation only; does not check `EI_DATA`.
    fn valid_bytes(buf: &[u8]) -> bool {
        buf.len() >= 5 && buf[0..4] == MAGIC && buf[EI_CLASS] == ELFCLASS32
    }

    /// Parses an in-memory ELF32 image. Rejects images shorter than the
    /// minimum header size or failing the magic/class check.
    pub fn from_bytes(bytes: &'a [u8]) -> Result<ElfView<'a>, Error> {
        if bytes.len() < MIN_ELF_SIZE || !Self::valid_bytes(bytes) {
            return Err(Error::NotElf32);
        }
        let endian = Endian::from_ei_data(bytes[EI_DATA]);
        Ok(ElfView {
            buf: Buffer::Borrowed(bytes),
            endian,
        })
    }

    /// Reads the whole file into memory and parses it as an ELF32 image.
    #[cfg(feature = "std")]
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<ElfView<'static>, Error> {
        use std::io::Read;

        let mut file = std::fs::File::open(path).map_err(|_| Error::InvalidPath)?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;

        if bytes.len() < MIN_ELF_SIZE || !Self::valid_bytes(&bytes) {
            return Err(Error::NotElf32);
        }
        let endian = Endian::from_ei_data(bytes[EI_DATA]);
        log::debug!(
            "loaded ELF image, {} bytes, endian={:?}",
            bytes.len(),
            endian
        );
        Ok(ElfView {
            buf: Buffer::Owned(bytes),
            endian,
        })
    }

    /// `true` iff the underlying buffer starts with the ELF32 magic+class
    /// sequence.
    pub fn valid(&self) -> bool {
        Self::valid_bytes(self.buf.bytes())
    }

    #[inline]
    pub fn read_u8(&self, offs: u32) -> u8 {
        read_u8(self.buf.bytes(), offs as usize)
    }

    #[inline]
    pub fn read_u16(&self, offs: u32) -> u16 {
        self.endian.read(self.buf.bytes(), offs as usize)
    }

    #[inline]
    pub fn read_u32(&self, offs: u32) -> u32 {
        self.endian.read(self.buf.bytes(), offs as usize)
    }

    pub fn entry_point(&self) -> u32 {
        self.read_u32(OFF_E_ENTRY as u32)
    }

    pub fn prog_header_offs(&self) -> u32 {
        self.read_u32(OFF_E_PHOFF as u32)
    }

    pub fn sect_header_offs(&self) -> u32 {
        self.read_u32(OFF_E_SHOFF as u32)
    }

    pub fn sect_header_entry_size(&self) -> u32 {
        self.read_u16(OFF_E_SHENTSIZE as u32) as u32
    }

    pub fn num_sect_header_entries(&self) -> u32 {
        self.read_u16(OFF_E_SHNUM as u32) as u32
    }

    pub fn sect_names_entry_id(&self) -> u32 {
        self.read_u16(OFF_E_SHSTRNDX as u32) as u32
    }

    /// Linear search over section headers by exact name match. The name of
    /// entry `i` is the NUL-terminated string at
    /// `sh_offset[e_shstrndx] + sh_name[i]`.
    pub fn find_section(&self, name: &str) -> Option<usize> {
        let nsects = self.num_sect_header_entries();
        if nsects == 0 {
            return None;
        }
        let hoffs = self.sect_header_offs();
        let esize = self.sect_header_entry_size();
        if hoffs == 0 || esize == 0 {
            return None;
        }
        let nid = self.sect_names_entry_id();
        if nid >= nsects {
            return None;
        }
        let name_strs_offs = self.read_u32(
            hoffs
                .wrapping_add(nid.wrapping_mul(esize))
                .wrapping_add(SH_OFFSET as u32),
        );
        if name_strs_offs == 0 {
            return None;
        }
        for i in 0..nsects {
            let name_offs = self.read_u32(
                hoffs
                    .wrapping_add(i.wrapping_mul(esize))
                    .wrapping_add(SH_NAME as u32),
            );
            if self.read_cstr(name_strs_offs.wrapping_add(name_offs)) == Some(name) {
                return Some(i as usize);
            }
        }
        None
    }

    /// Returns the zero value for any out-of-range index, matching the
    /// source's degrade-safely policy rather than panicking.
    pub fn section_info(&self, index: usize) -> SectionInfo {
        let nsects = self.num_sect_header_entries();
        if index as u32 >= nsects {
            return SectionInfo::default();
        }
        let hoffs = self.sect_header_offs();
        let esize = self.sect_header_entry_size();
        let top = hoffs.wrapping_add((index as u32).wrapping_mul(esize));
        SectionInfo {
            addr: self.read_u32(top.wrapping_add(SH_ADDR as u32)),
            offset: self.read_u32(top.wrapping_add(SH_OFFSET as u32)),
            size: self.read_u32(top.wrapping_add(SH_SIZE as u32)),
        }
    }

    /// Borrows a NUL-terminated, UTF-8 string starting at `offs`. Returns
    /// `None` if the offset is out of range, no terminator is found before
    /// the end of the buffer, or the bytes are not valid UTF-8 -- ELF symbol
    /// and section names are conventionally ASCII, so this is never hit on
    /// well-formed input.
    fn read_cstr(&self, offs: u32) -> Option<&str> {
        let start = offs as usize;
        let bytes = self.buf.bytes().get(start..)?;
        let end = bytes.iter().position(|&b| b == 0)?;
        core::str::from_utf8(&bytes[..end]).ok()
    }

    /// Iterates every `.symtab` entry, resolving names against `.strtab`.
    /// Yields nothing if either section is missing or malformed.
    pub fn iter_syms(&self) -> SymbolIter<'_, 'a> {
        SymbolIter::new(self, false)
    }

    /// Iterates only `BIND(GLOBAL), TYPE(FUNC)` symbol table entries.
    pub fn iter_global_funcs(&self) -> SymbolIter<'_, 'a> {
        SymbolIter::new(self, true)
    }

    /// Count of global function symbols. Defined as the length of
    /// [`ElfView::iter_global_funcs`] -- iteration with no visitor still
    /// counts every matching entry.
    pub fn num_global_funcs(&self) -> usize {
        self.iter_global_funcs().count()
    }
}

/// One resolved `.symtab` entry, including the raw packed `st_info`/`st_other`
/// /`st_shndx` attribute word for callers that need bind/type beyond the
/// global-function filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SymEntry<'v> {
    pub sym: FuncSym<'v>,
    pub attr: u32,
}

/// Iterator over `.symtab` entries, optionally filtered to global functions.
pub struct SymbolIter<'v, 'a> {
    view: &'v ElfView<'a>,
    global_funcs_only: bool,
    sym_offs: u32,
    strtab_offs: u32,
    remaining: u32,
    index: u32,
}

impl<'v, 'a> SymbolIter<'v, 'a> {
    fn new(view: &'v ElfView<'a>, global_funcs_only: bool) -> Self {
        let (sym_offs, strtab_offs, nsym) = Self::locate(view);
        SymbolIter {
            view,
            global_funcs_only,
            sym_offs,
            strtab_offs,
            remaining: nsym,
            index: 0,
        }
    }

    fn locate(view: &ElfView<'a>) -> (u32, u32, u32) {
        let isymtab = match view.find_section(".symtab") {
            Some(i) => i,
            None => return (0, 0, 0),
        };
        let istrtab = match view.find_section(".strtab") {
            Some(i) => i,
            None => return (0, 0, 0),
        };
        let symtab = view.section_info(isymtab);
        let strtab = view.section_info(istrtab);
        if symtab.offset == 0 || symtab.size <= 0xF || strtab.offset == 0 || strtab.size == 0 {
            return (0, 0, 0);
        }
        (symtab.offset, strtab.offset, symtab.size / SYM_ENTRY_SIZE)
    }
}

impl<'v, 'a> Iterator for SymbolIter<'v, 'a> {
    type Item = SymEntry<'v>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.index < self.remaining {
            let offs = self.sym_offs.wrapping_add(self.index.wrapping_mul(SYM_ENTRY_SIZE));
            self.index += 1;

            let name_offs = self.view.read_u32(offs);
            let addr = self.view.read_u32(offs.wrapping_add(4));
            let size = self.view.read_u32(offs.wrapping_add(8));
            let info = self.view.read_u8(offs.wrapping_add(12));
            let other = self.view.read_u8(offs.wrapping_add(13));
            let shndx = self.view.read_u16(offs.wrapping_add(14));
            let attr = info as u32 | (other as u32) << 8 | (shndx as u32) << 16;

            if self.global_funcs_only && (attr & 0xFF) as u8 != GLOBAL_FUNC_INFO {
                continue;
            }

            let name = self
                .view
                .read_cstr(self.strtab_offs.wrapping_add(name_offs))
                .unwrap_or("");
            return Some(SymEntry {
                sym: FuncSym { name, addr, size },
                attr,
            });
        }
        None
    }
}
