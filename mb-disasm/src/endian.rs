//! Endian-aware primitive readers, generalized from a single swap flag rather
//! than two parallel reader families.

/// Byte order declared by the ELF file's `e_ident[EI_DATA]` field.
#[derive(Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Debug, Hash)]
pub enum Endian {
    Little,
    Big,
}

impl Endian {
    /// `1` is `ELFDATA2LSB`, `2` is `ELFDATA2MSB`. Anything else degrades to
    /// `Little` rather than rejecting the file outright -- matching the
    /// source's behavior of only ever flipping a swap bit for the two known
    /// values and otherwise reading bytes in their natural order.
    pub fn from_ei_data(byte: u8) -> Endian {
        match byte {
            2 => Endian::Big,
            _ => Endian::Little,
        }
    }

    #[inline]
    pub fn read<T: EndianReader>(&self, slice: &[u8], offset: usize) -> T {
        T::read_with_endian(slice, *self, offset)
    }
}

pub trait EndianReader {
    fn read_with_endian(slice: &[u8], endian: Endian, offset: usize) -> Self;
}

macro_rules! impl_endian_reader {
    ($ty:ty) => {
        impl EndianReader for $ty {
            fn read_with_endian(slice: &[u8], endian: Endian, offset: usize) -> Self {
                const SIZE: usize = core::mem::size_of::<$ty>();
                let bytes = match slice.get(offset..offset + SIZE) {
                    Some(bytes) => bytes,
                    None => return 0,
                };
                let mut buf = [0u8; SIZE];
                buf.copy_from_slice(bytes);
                match endian {
                    Endian::Big => Self::from_be_bytes(buf),
                    Endian::Little => Self::from_le_bytes(buf),
                }
            }
        }
    };
}

impl_endian_reader!(u16);
impl_endian_reader!(u32);

/// Plain indexed byte read; out-of-range degrades to 0 rather than panicking.
pub fn read_u8(slice: &[u8], offset: usize) -> u8 {
    slice.get(offset).copied().unwrap_or(0)
}
