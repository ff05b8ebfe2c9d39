//! The thin glue between [`crate::view::ElfView`] and [`crate::decoder`]:
//! given a function symbol, walk `.text` word by word and hand each decoded
//! record to a caller-supplied sink.

use crate::decoder::{decode, Instruction};
use crate::view::ElfView;
use crate::Error;

/// Disassembles the `func_index`-th global function symbol (in the order
/// [`ElfView::iter_global_funcs`] yields them), delivering one [`Instruction`]
/// per 4-byte word of `.text` to `sink`.
///
/// Computes `file_offset = text.offset + (func.addr - text.addr)` and reads
/// `func.size / 4` successive 32-bit words starting there (endian-transparent,
/// per the view's own byte order), stepping the virtual address by 4 per
/// word.
pub fn disassemble_function<F: FnMut(Instruction)>(
    view: &ElfView<'_>,
    func_index: usize,
    mut sink: F,
) -> Result<(), Error> {
    let itext = view.find_section(".text").ok_or(Error::MissingSection(".text"))?;
    let text = view.section_info(itext);

    let func = view
        .iter_global_funcs()
        .nth(func_index)
        .ok_or(Error::OutOfRange)?
        .sym;

    let mut offs = text.offset.wrapping_add(func.addr.wrapping_sub(text.addr));
    let mut addr = func.addr;
    let ninstrs = func.size / 4;

    for _ in 0..ninstrs {
        let code = view.read_u32(offs);
        sink(decode(code, addr));
        offs = offs.wrapping_add(4);
        addr = addr.wrapping_add(4);
    }

    Ok(())
}
