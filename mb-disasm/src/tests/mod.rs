use alloc::vec::Vec;

use crate::decoder::decode;
use crate::driver::disassemble_function;
use crate::endian::Endian;
use crate::view::ElfView;
use crate::Error;

const SHENTSIZE: u32 = 0x28;
const SYMENTSIZE: u32 = 0x10;

fn put_u32(out: &mut Vec<u8>, endian: Endian, v: u32) {
    let bytes = match endian {
        Endian::Little => v.to_le_bytes(),
        Endian::Big => v.to_be_bytes(),
    };
    out.extend_from_slice(&bytes);
}

fn put_u16(out: &mut Vec<u8>, endian: Endian, v: u16) {
    let bytes = match endian {
        Endian::Little => v.to_le_bytes(),
        Endian::Big => v.to_be_bytes(),
    };
    out.extend_from_slice(&bytes);
}

fn pad_to(out: &mut Vec<u8>, offset: usize) {
    while out.len() < offset {
        out.push(0);
    }
}

/// Builds a minimal 32-bit ELF image with a `.text` section holding `words`,
/// one global `FUNC` symbol named `func_name` covering all of `.text`, and
/// the `.symtab`/`.strtab`/`.shstrtab` plumbing needed to find it.
fn build_elf(endian: Endian, words: &[u32], func_name: &str) -> Vec<u8> {
    const TEXT_ADDR: u32 = 0x1000;

    let mut out = Vec::new();

    // e_ident + rest of the file header, up to 0x34 bytes.
    out.extend_from_slice(&[0x7F, 0x45, 0x4C, 0x46]); // magic
    out.push(1); // EI_CLASS = ELFCLASS32
    out.push(if endian == Endian::Big { 2 } else { 1 }); // EI_DATA
    out.push(1); // EI_VERSION
    pad_to(&mut out, 0x10);
    put_u16(&mut out, endian, 2); // e_type (EXEC)
    put_u16(&mut out, endian, 0xBAAB); // e_machine (MicroBlaze, placeholder value)
    put_u32(&mut out, endian, 1); // e_version
    put_u32(&mut out, endian, TEXT_ADDR); // e_entry
    put_u32(&mut out, endian, 0); // e_phoff
    let e_shoff_pos = out.len();
    put_u32(&mut out, endian, 0); // e_shoff (patched below)
    put_u32(&mut out, endian, 0); // e_flags
    put_u16(&mut out, endian, 0x34); // e_ehsize
    put_u16(&mut out, endian, 0); // e_phentsize
    put_u16(&mut out, endian, 0); // e_phnum
    put_u16(&mut out, endian, SHENTSIZE as u16); // e_shentsize
    put_u16(&mut out, endian, 5); // e_shnum: null, .text, .symtab, .strtab, .shstrtab
    put_u16(&mut out, endian, 4); // e_shstrndx
    assert_eq!(out.len(), 0x34);

    // .text
    let text_offset = out.len() as u32;
    for &w in words {
        put_u32(&mut out, endian, w);
    }
    let text_size = (words.len() * 4) as u32;

    // .symtab: null entry + one global FUNC symbol.
    let symtab_offset = out.len() as u32;
    // null entry
    put_u32(&mut out, endian, 0);
    put_u32(&mut out, endian, 0);
    put_u32(&mut out, endian, 0);
    out.push(0);
    out.push(0);
    put_u16(&mut out, endian, 0);
    // global FUNC entry "func_name" at TEXT_ADDR, size text_size
    let name_in_strtab = 1u32; // strtab[0] = 0, name starts at 1
    put_u32(&mut out, endian, name_in_strtab);
    put_u32(&mut out, endian, TEXT_ADDR);
    put_u32(&mut out, endian, text_size);
    out.push(0x12); // st_info: BIND(GLOBAL)=1, TYPE(FUNC)=2 -> 0x12
    out.push(0); // st_other
    put_u16(&mut out, endian, 1); // st_shndx (arbitrary, points at .text)
    let symtab_size = out.len() as u32 - symtab_offset;

    // .strtab
    let strtab_offset = out.len() as u32;
    out.push(0);
    out.extend_from_slice(func_name.as_bytes());
    out.push(0);
    let strtab_size = out.len() as u32 - strtab_offset;

    // .shstrtab
    let shstrtab_offset = out.len() as u32;
    out.push(0); // NULL section's name: empty string at offset 0
    let text_name_off = (out.len() as u32) - shstrtab_offset;
    out.extend_from_slice(b".text\0");
    let symtab_name_off = (out.len() as u32) - shstrtab_offset;
    out.extend_from_slice(b".symtab\0");
    let strtab_name_off = (out.len() as u32) - shstrtab_offset;
    out.extend_from_slice(b".strtab\0");
    let shstrtab_name_off = (out.len() as u32) - shstrtab_offset;
    out.extend_from_slice(b".shstrtab\0");
    let shstrtab_size = out.len() as u32 - shstrtab_offset;

    // Section header table.
    let shoff = out.len() as u32;
    // entry 0: NULL
    for _ in 0..SHENTSIZE {
        out.push(0);
    }
    // entry 1: .text
    put_u32(&mut out, endian, text_name_off);
    put_u32(&mut out, endian, 1); // SHT_PROGBITS
    put_u32(&mut out, endian, 0x6); // flags: ALLOC|EXEC
    put_u32(&mut out, endian, TEXT_ADDR);
    put_u32(&mut out, endian, text_offset);
    put_u32(&mut out, endian, text_size);
    put_u32(&mut out, endian, 0);
    put_u32(&mut out, endian, 0);
    put_u32(&mut out, endian, 4);
    put_u32(&mut out, endian, 0);
    // entry 2: .symtab
    put_u32(&mut out, endian, symtab_name_off);
    put_u32(&mut out, endian, 2); // SHT_SYMTAB
    put_u32(&mut out, endian, 0);
    put_u32(&mut out, endian, 0);
    put_u32(&mut out, endian, symtab_offset);
    put_u32(&mut out, endian, symtab_size);
    put_u32(&mut out, endian, 3); // link -> .strtab
    put_u32(&mut out, endian, 1);
    put_u32(&mut out, endian, 4);
    put_u32(&mut out, endian, SYMENTSIZE);
    // entry 3: .strtab
    put_u32(&mut out, endian, strtab_name_off);
    put_u32(&mut out, endian, 3); // SHT_STRTAB
    put_u32(&mut out, endian, 0);
    put_u32(&mut out, endian, 0);
    put_u32(&mut out, endian, strtab_offset);
    put_u32(&mut out, endian, strtab_size);
    put_u32(&mut out, endian, 0);
    put_u32(&mut out, endian, 0);
    put_u32(&mut out, endian, 1);
    put_u32(&mut out, endian, 0);
    // entry 4: .shstrtab
    put_u32(&mut out, endian, shstrtab_name_off);
    put_u32(&mut out, endian, 3); // SHT_STRTAB
    put_u32(&mut out, endian, 0);
    put_u32(&mut out, endian, 0);
    put_u32(&mut out, endian, shstrtab_offset);
    put_u32(&mut out, endian, shstrtab_size);
    put_u32(&mut out, endian, 0);
    put_u32(&mut out, endian, 0);
    put_u32(&mut out, endian, 1);
    put_u32(&mut out, endian, 0);

    // patch e_shoff
    let patched = match endian {
        Endian::Little => shoff.to_le_bytes(),
        Endian::Big => shoff.to_be_bytes(),
    };
    out[e_shoff_pos..e_shoff_pos + 4].copy_from_slice(&patched);

    out
}

#[test]
fn valid_requires_magic_and_class() {
    let bytes = build_elf(Endian::Little, &[0], "f");
    let view = ElfView::from_bytes(&bytes).unwrap();
    assert!(view.valid());

    let mut corrupt = bytes.clone();
    corrupt[0] = 0x00;
    assert!(matches!(
        ElfView::from_bytes(&corrupt),
        Err(Error::NotElf32)
    ));
}

#[test]
fn out_of_range_reads_degrade_to_zero() {
    let bytes = build_elf(Endian::Little, &[0], "f");
    let view = ElfView::from_bytes(&bytes).unwrap();
    let n = bytes.len() as u32;
    assert_eq!(view.read_u32(n), 0);
    assert_eq!(view.read_u32(n - 1), 0);
    assert_eq!(view.read_u8(n + 100), 0);
}

#[test]
fn entry_point_is_endian_transparent() {
    let le = build_elf(Endian::Little, &[0], "f");
    let be = build_elf(Endian::Big, &[0], "f");
    let le_view = ElfView::from_bytes(&le).unwrap();
    let be_view = ElfView::from_bytes(&be).unwrap();
    assert_eq!(le_view.entry_point(), 0x1000);
    assert_eq!(be_view.entry_point(), 0x1000);
}

#[test]
fn num_global_funcs_counts_symtab_entries_with_global_func_info() {
    let bytes = build_elf(Endian::Little, &[0, 0], "f");
    let view = ElfView::from_bytes(&bytes).unwrap();
    assert_eq!(view.num_global_funcs(), 1);
    let syms: Vec<_> = view.iter_global_funcs().collect();
    assert_eq!(syms.len(), 1);
    assert_eq!(syms[0].sym.name, "f");
    assert_eq!(syms[0].sym.addr, 0x1000);
}

#[test]
fn decode_is_total_and_register_slots_are_in_range() {
    for op in 0u32..64 {
        let word = op << 26;
        let instr = decode(word, 0);
        for slot in [instr.rd, instr.ra, instr.rb] {
            if let Some(r) = slot {
                assert!(r <= 31);
            }
        }
    }
}

// S1: arithmetic `add`.
#[test]
fn scenario_add() {
    let instr = decode(0x0023_1005, 0);
    assert_eq!(instr.mnemonic, "add");
    assert_eq!(instr.rd, Some(1));
    assert_eq!(instr.ra, Some(3));
    assert_eq!(instr.rb, Some(2));
    assert!(instr.has_third_operand);
}

// S2: `addi` with rB absent, third operand is the immediate.
#[test]
fn scenario_addi() {
    let instr = decode(0x2043_002A, 0);
    assert_eq!(instr.mnemonic, "addi");
    assert_eq!(instr.rd, Some(2));
    assert_eq!(instr.ra, Some(3));
    assert_eq!(instr.rb, None);
    assert_eq!(instr.imm, 42);
    assert!(instr.has_third_operand);
}

// S3: conditional branch with delay slot, `beqd`.
#[test]
fn scenario_beqd() {
    let op = 0x27u32;
    let rd = 0x10u32;
    let ra = 0u32;
    let rb = 5u32;
    let word = (op << 26) | (rd << 21) | (ra << 16) | (rb << 11);
    let instr = decode(word, 0);
    assert_eq!(instr.mnemonic, "beqd");
    assert_eq!(instr.rd, None);
    assert_eq!(instr.ra, Some(0));
    assert_eq!(instr.rb, Some(5));
}

// S4: immediate prefix.
#[test]
fn scenario_imm_prefix() {
    let op = 0x2Cu32;
    let word = (op << 26) | 0xABCD;
    let instr = decode(word, 0);
    assert_eq!(instr.mnemonic, "imm");
    assert_eq!(instr.rd, None);
    assert_eq!(instr.ra, None);
    assert_eq!(instr.rb, None);
    assert_eq!(instr.imm, 0xABCD);
}

// S5: load word indexed, `lwx`.
#[test]
fn scenario_lwx() {
    let op = 0x32u32;
    let rd = 4u32;
    let ra = 5u32;
    let rb = 6u32;
    let imm_bit10 = 1u32 << 10;
    let word = (op << 26) | (rd << 21) | (ra << 16) | (rb << 11) | imm_bit10;
    let instr = decode(word, 0);
    assert_eq!(instr.mnemonic, "lwx");
    assert_eq!(instr.rd, Some(4));
    assert_eq!(instr.ra, Some(5));
    assert_eq!(instr.rb, Some(6));
    assert!(instr.has_third_operand);
}

// S6: end-to-end driver walk over a two-instruction function.
#[test]
fn scenario_end_to_end_disassemble_function() {
    let w0 = 0x0023_1005u32; // add r1, r3, r2
    let w1 = 0x2043_002Au32; // addi r2, r3, 42
    let bytes = build_elf(Endian::Little, &[w0, w1], "f");
    let view = ElfView::from_bytes(&bytes).unwrap();

    let mut seen = Vec::new();
    disassemble_function(&view, 0, |instr| seen.push(instr)).unwrap();

    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].addr, 0x1000);
    assert_eq!(seen[0].mnemonic, "add");
    assert_eq!(seen[1].addr, 0x1004);
    assert_eq!(seen[1].mnemonic, "addi");
}

#[test]
fn disassemble_function_rejects_out_of_range_index() {
    let bytes = build_elf(Endian::Little, &[0], "f");
    let view = ElfView::from_bytes(&bytes).unwrap();
    let result = disassemble_function(&view, 7, |_| {});
    assert!(matches!(result, Err(Error::OutOfRange)));
}

#[test]
fn find_section_is_byte_exact() {
    let bytes = build_elf(Endian::Little, &[0], "f");
    let view = ElfView::from_bytes(&bytes).unwrap();
    assert!(view.find_section(".text").is_some());
    assert!(view.find_section(".symtab").is_some());
    assert!(view.find_section(".strtab").is_some());
    assert!(view.find_section(".shstrtab").is_some());
    assert_eq!(view.find_section(".tex"), None);
    assert_eq!(view.find_section(".textual"), None);
}
