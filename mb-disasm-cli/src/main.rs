use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use mb_disasm::{disassemble_function, format_operands, ElfView};

/// MicroBlaze ELF32 disassembler.
///
/// With a function name, disassembles that function. Without one, lists the
/// binary's global function symbols and their sizes.
#[derive(Parser, Debug)]
#[command(name = "disasm", version, about)]
struct Args {
    /// Path to a 32-bit MicroBlaze ELF object file.
    elf_path: PathBuf,

    /// Name of the global function to disassemble.
    func_name: Option<String>,

    /// Raise logging verbosity to debug.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let view = ElfView::load(&args.elf_path)
        .with_context(|| format!("failed to load ELF image at {}", args.elf_path.display()))?;

    log::info!(
        "loaded {}, {} global function(s)",
        args.elf_path.display(),
        view.num_global_funcs()
    );

    match &args.func_name {
        Some(name) => disassemble_named_function(&view, name),
        None => {
            list_functions(&view);
            Ok(())
        }
    }
}

fn disassemble_named_function(view: &ElfView<'_>, name: &str) -> Result<()> {
    let func_index = view
        .iter_global_funcs()
        .position(|entry| entry.sym.name == name)
        .with_context(|| format!("no global function named \"{name}\""))?;

    let func = view.iter_global_funcs().nth(func_index).unwrap().sym;
    println!(
        "function \"{}\": addr=0x{:X}, size=0x{:X}, #instrs={}",
        func.name,
        func.addr,
        func.size,
        func.size / 4
    );

    disassemble_function(view, func_index, |instr| {
        println!(
            "{:08X}: {:08X}   {}\t{}",
            instr.addr,
            instr.raw,
            instr.mnemonic,
            format_operands(&instr)
        );
    })
    .context("failed to disassemble function")
}

fn list_functions(view: &ElfView<'_>) {
    let mut funcs: Vec<_> = view.iter_global_funcs().map(|e| e.sym).collect();
    funcs.sort_by_key(|f| f.addr);
    for func in funcs {
        println!("{:08X}  {:>8}  {}", func.addr, func.size, func.name);
    }
}
