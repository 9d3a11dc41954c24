//! vole-emu: simulator for the VOLE teaching machine
//!
//! Loads a hex program file into the machine, runs the cycle loop until a
//! halt condition, and prints the final state.

use std::env;

use anyhow::{bail, Context};
use vole_emu::config::Config;
use vole_emu::machine::{Machine, MachineStatus};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut dump_memory = false;
    let mut max_cycles: Option<u64> = None;
    let mut path = None;

    let mut iter = args[1..].iter();
    while let Some(arg) = iter.next() {
        if arg == "--dump-memory" || arg == "-m" {
            dump_memory = true;
        } else if arg == "--max-cycles" {
            let value = iter
                .next()
                .context("--max-cycles requires a number")?;
            max_cycles = Some(value.parse().context("--max-cycles requires a number")?);
        } else if arg == "--help" || arg == "-h" {
            print_usage();
            return Ok(());
        } else if !arg.starts_with('-') {
            path = Some(arg.as_str());
        } else {
            bail!("unknown option: {}", arg);
        }
    }

    let path = match path {
        Some(p) => p,
        None => {
            print_usage();
            bail!("no program file given");
        }
    };

    let config = Config::get();
    let mut machine = Machine::from_config(config);
    if let Some(limit) = max_cycles {
        machine.set_max_cycles(limit);
    }

    machine
        .load_program_file(path)
        .with_context(|| format!("failed to load program '{}'", path))?;

    println!("Running: {}", path);
    println!();

    let cycles = machine.run();
    log::info!("machine stopped after {} cycles", cycles);

    machine.print_final_state(dump_memory);

    if machine.status() == MachineStatus::Faulted {
        if let Some(fault) = machine.last_fault() {
            bail!("machine faulted: {}", fault);
        }
    }

    Ok(())
}

fn print_usage() {
    println!("Usage: vole-emu [OPTIONS] <program-file>");
    println!();
    println!("Options:");
    println!("  -m, --dump-memory    print the full memory contents after the run");
    println!("      --max-cycles N   stop after N cycles (guards infinite loops)");
    println!("  -h, --help           show this help");
    println!();
    println!("Program files contain one instruction per line as 4 hex digits,");
    println!("for example:");
    println!("  20FF");
    println!("  C000");
}
