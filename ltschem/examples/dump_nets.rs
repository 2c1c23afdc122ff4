//! Parse a schematic and print its extracted electrical nets.
//!
//! Usage: cargo run --example dump_nets -- path/to/schematic.asc

use ltschem::parser::netlist::NetExtractor;
use std::path::PathBuf;

fn main() {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/fuel_tanks.asc")
        });

    let schematic = match ltschem::parse_schematic(&path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let nets = NetExtractor::extract(&schematic);
    println!("{}: {} nets", path.display(), nets.len());
    for net in &nets {
        println!(
            "  {:<8} {} wires, {} flags",
            net.name,
            net.wires.len(),
            net.flags.len()
        );
        for pin in &net.pins {
            println!("           {} pin {}", pin.instance, pin.pin);
        }
    }
}
