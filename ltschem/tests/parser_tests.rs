//! Tests for ASC file parsing against the fuel-tank fixture.

use ltschem::parse_schematic;
use ltschem::parser::netlist::NetExtractor;
use std::path::PathBuf;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn parses_fuel_tank_schematic() {
    let schematic = parse_schematic(&fixture_path("fuel_tanks.asc")).expect("should parse");

    assert_eq!(schematic.version, 4);
    assert_eq!(schematic.sheet.width, 1400);
    assert_eq!(schematic.wires.len(), 39);
    assert_eq!(schematic.flags.len(), 11);
    assert_eq!(schematic.symbols.len(), 15);
    assert_eq!(schematic.texts.len(), 8);
}

#[test]
fn fuel_tank_components_are_unit_valued() {
    let schematic = parse_schematic(&fixture_path("fuel_tanks.asc")).expect("should parse");

    // Six tank capacitors, every value a unit placeholder.
    let caps: Vec<_> = schematic.symbols.iter().filter(|s| s.symbol == "cap").collect();
    assert_eq!(caps.len(), 6);
    for sym in &schematic.symbols {
        assert_eq!(sym.value(), Some("1"), "{:?} not unit valued", sym.inst_name());
    }

    // Internal resistances are named RI*, valves plain R*.
    let internal = schematic
        .symbols
        .iter()
        .filter(|s| s.inst_name().is_some_and(|n| n.starts_with("RI")))
        .count();
    assert_eq!(internal, 4);
}

#[test]
fn fuel_tank_nets_carry_tank_names() {
    let schematic = parse_schematic(&fixture_path("fuel_tanks.asc")).expect("should parse");
    let nets = NetExtractor::extract(&schematic);

    assert_eq!(nets.len(), 11);
    let mut names: Vec<&str> = nets.iter().map(|n| n.name.as_str()).collect();
    names.sort();
    assert_eq!(
        names,
        ["0", "E1", "E2", "E3", "E4", "T1", "T2", "T3", "T4", "TLAux", "TRAux"]
    );

    // The ground net collects one pin from every tank capacitor.
    let ground = nets.iter().find(|n| n.is_ground()).unwrap();
    let cap_pins = ground
        .pins
        .iter()
        .filter(|p| p.instance.starts_with('C'))
        .count();
    assert_eq!(cap_pins, 6);

    // Tank T1 connects its capacitor, its internal resistance, and a valve.
    let t1 = nets.iter().find(|n| n.name == "T1").unwrap();
    let instances: Vec<&str> = t1.pins.iter().map(|p| p.instance.as_str()).collect();
    assert!(instances.contains(&"C1"));
    assert!(instances.contains(&"RI1"));
    assert!(instances.contains(&"R1"));
}

#[test]
fn fuel_tank_directive_is_found() {
    let schematic = parse_schematic(&fixture_path("fuel_tanks.asc")).expect("should parse");
    let directives: Vec<_> = schematic.directives().collect();
    assert_eq!(directives.len(), 1);
    assert!(directives[0].content.text().starts_with(".tran"));
}

#[test]
fn nonexistent_file_is_an_error() {
    assert!(parse_schematic(&PathBuf::from("no_such_file.asc")).is_err());
}

#[test]
fn malformed_line_fails_with_position() {
    let err = parse_schematic(&fixture_path("malformed.asc")).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("line 3"), "error should name the line: {msg}");
}
