//! Build the fuel-tank sensing schematic programmatically and print it.
//!
//! Six tanks (four primary with engine feeds, two auxiliary) drawn as unit
//! capacitors, internal resistances to the engine nodes, and valve resistors
//! between neighbouring tanks.

use ltschem::parser::schema::*;
use ltschem::parser::writer::AscWriter;

const TANKS: [&str; 6] = ["T1", "T2", "TLAux", "TRAux", "T3", "T4"];
// Primary tanks feed an engine; the two aux tanks in the middle do not.
const ENGINES: [(usize, &str); 4] = [(0, "E1"), (1, "E2"), (4, "E3"), (5, "E4")];

fn two_terminal(symbol: &str, at: Point, orientation: Orientation, name: &str) -> SymbolInstance {
    let mut inst = SymbolInstance::new(symbol, at, orientation);
    inst.set_attr("InstName", name);
    inst.set_attr("Value", "1");
    inst
}

fn main() {
    let mut sch = Schematic::new();
    sch.sheet = Sheet {
        number: 1,
        width: 1400,
        height: 760,
    };

    let mut internal = 0;
    for (k, tank) in TANKS.iter().enumerate() {
        let x = 100 + 200 * k as i32;
        sch.symbols
            .push(two_terminal("cap", Point::new(x, 200), Orientation::R0, &format!("C{}", k + 1)));
        sch.add_wire(Point::new(x + 16, 150), Point::new(x + 16, 216));
        sch.add_wire(Point::new(x + 16, 264), Point::new(x + 16, 300));
        sch.add_flag(Point::new(x + 16, 150), *tank);

        if let Some(&(_, engine)) = ENGINES.iter().find(|(i, _)| *i == k) {
            internal += 1;
            sch.symbols.push(two_terminal(
                "res",
                Point::new(x + 80, 48),
                Orientation::R0,
                &format!("RI{internal}"),
            ));
            sch.add_wire(Point::new(x + 16, 150), Point::new(x + 96, 150));
            sch.add_wire(Point::new(x + 96, 144), Point::new(x + 96, 150));
            sch.add_wire(Point::new(x + 96, 32), Point::new(x + 96, 64));
            sch.add_flag(Point::new(x + 96, 32), engine);
        }
    }

    // Shared ground rail under the tanks.
    for k in 0..5 {
        let x = 100 + 200 * k;
        sch.add_wire(Point::new(x + 16, 300), Point::new(x + 216, 300));
    }
    sch.add_flag(Point::new(116, 300), "0");

    // Valve resistors between neighbouring tank nodes.
    for k in 0..5usize {
        let x = 100 + 200 * k as i32;
        sch.symbols.push(two_terminal(
            "res",
            Point::new(x + 228, 134),
            Orientation::R90,
            &format!("R{}", k + 1),
        ));
        let left = if ENGINES.iter().any(|(i, _)| *i == k) {
            x + 96
        } else {
            x + 16
        };
        sch.add_wire(Point::new(left, 150), Point::new(x + 132, 150));
        sch.add_wire(Point::new(x + 212, 150), Point::new(x + 216, 150));
    }

    for (k, tank) in TANKS.iter().enumerate() {
        let x = 100 + 200 * k as i32;
        sch.texts.push(TextAnnotation {
            at: Point::new(x - 16, 340),
            justification: Justification::Center,
            size: 2,
            content: TextContent::Comment((*tank).to_string()),
        });
    }
    sch.texts.push(TextAnnotation {
        at: Point::new(76, 392),
        justification: Justification::Left,
        size: 2,
        content: TextContent::Directive(".tran 0 15 0 0.1".to_string()),
    });

    print!("{}", AscWriter::to_string(&sch));
}
