//! ASC file writer.
//!
//! Emits the grouped section order LTspice itself writes: header, wires,
//! flags (with their IOPIN markers), symbols (with WINDOW/SYMATTR lines),
//! then text. A canonical file survives parse-then-write byte for byte; any
//! parsed file survives write-then-parse structurally.

use std::fmt::Write as _;
use std::path::Path;

use crate::parser::schema::*;

/// Writer for ASC schematic files.
pub struct AscWriter;

impl AscWriter {
    /// Serialize a schematic to canonical ASC text.
    pub fn to_string(schematic: &Schematic) -> String {
        let mut out = String::new();
        // Infallible: writing to a String cannot fail.
        let _ = writeln!(out, "Version {}", schematic.version);
        let _ = writeln!(
            out,
            "SHEET {} {} {}",
            schematic.sheet.number, schematic.sheet.width, schematic.sheet.height
        );
        for w in &schematic.wires {
            let _ = writeln!(out, "WIRE {} {}", w.a, w.b);
        }
        for f in &schematic.flags {
            let _ = writeln!(out, "FLAG {} {}", f.at, f.net);
            if let Some(dir) = f.port {
                let _ = writeln!(out, "IOPIN {} {}", f.at, dir);
            }
        }
        for s in &schematic.symbols {
            let _ = writeln!(out, "SYMBOL {} {} {}", s.symbol, s.at, s.orientation);
            for w in &s.windows {
                let _ = writeln!(
                    out,
                    "WINDOW {} {} {} {}",
                    w.index, w.offset, w.justification, w.size
                );
            }
            for a in &s.attrs {
                let _ = writeln!(out, "SYMATTR {} {}", a.key, a.value);
            }
        }
        for t in &schematic.texts {
            let prefix = if t.content.is_directive() { '!' } else { ';' };
            let _ = writeln!(
                out,
                "TEXT {} {} {} {}{}",
                t.at,
                t.justification,
                t.size,
                prefix,
                t.content.text()
            );
        }
        out
    }

    /// Serialize a schematic to a file.
    pub fn write_file(schematic: &Schematic, path: &Path) -> std::io::Result<()> {
        std::fs::write(path, Self::to_string(schematic))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::asc::AscParser;

    #[test]
    fn canonical_text_roundtrips_byte_for_byte() {
        let src = "\
Version 4
SHEET 1 880 680
WIRE 144 96 80 96
FLAG 80 176 0
FLAG 256 96 out
IOPIN 256 96 BiDir
SYMBOL res 240 80 R90
WINDOW 0 0 56 VBottom 2
SYMATTR InstName R1
SYMATTR Value 1
TEXT -24 224 Left 2 !.tran 10
";
        let sch = AscParser::parse_str(src).unwrap();
        assert_eq!(AscWriter::to_string(&sch), src);
    }

    #[test]
    fn structural_roundtrip_of_built_schematic() {
        let mut sch = Schematic::new();
        sch.add_wire(Point::new(0, 0), Point::new(96, 0));
        sch.add_flag(Point::new(0, 0), "0");
        let mut cap = SymbolInstance::new("cap", Point::new(80, -16), Orientation::R0);
        cap.set_attr("InstName", "C1");
        cap.set_attr("Value", "1");
        sch.symbols.push(cap);
        sch.texts.push(TextAnnotation {
            at: Point::new(0, 64),
            justification: Justification::Left,
            size: 2,
            content: TextContent::Comment("tank model".to_string()),
        });

        let reparsed = AscParser::parse_str(&AscWriter::to_string(&sch)).unwrap();
        assert_eq!(reparsed, sch);
    }
}
