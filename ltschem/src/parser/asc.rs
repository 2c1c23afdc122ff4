//! ASC file reader.
//!
//! The format is line oriented: a `Version` header, a `SHEET` record, then a
//! flat stream of `WIRE`/`FLAG`/`SYMBOL`/`TEXT` records. `WINDOW` and
//! `SYMATTR` lines belong to the most recent `SYMBOL`; `IOPIN` lines belong
//! to the most recent `FLAG`. A malformed line is a parse failure carrying
//! its 1-based line number. Unknown record keywords are skipped with a
//! warning so files from newer tool versions still load.

use std::path::Path;

use crate::parser::schema::*;

/// Error type for ASC parsing.
#[derive(Debug, thiserror::Error)]
pub enum AscParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("missing Version header")]
    MissingHeader,
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },
    #[error("encoding error: {0}")]
    Encoding(String),
}

impl AscParseError {
    fn syntax(line: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            message: message.into(),
        }
    }
}

/// Parser for ASC schematic files.
pub struct AscParser;

impl AscParser {
    /// Read and parse a schematic file. Handles ASCII/UTF-8 (with or
    /// without BOM) and the UTF-16LE that LTspice XVII writes.
    pub fn parse_file(path: &Path) -> Result<Schematic, AscParseError> {
        let content = Self::read_source(path)?;
        Self::parse_str(&content)
    }

    /// Read a schematic file to text, decoding the same encodings
    /// `parse_file` accepts. Callers that need the source text itself (for
    /// canonical-form comparison, say) must go through this rather than a
    /// plain UTF-8 read.
    pub fn read_source(path: &Path) -> Result<String, AscParseError> {
        let bytes = std::fs::read(path)?;
        decode(&bytes)
    }

    /// Parse schematic text.
    pub fn parse_str(content: &str) -> Result<Schematic, AscParseError> {
        let mut schematic = Schematic::new();
        let mut saw_header = false;
        let mut saw_sheet = false;
        // SYMBOL opens a block; WINDOW/SYMATTR attach until the next
        // non-symbol record or the next SYMBOL.
        let mut open_symbol: Option<SymbolInstance> = None;

        for (idx, raw) in content.lines().enumerate() {
            let lineno = idx + 1;
            let line = raw.trim_end_matches('\r').trim();
            if line.is_empty() {
                continue;
            }

            if !saw_header {
                let rest = line
                    .strip_prefix("Version")
                    .ok_or(AscParseError::MissingHeader)?;
                let version: u32 = rest.trim().parse().map_err(|_| {
                    AscParseError::syntax(lineno, format!("bad Version header: {line:?}"))
                })?;
                if version != 4 {
                    tracing::warn!(version, "unfamiliar ASC format version, parsing anyway");
                }
                schematic.version = version;
                saw_header = true;
                continue;
            }

            let (keyword, rest) = split_keyword(line);
            match keyword {
                "WINDOW" => {
                    let sym = open_symbol.as_mut().ok_or_else(|| {
                        AscParseError::syntax(lineno, "WINDOW record outside a SYMBOL block")
                    })?;
                    sym.windows.push(parse_window(rest, lineno)?);
                    continue;
                }
                "SYMATTR" => {
                    let sym = open_symbol.as_mut().ok_or_else(|| {
                        AscParseError::syntax(lineno, "SYMATTR record outside a SYMBOL block")
                    })?;
                    let (key, value) = rest.split_once(char::is_whitespace).ok_or_else(|| {
                        AscParseError::syntax(lineno, "SYMATTR needs a key and a value")
                    })?;
                    sym.attrs.push(SymAttr {
                        key: key.to_string(),
                        value: value.trim_start().to_string(),
                    });
                    continue;
                }
                _ => {}
            }

            // Any other keyword closes an open symbol block.
            if let Some(sym) = open_symbol.take() {
                schematic.symbols.push(sym);
            }

            match keyword {
                "SHEET" => {
                    let t = tokens(rest, 3, lineno, "SHEET expects number, width, height")?;
                    schematic.sheet = Sheet {
                        number: parse_num(t[0], lineno)?,
                        width: parse_num(t[1], lineno)?,
                        height: parse_num(t[2], lineno)?,
                    };
                    saw_sheet = true;
                }
                "WIRE" => {
                    let t = tokens(rest, 4, lineno, "WIRE expects four coordinates")?;
                    schematic.wires.push(Wire::new(
                        Point::new(parse_num(t[0], lineno)?, parse_num(t[1], lineno)?),
                        Point::new(parse_num(t[2], lineno)?, parse_num(t[3], lineno)?),
                    ));
                }
                "FLAG" => {
                    let (t, name) = tokens_rest(rest, 2, lineno, "FLAG expects x, y, name")?;
                    if name.is_empty() {
                        return Err(AscParseError::syntax(lineno, "FLAG is missing a net name"));
                    }
                    schematic.flags.push(Flag::new(
                        Point::new(parse_num(t[0], lineno)?, parse_num(t[1], lineno)?),
                        name,
                    ));
                }
                "IOPIN" => {
                    let t = tokens(rest, 3, lineno, "IOPIN expects x, y, direction")?;
                    let dir: PortDirection = t[2].parse().map_err(|_| {
                        AscParseError::syntax(lineno, format!("unknown IOPIN direction {:?}", t[2]))
                    })?;
                    let flag = schematic.flags.last_mut().ok_or_else(|| {
                        AscParseError::syntax(lineno, "IOPIN record without a preceding FLAG")
                    })?;
                    flag.port = Some(dir);
                }
                "SYMBOL" => {
                    let t = tokens(rest, 4, lineno, "SYMBOL expects name, x, y, orientation")?;
                    let orientation: Orientation = t[3].parse().map_err(|_| {
                        AscParseError::syntax(lineno, format!("unknown orientation {:?}", t[3]))
                    })?;
                    open_symbol = Some(SymbolInstance::new(
                        t[0],
                        Point::new(parse_num(t[1], lineno)?, parse_num(t[2], lineno)?),
                        orientation,
                    ));
                }
                "TEXT" => {
                    schematic.texts.push(parse_text(rest, lineno)?);
                }
                _ => {
                    tracing::warn!(lineno, keyword, "skipping unknown ASC record");
                }
            }
        }

        if let Some(sym) = open_symbol.take() {
            schematic.symbols.push(sym);
        }
        if !saw_header {
            return Err(AscParseError::MissingHeader);
        }
        if !saw_sheet {
            tracing::warn!("no SHEET record, using default sheet size");
        }
        Ok(schematic)
    }
}

/// Decode raw file bytes. LTspice IV writes ASCII; XVII writes UTF-16LE.
fn decode(bytes: &[u8]) -> Result<String, AscParseError> {
    if bytes.starts_with(&[0xFF, 0xFE]) {
        return decode_utf16le(&bytes[2..]);
    }
    // UTF-16LE without a BOM: ASCII text has a NUL in every second byte.
    if bytes.len() >= 2 && bytes[0] != 0 && bytes[1] == 0 {
        return decode_utf16le(bytes);
    }
    let text = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF][..]).unwrap_or(bytes);
    std::str::from_utf8(text)
        .map(str::to_owned)
        .map_err(|e| AscParseError::Encoding(e.to_string()))
}

fn decode_utf16le(bytes: &[u8]) -> Result<String, AscParseError> {
    if bytes.len() % 2 != 0 {
        return Err(AscParseError::Encoding(
            "odd byte count in UTF-16 content".to_string(),
        ));
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect();
    String::from_utf16(&units).map_err(|e| AscParseError::Encoding(e.to_string()))
}

fn split_keyword(line: &str) -> (&str, &str) {
    match line.split_once(char::is_whitespace) {
        Some((kw, rest)) => (kw, rest.trim_start()),
        None => (line, ""),
    }
}

/// Split exactly `n` whitespace-separated tokens, rejecting trailing junk.
fn tokens<'a>(
    s: &'a str,
    n: usize,
    lineno: usize,
    expect: &str,
) -> Result<Vec<&'a str>, AscParseError> {
    let t: Vec<&str> = s.split_whitespace().collect();
    if t.len() != n {
        return Err(AscParseError::syntax(lineno, expect));
    }
    Ok(t)
}

/// Split `n` leading tokens and return the untouched remainder, which keeps
/// interior spacing (flag names cannot contain spaces, but text can).
fn tokens_rest<'a>(
    s: &'a str,
    n: usize,
    lineno: usize,
    expect: &str,
) -> Result<(Vec<&'a str>, &'a str), AscParseError> {
    let mut out = Vec::with_capacity(n);
    let mut rest = s;
    for _ in 0..n {
        match rest.trim_start().split_once(char::is_whitespace) {
            Some((tok, tail)) => {
                out.push(tok);
                rest = tail;
            }
            None => {
                let tok = rest.trim();
                if tok.is_empty() {
                    return Err(AscParseError::syntax(lineno, expect));
                }
                out.push(tok);
                rest = "";
            }
        }
    }
    Ok((out, rest.trim_start()))
}

fn parse_num<T: std::str::FromStr>(s: &str, lineno: usize) -> Result<T, AscParseError> {
    s.parse()
        .map_err(|_| AscParseError::syntax(lineno, format!("bad number {s:?}")))
}

fn parse_window(rest: &str, lineno: usize) -> Result<Window, AscParseError> {
    let t = tokens(rest, 5, lineno, "WINDOW expects index, x, y, justification, size")?;
    let justification: Justification = t[3].parse().map_err(|_| {
        AscParseError::syntax(lineno, format!("unknown justification {:?}", t[3]))
    })?;
    Ok(Window {
        index: parse_num(t[0], lineno)?,
        offset: Point::new(parse_num(t[1], lineno)?, parse_num(t[2], lineno)?),
        justification,
        size: parse_num(t[4], lineno)?,
    })
}

fn parse_text(rest: &str, lineno: usize) -> Result<TextAnnotation, AscParseError> {
    let (t, body) = tokens_rest(rest, 4, lineno, "TEXT expects x, y, justification, size, body")?;
    let justification: Justification = t[2].parse().map_err(|_| {
        AscParseError::syntax(lineno, format!("unknown justification {:?}", t[2]))
    })?;
    let content = if let Some(s) = body.strip_prefix('!') {
        TextContent::Directive(s.to_string())
    } else if let Some(s) = body.strip_prefix(';') {
        TextContent::Comment(s.to_string())
    } else {
        return Err(AscParseError::syntax(
            lineno,
            "TEXT body must start with '!' (directive) or ';' (comment)",
        ));
    };
    Ok(TextAnnotation {
        at: Point::new(parse_num(t[0], lineno)?, parse_num(t[1], lineno)?),
        justification,
        size: parse_num(t[3], lineno)?,
        content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = "\
Version 4
SHEET 1 880 680
WIRE 144 96 80 96
WIRE 256 96 224 96
FLAG 80 176 0
FLAG 256 96 out
IOPIN 256 96 Out
SYMBOL res 240 80 R90
WINDOW 0 0 56 VBottom 2
WINDOW 3 32 56 VTop 2
SYMATTR InstName R1
SYMATTR Value 1k
SYMBOL cap 240 96 R0
SYMATTR InstName C1
SYMATTR Value 1
TEXT -24 224 Left 2 !.tran 10
TEXT -24 256 Left 2 ;unit valued
";

    #[test]
    fn parses_minimal_schematic() {
        let sch = AscParser::parse_str(MINIMAL).unwrap();
        assert_eq!(sch.version, 4);
        assert_eq!(sch.sheet, Sheet { number: 1, width: 880, height: 680 });
        assert_eq!(sch.wires.len(), 2);
        assert_eq!(sch.flags.len(), 2);
        assert_eq!(sch.symbols.len(), 2);
        assert_eq!(sch.texts.len(), 2);

        assert!(sch.flags[0].is_ground());
        assert_eq!(sch.flags[1].net, "out");
        assert_eq!(sch.flags[1].port, Some(PortDirection::Out));

        let r1 = sch.instance("R1").unwrap();
        assert_eq!(r1.symbol, "res");
        assert_eq!(r1.orientation, Orientation::R90);
        assert_eq!(r1.windows.len(), 2);
        assert_eq!(r1.value(), Some("1k"));

        assert!(sch.texts[0].content.is_directive());
        assert_eq!(sch.texts[0].content.text(), ".tran 10");
        assert_eq!(sch.texts[1].content.text(), "unit valued");
    }

    #[test]
    fn missing_header_is_an_error() {
        let err = AscParser::parse_str("SHEET 1 880 680\n").unwrap_err();
        assert!(matches!(err, AscParseError::MissingHeader));
    }

    #[test]
    fn malformed_wire_reports_line_number() {
        let src = "Version 4\nSHEET 1 880 680\nWIRE 1 2 3\n";
        match AscParser::parse_str(src).unwrap_err() {
            AscParseError::Syntax { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn symattr_outside_symbol_is_an_error() {
        let src = "Version 4\nSHEET 1 880 680\nSYMATTR InstName R1\n";
        assert!(matches!(
            AscParser::parse_str(src),
            Err(AscParseError::Syntax { line: 3, .. })
        ));
    }

    #[test]
    fn unknown_records_are_skipped() {
        let src = "Version 4\nSHEET 1 880 680\nRECTANGLE Normal 0 0 10 10\nWIRE 0 0 8 0\n";
        let sch = AscParser::parse_str(src).unwrap();
        assert_eq!(sch.wires.len(), 1);
    }

    #[test]
    fn symattr_value_keeps_interior_spaces() {
        let src = "Version 4\nSHEET 1 880 680\nSYMBOL voltage 0 0 R0\nSYMATTR Value PULSE(0 5 0 1n 1n 1u 2u)\n";
        let sch = AscParser::parse_str(src).unwrap();
        assert_eq!(sch.symbols[0].value(), Some("PULSE(0 5 0 1n 1n 1u 2u)"));
    }

    #[test]
    fn decodes_utf16le_with_bom() {
        let text = "Version 4\nSHEET 1 880 680\nWIRE 0 0 16 0\n";
        let mut bytes = vec![0xFF, 0xFE];
        for u in text.encode_utf16() {
            bytes.extend_from_slice(&u.to_le_bytes());
        }
        let decoded = decode(&bytes).unwrap();
        let sch = AscParser::parse_str(&decoded).unwrap();
        assert_eq!(sch.wires.len(), 1);
    }

    #[test]
    fn read_source_decodes_utf16le_files() {
        let text = "Version 4\nSHEET 1 880 680\nWIRE 0 0 16 0\n";
        let mut bytes = vec![0xFF, 0xFE];
        for u in text.encode_utf16() {
            bytes.extend_from_slice(&u.to_le_bytes());
        }
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.asc");
        std::fs::write(&path, bytes).unwrap();

        assert_eq!(AscParser::read_source(&path).unwrap(), text);
        let sch = AscParser::parse_file(&path).unwrap();
        assert_eq!(sch.wires.len(), 1);
    }

    #[test]
    fn trailing_symbol_block_is_closed() {
        let src = "Version 4\nSHEET 1 880 680\nSYMBOL res 0 0 R0\nSYMATTR InstName R1\n";
        let sch = AscParser::parse_str(src).unwrap();
        assert_eq!(sch.symbols.len(), 1);
        assert_eq!(sch.symbols[0].inst_name(), Some("R1"));
    }
}
