//! Typed model of an ASC schematic.
//!
//! Coordinates are exact grid integers; connectivity is decided by equality,
//! never by distance tolerance. Record lists keep file order so the writer
//! can reproduce a canonical file byte for byte.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A point on the drawing sheet, in LTspice grid units.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.x, self.y)
    }
}

/// Sheet record: sheet number plus drawing extents.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Sheet {
    pub number: u32,
    pub width: u32,
    pub height: u32,
}

impl Default for Sheet {
    fn default() -> Self {
        // LTspice's default sheet size for a new schematic.
        Self {
            number: 1,
            width: 880,
            height: 680,
        }
    }
}

/// A drawn wire segment between two endpoints.
///
/// Wires have no identity beyond their coordinates; duplicate segments are
/// legal and merely redundant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Wire {
    pub a: Point,
    pub b: Point,
}

impl Wire {
    pub const fn new(a: Point, b: Point) -> Self {
        Self { a, b }
    }

    /// True for a degenerate segment whose endpoints coincide.
    pub fn is_zero_length(&self) -> bool {
        self.a == self.b
    }

    /// True if `p` lies on this segment (endpoints included). Exact integer
    /// test: collinear and within the bounding box.
    pub fn contains(&self, p: Point) -> bool {
        let (ax, ay) = (i64::from(self.a.x), i64::from(self.a.y));
        let (bx, by) = (i64::from(self.b.x), i64::from(self.b.y));
        let (px, py) = (i64::from(p.x), i64::from(p.y));
        let cross = (bx - ax) * (py - ay) - (by - ay) * (px - ax);
        if cross != 0 {
            return false;
        }
        px >= ax.min(bx) && px <= ax.max(bx) && py >= ay.min(by) && py <= ay.max(by)
    }

    /// True if `other` covers the same segment, in either direction.
    pub fn same_segment(&self, other: &Wire) -> bool {
        (self.a == other.a && self.b == other.b) || (self.a == other.b && self.b == other.a)
    }
}

/// Direction of an `IOPIN` port marker attached to a flag.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PortDirection {
    In,
    Out,
    BiDir,
}

impl FromStr for PortDirection {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "In" => Ok(Self::In),
            "Out" => Ok(Self::Out),
            "BiDir" => Ok(Self::BiDir),
            _ => Err(()),
        }
    }
}

impl fmt::Display for PortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::In => "In",
            Self::Out => "Out",
            Self::BiDir => "BiDir",
        })
    }
}

/// A net label anchored at a point. The name "0" is the ground net.
///
/// The format does not require the anchor to touch anything; the
/// `floating_flag` lint rule checks that it does.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Flag {
    pub at: Point,
    pub net: String,
    /// Port marker from a following `IOPIN` record, if any.
    pub port: Option<PortDirection>,
}

impl Flag {
    pub fn new(at: Point, net: impl Into<String>) -> Self {
        Self {
            at,
            net: net.into(),
            port: None,
        }
    }

    pub fn is_ground(&self) -> bool {
        self.net == "0"
    }
}

/// Symbol orientation: four rotations, optionally mirrored first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    R0,
    R90,
    R180,
    R270,
    M0,
    M90,
    M180,
    M270,
}

impl Orientation {
    /// Transform a symbol-local offset into sheet-relative coordinates
    /// (before translation by the placement point). Mirroring flips x and is
    /// applied before the rotation, matching how LTspice composes the two.
    pub fn apply(self, p: Point) -> Point {
        let (x, y) = match self {
            Self::R0 | Self::R90 | Self::R180 | Self::R270 => (p.x, p.y),
            Self::M0 | Self::M90 | Self::M180 | Self::M270 => (-p.x, p.y),
        };
        match self {
            Self::R0 | Self::M0 => Point::new(x, y),
            Self::R90 | Self::M90 => Point::new(-y, x),
            Self::R180 | Self::M180 => Point::new(-x, -y),
            Self::R270 | Self::M270 => Point::new(y, -x),
        }
    }
}

impl FromStr for Orientation {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "R0" => Ok(Self::R0),
            "R90" => Ok(Self::R90),
            "R180" => Ok(Self::R180),
            "R270" => Ok(Self::R270),
            "M0" => Ok(Self::M0),
            "M90" => Ok(Self::M90),
            "M180" => Ok(Self::M180),
            "M270" => Ok(Self::M270),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::R0 => "R0",
            Self::R90 => "R90",
            Self::R180 => "R180",
            Self::R270 => "R270",
            Self::M0 => "M0",
            Self::M90 => "M90",
            Self::M180 => "M180",
            Self::M270 => "M270",
        })
    }
}

/// Text justification token used by `TEXT` and `WINDOW` records.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Justification {
    Left,
    Right,
    Center,
    Top,
    Bottom,
    VTop,
    VBottom,
    VLeft,
    VRight,
    Invisible,
}

impl FromStr for Justification {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Left" => Ok(Self::Left),
            "Right" => Ok(Self::Right),
            "Center" => Ok(Self::Center),
            "Top" => Ok(Self::Top),
            "Bottom" => Ok(Self::Bottom),
            "VTop" => Ok(Self::VTop),
            "VBottom" => Ok(Self::VBottom),
            "VLeft" => Ok(Self::VLeft),
            "VRight" => Ok(Self::VRight),
            "Invisible" => Ok(Self::Invisible),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Justification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Left => "Left",
            Self::Right => "Right",
            Self::Center => "Center",
            Self::Top => "Top",
            Self::Bottom => "Bottom",
            Self::VTop => "VTop",
            Self::VBottom => "VBottom",
            Self::VLeft => "VLeft",
            Self::VRight => "VRight",
            Self::Invisible => "Invisible",
        })
    }
}

/// `WINDOW` record inside a symbol block: where an attribute is displayed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Window {
    pub index: u8,
    pub offset: Point,
    pub justification: Justification,
    pub size: u8,
}

/// `SYMATTR` key/value pair. Order and unknown keys are preserved so files
/// carrying `SpiceLine`, `Description` and the like survive a round trip.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SymAttr {
    pub key: String,
    pub value: String,
}

/// A placed instance of a library symbol (resistor, capacitor, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SymbolInstance {
    /// Library symbol name, e.g. "res" or "cap".
    pub symbol: String,
    pub at: Point,
    pub orientation: Orientation,
    pub windows: Vec<Window>,
    pub attrs: Vec<SymAttr>,
}

impl SymbolInstance {
    pub fn new(symbol: impl Into<String>, at: Point, orientation: Orientation) -> Self {
        Self {
            symbol: symbol.into(),
            at,
            orientation,
            windows: Vec::new(),
            attrs: Vec::new(),
        }
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.key == key)
            .map(|a| a.value.as_str())
    }

    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(a) = self.attrs.iter_mut().find(|a| a.key == key) {
            a.value = value;
        } else {
            self.attrs.push(SymAttr { key, value });
        }
    }

    /// Instance name, e.g. "RI1". Unique per circuit when the file is sane.
    pub fn inst_name(&self) -> Option<&str> {
        self.attr("InstName")
    }

    pub fn value(&self) -> Option<&str> {
        self.attr("Value")
    }

    /// Sheet positions of this instance's pins, if the symbol is one of the
    /// standard two-terminal templates with known pin geometry.
    pub fn pin_positions(&self) -> Option<Vec<Point>> {
        builtin_pin_offsets(&self.symbol).map(|offsets| {
            offsets
                .iter()
                .map(|&off| {
                    let p = self.orientation.apply(off);
                    Point::new(self.at.x + p.x, self.at.y + p.y)
                })
                .collect()
        })
    }
}

/// Pin offsets (symbol-local, R0) for the standard two-terminal symbols.
/// Anything else needs library data we do not carry, and yields `None`.
pub fn builtin_pin_offsets(symbol: &str) -> Option<&'static [Point]> {
    const RES: &[Point] = &[Point::new(16, 16), Point::new(16, 96)];
    const CAP: &[Point] = &[Point::new(16, 16), Point::new(16, 64)];
    const IND: &[Point] = &[Point::new(16, 16), Point::new(16, 96)];
    const DIODE: &[Point] = &[Point::new(16, 16), Point::new(16, 64)];
    const VOLTAGE: &[Point] = &[Point::new(0, 16), Point::new(0, 96)];
    const CURRENT: &[Point] = &[Point::new(0, 16), Point::new(0, 96)];
    match symbol {
        "res" | "res2" => Some(RES),
        "cap" | "polcap" => Some(CAP),
        "ind" | "ind2" => Some(IND),
        "diode" | "schottky" | "zener" => Some(DIODE),
        "voltage" => Some(VOLTAGE),
        "current" => Some(CURRENT),
        _ => None,
    }
}

/// Content of a `TEXT` record: a simulator directive (`!` prefix in the
/// file) or a free comment (`;` prefix).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum TextContent {
    Directive(String),
    Comment(String),
}

impl TextContent {
    /// The text without its prefix. Multi-line text keeps LTspice's literal
    /// `\n` escape; display semantics belong to the consumer.
    pub fn text(&self) -> &str {
        match self {
            Self::Directive(s) | Self::Comment(s) => s,
        }
    }

    pub fn is_directive(&self) -> bool {
        matches!(self, Self::Directive(_))
    }
}

/// Free-placed text: tank labels, titles, and simulation directives.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextAnnotation {
    pub at: Point,
    pub justification: Justification,
    pub size: u8,
    pub content: TextContent,
}

/// A complete schematic: header plus the four record lists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Schematic {
    /// Format version from the `Version` header line.
    pub version: u32,
    pub sheet: Sheet,
    pub wires: Vec<Wire>,
    pub flags: Vec<Flag>,
    pub symbols: Vec<SymbolInstance>,
    pub texts: Vec<TextAnnotation>,
}

impl Default for Schematic {
    fn default() -> Self {
        Self {
            version: 4,
            sheet: Sheet::default(),
            wires: Vec::new(),
            flags: Vec::new(),
            symbols: Vec::new(),
            texts: Vec::new(),
        }
    }
}

impl Schematic {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_wire(&mut self, a: Point, b: Point) {
        self.wires.push(Wire::new(a, b));
    }

    pub fn add_flag(&mut self, at: Point, net: impl Into<String>) {
        self.flags.push(Flag::new(at, net));
    }

    /// Simulator directives among the text annotations (e.g. `.tran`).
    pub fn directives(&self) -> impl Iterator<Item = &TextAnnotation> {
        self.texts.iter().filter(|t| t.content.is_directive())
    }

    /// Find a symbol instance by its `InstName`.
    pub fn instance(&self, name: &str) -> Option<&SymbolInstance> {
        self.symbols.iter().find(|s| s.inst_name() == Some(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_contains_is_exact() {
        let w = Wire::new(Point::new(0, 0), Point::new(100, 0));
        assert!(w.contains(Point::new(50, 0)));
        assert!(w.contains(Point::new(0, 0)));
        assert!(w.contains(Point::new(100, 0)));
        assert!(!w.contains(Point::new(50, 1)));
        assert!(!w.contains(Point::new(101, 0)));
    }

    #[test]
    fn orientation_transforms() {
        let p = Point::new(16, 96);
        assert_eq!(Orientation::R0.apply(p), Point::new(16, 96));
        assert_eq!(Orientation::R90.apply(p), Point::new(-96, 16));
        assert_eq!(Orientation::R180.apply(p), Point::new(-16, -96));
        assert_eq!(Orientation::R270.apply(p), Point::new(96, -16));
        assert_eq!(Orientation::M0.apply(p), Point::new(-16, 96));
        assert_eq!(Orientation::M90.apply(p), Point::new(-96, -16));
    }

    #[test]
    fn rotated_resistor_pins() {
        // res at (300, 134) R90: pins land on y = 150, 80 apart.
        let inst = SymbolInstance::new("res", Point::new(300, 134), Orientation::R90);
        let pins = inst.pin_positions().unwrap();
        assert_eq!(pins, vec![Point::new(284, 150), Point::new(204, 150)]);
    }

    #[test]
    fn attrs_roundtrip_through_accessors() {
        let mut inst = SymbolInstance::new("cap", Point::new(0, 0), Orientation::R0);
        inst.set_attr("InstName", "C1");
        inst.set_attr("Value", "1");
        inst.set_attr("Value", "2");
        assert_eq!(inst.inst_name(), Some("C1"));
        assert_eq!(inst.value(), Some("2"));
        assert_eq!(inst.attrs.len(), 2);
    }
}
