//! ltschem - LTspice ASC schematic library
//!
//! Reads, writes, and lints the plain-text `.asc` schematic format: wire
//! segments, net flags, symbol instances, and text annotations on a drawing
//! sheet. Also extracts the electrical nets implied by the drawing's
//! geometry.
//!
//! # Quick Start
//!
//! ```no_run
//! use ltschem::{AscToolkit, CheckOptions};
//! use std::path::Path;
//!
//! let result = AscToolkit::check_schematic(
//!     Path::new("fuel_tanks.asc"),
//!     &CheckOptions::default(),
//! ).unwrap();
//!
//! for issue in &result.issues {
//!     println!("{:?}: {}", issue.severity, issue.message);
//! }
//! ```
//!
//! # Features
//!
//! - **Parsing**: line-oriented reader with per-line errors, UTF-16 aware
//! - **Writing**: canonical serializer with byte round-trip fidelity
//! - **Net extraction**: geometric connectivity from wires, flags, and pins
//! - **Linting**: floating flags, duplicate names, dangling wires, and more

pub mod analyzer;
pub mod core;
pub mod parser;

// Re-export main types
pub use crate::core::{
    discover_asc_files, AscError, AscToolkit, CheckOptions, CheckResult, CheckStats,
};
pub use analyzer::rules::{Issue, Rule, RulesEngine, Severity};
pub use parser::asc::AscParser;
pub use parser::netlist::{Net, NetExtractor};
pub use parser::schema::Schematic;
pub use parser::writer::AscWriter;

/// Parse a schematic file (convenience wrapper).
pub fn parse_schematic(path: &std::path::Path) -> Result<Schematic, AscError> {
    AscParser::parse_file(path).map_err(AscError::from)
}

/// Write a schematic file in canonical form (convenience wrapper).
pub fn write_schematic(schematic: &Schematic, path: &std::path::Path) -> Result<(), AscError> {
    AscWriter::write_file(schematic, path).map_err(AscError::from)
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        AscError, AscToolkit, CheckOptions, CheckResult, CheckStats, Issue, NetExtractor,
        RulesEngine, Schematic, Severity,
    };
}
