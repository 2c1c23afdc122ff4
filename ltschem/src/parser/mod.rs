pub mod asc;
pub mod netlist;
pub mod schema;
pub mod writer;

// Re-export for convenience
pub use asc::{AscParseError, AscParser};
pub use netlist::{Net, NetExtractor, PinConnection};
pub use schema::*;
pub use writer::AscWriter;
