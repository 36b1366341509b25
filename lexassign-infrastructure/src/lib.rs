#![warn(clippy::uninlined_format_args)]

pub mod parser;
pub mod seed;

pub use parser::PastedTableParser;
pub use seed::{FixedSeedSource, OsSeedSource};
