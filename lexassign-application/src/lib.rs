#![warn(clippy::uninlined_format_args)]

pub mod assignment_processor;
pub mod error;
pub mod model;
pub mod ports;

pub use assignment_processor::AssignmentProcessor;
pub use error::{AssignmentError, TableParseError};
pub use model::{
    AssignmentReport, AssignmentRequest, ParsedTable, RefinementBackend, ReportLabels,
};
pub use ports::{SeedSource, TableParser};
