#![warn(clippy::uninlined_format_args)]

pub mod error_presenter;
pub mod report_presenter;
pub mod text_table;

pub use error_presenter::format_assignment_error;
pub use report_presenter::{ReportPresenter, ReportView};
pub use text_table::{Alignment, TextTableBuilder};
