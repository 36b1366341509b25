use crate::{error::TableParseError, model::ParsedTable};

pub trait TableParser: Send + Sync {
    fn parse(&self, content: &str) -> Result<ParsedTable, TableParseError>;
}

/// Source of the seed for the tie-breaking relabeling.
pub trait SeedSource: Send + Sync {
    fn next_seed(&self) -> u64;
}
