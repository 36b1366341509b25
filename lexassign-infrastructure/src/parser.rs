use lexassign_application::{ParsedTable, TableParseError, TableParser};
use lexassign_parser::{Label, ParseError, Table, parse_table};

#[derive(Default)]
pub struct PastedTableParser;

fn map_parse_error(err: ParseError) -> TableParseError {
    match err {
        ParseError::Empty => TableParseError::Empty,
        ParseError::SyntaxError { line, detail } => TableParseError::Syntax { line, detail },
        ParseError::RaggedRow {
            line,
            expected,
            found,
        } => TableParseError::RaggedRow {
            line,
            expected,
            found,
        },
    }
}

fn split_labels(labels: Vec<Label>) -> (Vec<String>, Vec<usize>) {
    labels
        .into_iter()
        .map(|Label { name, factor }| (name, factor))
        .unzip()
}

impl TableParser for PastedTableParser {
    fn parse(&self, content: &str) -> Result<ParsedTable, TableParseError> {
        let Table {
            rows,
            cols,
            values,
            has_header,
        } = parse_table(content).map_err(map_parse_error)?;
        tracing::debug!(
            rows = rows.len(),
            cols = cols.len(),
            has_header,
            "parsed pasted table"
        );

        let (row_names, row_factors) = split_labels(rows);
        let (col_names, col_factors) = split_labels(cols);
        Ok(ParsedTable {
            matrix: values,
            row_names,
            col_names,
            row_factors,
            col_factors,
        })
    }
}
