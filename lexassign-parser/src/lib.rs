#![warn(clippy::uninlined_format_args)]

//! Parser for pasted spreadsheet tables.
//!
//! ```text
//!         Mon   Tue   Wed*2
//! Ann*2   4     7     3
//! Bob     6     2     5
//! Cho     1     8     8
//! ```
//!
//! Cells are tab separated, comma separated, or separated by runs of spaces,
//! in that order of preference. A first line holding a non-numeric cell after
//! its corner cell is a header of column names, and every row then starts
//! with its name. Names may end in `*N` or `×N` to replicate that row or
//! column `N` times.

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{take_till, take_till1},
    character::complete::{char, space0, space1, u64},
    combinator::{all_consuming, opt},
    multi::separated_list1,
    sequence::preceded,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("No table found")]
    Empty,
    #[error("Syntax error at line {line}: {detail}")]
    SyntaxError { line: usize, detail: String },
    #[error("Line {line} has {found} cells, expected {expected}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },
}

/// A row or column name with its replication factor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub name: String,
    pub factor: usize,
}

impl Label {
    fn generated(prefix: char, index: usize) -> Self {
        Self {
            name: format!("{prefix}{}", index + 1),
            factor: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub rows: Vec<Label>,
    pub cols: Vec<Label>,
    pub values: Vec<Vec<u64>>,
    pub has_header: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delimiter {
    Tab,
    Comma,
    Spaces,
}

impl Delimiter {
    fn detect(input: &str) -> Self {
        if input.contains('\t') {
            Self::Tab
        } else if input.contains(',') {
            Self::Comma
        } else {
            Self::Spaces
        }
    }
}

fn delimited_cells(input: &str, delimiter: char) -> IResult<&str, Vec<&str>> {
    separated_list1(char(delimiter), take_till(|c| c == delimiter)).parse(input)
}

fn spaced_cells(input: &str) -> IResult<&str, Vec<&str>> {
    separated_list1(space1, take_till1(|c: char| c.is_whitespace())).parse(input)
}

fn split_cells(line: &str, delimiter: Delimiter) -> IResult<&str, Vec<&str>> {
    match delimiter {
        Delimiter::Tab => delimited_cells(line, '\t'),
        Delimiter::Comma => delimited_cells(line, ','),
        Delimiter::Spaces => spaced_cells(line.trim()),
    }
}

fn replication_suffix(input: &str) -> IResult<&str, u64> {
    preceded((space0, alt((char('*'), char('×'))), space0), u64).parse(input)
}

// Name followed by an optional `*N` / `×N`.
fn label(input: &str) -> IResult<&str, (&str, Option<u64>)> {
    (take_till(|c| c == '*' || c == '×'), opt(replication_suffix)).parse(input)
}

fn parse_label(cell: &str, line: usize) -> Result<Label, ParseError> {
    let (_, (name, factor)) =
        all_consuming(label)
            .parse(cell)
            .map_err(|_| ParseError::SyntaxError {
                line,
                detail: format!("'{cell}' is not a name with an optional *N factor"),
            })?;
    let name = name.trim();
    if name.is_empty() {
        return Err(ParseError::SyntaxError {
            line,
            detail: "empty name".to_string(),
        });
    }
    let factor = match factor {
        None => 1,
        Some(factor) => usize::try_from(factor).map_err(|_| ParseError::SyntaxError {
            line,
            detail: format!("replication factor {factor} is too large"),
        })?,
    };
    Ok(Label {
        name: name.to_string(),
        factor,
    })
}

fn number(input: &str) -> IResult<&str, u64> {
    all_consuming(u64).parse(input)
}

fn parse_value(cell: &str) -> Option<u64> {
    number(cell).ok().map(|(_, value)| value)
}

fn value_or_error(cell: &str, line: usize) -> Result<u64, ParseError> {
    parse_value(cell).ok_or_else(|| ParseError::SyntaxError {
        line,
        detail: format!("'{cell}' is not a non-negative integer"),
    })
}

struct Line<'a> {
    number: usize,
    cells: Vec<&'a str>,
}

fn read_lines(input: &str) -> Result<Vec<Line<'_>>, ParseError> {
    let delimiter = Delimiter::detect(input);
    let mut out = Vec::new();
    for (idx, raw) in input.lines().enumerate() {
        if raw.trim().is_empty() {
            continue;
        }
        let (_, cells) = split_cells(raw, delimiter).map_err(|err| ParseError::SyntaxError {
            line: idx + 1,
            detail: err.to_string(),
        })?;
        out.push(Line {
            number: idx + 1,
            cells: cells.into_iter().map(str::trim).collect(),
        });
    }
    Ok(out)
}

fn is_header(first: &Line<'_>) -> bool {
    first
        .cells
        .iter()
        .skip(1)
        .any(|cell| parse_value(cell).is_none())
}

pub fn parse_table(input: &str) -> Result<Table, ParseError> {
    let lines = read_lines(input)?;
    let Some(first) = lines.first() else {
        return Err(ParseError::Empty);
    };

    if !is_header(first) {
        return headerless(&lines);
    }

    let body = &lines[1..];
    let Some(width) = body.first().map(|line| line.cells.len()) else {
        return Err(ParseError::Empty);
    };
    // The corner cell may be left out of the header.
    let header = if first.cells.len() + 1 == width {
        &first.cells[..]
    } else {
        &first.cells[1..]
    };
    if header.len() + 1 != width {
        return Err(ParseError::RaggedRow {
            line: body[0].number,
            expected: header.len() + 1,
            found: width,
        });
    }

    let cols = header
        .iter()
        .map(|cell| parse_label(cell, first.number))
        .collect::<Result<Vec<_>, _>>()?;
    let mut rows = Vec::with_capacity(body.len());
    let mut values = Vec::with_capacity(body.len());
    for line in body {
        if line.cells.len() != width {
            return Err(ParseError::RaggedRow {
                line: line.number,
                expected: width,
                found: line.cells.len(),
            });
        }
        rows.push(parse_label(line.cells[0], line.number)?);
        values.push(
            line.cells[1..]
                .iter()
                .map(|cell| value_or_error(cell, line.number))
                .collect::<Result<Vec<_>, _>>()?,
        );
    }

    Ok(Table {
        rows,
        cols,
        values,
        has_header: true,
    })
}

fn headerless(lines: &[Line<'_>]) -> Result<Table, ParseError> {
    let width = lines[0].cells.len();
    let mut values = Vec::with_capacity(lines.len());
    for line in lines {
        if line.cells.len() != width {
            return Err(ParseError::RaggedRow {
                line: line.number,
                expected: width,
                found: line.cells.len(),
            });
        }
        values.push(
            line.cells
                .iter()
                .map(|cell| value_or_error(cell, line.number))
                .collect::<Result<Vec<_>, _>>()?,
        );
    }

    Ok(Table {
        rows: (0..values.len()).map(|idx| Label::generated('R', idx)).collect(),
        cols: (0..width).map(|idx| Label::generated('C', idx)).collect(),
        values,
        has_header: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn names(labels: &[Label]) -> Vec<&str> {
        labels.iter().map(|label| label.name.as_str()).collect()
    }

    fn factors(labels: &[Label]) -> Vec<usize> {
        labels.iter().map(|label| label.factor).collect()
    }

    #[rstest]
    #[case::tabs("1\t2\n3\t4")]
    #[case::commas("1,2\n3,4\n")]
    #[case::spaces("  1   2\n3 4")]
    #[case::blank_lines("\n1,2\n\n3,4\n\n")]
    fn headerless_grid_gets_generated_names(#[case] input: &str) {
        let table = parse_table(input).expect("valid table");
        assert!(!table.has_header);
        assert_eq!(table.values, vec![vec![1, 2], vec![3, 4]]);
        assert_eq!(names(&table.rows), vec!["R1", "R2"]);
        assert_eq!(names(&table.cols), vec!["C1", "C2"]);
        assert_eq!(factors(&table.cols), vec![1, 1]);
    }

    #[test]
    fn header_and_row_names_carry_factors() {
        let input = "\tMon\tTue\tWed*2\nAnn × 2\t4\t7\t3\nBob\t6\t2\t5\nCho\t1\t8\t8\n";
        let table = parse_table(input).expect("valid table");
        assert!(table.has_header);
        assert_eq!(names(&table.cols), vec!["Mon", "Tue", "Wed"]);
        assert_eq!(factors(&table.cols), vec![1, 1, 2]);
        assert_eq!(names(&table.rows), vec!["Ann", "Bob", "Cho"]);
        assert_eq!(factors(&table.rows), vec![2, 1, 1]);
        assert_eq!(table.values[2], vec![1, 8, 8]);
    }

    #[test]
    fn header_without_corner_cell_is_accepted() {
        let table = parse_table("x,y\na,1,2\nb,3,4").expect("valid table");
        assert_eq!(names(&table.cols), vec!["x", "y"]);
        assert_eq!(names(&table.rows), vec!["a", "b"]);
    }

    #[test]
    fn single_column_without_header() {
        let table = parse_table("7").expect("valid table");
        assert_eq!(table.values, vec![vec![7]]);
    }

    #[rstest]
    #[case::empty("", ParseError::Empty)]
    #[case::whitespace(" \n\t\n", ParseError::Empty)]
    #[case::header_only(",a,b", ParseError::Empty)]
    #[case::ragged("1,2\n3", ParseError::RaggedRow { line: 2, expected: 2, found: 1 })]
    #[case::ragged_body(",a,b\nr,1,2\n\ns,3", ParseError::RaggedRow { line: 4, expected: 3, found: 2 })]
    #[case::header_width(",a,b,c\nr,1", ParseError::RaggedRow { line: 2, expected: 4, found: 2 })]
    fn structural_errors(#[case] input: &str, #[case] expected: ParseError) {
        assert_eq!(parse_table(input), Err(expected));
    }

    #[rstest]
    #[case::negative(",a\nr,-1", 2)]
    #[case::decimal("1.5,2", 1)]
    #[case::bad_factor(",a*x\nr,1", 1)]
    #[case::empty_name(",a\n*2,1", 2)]
    fn cell_errors_report_their_line(#[case] input: &str, #[case] line: usize) {
        let err = parse_table(input).expect_err("invalid cell");
        assert!(
            matches!(err, ParseError::SyntaxError { line: found, .. } if found == line),
            "unexpected error {err:?}"
        );
    }

    #[test]
    fn zero_factor_is_left_for_validation() {
        let table = parse_table(",a*0\nr,1").expect("parses");
        assert_eq!(factors(&table.cols), vec![0]);
    }
}
