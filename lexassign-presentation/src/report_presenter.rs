use crate::text_table::{Alignment, TextTableBuilder};
use lexassign_application::AssignmentReport;
use lexassign_domain::{Axis, FoldedAssignment, MatrixKind, PriorityMode};
use std::borrow::Cow;

pub struct ReportPresenter;

pub struct ReportView {
    /// Expanded matrix: `[v]` assigned, `v*` another optimal candidate.
    pub square: String,
    /// Original rows against expanded columns, with per-row totals.
    pub row_fold: String,
    /// Expanded rows against original columns, with per-column totals.
    pub col_fold: String,
    /// One line per expanded assignment, grouped by original row.
    pub folded: String,
    /// Committed sum of every priority tier.
    pub tiers: String,
    pub summary: String,
}

impl ReportView {
    pub fn to_text(&self) -> String {
        [
            &self.square,
            &self.row_fold,
            &self.col_fold,
            &self.folded,
            &self.tiers,
            &self.summary,
        ]
            .into_iter()
            .filter(|section| !section.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl ReportPresenter {
    pub fn render(report: &AssignmentReport) -> ReportView {
        ReportView {
            square: Self::build_square_table(report),
            row_fold: Self::build_row_fold_table(report),
            col_fold: Self::build_column_fold_table(report),
            folded: Self::build_folded_table(report),
            tiers: Self::build_tier_table(report),
            summary: Self::build_summary(report),
        }
    }

    pub fn build_square_table(report: &AssignmentReport) -> String {
        let size = report.expanded.row_count();
        let alignments: Vec<Alignment> = std::iter::once(Alignment::Left)
            .chain(std::iter::repeat_n(Alignment::Right, size))
            .collect();
        let headers = std::iter::once(Cow::Borrowed(""))
            .chain(report.labels.cols.iter().map(|name| Cow::Borrowed(name.as_str())));

        let mut builder = TextTableBuilder::new()
            .alignments(&alignments)
            .headers(headers);
        for row in 0..size {
            let cells = (0..size).map(|col| Cow::Owned(square_cell(report, row, col)));
            builder = builder.row(
                std::iter::once(Cow::Borrowed(report.labels.rows[row].as_str())).chain(cells),
            );
        }
        builder.build()
    }

    pub fn build_row_fold_table(report: &AssignmentReport) -> String {
        let layout = report.replication.rows();
        let size = report.expanded.col_count();
        let assigned = assigned_columns(report);
        let totals = report.folded.row_totals();

        let alignments: Vec<Alignment> = std::iter::once(Alignment::Left)
            .chain(std::iter::repeat_n(Alignment::Right, size + 1))
            .collect();
        let headers = std::iter::once(Cow::Borrowed(""))
            .chain(report.labels.cols.iter().map(|name| Cow::Borrowed(name.as_str())))
            .chain(std::iter::once(Cow::Borrowed("total")));

        let mut builder = TextTableBuilder::new()
            .alignments(&alignments)
            .headers(headers);
        for (original, total) in totals.iter().enumerate() {
            let replicas = layout.expanded_range(original);
            let cells = (0..size).map(|col| {
                let value = report.expanded[(replicas.start, col)];
                let taken = replicas.clone().any(|row| assigned[row] == col);
                Cow::Owned(fold_cell(value, taken))
            });
            builder = builder.row(
                std::iter::once(Cow::Borrowed(report.labels.folded_rows[original].as_str()))
                    .chain(cells)
                    .chain(std::iter::once(Cow::Owned(total.to_string()))),
            );
        }
        builder.build()
    }

    pub fn build_column_fold_table(report: &AssignmentReport) -> String {
        let layout = report.replication.cols();
        let size = report.expanded.row_count();
        let assigned = assigned_columns(report);
        let originals = layout.original_len();

        let alignments: Vec<Alignment> = std::iter::once(Alignment::Left)
            .chain(std::iter::repeat_n(Alignment::Right, originals))
            .collect();
        let headers = std::iter::once(Cow::Borrowed("")).chain(
            report
                .labels
                .folded_cols
                .iter()
                .map(|name| Cow::Borrowed(name.as_str())),
        );

        let mut builder = TextTableBuilder::new()
            .alignments(&alignments)
            .headers(headers);
        for row in 0..size {
            let cells = (0..originals).map(|original| {
                let replicas = layout.expanded_range(original);
                let value = report.expanded[(row, replicas.start)];
                Cow::Owned(fold_cell(value, replicas.contains(&assigned[row])))
            });
            builder = builder.row(
                std::iter::once(Cow::Borrowed(report.labels.rows[row].as_str())).chain(cells),
            );
        }
        let totals = report.folded.col_totals();
        builder = builder.row(
            std::iter::once(Cow::Borrowed("total"))
                .chain(totals.iter().map(|total| Cow::Owned(total.to_string()))),
        );
        builder.build()
    }

    pub fn build_folded_table(report: &AssignmentReport) -> String {
        let mut builder = TextTableBuilder::new()
            .alignments(&[Alignment::Left, Alignment::Left, Alignment::Right])
            .headers([
                Cow::Borrowed("row"),
                Cow::Borrowed("column"),
                Cow::Borrowed("value"),
            ]);

        let mut previous = None;
        for entry in report.folded.entries() {
            let row_label = if previous == Some(entry.row.original) {
                Cow::Borrowed("")
            } else {
                Cow::Borrowed(report.labels.folded_rows[entry.row.original].as_str())
            };
            previous = Some(entry.row.original);
            builder = builder.row([
                row_label,
                Cow::Borrowed(expanded_label(report, Axis::Column, entry)),
                Cow::Owned(entry.value.to_string()),
            ]);
        }
        builder.build()
    }

    pub fn build_tier_table(report: &AssignmentReport) -> String {
        if report.tiers.is_empty() {
            return String::new();
        }
        let mut builder = TextTableBuilder::new()
            .alignments(&[Alignment::Left, Alignment::Right, Alignment::Left, Alignment::Right])
            .headers([
                Cow::Borrowed("tier"),
                Cow::Borrowed("rank"),
                Cow::Borrowed("members"),
                Cow::Borrowed("committed"),
            ]);
        for commit in &report.tiers {
            let labels = match commit.axis {
                Axis::Row => &report.labels.rows,
                Axis::Column => &report.labels.cols,
            };
            let members = commit
                .members
                .iter()
                .map(|&idx| labels[idx].as_str())
                .collect::<Vec<_>>()
                .join(", ");
            builder = builder.row([
                Cow::Owned(commit.axis.to_string()),
                Cow::Owned(commit.rank.to_string()),
                Cow::Owned(members),
                Cow::Owned(commit.committed.to_string()),
            ]);
        }
        builder.build()
    }

    pub fn build_summary(report: &AssignmentReport) -> String {
        let objective = match report.kind {
            MatrixKind::Cost => "minimum cost",
            MatrixKind::Profit => "maximum profit",
        };
        let order = match report.mode {
            PriorityMode::RowFirst => "rows first",
            PriorityMode::ColumnFirst => "columns first",
        };
        format!(
            "{objective}: {}\npriority: {order}, backend: {}, seed: {}\n",
            report.total,
            report.backend.name(),
            report.seed
        )
    }
}

fn square_cell(report: &AssignmentReport, row: usize, col: usize) -> String {
    let value = report.expanded[(row, col)];
    if report.marker[(row, col)] == 0 {
        format!("[{value}]")
    } else if report.candidates[(row, col)] == 0 {
        format!("{value}*")
    } else {
        value.to_string()
    }
}

// Expanded column assigned to each expanded row.
fn assigned_columns(report: &AssignmentReport) -> Vec<usize> {
    let mut assigned = vec![0; report.expanded.row_count()];
    for assignment in &report.assignments {
        assigned[assignment.row] = assignment.col;
    }
    assigned
}

fn fold_cell(value: u64, assigned: bool) -> String {
    if assigned {
        format!("[{value}]")
    } else {
        value.to_string()
    }
}

fn expanded_label<'r>(report: &'r AssignmentReport, axis: Axis, entry: &FoldedAssignment) -> &'r str {
    let (index, labels) = match axis {
        Axis::Row => (entry.row, &report.labels.rows),
        Axis::Column => (entry.col, &report.labels.cols),
    };
    let start = report.replication.layout(axis).expanded_range(index.original).start;
    labels[start + index.replica].as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexassign_application::{
        AssignmentProcessor, AssignmentRequest, ParsedTable, SeedSource, TableParseError,
        TableParser,
    };
    use rstest::{fixture, rstest};

    struct NoParser;

    impl TableParser for NoParser {
        fn parse(&self, _content: &str) -> Result<ParsedTable, TableParseError> {
            Err(TableParseError::Empty)
        }
    }

    struct Seed;

    impl SeedSource for Seed {
        fn next_seed(&self) -> u64 {
            5
        }
    }

    #[fixture]
    fn scenario() -> AssignmentReport {
        AssignmentProcessor::new(&NoParser, &Seed)
            .solve(
                AssignmentRequest::new(vec![vec![5, 15, 25], vec![15, 5, 25], vec![25, 25, 5]])
                    .with_priorities(Some(vec![1, 1, 2]), Some(vec![1, 1, 2])),
            )
            .expect("solve")
    }

    #[rstest]
    fn square_view_brackets_assigned_cells(scenario: AssignmentReport) {
        let square = ReportPresenter::build_square_table(&scenario);
        let lines: Vec<&str> = square.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[2].starts_with("R1"));
        assert!(lines[2].contains("[5]"));
        assert!(!lines[2].contains("[15]"));
        assert!(lines[4].contains("[5]"));
    }

    #[rstest]
    fn summary_names_objective_and_seed(scenario: AssignmentReport) {
        let summary = ReportPresenter::build_summary(&scenario);
        assert_eq!(
            summary,
            "minimum cost: 15\npriority: rows first, backend: dual, seed: 5\n"
        );
    }

    #[rstest]
    fn tier_table_lists_every_commit(scenario: AssignmentReport) {
        let tiers = ReportPresenter::build_tier_table(&scenario);
        assert_eq!(tiers.lines().count(), 2 + 4);
        assert!(tiers.contains("R1, R2"));
    }

    #[fixture]
    fn shifts() -> AssignmentReport {
        // Ann covers Mon, Bob and Cy each take one Wed replica.
        AssignmentProcessor::new(&NoParser, &Seed)
            .solve(
                AssignmentRequest::new(vec![vec![1, 9], vec![9, 2], vec![9, 3]])
                    .with_factors(vec![1, 1, 1], vec![1, 2])
                    .with_names(
                        vec!["Ann".into(), "Bob".into(), "Cy".into()],
                        vec!["Mon".into(), "Wed".into()],
                    ),
            )
            .expect("solve")
    }

    #[rstest]
    fn column_fold_aggregates_replicated_columns(shifts: AssignmentReport) {
        let table = ReportPresenter::build_column_fold_table(&shifts);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2 + 3 + 1);
        assert!(lines[0].contains("Mon"));
        assert!(lines[0].contains("Wed×2"));
        assert!(!lines[0].contains("Wed-1"));
        assert!(lines[2].starts_with("Ann"));
        assert!(lines[2].contains("[1]"));
        assert!(lines[3].contains("[2]"));
        assert!(lines[4].contains("[3]"));
        assert_eq!(shifts.folded.col_totals(), vec![1, 5]);
        assert!(lines[5].starts_with("total"));
        assert!(lines[5].ends_with('5'));
    }

    #[rstest]
    fn row_fold_keeps_expanded_columns_and_row_totals(shifts: AssignmentReport) {
        let table = ReportPresenter::build_row_fold_table(&shifts);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2 + 3);
        assert!(lines[0].contains("Wed-1"));
        assert!(lines[0].contains("Wed-2"));
        assert!(lines[0].trim_end().ends_with("total"));
        assert!(lines[2].starts_with("Ann"));
        assert_eq!(lines[2].matches('[').count(), 1);
        assert!(lines[3].starts_with("Bob"));
        assert_eq!(lines[3].matches("[2]").count(), 1);
        assert!(lines[3].ends_with('2'));
        assert!(lines[4].ends_with('3'));
    }

    #[test]
    fn row_fold_marks_every_replica_of_a_worker() {
        let report = AssignmentProcessor::new(&NoParser, &Seed)
            .solve(
                AssignmentRequest::new(vec![vec![1, 2, 9], vec![9, 9, 1]])
                    .with_factors(vec![2, 1], vec![1, 1, 1])
                    .with_names(
                        vec!["Ann".into(), "Bob".into()],
                        vec!["x".into(), "y".into(), "z".into()],
                    ),
            )
            .expect("solve");
        let table = ReportPresenter::build_row_fold_table(&report);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2 + 2);
        assert!(lines[2].starts_with("Ann×2"));
        assert!(lines[2].contains("[1]"));
        assert!(lines[2].contains("[2]"));
        assert!(lines[2].ends_with('3'));
        assert!(lines[3].contains("[1]"));
    }

    #[test]
    fn folded_view_shows_replicas_under_their_original_row() {
        let report = AssignmentProcessor::new(&NoParser, &Seed)
            .solve(
                AssignmentRequest::new(vec![vec![1, 2, 9], vec![9, 9, 1]])
                    .with_factors(vec![2, 1], vec![1, 1, 1])
                    .with_names(
                        vec!["Ann".into(), "Bob".into()],
                        vec!["x".into(), "y".into(), "z".into()],
                    ),
            )
            .expect("solve");
        let folded = ReportPresenter::build_folded_table(&report);
        let lines: Vec<&str> = folded.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[2].starts_with("Ann×2"));
        assert!(lines[3].starts_with(' '));
        assert!(lines[4].starts_with("Bob"));
        assert!(lines[4].contains('z'));

        let text = ReportPresenter::render(&report).to_text();
        assert!(text.contains("Ann-1"));
        assert!(text.contains("minimum cost: 4"));
    }
}
