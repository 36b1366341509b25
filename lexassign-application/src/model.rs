use lexassign_domain::{
    Assignment, AxisPriorities, FoldedAllocation, Matrix, MatrixKind, PriorityMode,
    ReplicationPlan,
};
use lexassign_solver::TierCommit;

/// Raw solve input, validated by the processor before any solving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentRequest {
    pub matrix: Vec<Vec<u64>>,
    pub row_factors: Vec<usize>,
    pub col_factors: Vec<usize>,
    pub row_priorities: Option<Vec<u32>>,
    pub col_priorities: Option<Vec<u32>>,
    pub row_names: Option<Vec<String>>,
    pub col_names: Option<Vec<String>>,
    /// `0` cost, `1` profit.
    pub matrix_type: u8,
    /// `0` row priority first, `1` column priority first.
    pub priority_mode: u8,
}

impl AssignmentRequest {
    /// Cost matrix with every factor 1 and derived priorities.
    pub fn new(matrix: Vec<Vec<u64>>) -> Self {
        let row_factors = vec![1; matrix.len()];
        let col_factors = vec![1; matrix.first().map_or(0, Vec::len)];
        Self {
            matrix,
            row_factors,
            col_factors,
            row_priorities: None,
            col_priorities: None,
            row_names: None,
            col_names: None,
            matrix_type: MatrixKind::Cost.code(),
            priority_mode: PriorityMode::RowFirst.flag(),
        }
    }

    pub fn with_factors(mut self, row_factors: Vec<usize>, col_factors: Vec<usize>) -> Self {
        self.row_factors = row_factors;
        self.col_factors = col_factors;
        self
    }

    pub fn with_priorities(mut self, rows: Option<Vec<u32>>, cols: Option<Vec<u32>>) -> Self {
        self.row_priorities = rows;
        self.col_priorities = cols;
        self
    }

    pub fn with_names(mut self, rows: Vec<String>, cols: Vec<String>) -> Self {
        self.row_names = Some(rows);
        self.col_names = Some(cols);
        self
    }

    pub fn with_kind(mut self, kind: MatrixKind) -> Self {
        self.matrix_type = kind.code();
        self
    }

    pub fn with_mode(mut self, mode: PriorityMode) -> Self {
        self.priority_mode = mode.flag();
        self
    }
}

/// Table as read from pasted text: values, names, and replication factors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTable {
    pub matrix: Vec<Vec<u64>>,
    pub row_names: Vec<String>,
    pub col_names: Vec<String>,
    pub row_factors: Vec<usize>,
    pub col_factors: Vec<usize>,
}

impl ParsedTable {
    pub fn into_request(self, kind: MatrixKind, mode: PriorityMode) -> AssignmentRequest {
        AssignmentRequest::new(self.matrix)
            .with_factors(self.row_factors, self.col_factors)
            .with_names(self.row_names, self.col_names)
            .with_kind(kind)
            .with_mode(mode)
    }
}

/// Tier backend used by the refinement stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefinementBackend {
    #[default]
    DualTightening,
    Milp,
}

impl RefinementBackend {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "dual" | "dual-tightening" | "hungarian" => Some(Self::DualTightening),
            "milp" | "lp" => Some(Self::Milp),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::DualTightening => "dual",
            Self::Milp => "milp",
        }
    }
}

/// Display names for both views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLabels {
    /// One per expanded row, replicas suffixed with their ordinal.
    pub rows: Vec<String>,
    pub cols: Vec<String>,
    /// One per original row, replicated rows carrying a fold marker.
    pub folded_rows: Vec<String>,
    pub folded_cols: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentReport {
    /// Expanded square value matrix.
    pub expanded: Matrix<u64>,
    /// Zero exactly at the returned assignment.
    pub marker: Matrix<u8>,
    /// Zero wherever some optimal matching may assign.
    pub candidates: Matrix<i64>,
    pub assignments: Vec<Assignment>,
    /// `(original_row, original_col)` for every expanded assignment.
    pub pairs: Vec<(usize, usize)>,
    pub folded: FoldedAllocation,
    pub total: u64,
    pub replication: ReplicationPlan,
    pub labels: ReportLabels,
    /// Resolved priorities on original indices.
    pub priorities: AxisPriorities,
    /// Committed tier sums on expanded indices, in processing order.
    pub tiers: Vec<TierCommit>,
    pub kind: MatrixKind,
    pub mode: PriorityMode,
    pub backend: RefinementBackend,
    /// Reusing it reproduces this report.
    pub seed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("dual", Some(RefinementBackend::DualTightening))]
    #[case(" MILP ", Some(RefinementBackend::Milp))]
    #[case("simplex", None)]
    fn backend_names(#[case] name: &str, #[case] expected: Option<RefinementBackend>) {
        assert_eq!(RefinementBackend::from_name(name), expected);
    }

    #[test]
    fn parsed_table_keeps_factors_and_names() {
        let table = ParsedTable {
            matrix: vec![vec![1, 2], vec![3, 4]],
            row_names: vec!["a".into(), "b".into()],
            col_names: vec!["x".into(), "y".into()],
            row_factors: vec![1, 1],
            col_factors: vec![1, 1],
        };
        let request = table.into_request(MatrixKind::Profit, PriorityMode::ColumnFirst);
        assert_eq!(request.matrix_type, 1);
        assert_eq!(request.priority_mode, 1);
        assert_eq!(request.col_names.as_deref(), Some(&["x".to_string(), "y".to_string()][..]));
        assert!(request.row_priorities.is_none());
    }
}
