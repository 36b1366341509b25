#![warn(clippy::uninlined_format_args)]

pub mod model;
pub mod services;

pub use model::{
    Assignment, Axis, ExpandedIndex, FoldedAssignment, MAX_CELL_VALUE, Matrix, MatrixError,
    MatrixKind, PriorityMode,
};
pub use services::{
    AssignmentPlan, AssignmentPlanner, AxisLayout, AxisPriorities, ExpansionError,
    FoldedAllocation, MAX_EXPANDED_SIZE, PlanInput, PlanningError, PriorityRanking, RankingError,
    ReplicationPlan,
};
