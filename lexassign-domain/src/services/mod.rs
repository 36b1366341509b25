pub mod assignment_planner;
pub mod expansion;
pub mod priority_ranking;

pub use assignment_planner::{AssignmentPlan, AssignmentPlanner, PlanInput, PlanningError};
pub use expansion::{
    AxisLayout, ExpansionError, FoldedAllocation, MAX_EXPANDED_SIZE, ReplicationPlan,
};
pub use priority_ranking::{
    AxisPriorities, PriorityRanking, RankDirection, RankingError, competition_rank,
};
