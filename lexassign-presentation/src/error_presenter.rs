use lexassign_application::AssignmentError;

pub fn format_assignment_error(error: &AssignmentError) -> String {
    match error {
        AssignmentError::DimensionMismatch {
            row_total,
            col_total,
        } => format!(
            "Replicated rows ({row_total}) and replicated columns ({col_total}) must add up to the same count."
        ),
        AssignmentError::InvalidReplicationFactor {
            axis,
            index,
            factor,
        } => format!(
            "The {axis} at position {} has replication factor {factor}; factors start at 1.",
            index + 1
        ),
        AssignmentError::MalformedInput(detail) => format!("Invalid input: {detail}"),
        AssignmentError::Infeasible(detail) => {
            format!("Internal solver error (please report it): {detail}")
        }
    }
}
