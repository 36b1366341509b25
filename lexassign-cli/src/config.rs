use lexassign_application::RefinementBackend;
use lexassign_domain::{MatrixKind, PriorityMode};
use std::env;

pub const MATRIX_TYPE_VAR: &str = "LEXASSIGN_MATRIX_TYPE";
pub const PRIORITY_VAR: &str = "LEXASSIGN_PRIORITY";
pub const SEED_VAR: &str = "LEXASSIGN_SEED";
pub const BACKEND_VAR: &str = "LEXASSIGN_BACKEND";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{key}={value} is invalid, expected {expected}")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub expected: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppConfig {
    pub kind: MatrixKind,
    pub mode: PriorityMode,
    /// Fixed relabeling seed; a fresh one is drawn per run when absent.
    pub seed: Option<u64>,
    pub backend: RefinementBackend,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let kind = read(&lookup, MATRIX_TYPE_VAR, "cost, profit, 0 or 1", parse_kind)?
            .unwrap_or_default();
        let mode = read(&lookup, PRIORITY_VAR, "row, column, 0 or 1", parse_mode)?
            .unwrap_or(PriorityMode::RowFirst);
        let seed = read(&lookup, SEED_VAR, "an unsigned 64-bit integer", |value| {
            value.parse().ok()
        })?;
        let backend = read(&lookup, BACKEND_VAR, "dual or milp", RefinementBackend::from_name)?
            .unwrap_or_default();

        Ok(Self {
            kind,
            mode,
            seed,
            backend,
        })
    }
}

fn read<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    expected: &'static str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Option<T>, ConfigError> {
    let Some(value) = lookup(key).filter(|value| !value.trim().is_empty()) else {
        return Ok(None);
    };
    match parse(value.trim()) {
        Some(parsed) => Ok(Some(parsed)),
        None => Err(ConfigError {
            key,
            value,
            expected,
        }),
    }
}

fn parse_kind(value: &str) -> Option<MatrixKind> {
    match value.to_ascii_lowercase().as_str() {
        "cost" => Some(MatrixKind::Cost),
        "profit" => Some(MatrixKind::Profit),
        code => code.parse().ok().and_then(MatrixKind::from_code),
    }
}

fn parse_mode(value: &str) -> Option<PriorityMode> {
    match value.to_ascii_lowercase().as_str() {
        "row" | "rows" => Some(PriorityMode::RowFirst),
        "column" | "columns" | "col" => Some(PriorityMode::ColumnFirst),
        code => code.parse().ok().and_then(PriorityMode::from_flag),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_variables() {
        assert_eq!(
            config(&[]),
            Ok(AppConfig {
                kind: MatrixKind::Cost,
                mode: PriorityMode::RowFirst,
                seed: None,
                backend: RefinementBackend::DualTightening,
            })
        );
    }

    #[rstest]
    #[case::names(&[(MATRIX_TYPE_VAR, "Profit"), (PRIORITY_VAR, "column")])]
    #[case::codes(&[(MATRIX_TYPE_VAR, "1"), (PRIORITY_VAR, " 1 ")])]
    fn names_and_codes_are_equivalent(#[case] vars: &[(&str, &str)]) {
        let config = config(vars).expect("valid");
        assert_eq!(config.kind, MatrixKind::Profit);
        assert_eq!(config.mode, PriorityMode::ColumnFirst);
    }

    #[test]
    fn seed_and_backend_are_read() {
        let config = config(&[(SEED_VAR, "42"), (BACKEND_VAR, "milp")]).expect("valid");
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.backend, RefinementBackend::Milp);
    }

    #[rstest]
    #[case(MATRIX_TYPE_VAR, "2")]
    #[case(PRIORITY_VAR, "diagonal")]
    #[case(SEED_VAR, "-1")]
    #[case(BACKEND_VAR, "simplex")]
    fn invalid_values_name_their_variable(#[case] key: &'static str, #[case] value: &str) {
        let err = config(&[(key, value)]).expect_err("invalid");
        assert_eq!(err.key, key);
        assert_eq!(err.value, value);
    }
}
