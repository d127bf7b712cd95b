//! Run and check queries against a JSON data set

use serde_json::Value as JsonValue;
use tracing::debug;

use super::CliError;
use crate::{
    error::QueryError,
    evaluator::Evaluator,
    parser::parse_query,
    store::{InMemorySource, JsonStore},
};

/// Options for the run command
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// The query to execute
    pub query: String,
    /// JSON data set: an object of named collections
    pub data: Option<String>,
    /// Path used to match KEYS; `$.id` when not given
    pub key_path: Option<String>,
}

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The query to validate
    pub query: String,
}

/// Execute a query and return its rows as a JSON array.
///
/// Without a data set only FROM-less queries can succeed.
pub fn execute_run(options: &RunOptions) -> Result<JsonValue, CliError> {
    let mut source = match &options.data {
        Some(data) => InMemorySource::from_json(serde_json::from_str(data)?)?,
        None => InMemorySource::new(),
    };
    if let Some(key_path) = &options.key_path {
        source = source.with_key_path(key_path)?;
    }

    let store = JsonStore::new(source);
    let rows = Evaluator::new(&store)
        .run(&options.query)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(QueryError::from)?;
    debug!(rows = rows.len(), "query finished");

    Ok(JsonValue::Array(rows))
}

/// Validate a query's syntax and return its normalized text.
pub fn execute_check(options: &CheckOptions) -> Result<String, CliError> {
    let query = parse_query(&options.query)?;
    Ok(query.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_run_against_data() {
        let options = RunOptions {
            query: "SELECT $.name FROM people KEYS 'b'".to_string(),
            data: Some(r#"{ "people": [{ "id": "a", "name": "Ann" }, { "id": "b", "name": "Bob" }] }"#.to_string()),
            key_path: None,
        };
        assert_eq!(execute_run(&options).unwrap(), json!([{ "name": "Bob" }]));
    }

    #[test]
    fn test_run_with_key_path() {
        let options = RunOptions {
            query: "SELECT $.name FROM people KEYS 'x2'".to_string(),
            data: Some(r#"{ "people": [{ "code": "x1", "name": "Ann" }, { "code": "x2", "name": "Bob" }] }"#.to_string()),
            key_path: Some("$.code".to_string()),
        };
        assert_eq!(execute_run(&options).unwrap(), json!([{ "name": "Bob" }]));
    }

    #[test]
    fn test_run_without_data() {
        let options = RunOptions {
            query: "SELECT upper('abc') AS up".to_string(),
            ..Default::default()
        };
        assert_eq!(execute_run(&options).unwrap(), json!([{ "up": "ABC" }]));

        let options = RunOptions {
            query: "SELECT $.name FROM people".to_string(),
            ..Default::default()
        };
        assert!(matches!(execute_run(&options), Err(CliError::Query(_))));
    }

    #[test]
    fn test_check_normalizes() {
        let options = CheckOptions {
            query: "select $.name from people where $.age>18 or(1=1) -- adults\n".to_string(),
        };
        assert_eq!(
            execute_check(&options).unwrap(),
            "SELECT $.name FROM people WHERE ($.age > 18 OR 1 = 1)"
        );
    }

    #[test]
    fn test_check_rejects() {
        let options = CheckOptions {
            query: "SELECT $.name FROM people WHERE".to_string(),
        };
        assert!(matches!(execute_check(&options), Err(CliError::Query(_))));
    }
}
