//! Loading and validation of the auth and run files.
//!
//! Both files are JSON mappings. They are validated from a raw
//! [`serde_json::Value`] rather than through `Deserialize` so the errors can
//! point at the exact field or list index that is wrong.

use crate::error::{ConfigError, SchemaViolation};
use crate::types::{Credentials, RunSettings, WatchList};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::debug;

pub const DEFAULT_AUTH_FILE: &str = "auth.conf";
pub const DEFAULT_RUN_FILE: &str = "run.conf";

pub const WATCH_LIST_FIELD: &str = "comments_detect_users";
const SKIP_EXISTING_FIELD: &str = "skip_existing";
const CONTINUE_ON_DELIVERY_ERROR_FIELD: &str = "continue_on_delivery_error";

pub fn load_credentials(path: impl AsRef<Path>) -> Result<Credentials, ConfigError> {
    let path = path.as_ref();
    let root = read_mapping(path)?;
    let field = |name: &str| required_string(&root, name).map_err(|v| schema(path, v));

    let credentials = Credentials {
        user_agent: field("user_agent")?,
        client_id: field("client_id")?,
        client_secret: field("client_secret")?,
        username: field("username")?,
        password: field("password")?,
        subreddit: field("subreddit")?,
    };

    debug!("Loaded credentials from {}: {:?}", path.display(), credentials);
    Ok(credentials)
}

pub fn load_run_settings(path: impl AsRef<Path>) -> Result<RunSettings, ConfigError> {
    let path = path.as_ref();
    let root = read_mapping(path)?;

    let watch_list = watch_list_from(&root).map_err(|v| schema(path, v))?;
    let skip_existing =
        optional_bool(&root, SKIP_EXISTING_FIELD).map_err(|v| schema(path, v))?;
    let continue_on_delivery_error =
        optional_bool(&root, CONTINUE_ON_DELIVERY_ERROR_FIELD).map_err(|v| schema(path, v))?;

    debug!(
        "Loaded {} watched users from {}",
        watch_list.len(),
        path.display()
    );

    Ok(RunSettings {
        watch_list,
        skip_existing,
        continue_on_delivery_error,
    })
}

pub fn load_watch_list(path: impl AsRef<Path>) -> Result<WatchList, ConfigError> {
    load_run_settings(path).map(|settings| settings.watch_list)
}

fn read_mapping(path: &Path) -> Result<Map<String, Value>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let document: Value =
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    match document {
        Value::Object(map) => Ok(map),
        _ => Err(schema(path, SchemaViolation::RootNotMapping)),
    }
}

fn schema(path: &Path, violation: SchemaViolation) -> ConfigError {
    ConfigError::Schema {
        path: path.to_path_buf(),
        violation,
    }
}

fn required_string(root: &Map<String, Value>, field: &str) -> Result<String, SchemaViolation> {
    match root.get(field) {
        None | Some(Value::Null) => Err(SchemaViolation::MissingField {
            field: field.to_string(),
        }),
        Some(Value::String(s)) if s.is_empty() => Err(SchemaViolation::EmptyValue {
            field: field.to_string(),
        }),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(SchemaViolation::WrongType {
            field: field.to_string(),
            expected: "string",
        }),
    }
}

fn optional_bool(root: &Map<String, Value>, field: &str) -> Result<bool, SchemaViolation> {
    match root.get(field) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(SchemaViolation::WrongType {
            field: field.to_string(),
            expected: "boolean",
        }),
    }
}

fn watch_list_from(root: &Map<String, Value>) -> Result<WatchList, SchemaViolation> {
    let entries = match root.get(WATCH_LIST_FIELD) {
        None | Some(Value::Null) => {
            return Err(SchemaViolation::MissingField {
                field: WATCH_LIST_FIELD.to_string(),
            })
        }
        Some(Value::Array(entries)) => entries,
        Some(_) => {
            return Err(SchemaViolation::WrongType {
                field: WATCH_LIST_FIELD.to_string(),
                expected: "list of user names",
            })
        }
    };

    let invalid = |index: usize, reason: &str| SchemaViolation::InvalidEntry {
        field: WATCH_LIST_FIELD.to_string(),
        index,
        reason: reason.to_string(),
    };

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| match entry {
            Value::String(name) if name.is_empty() => Err(invalid(index, "empty user name")),
            Value::String(name) => Ok(name.clone()),
            _ => Err(invalid(index, "expected a string")),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(WatchList::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mapping(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test fixture must be an object"),
        }
    }

    #[test]
    fn test_required_string_classification() {
        let root = mapping(json!({
            "present": "value",
            "empty": "",
            "number": 7,
            "null": null,
        }));

        assert_eq!(required_string(&root, "present").unwrap(), "value");
        assert!(matches!(
            required_string(&root, "empty"),
            Err(SchemaViolation::EmptyValue { .. })
        ));
        assert!(matches!(
            required_string(&root, "number"),
            Err(SchemaViolation::WrongType { expected: "string", .. })
        ));
        assert!(matches!(
            required_string(&root, "null"),
            Err(SchemaViolation::MissingField { .. })
        ));
        assert!(matches!(
            required_string(&root, "absent"),
            Err(SchemaViolation::MissingField { .. })
        ));
    }

    #[test]
    fn test_watch_list_reports_first_bad_index() {
        let root = mapping(json!({ "comments_detect_users": ["alice", "", 3] }));
        assert_eq!(
            watch_list_from(&root),
            Err(SchemaViolation::InvalidEntry {
                field: WATCH_LIST_FIELD.to_string(),
                index: 1,
                reason: "empty user name".to_string(),
            })
        );
    }

    #[test]
    fn test_optional_flags_default_to_false() {
        let root = mapping(json!({ "skip_existing": true }));
        assert!(optional_bool(&root, SKIP_EXISTING_FIELD).unwrap());
        assert!(!optional_bool(&root, CONTINUE_ON_DELIVERY_ERROR_FIELD).unwrap());

        let root = mapping(json!({ "skip_existing": "yes" }));
        assert!(optional_bool(&root, SKIP_EXISTING_FIELD).is_err());
    }
}
