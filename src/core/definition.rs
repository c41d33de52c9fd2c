//! Environment definition loading
//!
//! Definitions are YAML documents describing an environment. The client
//! only needs the `project` and `name` keys to address the API; the whole
//! document is forwarded to the server as JSON.

use std::fs;
use std::path::Path;

use crate::error::DefinitionError;

/// A loaded environment definition
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    pub project: String,
    pub name: String,
    /// Full document, converted for the API
    pub body: serde_json::Value,
}

impl Definition {
    /// Read and parse a definition file
    pub fn load(path: &Path) -> Result<Self, DefinitionError> {
        let content = fs::read_to_string(path).map_err(|e| DefinitionError::Read {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
        Self::parse(path, &content)
    }

    /// Parse definition text; `path` is only used in errors
    pub fn parse(path: &Path, content: &str) -> Result<Self, DefinitionError> {
        let body: serde_json::Value =
            serde_yaml::from_str(content).map_err(|e| DefinitionError::Parse {
                path: path.to_path_buf(),
                error: e.to_string(),
            })?;

        let field = |name: &str| {
            body.get(name)
                .and_then(serde_json::Value::as_str)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or_else(|| DefinitionError::MissingField {
                    path: path.to_path_buf(),
                    field: name.to_string(),
                })
        };

        Ok(Self {
            project: field("project")?,
            name: field("name")?,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DEFINITION: &str = r#"
name: my-env
project: my-project
networks:
  - name: web
    subnet: 10.1.0.0/24
instances:
  - name: web
    count: 2
"#;

    #[test]
    fn test_parse_definition() {
        let def = Definition::parse(Path::new("env.yml"), DEFINITION).unwrap();
        assert_eq!(def.project, "my-project");
        assert_eq!(def.name, "my-env");
        assert_eq!(def.body["instances"][0]["count"], 2);
    }

    #[test]
    fn test_missing_project() {
        let result = Definition::parse(Path::new("env.yml"), "name: my-env\n");
        match result {
            Err(DefinitionError::MissingField { field, .. }) => assert_eq!(field, "project"),
            other => panic!("Expected MissingField, got: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_yaml() {
        let result = Definition::parse(Path::new("env.yml"), "name: [unclosed");
        assert!(matches!(result, Err(DefinitionError::Parse { .. })));
    }

    #[test]
    fn test_load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("env.yml");
        std::fs::write(&path, DEFINITION).unwrap();
        assert_eq!(Definition::load(&path).unwrap().name, "my-env");
    }

    #[test]
    fn test_load_missing_file() {
        let result = Definition::load(Path::new("/nonexistent/env.yml"));
        assert!(matches!(result, Err(DefinitionError::Read { .. })));
    }
}
