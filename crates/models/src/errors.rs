use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("database error: {0}")]
    Db(String),
}

/// One violated constraint. `path` is dot-separated from the validated root
/// (`proof.blueprintSlug`); an empty path means the root value itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub path: String,
    pub message: String,
}

/// Every constraint a value violated, in field order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Error)]
pub struct ValidationErrors {
    pub issues: Vec<Issue>,
}

/// Issues grouped by top-level field, the shape returned to HTTP clients.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlattenedErrors {
    pub form_errors: Vec<String>,
    pub field_errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn single(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { issues: vec![Issue { path: path.into(), message: message.into() }] }
    }

    pub fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.issues.push(Issue { path: path.into(), message: message.into() });
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Names of the top-level fields with at least one issue.
    pub fn fields(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for issue in &self.issues {
            let head = top_level(&issue.path);
            if !head.is_empty() && !out.contains(&head) {
                out.push(head);
            }
        }
        out
    }

    pub fn flatten(&self) -> FlattenedErrors {
        let mut flat = FlattenedErrors::default();
        for issue in &self.issues {
            let head = top_level(&issue.path);
            if head.is_empty() {
                flat.form_errors.push(issue.message.clone());
            } else {
                flat.field_errors.entry(head.to_string()).or_default().push(issue.message.clone());
            }
        }
        flat
    }
}

fn top_level(path: &str) -> &str {
    path.split('.').next().unwrap_or_default()
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for issue in &self.issues {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            if issue.path.is_empty() {
                write!(f, "{}", issue.message)?;
            } else {
                write!(f, "{}: {}", issue.path, issue.message)?;
            }
        }
        Ok(())
    }
}
