//! Schema validation for untrusted JSON.
//!
//! Shapes implement [`Schema`] by reading fields through an [`ObjectParser`],
//! which records one issue per violated constraint and keeps going, so a
//! single pass reports every bad field. Malformed input is an `Err` value,
//! never a panic.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::errors::ValidationErrors;

/// A shape that can be validated out of an arbitrary decoded JSON value.
pub trait Schema: Sized {
    /// Validate `value`, reporting issue paths relative to `path`.
    fn parse_at(value: &Value, path: &str) -> Result<Self, ValidationErrors>;

    fn parse(value: &Value) -> Result<Self, ValidationErrors> {
        Self::parse_at(value, "")
    }
}

/// Validate every element of a JSON array independently.
///
/// Fails as a whole only when `value` is not an array; otherwise each element
/// carries its own result.
pub fn parse_each<T: Schema>(value: &Value) -> Result<Vec<Result<T, ValidationErrors>>, ValidationErrors> {
    match value {
        Value::Array(items) => Ok(items.iter().map(T::parse).collect()),
        other => Err(ValidationErrors::single("", format!("Expected array, received {}", type_name(other)))),
    }
}

pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Field reader over one JSON object.
///
/// Every accessor returns `None` exactly when it recorded an issue, so once
/// [`ObjectParser::is_clean`] holds all previously read values are `Some`.
pub struct ObjectParser<'a> {
    base: &'a str,
    obj: &'a Map<String, Value>,
    errors: ValidationErrors,
}

impl<'a> ObjectParser<'a> {
    pub fn new(value: &'a Value, base: &'a str) -> Result<Self, ValidationErrors> {
        match value {
            Value::Object(obj) => Ok(Self { base, obj, errors: ValidationErrors::default() }),
            other => Err(ValidationErrors::single(base, format!("Expected object, received {}", type_name(other)))),
        }
    }

    fn path(&self, key: &str) -> String {
        if self.base.is_empty() { key.to_string() } else { format!("{}.{}", self.base, key) }
    }

    fn fail<T>(&mut self, key: &str, message: impl Into<String>) -> Option<T> {
        let path = self.path(key);
        self.errors.push(path, message);
        None
    }

    fn required(&mut self, key: &str) -> Option<&'a Value> {
        match self.obj.get(key) {
            Some(v) => Some(v),
            None => self.fail(key, "Required"),
        }
    }

    pub fn string(&mut self, key: &str) -> Option<&'a str> {
        match self.required(key)? {
            Value::String(s) => Some(s.as_str()),
            other => self.fail(key, format!("Expected string, received {}", type_name(other))),
        }
    }

    /// Trimmed string whose length in characters lies within `min..=max`.
    pub fn trimmed(&mut self, key: &str, min: usize, max: Option<usize>) -> Option<String> {
        let trimmed = self.string(key)?.trim();
        let len = trimmed.chars().count();
        if len < min {
            return self.fail(key, format!("String must contain at least {min} character(s)"));
        }
        if let Some(max) = max {
            if len > max {
                return self.fail(key, format!("String must contain at most {max} character(s)"));
            }
        }
        Some(trimmed.to_string())
    }

    /// Like [`ObjectParser::trimmed`] but returns the string untouched; used
    /// for stored shapes, which must read back exactly as written.
    pub fn text(&mut self, key: &str, min: usize, max: Option<usize>) -> Option<String> {
        let raw = self.string(key)?;
        self.trimmed(key, min, max)?;
        Some(raw.to_string())
    }

    pub fn non_empty(&mut self, key: &str) -> Option<String> {
        let s = self.string(key)?;
        if s.is_empty() {
            return self.fail(key, "String must contain at least 1 character(s)");
        }
        Some(s.to_string())
    }

    pub fn boolean(&mut self, key: &str) -> Option<bool> {
        match self.required(key)? {
            Value::Bool(b) => Some(*b),
            other => self.fail(key, format!("Expected boolean, received {}", type_name(other))),
        }
    }

    /// Canonical hyphenated UUID.
    pub fn uuid(&mut self, key: &str) -> Option<Uuid> {
        let s = self.string(key)?;
        match Uuid::try_parse(s) {
            Ok(id) if s.len() == 36 => Some(id),
            _ => self.fail(key, "Invalid uuid"),
        }
    }

    /// RFC 3339 timestamp in UTC (`Z` designator).
    pub fn timestamp(&mut self, key: &str) -> Option<DateTime<Utc>> {
        let s = self.string(key)?;
        match DateTime::parse_from_rfc3339(s) {
            Ok(dt) if s.ends_with('Z') => Some(dt.with_timezone(&Utc)),
            _ => self.fail(key, "Invalid datetime"),
        }
    }

    pub fn non_negative_int(&mut self, key: &str) -> Option<u64> {
        let n = match self.required(key)? {
            Value::Number(n) => n,
            other => return self.fail(key, format!("Expected number, received {}", type_name(other))),
        };
        if let Some(v) = n.as_u64() {
            return Some(v);
        }
        if n.as_i64().is_some() {
            return self.fail(key, "Number must be greater than or equal to 0");
        }
        match n.as_f64() {
            Some(f) if f.fract() != 0.0 || !f.is_finite() => self.fail(key, "Expected integer, received float"),
            Some(f) if f < 0.0 => self.fail(key, "Number must be greater than or equal to 0"),
            Some(f) if f <= u64::MAX as f64 => Some(f as u64),
            _ => self.fail(key, "Number must be less than or equal to 18446744073709551615"),
        }
    }

    /// Optional `string -> any` mapping. `Some(None)` when absent.
    pub fn optional_map(&mut self, key: &str) -> Option<Option<Map<String, Value>>> {
        match self.obj.get(key) {
            None => Some(None),
            Some(Value::Object(map)) => Some(Some(map.clone())),
            Some(other) => self.fail(key, format!("Expected object, received {}", type_name(other))),
        }
    }

    /// Unconstrained value; absent stays `None`.
    pub fn any(&self, key: &str) -> Option<Value> {
        self.obj.get(key).cloned()
    }

    pub fn nested<T: Schema>(&mut self, key: &str) -> Option<T> {
        let value = self.required(key)?;
        let path = self.path(key);
        match T::parse_at(value, &path) {
            Ok(v) => Some(v),
            Err(e) => {
                self.errors.issues.extend(e.issues);
                None
            }
        }
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_errors(self) -> ValidationErrors {
        self.errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Pair {
        name: String,
        count: u64,
    }

    impl Schema for Pair {
        fn parse_at(value: &Value, path: &str) -> Result<Self, ValidationErrors> {
            let mut p = ObjectParser::new(value, path)?;
            let name = p.trimmed("name", 2, Some(4));
            let count = p.non_negative_int("count");
            match (name, count) {
                (Some(name), Some(count)) if p.is_clean() => Ok(Pair { name, count }),
                _ => Err(p.into_errors()),
            }
        }
    }

    #[test]
    fn reports_every_bad_field() {
        let err = Pair::parse(&json!({"name": 5, "count": -1})).err().unwrap();
        assert_eq!(err.issues.len(), 2);
        assert_eq!(err.issues[0].path, "name");
        assert_eq!(err.issues[0].message, "Expected string, received number");
        assert_eq!(err.issues[1].path, "count");
        assert_eq!(err.issues[1].message, "Number must be greater than or equal to 0");
    }

    #[test]
    fn trims_before_measuring() {
        let ok = Pair::parse(&json!({"name": "  abc  ", "count": 3})).unwrap();
        assert_eq!(ok.name, "abc");
        assert_eq!(ok.count, 3);
        assert!(Pair::parse(&json!({"name": "   a   ", "count": 3})).is_err());
        assert!(Pair::parse(&json!({"name": "abcde", "count": 3})).is_err());
    }

    #[test]
    fn integers_reject_fractions_but_accept_whole_floats() {
        assert!(Pair::parse(&json!({"name": "ab", "count": 1.5})).is_err());
        assert_eq!(Pair::parse(&json!({"name": "ab", "count": 2.0})).unwrap().count, 2);
    }

    #[test]
    fn non_object_fails_at_root() {
        let err = Pair::parse(&json!([1, 2])).err().unwrap();
        assert_eq!(err.issues[0].path, "");
        assert_eq!(err.issues[0].message, "Expected object, received array");
    }

    #[test]
    fn parse_each_isolates_elements() {
        let results = parse_each::<Pair>(&json!([
            {"name": "ok", "count": 1},
            {"name": "x"},
            "junk"
        ]))
        .unwrap();
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_err());

        assert!(parse_each::<Pair>(&json!({"name": "ok"})).is_err());
    }

    #[test]
    fn uuid_and_timestamp_formats() {
        let v = json!({
            "a": "0f8fad5b-d9cb-469f-a165-70867728950e",
            "b": "0f8fad5bd9cb469fa16570867728950e",
            "c": "2025-03-01T10:00:00.000Z",
            "d": "2025-03-01T10:00:00+02:00",
            "e": "yesterday"
        });
        let mut p = ObjectParser::new(&v, "").unwrap();
        assert!(p.uuid("a").is_some());
        assert!(p.uuid("b").is_none());
        assert!(p.timestamp("c").is_some());
        assert!(p.timestamp("d").is_none());
        assert!(p.timestamp("e").is_none());
        assert_eq!(p.into_errors().issues.len(), 3);
    }
}
