//! Typed item metadata.
//!
//! Front matter is loosely typed on disk. It is normalized at load time into a
//! [`Metadata`] map whose values are a small closed set of variants, so guards
//! and templates never deal with raw YAML or TOML values.

use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike, Utc};

/// A single metadata value.
#[derive(Debug, Clone, PartialEq)]
pub enum MetaValue {
    /// Plain string.
    String(String),
    /// Boolean flag.
    Bool(bool),
    /// Integer number.
    Integer(i64),
    /// Point in time, normalized to UTC.
    Date(DateTime<Utc>),
    /// List of scalar values rendered as strings.
    List(Vec<String>),
}

impl MetaValue {
    /// Get the string value, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the boolean value, if this is a boolean.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the date value, if this is a date.
    #[must_use]
    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Convert a YAML value. Returns `None` for nulls and nested mappings.
    pub fn from_yaml(key: &str, value: &serde_yaml::Value) -> Option<Self> {
        use serde_yaml::Value;

        match value {
            Value::Null | Value::Mapping(_) => None,
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Number(n) => Some(
                n.as_i64()
                    .map_or_else(|| Self::String(n.to_string()), Self::Integer),
            ),
            Value::String(s) => Some(Self::from_string(key, s)),
            Value::Sequence(items) => Some(Self::List(
                items.iter().filter_map(yaml_scalar_to_string).collect(),
            )),
            Value::Tagged(tagged) => Self::from_yaml(key, &tagged.value),
        }
    }

    /// Convert a TOML value. Returns `None` for nested tables.
    pub fn from_toml(key: &str, value: &toml::Value) -> Option<Self> {
        use toml::Value;

        match value {
            Value::Table(_) => None,
            Value::Boolean(b) => Some(Self::Bool(*b)),
            Value::Integer(i) => Some(Self::Integer(*i)),
            Value::Float(f) => Some(Self::String(f.to_string())),
            Value::String(s) => Some(Self::from_string(key, s)),
            Value::Datetime(dt) => {
                let raw = dt.to_string();
                Some(parse_date(&raw).map_or(Self::String(raw), Self::Date))
            }
            Value::Array(items) => Some(Self::List(
                items
                    .iter()
                    .filter_map(|v| match v {
                        Value::String(s) => Some(s.clone()),
                        Value::Table(_) | Value::Array(_) => None,
                        other => Some(other.to_string()),
                    })
                    .collect(),
            )),
        }
    }

    /// Strings under date-like keys are parsed as dates when possible.
    fn from_string(key: &str, value: &str) -> Self {
        if is_date_key(key)
            && let Some(date) = parse_date(value)
        {
            return Self::Date(date);
        }
        Self::String(value.to_string())
    }
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Date(d) if d.num_seconds_from_midnight() == 0 => {
                write!(f, "{}", d.format("%Y-%m-%d"))
            }
            Self::Date(d) => f.write_str(&d.to_rfc3339()),
            Self::List(items) => f.write_str(&items.join(", ")),
        }
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for MetaValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for MetaValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<DateTime<Utc>> for MetaValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Date(value)
    }
}

/// Metadata attached to a content item.
///
/// Missing keys are simply absent: lookups return `None` and never fail.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    values: BTreeMap<String, MetaValue>,
}

impl Metadata {
    /// Create an empty metadata map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<MetaValue>) {
        self.values.insert(key.into(), value.into());
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<MetaValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Get a raw value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.values.get(key)
    }

    /// Get a string value.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(MetaValue::as_str)
    }

    /// Get a boolean value.
    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(MetaValue::as_bool)
    }

    /// Get a date value.
    #[must_use]
    pub fn get_date(&self, key: &str) -> Option<DateTime<Utc>> {
        self.get(key).and_then(MetaValue::as_date)
    }

    /// Check whether a key is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Iterate over all entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetaValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The `status` field.
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.get_str("status")
    }

    /// The `kind` field.
    #[must_use]
    pub fn kind(&self) -> Option<&str> {
        self.get_str("kind")
    }

    /// The `title` field.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.get_str("title")
    }

    /// The `created_at` field.
    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.get_date("created_at")
    }

    /// Whether the item is marked as a draft. Items without a status are published.
    #[must_use]
    pub fn is_draft(&self) -> bool {
        self.status() == Some("draft")
    }

    /// Build metadata from a YAML mapping.
    pub fn from_yaml(mapping: &serde_yaml::Mapping) -> Self {
        mapping
            .iter()
            .filter_map(|(k, v)| {
                let key = k.as_str()?;
                MetaValue::from_yaml(key, v).map(|value| (key.to_string(), value))
            })
            .collect()
    }

    /// Build metadata from a TOML table.
    pub fn from_toml(table: &toml::Table) -> Self {
        table
            .iter()
            .filter_map(|(k, v)| MetaValue::from_toml(k, v).map(|value| (k.clone(), value)))
            .collect()
    }
}

impl FromIterator<(String, MetaValue)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (String, MetaValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Keys whose string values are interpreted as dates.
fn is_date_key(key: &str) -> bool {
    key == "date" || key == "updated" || key.ends_with("_at")
}

fn yaml_scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    use serde_yaml::Value;

    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parse the date formats commonly found in blog front matter.
pub fn parse_date(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S %z") {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|n| n.and_utc())
}
