//! Typed QSO record and field value types.

use chrono::{NaiveDate, NaiveTime};
use hashbrown::HashMap;
use serde::{Serialize, Serializer};

/// Field values as they were read, before coercion.
pub type RawRecord = HashMap<String, String>;

/// A single coerced field value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Calendar date from a `*_date` field.
    Date(NaiveDate),
    /// Time of day from a `time_*` field.
    Time(NaiveTime),
    /// Frequency in MHz.
    Float(f64),
    /// Integer field, `-1` when the source text was unusable.
    Int(i64),
    /// Any other field, entity-decoded.
    Text(String),
}

impl FieldValue {
    /// Returns the date, if this is a date value.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Returns the time of day, if this is a time value.
    pub fn as_time(&self) -> Option<NaiveTime> {
        match self {
            Self::Time(t) => Some(*t),
            _ => None,
        }
    }

    /// Returns the float, if this is a float value.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the integer, if this is an integer value.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the text, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

/// One closed QSO: lowercase field names mapped to coerced values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: HashMap<String, FieldValue>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, lowercasing the name. Returns the replaced value.
    pub fn insert(&mut self, name: &str, value: impl Into<FieldValue>) -> Option<FieldValue> {
        self.fields.insert(name.to_ascii_lowercase(), value.into())
    }

    /// Looks up a field by case-insensitive name.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        match self.fields.get(name) {
            Some(v) => Some(v),
            None => self.fields.get(&name.to_ascii_lowercase()),
        }
    }

    /// Returns true when the field is present.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Date value of `name`.
    pub fn date(&self, name: &str) -> Option<NaiveDate> {
        self.get(name).and_then(FieldValue::as_date)
    }

    /// Time value of `name`.
    pub fn time(&self, name: &str) -> Option<NaiveTime> {
        self.get(name).and_then(FieldValue::as_time)
    }

    /// Float value of `name`.
    pub fn float(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(FieldValue::as_float)
    }

    /// Integer value of `name`.
    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(FieldValue::as_int)
    }

    /// Text value of `name`.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_text)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true when no fields are set.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates fields in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Fields ordered by name.
    pub fn sorted(&self) -> Vec<(&str, &FieldValue)> {
        let mut out: Vec<_> = self.iter().collect();
        out.sort_unstable_by(|a, b| a.0.cmp(b.0));
        out
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.sorted())
    }
}

impl FromIterator<(String, FieldValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        let mut rec = Self::new();
        for (name, value) in iter {
            rec.insert(&name, value);
        }
        rec
    }
}
