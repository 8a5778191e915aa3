//! Accident record shapes: the raw source mapping and its validated projection.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Field names used by the historical dataset.
pub mod fields {
    pub const REGION: &str = "mahoz";
    pub const SEVERITY: &str = "humrat_teuna";
    pub const ROAD_CONDITION: &str = "tkinut";
    pub const SIGNAGE: &str = "simun_timrur";
    pub const LIGHTING: &str = "teura";
    pub const YEAR: &str = "shnat_teuna";
    pub const MONTH: &str = "hodesh_teuna";
    pub const DAY_OF_WEEK: &str = "yom_bashavua";
    pub const NIGHT: &str = "yom_layla";
    pub const LATITUDE: &str = "latitude";
    pub const LONGITUDE: &str = "longitude";

    /// Fields that must be non-null for a record to be kept.
    pub const REQUIRED: [&str; 5] = [SEVERITY, YEAR, MONTH, DAY_OF_WEEK, NIGHT];
}

/// One untyped record from the historical dataset.
///
/// Fields absent from the source object read as `None`, which downstream
/// code treats the same as an explicit `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccidentRecord(Map<String, Value>);

impl AccidentRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a JSON value, returning `None` unless it is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    /// Stores a float, writing `null` in place of NaN or infinite values.
    pub fn insert_number(&mut self, name: impl Into<String>, value: f64) {
        let value = serde_json::Number::from_f64(value).map_or(Value::Null, Value::Number);
        self.0.insert(name.into(), value);
    }

    /// Builder form of [`AccidentRecord::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }
}

impl From<Map<String, Value>> for AccidentRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// A record that passed sanitization.
///
/// Coordinates are numeric and inside the configured bounding box, and every
/// field in [`fields::REQUIRED`] is non-null. All other source fields are
/// carried through untouched so the listing surface can return them.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanAccidentRecord {
    pub(crate) latitude: f64,
    pub(crate) longitude: f64,
    pub(crate) fields: Map<String, Value>,
}

impl CleanAccidentRecord {
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Region identifier, or `None` when the field is absent, empty or zero.
    ///
    /// Integral numbers share one key, so `4` and `4.0` are the same region.
    pub fn region(&self) -> Option<String> {
        let value = self.fields.get(fields::REGION)?;
        match value {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => match as_code(value) {
                Some(0) => None,
                Some(code) => Some(code.to_string()),
                None => Some(n.to_string()),
            },
            _ => None,
        }
    }

    /// Integral value of a coded field, accepting `2` and `2.0` alike.
    pub fn code(&self, name: &str) -> Option<i64> {
        self.fields.get(name).and_then(as_code)
    }
}

impl Serialize for CleanAccidentRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

impl From<CleanAccidentRecord> for AccidentRecord {
    fn from(record: CleanAccidentRecord) -> Self {
        Self(record.fields)
    }
}

fn as_code(value: &Value) -> Option<i64> {
    let n = value.as_number()?;
    if let Some(i) = n.as_i64() {
        return Some(i);
    }
    let f = n.as_f64()?;
    (f.fract() == 0.0 && f.abs() < i64::MAX as f64).then_some(f as i64)
}
