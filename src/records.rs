use crate::geo::GeoPoint;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use strum_macros::{Display, EnumIter, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum Shift {
    #[strum(to_string = "Morning", serialize = "mañana", serialize = "manana", serialize = "m")]
    Morning,
    #[strum(to_string = "Afternoon", serialize = "tarde", serialize = "t")]
    Afternoon,
    #[strum(to_string = "Night", serialize = "noche", serialize = "n")]
    Night,
}

impl Serialize for Shift {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Shift {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Shift::from_str(raw.trim())
            .map_err(|_| serde::de::Error::custom(format!("unknown shift '{}'", raw)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub grade: Option<u32>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub locality: Option<String>,
    #[serde(default)]
    pub neighborhood: Option<String>,
}

impl Student {
    pub fn home(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub locality: Option<String>,
    #[serde(default)]
    pub neighborhood: Option<String>,
}

impl Teacher {
    pub fn home(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}

/// A class section. Coordinates are optional on the row and are
/// resolved through the owning establishment when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Class {
    pub id: u64,
    #[serde(default)]
    pub grade: Option<u32>,
    pub shift: Shift,
    pub capacity: u32,
    #[serde(default)]
    pub min_capacity: Option<u32>,
    #[serde(default)]
    pub section: Option<String>,
    pub establishment_id: u64,
    pub institution_id: u64,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
}

impl Class {
    pub fn own_site(&self) -> Option<GeoPoint> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Establishment {
    pub id: u64,
    pub institution_id: u64,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub locality: Option<String>,
    #[serde(default)]
    pub neighborhood: Option<String>,
}

impl Establishment {
    pub fn site(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}

/// The four raw collections handed over by a record provider.
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    pub students: Vec<Student>,
    pub teachers: Vec<Teacher>,
    pub classes: Vec<Class>,
    pub establishments: Vec<Establishment>,
    /// Source rows that could not be read. Problem construction rejects a
    /// set that carries any.
    pub rejected: Vec<RejectedRow>,
}

/// A source row with a missing or malformed field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRow {
    pub table: String,
    pub line: u64,
    pub reason: String,
}

impl std::fmt::Display for RejectedRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} line {}: {}", self.table, self.line, self.reason)
    }
}
