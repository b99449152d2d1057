use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::fs;
use std::path::Path;

use crate::coordinate::Coordinate;

/// Record identifier as it appears in the data file, shown verbatim
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordId<'a>(Option<&'a Value>);

impl fmt::Display for RecordId<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(Value::String(s)) => f.write_str(s),
            Some(Value::Null) | None => f.write_str("?"),
            Some(other) => write!(f, "{}", other),
        }
    }
}

/// A single place entry in the locations file.
///
/// The JSON object is kept whole, in its original key order, so a rewrite
/// only touches `lat`/`lng`. Missing keys stay missing and `null`s stay `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationRecord {
    fields: Map<String, Value>,
}

impl LocationRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn id(&self) -> RecordId<'_> {
        RecordId(self.fields.get("id"))
    }

    /// Display name of the place (e.g. the temple name)
    pub fn name(&self) -> &str {
        self.text("name")
    }

    /// Free-text location description (town, district, landmark)
    pub fn location(&self) -> &str {
        self.text("location")
    }

    pub fn state(&self) -> &str {
        self.text("state")
    }

    /// Country for geocoding queries, falling back to the given default
    pub fn country_or<'a>(&'a self, default: &'a str) -> &'a str {
        match self.fields.get("country").and_then(Value::as_str) {
            Some(c) if !c.trim().is_empty() => c,
            _ => default,
        }
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Stored coordinate, if both axes are present and numeric
    pub fn coordinate(&self) -> Option<Coordinate> {
        let lat = self.fields.get("lat").and_then(Value::as_f64)?;
        let lng = self.fields.get("lng").and_then(Value::as_f64)?;
        Some(Coordinate::new(lat, lng))
    }

    /// Overwrite `lat`/`lng` in place; new keys are appended at the end
    pub fn set_coordinate(&mut self, coordinate: Coordinate) {
        self.fields
            .insert("lat".to_string(), Value::from(coordinate.latitude));
        self.fields
            .insert("lng".to_string(), Value::from(coordinate.longitude));
    }

    fn text(&self, key: &str) -> &str {
        self.fields.get(key).and_then(Value::as_str).unwrap_or("")
    }
}

/// Load the whole record list from a JSON array file
pub fn load_records(path: &Path) -> Result<Vec<LocationRecord>> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let records: Vec<LocationRecord> = serde_json::from_str(&data)
        .with_context(|| format!("Failed to parse records in {}", path.display()))?;
    Ok(records)
}

/// Overwrite the file with the full record list (pretty-printed, UTF-8)
pub fn save_records(path: &Path, records: &[LocationRecord]) -> Result<()> {
    // Create parent directory if needed
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    let mut data = serde_json::to_string_pretty(records)?;
    data.push('\n');
    fs::write(path, data).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"[
  {
    "id": 1,
    "name": "Sri Ranganathaswamy Temple",
    "location": "Srirangam, Tiruchirappalli",
    "state": "Tamil Nadu",
    "lat": 10.8624,
    "lng": 78.6897,
    "status": "visited",
    "tags": ["Divya Desam", "Vishnu"]
  },
  {
    "id": "kedarnath",
    "name": "Kedarnath Temple",
    "location": "Kedarnath",
    "state": "Uttarakhand",
    "country": "India",
    "lat": 30.7352,
    "lng": 79.0669,
    "description": "केदारनाथ मंदिर"
  }
]"#;

    #[test]
    fn test_load_records() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("locations.json");
        fs::write(&path, SAMPLE)?;

        let records = load_records(&path)?;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id().to_string(), "1");
        assert_eq!(records[1].id().to_string(), "kedarnath");
        assert_eq!(records[0].name(), "Sri Ranganathaswamy Temple");
        assert_eq!(records[0].coordinate(), Some(Coordinate::new(10.8624, 78.6897)));
        assert_eq!(records[0].field("status"), Some(&json!("visited")));
        assert_eq!(records[0].country_or("India"), "India");
        Ok(())
    }

    #[test]
    fn test_save_preserves_extra_fields_and_unicode() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("data").join("locations.json");

        let mut records: Vec<LocationRecord> = serde_json::from_str(SAMPLE)?;
        records[0].set_coordinate(Coordinate::new(10.862583, 78.690265));
        save_records(&path, &records)?;

        let written = fs::read_to_string(&path)?;
        assert!(written.contains("केदारनाथ मंदिर"));
        assert!(written.contains("\"lat\": 10.862583"));
        assert!(written.contains("  {\n    \"id\": 1,"));

        let reloaded = load_records(&path)?;
        assert_eq!(reloaded, records);
        assert_eq!(reloaded[0].field("tags"), Some(&json!(["Divya Desam", "Vishnu"])));
        Ok(())
    }

    #[test]
    fn test_missing_and_null_fields_survive_rewrite() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("locations.json");
        let input = r#"[{"id":1,"name":"A","lat":null,"lng":null,"notes":"x"}]"#;
        fs::write(&path, input)?;

        let records = load_records(&path)?;
        assert_eq!(records[0].location(), "");
        assert_eq!(records[0].state(), "");
        assert!(records[0].coordinate().is_none());
        save_records(&path, &records)?;

        let rewritten: Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
        assert_eq!(
            rewritten,
            json!([{"id": 1, "name": "A", "lat": null, "lng": null, "notes": "x"}])
        );
        Ok(())
    }

    #[test]
    fn test_key_order_is_kept_on_update() -> Result<()> {
        let mut records: Vec<LocationRecord> = serde_json::from_str(
            r#"[{"lat": 1.0, "lng": 2.0, "id": 3, "location": "Puri", "name": "Jagannath"}]"#,
        )?;
        records[0].set_coordinate(Coordinate::new(19.8049, 85.8179));

        let out = serde_json::to_string(&records)?;
        assert_eq!(
            out,
            r#"[{"lat":19.8049,"lng":85.8179,"id":3,"location":"Puri","name":"Jagannath"}]"#
        );
        Ok(())
    }

    #[test]
    fn test_unusual_ids_load_and_display() -> Result<()> {
        let records: Vec<LocationRecord> = serde_json::from_str(
            r#"[{"id": -3, "name": "A"}, {"id": 4.0, "name": "B"}, {"name": "C"}, {"id": null}]"#,
        )?;
        let ids: Vec<String> = records.iter().map(|r| r.id().to_string()).collect();
        assert_eq!(ids, vec!["-3", "4.0", "?", "?"]);
        Ok(())
    }

    #[test]
    fn test_country_override() -> Result<()> {
        let records: Vec<LocationRecord> = serde_json::from_str(
            r#"[{"id": 1, "country": "Nepal"}, {"id": 2, "country": " "}]"#,
        )?;
        assert_eq!(records[0].country_or("India"), "Nepal");
        assert_eq!(records[1].country_or("India"), "India");
        Ok(())
    }

    #[test]
    fn test_load_reports_path_on_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.json");
        let err = load_records(&path).unwrap_err();
        assert!(err.to_string().contains("missing.json"));
    }

    #[test]
    fn test_save_reports_unwritable_parent() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "not a directory")?;

        let err = save_records(&blocker.join("locations.json"), &[]).unwrap_err();
        assert!(err.to_string().contains("Failed to create"));
        Ok(())
    }
}
