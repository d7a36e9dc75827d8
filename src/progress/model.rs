use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::achievements::Achievements;
use super::error::ProgressError;
use super::stage::{StageKey, StagePayload};

/// Stage payloads keyed by stage. A missing key means the stage has not started.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageData {
    stages: BTreeMap<StageKey, StagePayload>,
}

impl StageData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: StageKey) -> Option<&StagePayload> {
        self.stages.get(&key)
    }

    pub fn contains(&self, key: StageKey) -> bool {
        self.stages.contains_key(&key)
    }

    /// Store a payload under its own key, replacing whatever was there
    pub fn insert(&mut self, payload: StagePayload) -> Option<StagePayload> {
        self.stages.insert(payload.key(), payload)
    }

    pub fn remove(&mut self, key: StageKey) -> Option<StagePayload> {
        self.stages.remove(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (StageKey, &StagePayload)> {
        self.stages.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Build from a raw JSON object. Null values are treated as absent stages.
    pub fn from_json(map: Map<String, Value>) -> Result<Self, ProgressError> {
        let mut data = Self::new();
        for (raw_key, value) in map {
            let key: StageKey = raw_key.parse()?;
            if value.is_null() {
                continue;
            }
            data.insert(key.parse_payload(value)?);
        }
        Ok(data)
    }

    pub fn to_json(&self) -> Result<Map<String, Value>, ProgressError> {
        self.stages
            .iter()
            .map(|(k, v)| Ok((k.as_str().to_string(), v.to_value()?)))
            .collect()
    }
}

impl Serialize for StageData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().map_err(S::Error::custom)?.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for StageData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        StageData::from_json(map).map_err(D::Error::custom)
    }
}

/// The per-customer progress aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerProgress {
    pub customer_id: Uuid,
    #[serde(default)]
    pub stage_data: StageData,
    #[serde(default)]
    pub achievements: Achievements,
    pub updated_at: Option<DateTime<Utc>>,
}

impl CustomerProgress {
    /// Zero value: no stages started, no achievements, never saved
    pub fn new(customer_id: Uuid) -> Self {
        Self {
            customer_id,
            stage_data: StageData::new(),
            achievements: Achievements::default(),
            updated_at: None,
        }
    }

    pub fn stage(&self, key: StageKey) -> Option<&StagePayload> {
        self.stage_data.get(key)
    }

    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn zero_value() {
        let id = Uuid::new_v4();
        let p = CustomerProgress::new(id);
        assert_eq!(p.customer_id, id);
        assert!(p.stage_data.is_empty());
        assert_eq!(p.achievements, Achievements::default());
        assert!(p.updated_at.is_none());
    }

    #[test]
    fn stage_data_json_shape() {
        let raw = json!({
            "inflow": {"source": "insta", "memo": "dm"},
            "delivery": {"completed": true},
            "growth": null
        });
        let data: StageData = serde_json::from_value(raw).unwrap();
        assert_eq!(data.len(), 2);
        assert!(data.contains(StageKey::Inflow));
        assert!(!data.contains(StageKey::Growth));

        let back = serde_json::to_value(&data).unwrap();
        assert_eq!(back, json!({
            "inflow": {"source": "insta", "memo": "dm"},
            "delivery": {"completed": true}
        }));
    }

    #[test]
    fn stage_data_rejects_unknown_key() {
        let raw = json!({"basicInfo": {}});
        assert!(serde_json::from_value::<StageData>(raw).is_err());
    }

    #[test]
    fn progress_camel_case() {
        let p = CustomerProgress::new(Uuid::nil());
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["stageData"], json!({}));
        assert_eq!(v["achievements"]["expertCourse"], json!(false));
        assert!(v["updatedAt"].is_null());
    }
}
