//! Stage keys and their typed payloads.
//!
//! Each stage owns a payload shape and its own completion predicate. Fields
//! the typed shape does not know about are kept in `extra` so payloads
//! written by older clients round-trip unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use super::error::ProgressError;

/// The fixed set of stages a customer moves through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StageKey {
    Inflow,
    Contract,
    Delivery,
    EducationNotes,
    Growth,
    Expert,
}

impl StageKey {
    pub const ALL: [StageKey; 6] = [
        StageKey::Inflow,
        StageKey::Contract,
        StageKey::Delivery,
        StageKey::EducationNotes,
        StageKey::Growth,
        StageKey::Expert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StageKey::Inflow => "inflow",
            StageKey::Contract => "contract",
            StageKey::Delivery => "delivery",
            StageKey::EducationNotes => "educationNotes",
            StageKey::Growth => "growth",
            StageKey::Expert => "expert",
        }
    }

    /// Decode a raw JSON value into this stage's payload
    pub fn parse_payload(&self, value: Value) -> Result<StagePayload, ProgressError> {
        let stage = self.as_str();
        let invalid = |e: serde_json::Error| ProgressError::InvalidPayload {
            stage,
            message: e.to_string(),
        };

        Ok(match self {
            StageKey::Inflow => StagePayload::Inflow(serde_json::from_value(value).map_err(invalid)?),
            StageKey::Contract => StagePayload::Contract(serde_json::from_value(value).map_err(invalid)?),
            StageKey::Delivery => StagePayload::Delivery(serde_json::from_value(value).map_err(invalid)?),
            StageKey::EducationNotes => {
                StagePayload::EducationNotes(serde_json::from_value(value).map_err(invalid)?)
            }
            StageKey::Growth => StagePayload::Growth(serde_json::from_value(value).map_err(invalid)?),
            StageKey::Expert => StagePayload::Expert(serde_json::from_value(value).map_err(invalid)?),
        })
    }

    /// Empty payload of the right shape, used when a memo is written to an unstarted stage
    pub fn empty_payload(&self) -> StagePayload {
        match self {
            StageKey::Inflow => StagePayload::Inflow(InflowStage::default()),
            StageKey::Contract => StagePayload::Contract(ContractStage::default()),
            StageKey::Delivery => StagePayload::Delivery(DeliveryStage::default()),
            StageKey::EducationNotes => StagePayload::EducationNotes(EducationNotesStage::default()),
            StageKey::Growth => StagePayload::Growth(GrowthStage::default()),
            StageKey::Expert => StagePayload::Expert(ExpertStage::default()),
        }
    }
}

impl fmt::Display for StageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StageKey {
    type Err = ProgressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StageKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| ProgressError::InvalidStage(s.to_string()))
    }
}

/// Capability shared by every stage payload
pub trait StageKind {
    const KEY: StageKey;

    fn is_complete(&self) -> bool;

    fn memo(&self) -> Option<&str>;

    fn set_memo(&mut self, memo: Option<String>);
}

/// Three-step rating used on the education notes form (상/중/하)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rating {
    #[serde(rename = "상", alias = "high")]
    High,
    #[serde(rename = "중", alias = "mid")]
    Mid,
    #[serde(rename = "하", alias = "low")]
    Low,
}

/// Personality type picked on the education notes form. The editor stores a
/// single MBTI code; lists of traits are accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Personality {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InflowSource {
    Cafe,
    Insta,
    Intro,
    Seminar,
    Visit,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InflowStage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<InflowSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seminar_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seminar_count: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visit_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visit_count: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractType {
    Purchase,
    Deposit,
    Reject,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractStage {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ContractType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deposit_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deposit_amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reject_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reject_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reject_ad: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reject_retarget: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryType {
    Ship,
    Install,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryStage {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<DeliveryType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ship_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ship_package: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_contact_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_contact_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationNotesStage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub understanding: Option<Rating>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleanliness: Option<Rating>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setting: Option<Rating>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personality: Option<Personality>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q1_level: Option<Rating>,
    #[serde(rename = "q1YN", default, skip_serializing_if = "Option::is_none")]
    pub q1_yn: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q2_level: Option<Rating>,
    #[serde(rename = "q2YN", default, skip_serializing_if = "Option::is_none")]
    pub q2_yn: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q3_level: Option<Rating>,
    #[serde(rename = "q3YN", default, skip_serializing_if = "Option::is_none")]
    pub q3_yn: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q4_level: Option<Rating>,
    #[serde(rename = "q4YN", default, skip_serializing_if = "Option::is_none")]
    pub q4_yn: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q5_level: Option<Rating>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q6_level: Option<Rating>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub star_manager: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub star_owner: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub star_director: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthStage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personal_level: Option<u32>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub customer_progress: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub learning_progress: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub evaluation_scores: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sales_data: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpertStage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expert_certified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn filled(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|s| !s.trim().is_empty())
}

macro_rules! memo_accessors {
    () => {
        fn memo(&self) -> Option<&str> {
            self.memo.as_deref()
        }

        fn set_memo(&mut self, memo: Option<String>) {
            self.memo = memo;
        }
    };
}

impl StageKind for InflowStage {
    const KEY: StageKey = StageKey::Inflow;

    fn is_complete(&self) -> bool {
        self.completed == Some(true) || self.source.is_some()
    }

    memo_accessors!();
}

impl StageKind for ContractStage {
    const KEY: StageKey = StageKey::Contract;

    fn is_complete(&self) -> bool {
        self.completed == Some(true)
            || matches!(self.kind, Some(ContractType::Purchase) | Some(ContractType::Deposit))
    }

    memo_accessors!();
}

impl StageKind for DeliveryStage {
    const KEY: StageKey = StageKey::Delivery;

    fn is_complete(&self) -> bool {
        self.completed == Some(true) || filled(&self.install_date) || filled(&self.ship_date)
    }

    memo_accessors!();
}

impl StageKind for EducationNotesStage {
    const KEY: StageKey = StageKey::EducationNotes;

    fn is_complete(&self) -> bool {
        self.completed == Some(true)
            || (self.understanding.is_some() && self.cleanliness.is_some() && self.setting.is_some())
    }

    memo_accessors!();
}

impl StageKind for GrowthStage {
    const KEY: StageKey = StageKey::Growth;

    fn is_complete(&self) -> bool {
        self.completed == Some(true) || self.personal_level.unwrap_or(0) > 0
    }

    memo_accessors!();
}

impl StageKind for ExpertStage {
    const KEY: StageKey = StageKey::Expert;

    fn is_complete(&self) -> bool {
        self.completed == Some(true) || self.expert_certified == Some(true)
    }

    memo_accessors!();
}

/// One stage's payload, tagged by the stage it belongs to
#[derive(Debug, Clone, PartialEq)]
pub enum StagePayload {
    Inflow(InflowStage),
    Contract(ContractStage),
    Delivery(DeliveryStage),
    EducationNotes(EducationNotesStage),
    Growth(GrowthStage),
    Expert(ExpertStage),
}

macro_rules! dispatch {
    ($payload:expr, $inner:ident => $body:expr) => {
        match $payload {
            StagePayload::Inflow($inner) => $body,
            StagePayload::Contract($inner) => $body,
            StagePayload::Delivery($inner) => $body,
            StagePayload::EducationNotes($inner) => $body,
            StagePayload::Growth($inner) => $body,
            StagePayload::Expert($inner) => $body,
        }
    };
}

impl StagePayload {
    pub fn key(&self) -> StageKey {
        match self {
            StagePayload::Inflow(_) => InflowStage::KEY,
            StagePayload::Contract(_) => ContractStage::KEY,
            StagePayload::Delivery(_) => DeliveryStage::KEY,
            StagePayload::EducationNotes(_) => EducationNotesStage::KEY,
            StagePayload::Growth(_) => GrowthStage::KEY,
            StagePayload::Expert(_) => ExpertStage::KEY,
        }
    }

    pub fn is_complete(&self) -> bool {
        dispatch!(self, p => p.is_complete())
    }

    pub fn memo(&self) -> Option<&str> {
        dispatch!(self, p => p.memo())
    }

    pub fn set_memo(&mut self, memo: Option<String>) {
        dispatch!(self, p => p.set_memo(memo))
    }

    /// JSON form of the payload, unknown fields included.
    ///
    /// Fails when an entry in `extra` shadows a typed field. Deserialized
    /// payloads never do; only hand-built `extra` maps can.
    pub fn to_value(&self) -> Result<Value, ProgressError> {
        let stage = self.key().as_str();
        let invalid = |message: String| ProgressError::InvalidPayload { stage, message };

        let value = dispatch!(self, p => serde_json::to_value(p)).map_err(|e| invalid(e.to_string()))?;
        if self.key().parse_payload(value.clone())? != *self {
            return Err(invalid("an unknown field shadows a typed field".to_string()));
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_known_keys() {
        assert_eq!("inflow".parse::<StageKey>().unwrap(), StageKey::Inflow);
        assert_eq!("educationNotes".parse::<StageKey>().unwrap(), StageKey::EducationNotes);
        for key in StageKey::ALL {
            assert_eq!(key.as_str().parse::<StageKey>().unwrap(), key);
        }
    }

    #[test]
    fn rejects_unknown_keys() {
        for raw in ["", "Inflow", "education_notes", "basicInfo", "expert "] {
            match raw.parse::<StageKey>() {
                Err(ProgressError::InvalidStage(k)) => assert_eq!(k, raw),
                other => panic!("expected InvalidStage for {raw:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn delivery_completion() {
        let done = StageKey::Delivery.parse_payload(json!({"completed": true})).unwrap();
        assert!(done.is_complete());

        let installed = StageKey::Delivery
            .parse_payload(json!({"type": "install", "installDate": "2024-05-01"}))
            .unwrap();
        assert!(installed.is_complete());

        let pending = StageKey::Delivery
            .parse_payload(json!({"type": "install", "installDate": "  "}))
            .unwrap();
        assert!(!pending.is_complete());
    }

    #[test]
    fn contract_reject_is_not_complete() {
        let rejected = StageKey::Contract
            .parse_payload(json!({"type": "reject", "rejectReason": "price"}))
            .unwrap();
        assert!(!rejected.is_complete());

        let purchased = StageKey::Contract.parse_payload(json!({"type": "purchase"})).unwrap();
        assert!(purchased.is_complete());
    }

    #[test]
    fn education_notes_needs_all_three_ratings() {
        let partial = StageKey::EducationNotes
            .parse_payload(json!({"understanding": "상", "cleanliness": "중"}))
            .unwrap();
        assert!(!partial.is_complete());

        let rated = StageKey::EducationNotes
            .parse_payload(json!({"understanding": "상", "cleanliness": "중", "setting": "하"}))
            .unwrap();
        assert!(rated.is_complete());
    }

    #[test]
    fn unknown_fields_round_trip() {
        let raw = json!({"memo": "hi", "legacyFlag": 7, "completed": true});
        let payload = StageKey::Expert.parse_payload(raw.clone()).unwrap();
        assert_eq!(payload.to_value().unwrap(), raw);
    }

    #[test]
    fn single_personality_round_trips() {
        let raw = json!({"understanding": "상", "personality": "ENFP"});
        let payload = StageKey::EducationNotes.parse_payload(raw.clone()).unwrap();
        match &payload {
            StagePayload::EducationNotes(notes) => {
                assert_eq!(notes.personality, Some(Personality::One("ENFP".into())))
            }
            other => panic!("expected education notes, got {other:?}"),
        }
        assert_eq!(payload.to_value().unwrap(), raw);

        let many = json!({"personality": ["calm", "careful"]});
        let payload = StageKey::EducationNotes.parse_payload(many.clone()).unwrap();
        assert_eq!(payload.to_value().unwrap(), many);
    }

    #[test]
    fn shadowing_extra_field_is_rejected() {
        let mut payload = StageKey::Expert.parse_payload(json!({"memo": "a"})).unwrap();
        if let StagePayload::Expert(expert) = &mut payload {
            expert.extra.insert("memo".into(), json!("shadow"));
        }
        assert!(matches!(
            payload.to_value(),
            Err(ProgressError::InvalidPayload { stage: "expert", .. })
        ));
    }

    #[test]
    fn wrong_field_type_is_invalid_payload() {
        let err = StageKey::Growth
            .parse_payload(json!({"personalLevel": "three"}))
            .unwrap_err();
        assert!(matches!(err, ProgressError::InvalidPayload { stage: "growth", .. }));
    }

    #[test]
    fn empty_payload_matches_key() {
        for key in StageKey::ALL {
            let payload = key.empty_payload();
            assert_eq!(payload.key(), key);
            assert!(!payload.is_complete());
        }
    }
}
