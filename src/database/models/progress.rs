use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::progress::{Achievements, CustomerProgress, ProgressError, StageData};

/// Raw customer_progress row; stage data and achievements are jsonb
#[derive(Debug, Clone, FromRow)]
pub struct ProgressRow {
    pub customer_id: Uuid,
    pub stage_data: Value,
    pub achievements: Value,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProgressRow {
    pub fn from_progress(progress: &CustomerProgress) -> Result<Self, ProgressError> {
        Ok(Self {
            customer_id: progress.customer_id,
            stage_data: Value::Object(progress.stage_data.to_json()?),
            achievements: serde_json::to_value(progress.achievements).map_err(ProgressError::storage)?,
            updated_at: progress.updated_at,
        })
    }

    pub fn into_progress(self) -> Result<CustomerProgress, DatabaseError> {
        let stage_data = match self.stage_data {
            Value::Object(map) => StageData::from_json(map)
                .map_err(|e| DatabaseError::CorruptRow(format!("stage_data for {}: {}", self.customer_id, e)))?,
            Value::Null => StageData::new(),
            other => {
                return Err(DatabaseError::CorruptRow(format!(
                    "stage_data for {} is not an object: {}",
                    self.customer_id, other
                )))
            }
        };

        let achievements: Achievements = match self.achievements {
            Value::Null => Achievements::default(),
            other => serde_json::from_value(other)
                .map_err(|e| DatabaseError::CorruptRow(format!("achievements for {}: {}", self.customer_id, e)))?,
        };

        Ok(CustomerProgress {
            customer_id: self.customer_id,
            stage_data,
            achievements,
            updated_at: self.updated_at,
        })
    }
}
