use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;
use uuid::Uuid;

pub const DEFAULT_STATUS: &str = "pending";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    pub kol_id: Uuid,
    pub name: String,
    pub shop_name: Option<String>,
    pub phone: String,
    pub region: String,
    pub place_address: Option<String>,
    pub assignee: String,
    pub manager: String,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a customer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomer {
    pub kol_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub shop_name: Option<String>,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub place_address: Option<String>,
    #[serde(default)]
    pub assignee: String,
    #[serde(default)]
    pub manager: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewCustomer {
    pub fn into_customer(self, now: DateTime<Utc>) -> Customer {
        Customer {
            id: Uuid::new_v4(),
            kol_id: self.kol_id,
            name: self.name,
            shop_name: self.shop_name,
            phone: self.phone,
            region: self.region,
            place_address: self.place_address,
            assignee: self.assignee,
            manager: self.manager,
            status: self.status.unwrap_or_else(|| DEFAULT_STATUS.to_string()),
            notes: self.notes,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Optional list filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerFilter {
    pub status: Option<String>,
    pub region: Option<String>,
}

impl CustomerFilter {
    pub fn matches(&self, customer: &Customer) -> bool {
        self.status.as_ref().map_or(true, |s| &customer.status == s)
            && self.region.as_ref().map_or(true, |r| &customer.region == r)
    }
}

/// Per-KOL dashboard counts
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerStats {
    pub total_customers: usize,
    pub status_counts: BTreeMap<String, usize>,
    pub region_counts: BTreeMap<String, usize>,
    pub recent_customers: Vec<Customer>,
}

impl CustomerStats {
    pub const RECENT_LIMIT: usize = 5;

    pub fn from_customers(mut customers: Vec<Customer>) -> Self {
        let mut status_counts = BTreeMap::new();
        let mut region_counts = BTreeMap::new();
        for c in &customers {
            *status_counts.entry(c.status.clone()).or_insert(0) += 1;
            *region_counts.entry(c.region.clone()).or_insert(0) += 1;
        }

        customers.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total_customers = customers.len();
        customers.truncate(Self::RECENT_LIMIT);

        Self {
            total_customers,
            status_counts,
            region_counts,
            recent_customers: customers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn customer(status: &str, region: &str, age_days: i64) -> Customer {
        NewCustomer {
            kol_id: Uuid::nil(),
            name: format!("{status}-{region}-{age_days}"),
            region: region.to_string(),
            status: Some(status.to_string()),
            ..Default::default()
        }
        .into_customer(Utc::now() - Duration::days(age_days))
    }

    #[test]
    fn new_customer_defaults_to_pending() {
        let c = NewCustomer {
            kol_id: Uuid::nil(),
            name: "Glow Skin".into(),
            ..Default::default()
        }
        .into_customer(Utc::now());
        assert_eq!(c.status, DEFAULT_STATUS);
        assert_eq!(c.created_at, c.updated_at);
    }

    #[test]
    fn filter_matches_status_and_region() {
        let c = customer("active", "Seoul", 0);
        assert!(CustomerFilter::default().matches(&c));
        assert!(CustomerFilter { status: Some("active".into()), region: None }.matches(&c));
        assert!(!CustomerFilter { status: Some("active".into()), region: Some("Busan".into()) }.matches(&c));
    }

    #[test]
    fn stats_counts_and_recent() {
        let customers: Vec<_> = (0..7)
            .map(|i| customer(if i % 2 == 0 { "active" } else { "pending" }, "Seoul", i))
            .collect();
        let stats = CustomerStats::from_customers(customers);
        assert_eq!(stats.total_customers, 7);
        assert_eq!(stats.status_counts["active"], 4);
        assert_eq!(stats.status_counts["pending"], 3);
        assert_eq!(stats.region_counts["Seoul"], 7);
        assert_eq!(stats.recent_customers.len(), 5);
        assert_eq!(stats.recent_customers[0].name, "active-Seoul-0");
    }
}
