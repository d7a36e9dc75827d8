use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use crate::database::models::customer::{Customer, CustomerFilter, CustomerStats, NewCustomer};
use crate::progress::{
    mutator, CustomerProgress, ProgressError, ProgressSummary,
};
use crate::store::{CustomerDirectory, ProgressStore};

/// Customer with its progress and derived summary, as shown in list views
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerOverview {
    #[serde(flatten)]
    pub customer: Customer,
    pub progress: CustomerProgress,
    pub summary: ProgressSummary,
}

/// Read-modify-write flows over the progress store.
///
/// Writes are last-write-wins: two callers editing different stages of the
/// same customer at the same time can lose one of the edits.
#[derive(Clone)]
pub struct ProgressService {
    progress: Arc<dyn ProgressStore>,
    customers: Arc<dyn CustomerDirectory>,
}

impl ProgressService {
    pub fn new(progress: Arc<dyn ProgressStore>, customers: Arc<dyn CustomerDirectory>) -> Self {
        Self { progress, customers }
    }

    async fn require_customer(&self, customer_id: Uuid) -> Result<(), ProgressError> {
        if self.customers.exists(customer_id).await? {
            Ok(())
        } else {
            Err(ProgressError::NotFound(customer_id))
        }
    }

    /// Stored aggregate, or the zero value if the customer has none yet
    pub async fn get_progress(&self, customer_id: Uuid) -> Result<CustomerProgress, ProgressError> {
        self.require_customer(customer_id).await?;
        Ok(self
            .progress
            .get(customer_id)
            .await?
            .unwrap_or_else(|| CustomerProgress::new(customer_id)))
    }

    /// Entry point of every mutation path
    pub async fn ensure_progress(&self, customer_id: Uuid) -> Result<CustomerProgress, ProgressError> {
        self.get_progress(customer_id).await
    }

    /// Replace the stored aggregate, stamping `updated_at`
    pub async fn save_progress(
        &self,
        customer_id: Uuid,
        mut progress: CustomerProgress,
    ) -> Result<CustomerProgress, ProgressError> {
        self.require_customer(customer_id).await?;
        progress.customer_id = customer_id;
        progress.touch();
        self.progress.put(customer_id, &progress).await?;
        debug!(%customer_id, "saved customer progress");
        Ok(progress)
    }

    async fn mutate<F>(&self, customer_id: Uuid, apply: F) -> Result<CustomerProgress, ProgressError>
    where
        F: FnOnce(&CustomerProgress) -> Result<CustomerProgress, ProgressError>,
    {
        let current = self.ensure_progress(customer_id).await?;
        let next = apply(&current)?;
        self.save_progress(customer_id, next).await
    }

    pub async fn set_stage(
        &self,
        customer_id: Uuid,
        stage_key: &str,
        value: Option<Value>,
    ) -> Result<CustomerProgress, ProgressError> {
        self.mutate(customer_id, |p| mutator::set_stage(p, stage_key, value)).await
    }

    pub async fn set_stage_memo(
        &self,
        customer_id: Uuid,
        stage_key: &str,
        memo: Option<String>,
    ) -> Result<CustomerProgress, ProgressError> {
        self.mutate(customer_id, |p| mutator::set_stage_memo(p, stage_key, memo)).await
    }

    pub async fn toggle_achievement(
        &self,
        customer_id: Uuid,
        flag_name: &str,
    ) -> Result<CustomerProgress, ProgressError> {
        self.mutate(customer_id, |p| mutator::toggle_achievement_named(p, flag_name)).await
    }

    pub async fn set_achievement_level(
        &self,
        customer_id: Uuid,
        level: u8,
        checked: bool,
    ) -> Result<CustomerProgress, ProgressError> {
        self.mutate(customer_id, |p| mutator::set_achievement_level(p, level, checked)).await
    }

    // ── Customers ────────────────────────────────────────────────────

    /// Create a customer together with its zero-value progress row
    pub async fn create_customer(&self, new: NewCustomer) -> Result<CustomerOverview, ProgressError> {
        let customer = self.customers.create(new).await?;
        let progress = self
            .save_progress(customer.id, CustomerProgress::new(customer.id))
            .await?;
        info!(customer_id = %customer.id, kol_id = %customer.kol_id, "created customer");
        Ok(Self::overview(customer, progress))
    }

    pub async fn get_customer(&self, customer_id: Uuid) -> Result<CustomerOverview, ProgressError> {
        let customer = self
            .customers
            .get(customer_id)
            .await?
            .ok_or(ProgressError::NotFound(customer_id))?;
        let progress = self.get_progress(customer_id).await?;
        Ok(Self::overview(customer, progress))
    }

    pub async fn list_customers(
        &self,
        kol_id: Uuid,
        filter: &CustomerFilter,
    ) -> Result<Vec<CustomerOverview>, ProgressError> {
        let customers = self.customers.list_by_kol(kol_id, filter).await?;
        let lookups = customers.iter().map(|c| self.progress.get(c.id));
        let progress = futures::future::try_join_all(lookups).await?;

        Ok(customers
            .into_iter()
            .zip(progress)
            .map(|(customer, p)| {
                let p = p.unwrap_or_else(|| CustomerProgress::new(customer.id));
                Self::overview(customer, p)
            })
            .collect())
    }

    pub async fn customer_stats(&self, kol_id: Uuid) -> Result<CustomerStats, ProgressError> {
        let customers = self.customers.list_by_kol(kol_id, &CustomerFilter::default()).await?;
        Ok(CustomerStats::from_customers(customers))
    }

    /// Delete the customer and cascade its progress
    pub async fn delete_customer(&self, customer_id: Uuid) -> Result<(), ProgressError> {
        self.require_customer(customer_id).await?;
        self.progress.delete_all(customer_id).await?;
        self.customers.delete(customer_id).await?;
        info!(%customer_id, "deleted customer");
        Ok(())
    }

    fn overview(customer: Customer, progress: CustomerProgress) -> CustomerOverview {
        let summary = ProgressSummary::of(&progress);
        CustomerOverview {
            customer,
            progress,
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::{stage_completion_level, Achievements, StageKey};
    use crate::store::MemoryStore;
    use serde_json::json;

    fn service() -> ProgressService {
        let store = Arc::new(MemoryStore::new());
        ProgressService::new(store.clone(), store)
    }

    async fn customer(svc: &ProgressService) -> Uuid {
        svc.create_customer(NewCustomer {
            kol_id: Uuid::new_v4(),
            name: "Dr. Han Clinic".into(),
            ..Default::default()
        })
        .await
        .unwrap()
        .customer
        .id
    }

    #[tokio::test]
    async fn unknown_customer_is_not_found() {
        let svc = service();
        let id = Uuid::new_v4();
        assert!(matches!(svc.get_progress(id).await, Err(ProgressError::NotFound(x)) if x == id));
        assert!(matches!(
            svc.set_stage(id, "delivery", Some(json!({"completed": true}))).await,
            Err(ProgressError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn missing_row_reads_as_zero_value() {
        let store = Arc::new(MemoryStore::new());
        let svc = ProgressService::new(store.clone(), store.clone());
        let c = store
            .create(NewCustomer { name: "no row".into(), ..Default::default() })
            .await
            .unwrap();

        let p = svc.get_progress(c.id).await.unwrap();
        assert!(p.stage_data.is_empty());
        assert_eq!(p.achievements, Achievements::default());
    }

    #[tokio::test]
    async fn delivery_scenario() {
        let svc = service();
        let id = customer(&svc).await;

        let before = svc.get_progress(id).await.unwrap();
        assert!(before.stage_data.is_empty());

        let after = svc.set_stage(id, "delivery", Some(json!({"completed": true}))).await.unwrap();
        assert_eq!(stage_completion_level(&after), stage_completion_level(&before) + 1);
        assert!(after.updated_at.is_some());

        let reread = svc.get_progress(id).await.unwrap();
        assert_eq!(reread, after);
    }

    #[tokio::test]
    async fn memo_edit_keeps_other_fields() {
        let svc = service();
        let id = customer(&svc).await;
        svc.set_stage(id, "delivery", Some(json!({"memo": "a", "completed": true})))
            .await
            .unwrap();
        let p = svc.set_stage_memo(id, "delivery", Some("b".into())).await.unwrap();
        assert_eq!(
            p.stage(StageKey::Delivery).unwrap().to_value().unwrap(),
            json!({"memo": "b", "completed": true})
        );
    }

    #[tokio::test]
    async fn invalid_stage_leaves_store_untouched() {
        let svc = service();
        let id = customer(&svc).await;
        let before = svc.get_progress(id).await.unwrap();
        assert!(matches!(
            svc.set_stage(id, "payment", Some(json!({}))).await,
            Err(ProgressError::InvalidStage(_))
        ));
        assert_eq!(svc.get_progress(id).await.unwrap(), before);
    }

    #[tokio::test]
    async fn achievements_flow() {
        let svc = service();
        let id = customer(&svc).await;
        let p = svc.toggle_achievement(id, "standardProtocol").await.unwrap();
        assert!(p.achievements.standard_protocol);
        let p = svc.set_achievement_level(id, 3, true).await.unwrap();
        assert_eq!(p.achievements.count(), 3);
        assert!(matches!(
            svc.toggle_achievement(id, "nope").await,
            Err(ProgressError::InvalidAchievement(_))
        ));
    }

    #[tokio::test]
    async fn list_and_delete() {
        let svc = service();
        let kol = Uuid::new_v4();
        for name in ["one", "two"] {
            svc.create_customer(NewCustomer {
                kol_id: kol,
                name: name.into(),
                status: Some("active".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        }
        let listed = svc.list_customers(kol, &CustomerFilter::default()).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|o| o.summary.completed_stages == 0));

        let stats = svc.customer_stats(kol).await.unwrap();
        assert_eq!(stats.status_counts["active"], 2);

        let id = listed[0].customer.id;
        svc.delete_customer(id).await.unwrap();
        assert!(matches!(svc.get_progress(id).await, Err(ProgressError::NotFound(_))));
        assert!(matches!(svc.delete_customer(id).await, Err(ProgressError::NotFound(_))));
    }
}
