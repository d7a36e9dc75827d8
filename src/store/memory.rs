use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CustomerDirectory, ProgressStore};
use crate::database::models::customer::{Customer, CustomerFilter, NewCustomer};
use crate::progress::{CustomerProgress, ProgressError};

/// In-process store for development and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    customers: RwLock<HashMap<Uuid, Customer>>,
    progress: RwLock<HashMap<Uuid, CustomerProgress>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProgressStore for MemoryStore {
    async fn get(&self, customer_id: Uuid) -> Result<Option<CustomerProgress>, ProgressError> {
        Ok(self.progress.read().await.get(&customer_id).cloned())
    }

    async fn put(&self, customer_id: Uuid, progress: &CustomerProgress) -> Result<(), ProgressError> {
        self.progress.write().await.insert(customer_id, progress.clone());
        Ok(())
    }

    async fn delete_all(&self, customer_id: Uuid) -> Result<(), ProgressError> {
        self.progress.write().await.remove(&customer_id);
        Ok(())
    }
}

#[async_trait]
impl CustomerDirectory for MemoryStore {
    async fn exists(&self, customer_id: Uuid) -> Result<bool, ProgressError> {
        Ok(self.customers.read().await.contains_key(&customer_id))
    }

    async fn create(&self, customer: NewCustomer) -> Result<Customer, ProgressError> {
        let customer = customer.into_customer(Utc::now());
        self.customers.write().await.insert(customer.id, customer.clone());
        Ok(customer)
    }

    async fn get(&self, customer_id: Uuid) -> Result<Option<Customer>, ProgressError> {
        Ok(self.customers.read().await.get(&customer_id).cloned())
    }

    async fn list_by_kol(&self, kol_id: Uuid, filter: &CustomerFilter) -> Result<Vec<Customer>, ProgressError> {
        let mut found: Vec<Customer> = self
            .customers
            .read()
            .await
            .values()
            .filter(|c| c.kol_id == kol_id && filter.matches(c))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn delete(&self, customer_id: Uuid) -> Result<bool, ProgressError> {
        let removed = self.customers.write().await.remove(&customer_id).is_some();
        if removed {
            self.progress.write().await.remove(&customer_id);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_customer(kol_id: Uuid, name: &str) -> NewCustomer {
        NewCustomer {
            kol_id,
            name: name.to_string(),
            region: "Seoul".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn progress_put_get_delete() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();
        assert!(ProgressStore::get(&store, id).await.unwrap().is_none());

        let mut p = CustomerProgress::new(id);
        p.achievements.basic_training = true;
        store.put(id, &p).await.unwrap();
        assert_eq!(ProgressStore::get(&store, id).await.unwrap(), Some(p));

        store.delete_all(id).await.unwrap();
        assert!(ProgressStore::get(&store, id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn lists_by_kol_only() {
        let store = MemoryStore::new();
        let kol_a = Uuid::new_v4();
        let kol_b = Uuid::new_v4();
        store.create(new_customer(kol_a, "a1")).await.unwrap();
        store.create(new_customer(kol_a, "a2")).await.unwrap();
        store.create(new_customer(kol_b, "b1")).await.unwrap();

        let a = store.list_by_kol(kol_a, &CustomerFilter::default()).await.unwrap();
        assert_eq!(a.len(), 2);
        assert!(a.iter().all(|c| c.kol_id == kol_a));
    }

    #[tokio::test]
    async fn delete_cascades_progress() {
        let store = MemoryStore::new();
        let c = store.create(new_customer(Uuid::new_v4(), "x")).await.unwrap();
        store.put(c.id, &CustomerProgress::new(c.id)).await.unwrap();

        assert!(store.delete(c.id).await.unwrap());
        assert!(!store.exists(c.id).await.unwrap());
        assert!(ProgressStore::get(&store, c.id).await.unwrap().is_none());
        assert!(!store.delete(c.id).await.unwrap());
    }
}
