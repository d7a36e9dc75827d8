//! Collaborator boundaries for the progress tracker.
//!
//! `ProgressStore` persists the per-customer aggregate as an opaque unit and
//! `CustomerDirectory` owns customer identity. Both surface failures as
//! `ProgressError::Storage`; nothing here retries.

pub mod memory;

use async_trait::async_trait;
use uuid::Uuid;

use crate::database::models::customer::{Customer, CustomerFilter, NewCustomer};
use crate::progress::{CustomerProgress, ProgressError};

pub use memory::MemoryStore;

#[async_trait]
pub trait ProgressStore: Send + Sync {
    async fn get(&self, customer_id: Uuid) -> Result<Option<CustomerProgress>, ProgressError>;

    /// Replace the stored aggregate; last write wins
    async fn put(&self, customer_id: Uuid, progress: &CustomerProgress) -> Result<(), ProgressError>;

    async fn delete_all(&self, customer_id: Uuid) -> Result<(), ProgressError>;
}

#[async_trait]
pub trait CustomerDirectory: Send + Sync {
    async fn exists(&self, customer_id: Uuid) -> Result<bool, ProgressError>;

    async fn create(&self, customer: NewCustomer) -> Result<Customer, ProgressError>;

    async fn get(&self, customer_id: Uuid) -> Result<Option<Customer>, ProgressError>;

    /// Customers of one KOL, newest first
    async fn list_by_kol(&self, kol_id: Uuid, filter: &CustomerFilter) -> Result<Vec<Customer>, ProgressError>;

    /// Returns false when the customer did not exist
    async fn delete(&self, customer_id: Uuid) -> Result<bool, ProgressError>;
}
