//! Postgres implementations of the store boundaries.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::customer::{Customer, CustomerFilter, NewCustomer};
use crate::database::models::progress::ProgressRow;
use crate::progress::{CustomerProgress, ProgressError};
use crate::store::{CustomerDirectory, ProgressStore};

impl From<DatabaseError> for ProgressError {
    fn from(err: DatabaseError) -> Self {
        ProgressError::storage(err)
    }
}

impl From<sqlx::Error> for ProgressError {
    fn from(err: sqlx::Error) -> Self {
        ProgressError::storage(DatabaseError::Sqlx(err))
    }
}

const CUSTOMER_COLUMNS: &str = "id, kol_id, name, shop_name, phone, region, place_address, \
     assignee, manager, status, notes, created_at, updated_at";

pub struct PgProgressRepository {
    pool: PgPool,
}

impl PgProgressRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProgressStore for PgProgressRepository {
    async fn get(&self, customer_id: Uuid) -> Result<Option<CustomerProgress>, ProgressError> {
        let row: Option<ProgressRow> = sqlx::query_as(
            "SELECT customer_id, stage_data, achievements, updated_at \
             FROM customer_progress WHERE customer_id = $1",
        )
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ProgressRow::into_progress).transpose()?)
    }

    async fn put(&self, customer_id: Uuid, progress: &CustomerProgress) -> Result<(), ProgressError> {
        let row = ProgressRow::from_progress(progress)?;
        debug!(%customer_id, "upserting customer_progress");

        // customer_id is the primary key, so there is never more than one row per customer
        sqlx::query(
            "INSERT INTO customer_progress (customer_id, stage_data, achievements, updated_at) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (customer_id) DO UPDATE \
             SET stage_data = EXCLUDED.stage_data, \
                 achievements = EXCLUDED.achievements, \
                 updated_at = EXCLUDED.updated_at",
        )
        .bind(customer_id)
        .bind(&row.stage_data)
        .bind(&row.achievements)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_all(&self, customer_id: Uuid) -> Result<(), ProgressError> {
        sqlx::query("DELETE FROM customer_progress WHERE customer_id = $1")
            .bind(customer_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

pub struct PgCustomerRepository {
    pool: PgPool,
}

impl PgCustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomerDirectory for PgCustomerRepository {
    async fn exists(&self, customer_id: Uuid) -> Result<bool, ProgressError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM customers WHERE id = $1")
            .bind(customer_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0 > 0)
    }

    async fn create(&self, customer: NewCustomer) -> Result<Customer, ProgressError> {
        let customer = customer.into_customer(Utc::now());
        let sql = format!(
            "INSERT INTO customers ({CUSTOMER_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             RETURNING {CUSTOMER_COLUMNS}"
        );
        let created: Customer = sqlx::query_as(&sql)
            .bind(customer.id)
            .bind(customer.kol_id)
            .bind(&customer.name)
            .bind(&customer.shop_name)
            .bind(&customer.phone)
            .bind(&customer.region)
            .bind(&customer.place_address)
            .bind(&customer.assignee)
            .bind(&customer.manager)
            .bind(&customer.status)
            .bind(&customer.notes)
            .bind(customer.created_at)
            .bind(customer.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn get(&self, customer_id: Uuid) -> Result<Option<Customer>, ProgressError> {
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = $1");
        let found = sqlx::query_as(&sql)
            .bind(customer_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found)
    }

    async fn list_by_kol(&self, kol_id: Uuid, filter: &CustomerFilter) -> Result<Vec<Customer>, ProgressError> {
        let sql = format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers \
             WHERE kol_id = $1 \
               AND ($2::text IS NULL OR status = $2) \
               AND ($3::text IS NULL OR region = $3) \
             ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as(&sql)
            .bind(kol_id)
            .bind(&filter.status)
            .bind(&filter.region)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn delete(&self, customer_id: Uuid) -> Result<bool, ProgressError> {
        // customer_progress rows go with it via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(customer_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
