//! `SqliteDatabase` is a concrete implementation of a KropKart payment engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`traits`] module.
//!
//! [`traits`]: crate::traits
use std::fmt::Debug;

use log::*;
use sqlx::{migrate::MigrateError, SqlitePool};

use super::db::{listings, new_pool, orders};
use crate::{
    db_types::{GatewayOrderId, Listing, NewListing, NewOrder, Order, OrderStatusType, OrderTransition, PaymentId, TransitionSource},
    traits::{ListingManagement, OrderManagement, StoreError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl OrderManagement for SqliteDatabase {
    async fn insert_order(&self, order: NewOrder) -> Result<(Order, bool), StoreError> {
        let mut conn = self.pool.acquire().await?;
        orders::idempotent_insert(order, &mut conn).await
    }

    async fn fetch_order(&self, id: &GatewayOrderId) -> Result<Option<Order>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_gateway_id(id, &mut conn).await?;
        Ok(order)
    }

    async fn compare_and_set_status(
        &self,
        id: &GatewayOrderId,
        expected: OrderStatusType,
        new: OrderStatusType,
        payment_id: Option<&PaymentId>,
        source: TransitionSource,
    ) -> Result<Option<Order>, StoreError> {
        if !expected.can_transition_to(new) {
            return Err(StoreError::IllegalTransition { from: expected, to: new });
        }
        let mut tx = self.pool.begin().await?;
        let result = orders::compare_and_set_status(id, expected, new, payment_id, source, &mut tx).await?;
        tx.commit().await?;
        Ok(result)
    }

    async fn fetch_transitions(&self, id: &GatewayOrderId) -> Result<Vec<OrderTransition>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let transitions = orders::fetch_transitions(id, &mut conn).await?;
        Ok(transitions)
    }
}

impl ListingManagement for SqliteDatabase {
    async fn insert_listing(&self, listing: NewListing) -> Result<Listing, StoreError> {
        let mut conn = self.pool.acquire().await?;
        listings::insert_listing(listing, &mut conn).await
    }

    async fn fetch_listing(&self, id: i64) -> Result<Option<Listing>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        listings::fetch_listing(id, &mut conn).await
    }
}

impl SqliteDatabase {
    /// Connects to the database at `url`, creating the database file if it does not exist yet.
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Brings the schema up to date.
    pub async fn run_migrations(&self) -> Result<(), MigrateError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
