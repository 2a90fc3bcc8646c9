use std::str::FromStr;

use chrono::{DateTime, Utc};
use log::debug;
use rust_decimal::Decimal;
use sqlx::{FromRow, SqliteConnection};

use crate::{
    db_types::{Listing, NewListing},
    traits::StoreError,
};

/// Decimal columns come back as text and are parsed into a [`Listing`] after the fetch.
#[derive(FromRow)]
struct ListingRow {
    id: i64,
    owner: String,
    name: String,
    description: String,
    category: String,
    base_price: String,
    quality_score: String,
    adjusted_price: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ListingRow> for Listing {
    type Error = StoreError;

    fn try_from(row: ListingRow) -> Result<Self, Self::Error> {
        let decimal = |field: &str, value: &str| {
            Decimal::from_str(value)
                .map_err(|e| StoreError::CorruptRecord(format!("Listing #{} has an invalid {field}: {e}", row.id)))
        };
        Ok(Listing {
            base_price: decimal("base_price", &row.base_price)?,
            quality_score: decimal("quality_score", &row.quality_score)?,
            adjusted_price: decimal("adjusted_price", &row.adjusted_price)?,
            id: row.id,
            owner: row.owner,
            name: row.name,
            description: row.description,
            category: row.category,
            created_at: row.created_at,
        })
    }
}

pub async fn insert_listing(listing: NewListing, conn: &mut SqliteConnection) -> Result<Listing, StoreError> {
    let row: ListingRow = sqlx::query_as(
        r#"
            INSERT INTO listings (owner, name, description, category, base_price, quality_score, adjusted_price, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *;
        "#,
    )
    .bind(listing.owner)
    .bind(listing.name)
    .bind(listing.description)
    .bind(listing.category)
    .bind(listing.base_price.to_string())
    .bind(listing.quality_score.to_string())
    .bind(listing.adjusted_price.to_string())
    .bind(Utc::now())
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Listing #{} ({}) saved at {}", row.id, row.name, row.adjusted_price);
    Listing::try_from(row)
}

pub async fn fetch_listing(id: i64, conn: &mut SqliteConnection) -> Result<Option<Listing>, StoreError> {
    let row: Option<ListingRow> =
        sqlx::query_as("SELECT * FROM listings WHERE id = $1").bind(id).fetch_optional(conn).await?;
    row.map(Listing::try_from).transpose()
}
