use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Listing, NewListing},
    helpers::{adjusted_price, parse_base_price, quality_score},
    kpe_api::{errors::OrderFlowError, order_objects::NewListingRequest},
    traits::ListingManagement,
};

/// Prices new listings and stores them. A listing's price is fixed at creation; there is no way to re-price one.
pub struct ListingApi<B> {
    db: B,
}

impl<B> Debug for ListingApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ListingApi")
    }
}

impl<B> ListingApi<B>
where B: ListingManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn create_listing(&self, request: NewListingRequest) -> Result<Listing, OrderFlowError> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(OrderFlowError::InvalidInput("A listing name is required".to_string()));
        }
        let base_price = match &request.base_price {
            serde_json::Value::Number(n) => parse_base_price(&n.to_string())?,
            serde_json::Value::String(s) => parse_base_price(s)?,
            v => return Err(OrderFlowError::InvalidInput(format!("Base price must be a number, got {v}"))),
        };
        let score = quality_score(name, &request.description, &request.category);
        let price = adjusted_price(base_price, score)?;
        let listing = NewListing {
            owner: request.owner,
            name: name.to_string(),
            description: request.description,
            category: request.category,
            base_price,
            quality_score: score,
            adjusted_price: price,
        };
        let listing = self.db.insert_listing(listing).await?;
        info!(
            "🔄️🏷️ Listing #{} '{}' created. Base price {}, quality {}, listed at {}",
            listing.id, listing.name, listing.base_price, listing.quality_score, listing.adjusted_price
        );
        Ok(listing)
    }

    pub async fn fetch_listing(&self, id: i64) -> Result<Listing, OrderFlowError> {
        self.db.fetch_listing(id).await?.ok_or_else(|| OrderFlowError::NotFound(format!("Listing #{id}")))
    }
}
