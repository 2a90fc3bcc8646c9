use crate::{
    db_types::{Listing, NewListing},
    traits::StoreError,
};

/// Storage for priced listings. There is deliberately no update method: the adjusted price a buyer saw when the
/// listing went up is the price they pay.
#[allow(async_fn_in_trait)]
pub trait ListingManagement: Clone {
    async fn insert_listing(&self, listing: NewListing) -> Result<Listing, StoreError>;

    async fn fetch_listing(&self, id: i64) -> Result<Option<Listing>, StoreError>;
}
