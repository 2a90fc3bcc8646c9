mod helpers;
mod listings;
mod mocks;
mod orders;
mod payments;
