pub mod bids;
pub mod gigs;
pub mod hire;
pub mod views;
