//! Listings snapshot loading
//!
//! Reads the snapshot into a [`ListingTable`], dropping identifier
//! columns and recoding gearbox and fuel type on the way in.

mod loader;

pub use loader::{ListingTable, LoadStats, SnapshotFormat};
