//! BGP configuration models with field inheritance
//!
//! Peer groups, peer endpoints, and address-family objects may leave settings
//! unset and pick up effective values from related objects (templates,
//! peer groups, routing instances). See [`inheritance`] for the rules engine.
pub mod api;
pub mod config;
pub mod inheritance;
pub mod models;
pub mod utils;

#[cfg(feature = "cli")]
pub mod cli;

pub use config::{Inventory, InventoryError};
pub use inheritance::{Resolver, Schema};
