//! Data models representing database entities.
//!
//! This module contains all data structures that map to database tables,
//! along with the request types used to create and update them.

/// API key authentication model
pub mod api_key;
/// Audit log entry model
pub mod api_log;
/// Dealer model and list-query options
pub mod dealer;
/// Farmer model
pub mod farmer;
/// Product model
pub mod product;
/// Tenant model
pub mod tenant;
