//! Infrastructure Database Layer
//!
//! This crate provides the PostgreSQL persistence adapter for the
//! booking system using SQLx.
//!
//! # Architecture
//!
//! The crate follows the repository pattern: `PgBookingStore` implements
//! the domain's `BookingStore` port, hiding every SQL detail from the
//! ledger. The store's `transition_status` is a single conditional
//! `UPDATE` checked by affected-row count, which is what makes
//! reconciliation exactly-once across concurrently running service
//! instances.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, DatabaseConfig, PgBookingStore};
//!
//! let pool = create_pool(DatabaseConfig::new(url)).await?;
//! let store = PgBookingStore::new(pool);
//! ```

pub mod error;
pub mod pool;
pub mod repositories;

pub use error::DatabaseError;
pub use pool::{create_pool, create_pool_from_url, DatabaseConfig, DatabasePool};
pub use repositories::bookings::PgBookingStore;
