//! Core Kernel - Foundational types for the booking system
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money types with precise decimal arithmetic
//! - Strongly-typed identifiers
//! - Port error taxonomy shared by all collaborator adapters

pub mod money;
pub mod identifiers;
pub mod ports;

pub use money::{Money, Currency, MoneyError};
pub use identifiers::{BookingId, NotificationId};
pub use ports::{PortError, DomainPort};
