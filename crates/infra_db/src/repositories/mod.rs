//! Repository implementations

pub mod bookings;
