//! Booking repository implementation
//!
//! `PgBookingStore` implements the domain's `BookingStore` port on
//! PostgreSQL. The status transition is a single conditional `UPDATE`
//! whose row count decides the outcome, so two service instances racing
//! the same webhook delivery see exactly one winner without any
//! in-process locking.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{BookingId, Currency, DomainPort, Money, PortError};
use domain_booking::{
    Booking, BookingStatus, BookingStore, ConfirmationCode, ContactDetails, PassengerCounts,
    PaymentReference,
};

use crate::error::DatabaseError;

/// PostgreSQL-backed booking store
#[derive(Debug, Clone)]
pub struct PgBookingStore {
    pool: PgPool,
}

impl PgBookingStore {
    /// Creates a new store over the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_where(
        &self,
        column: &'static str,
        value: String,
    ) -> Result<Option<Booking>, PortError> {
        let query = format!("SELECT {COLUMNS} FROM bookings WHERE {column} = $1");
        let row: Option<BookingRow> = sqlx::query_as(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from)?;
        row.map(Booking::try_from).transpose().map_err(Into::into)
    }
}

impl DomainPort for PgBookingStore {}

const COLUMNS: &str = "booking_id, confirmation_code, adults, children, addons, \
     contact_name, contact_email, contact_phone, flight_date, total_amount, currency, \
     payment_reference, status, created_at, updated_at";

#[async_trait]
impl BookingStore for PgBookingStore {
    async fn insert(&self, booking: &Booking) -> Result<(), PortError> {
        sqlx::query(
            r#"
            INSERT INTO bookings (
                booking_id, confirmation_code, adults, children, addons,
                contact_name, contact_email, contact_phone, flight_date,
                total_amount, currency, payment_reference, status,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(booking.id.as_uuid())
        .bind(booking.confirmation_code.as_str())
        .bind(booking.passengers.adults as i32)
        .bind(booking.passengers.children as i32)
        .bind(&booking.addons)
        .bind(&booking.contact.name)
        .bind(&booking.contact.email)
        .bind(&booking.contact.phone)
        .bind(booking.flight_date)
        .bind(booking.total.amount())
        .bind(booking.total.currency().code())
        .bind(booking.payment_reference.as_ref().map(|r| r.as_str()))
        .bind(booking.status.as_str())
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        Ok(())
    }

    async fn find_by_id(&self, id: BookingId) -> Result<Option<Booking>, PortError> {
        let row: Option<BookingRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM bookings WHERE booking_id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?;
        row.map(Booking::try_from).transpose().map_err(Into::into)
    }

    async fn find_by_code(&self, code: &ConfirmationCode) -> Result<Option<Booking>, PortError> {
        self.fetch_one_where("confirmation_code", code.as_str().to_string())
            .await
    }

    async fn find_by_payment_reference(
        &self,
        reference: &PaymentReference,
    ) -> Result<Option<Booking>, PortError> {
        self.fetch_one_where("payment_reference", reference.as_str().to_string())
            .await
    }

    async fn set_payment_reference(
        &self,
        id: BookingId,
        reference: &PaymentReference,
    ) -> Result<(), PortError> {
        let result = sqlx::query(
            "UPDATE bookings SET payment_reference = $2, updated_at = now() WHERE booking_id = $1",
        )
        .bind(id.as_uuid())
        .bind(reference.as_str())
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        if result.rows_affected() == 0 {
            return Err(PortError::not_found("Booking", id));
        }
        Ok(())
    }

    async fn transition_status(
        &self,
        id: BookingId,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<Option<Booking>, PortError> {
        // Conditional update: the WHERE clause carries the expected
        // current status, and an empty result means another writer got
        // there first.
        let row: Option<BookingRow> = sqlx::query_as(&format!(
            "UPDATE bookings SET status = $3, updated_at = now() \
             WHERE booking_id = $1 AND status = $2 RETURNING {COLUMNS}"
        ))
        .bind(id.as_uuid())
        .bind(from.as_str())
        .bind(to.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?;
        row.map(Booking::try_from).transpose().map_err(Into::into)
    }

    async fn expire_pending_before(&self, cutoff: DateTime<Utc>) -> Result<u64, PortError> {
        let result = sqlx::query(
            "UPDATE bookings SET status = 'expired', updated_at = now() \
             WHERE status = 'pending' AND created_at < $1",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        Ok(result.rows_affected())
    }
}

/// Database row for a booking
#[derive(Debug, sqlx::FromRow)]
struct BookingRow {
    booking_id: Uuid,
    confirmation_code: String,
    adults: i32,
    children: i32,
    addons: Vec<String>,
    contact_name: String,
    contact_email: String,
    contact_phone: Option<String>,
    flight_date: NaiveDate,
    total_amount: Decimal,
    currency: String,
    payment_reference: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = DatabaseError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let confirmation_code: ConfirmationCode = row.confirmation_code.parse().map_err(|_| {
            DatabaseError::CorruptRow(format!(
                "malformed confirmation code: {}",
                row.confirmation_code
            ))
        })?;
        let status = BookingStatus::parse(&row.status)
            .ok_or_else(|| DatabaseError::CorruptRow(format!("unknown status: {}", row.status)))?;
        let currency = Currency::parse(&row.currency).ok_or_else(|| {
            DatabaseError::CorruptRow(format!("unknown currency: {}", row.currency))
        })?;

        Ok(Booking {
            id: BookingId::from_uuid(row.booking_id),
            confirmation_code,
            passengers: PassengerCounts::new(row.adults as u32, row.children as u32),
            addons: row.addons,
            flight_date: row.flight_date,
            contact: ContactDetails {
                name: row.contact_name,
                email: row.contact_email,
                phone: row.contact_phone,
            },
            total: Money::new(row.total_amount, currency),
            payment_reference: row.payment_reference.map(PaymentReference::new),
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
