//! API configuration
//!
//! One immutable configuration value, constructed at process start and
//! injected into the constructors that need it. Business logic never
//! reads the environment; prices, URLs, secrets, and feature flags all
//! flow through here.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

use core_kernel::{Currency, Money};
use domain_booking::{PriceTable, PricingMode};
use infra_providers::{CheckoutConfig, MailerConfig, TemplateIds};

/// One priced add-on in configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AddonSettings {
    pub name: String,
    pub price: Decimal,
    pub mode: PricingMode,
}

/// Server-side fares and add-on prices
#[derive(Debug, Clone, Deserialize)]
pub struct PricingSettings {
    /// ISO 4217 currency code
    pub currency: String,
    pub adult_fare: Decimal,
    pub child_fare: Decimal,
    #[serde(default)]
    pub addons: Vec<AddonSettings>,
}

impl PricingSettings {
    /// Builds the immutable price table injected into the engine
    pub fn price_table(&self) -> Result<PriceTable, config::ConfigError> {
        let currency = Currency::parse(&self.currency).ok_or_else(|| {
            config::ConfigError::Message(format!("unknown currency: {}", self.currency))
        })?;

        let mut table = PriceTable::new(
            currency,
            Money::new(self.adult_fare, currency),
            Money::new(self.child_fare, currency),
        );
        for addon in &self.addons {
            table = table.with_addon(&addon.name, Money::new(addon.price, currency), addon.mode);
        }
        Ok(table)
    }
}

/// Payment provider settings
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentSettings {
    pub api_base: String,
    pub secret_key: String,
    pub webhook_secret: String,
    pub success_url: String,
    pub cancel_url: String,
    pub timeout_secs: u64,
    /// Offer the cash-at-store payment method alongside cards
    pub store_payment_fallback: bool,
}

impl PaymentSettings {
    pub fn checkout_config(&self) -> CheckoutConfig {
        CheckoutConfig {
            api_base: self.api_base.clone(),
            secret_key: self.secret_key.clone(),
            success_url: self.success_url.clone(),
            cancel_url: self.cancel_url.clone(),
            timeout_secs: self.timeout_secs,
            store_payment_fallback: self.store_payment_fallback,
        }
    }
}

/// Email provider settings
#[derive(Debug, Clone, Deserialize)]
pub struct EmailSettings {
    pub api_url: String,
    pub api_key: String,
    pub from_address: String,
    pub staff_address: String,
    pub timeout_secs: u64,
    pub template_booking_confirmed: String,
    pub template_payment_failed: String,
    pub template_staff_booking_paid: String,
    pub template_staff_payment_failed: String,
}

impl EmailSettings {
    pub fn mailer_config(&self) -> MailerConfig {
        MailerConfig {
            api_url: self.api_url.clone(),
            api_key: self.api_key.clone(),
            from_address: self.from_address.clone(),
            staff_address: self.staff_address.clone(),
            timeout_secs: self.timeout_secs,
            templates: TemplateIds {
                booking_confirmed: self.template_booking_confirmed.clone(),
                payment_failed: self.template_payment_failed.clone(),
                staff_booking_paid: self.template_staff_booking_paid.clone(),
                staff_payment_failed: self.template_staff_payment_failed.clone(),
            },
        }
    }
}

/// API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Database URL
    pub database_url: String,
    /// Log level
    pub log_level: String,
    /// CORS origins; "*" allows any
    pub allowed_origins: Vec<String>,
    /// Shared token guarding the staff check-in action
    pub staff_token: String,
    /// Brand prefix on confirmation codes
    pub code_prefix: String,
    /// Hours a pending booking may wait for a payment event
    pub expiry_hours: i64,
    /// Seconds between expiry sweeps
    pub sweep_interval_secs: u64,
    pub pricing: PricingSettings,
    pub payments: PaymentSettings,
    pub email: EmailSettings,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: "postgres://localhost/bookings".to_string(),
            log_level: "info".to_string(),
            allowed_origins: vec!["*".to_string()],
            staff_token: "change-me-in-production".to_string(),
            code_prefix: "VUE".to_string(),
            expiry_hours: 48,
            sweep_interval_secs: 600,
            pricing: PricingSettings {
                currency: "MXN".to_string(),
                adult_fare: dec!(2500),
                child_fare: dec!(2200),
                addons: vec![
                    AddonSettings {
                        name: "photos".to_string(),
                        price: dec!(1200),
                        mode: PricingMode::Flat,
                    },
                    AddonSettings {
                        name: "breakfast".to_string(),
                        price: dec!(600),
                        mode: PricingMode::PerPassenger,
                    },
                ],
            },
            payments: PaymentSettings {
                api_base: "https://api.stripe.com".to_string(),
                secret_key: String::new(),
                webhook_secret: String::new(),
                success_url: "https://globovuelo.example/reserva/confirmada".to_string(),
                cancel_url: "https://globovuelo.example/reserva/cancelada".to_string(),
                timeout_secs: 30,
                store_payment_fallback: false,
            },
            email: EmailSettings {
                api_url: "https://api.sendgrid.com/v3/mail/send".to_string(),
                api_key: String::new(),
                from_address: "reservas@globovuelo.example".to_string(),
                staff_address: "operaciones@globovuelo.example".to_string(),
                timeout_secs: 10,
                template_booking_confirmed: String::new(),
                template_payment_failed: String::new(),
                template_staff_booking_paid: String::new(),
                template_staff_payment_failed: String::new(),
            },
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment variables
    ///
    /// Nested fields use `__` as separator, e.g.
    /// `APP_PRICING__ADULT_FARE=2500`.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_price_table_matches_reference_fares() {
        let config = ApiConfig::default();
        let table = config.pricing.price_table().unwrap();
        assert_eq!(table.currency(), Currency::MXN);
        assert!(table.addon("photos").is_some());
        assert!(table.addon("breakfast").is_some());
        assert!(table.addon("helicopter-transfer").is_none());
    }

    #[test]
    fn test_unknown_currency_is_a_config_error() {
        let pricing = PricingSettings {
            currency: "XXX".to_string(),
            adult_fare: dec!(1),
            child_fare: dec!(1),
            addons: vec![],
        };
        assert!(pricing.price_table().is_err());
    }
}
