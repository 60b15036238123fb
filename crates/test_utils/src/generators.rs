//! Fake-data generators

use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::faker::phone_number::en::PhoneNumber;
use fake::Fake;

use domain_booking::ContactDetails;

/// Generates plausible contact details
pub fn fake_contact() -> ContactDetails {
    ContactDetails {
        name: Name().fake(),
        email: SafeEmail().fake(),
        phone: Some(PhoneNumber().fake()),
    }
}

/// Generates contact details without a phone number
pub fn fake_contact_no_phone() -> ContactDetails {
    ContactDetails {
        name: Name().fake(),
        email: SafeEmail().fake(),
        phone: None,
    }
}
