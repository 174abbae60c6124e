//! Entity type enumeration

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Category of sensitive data
///
/// Built-in types map one-to-one to a synthetic generator. Types contributed
/// by a custom pattern library are carried as [`EntityType::Custom`] and are
/// substituted with the generic placeholder generator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityType {
    /// Person names
    Person,
    /// Email addresses
    EmailAddress,
    /// Telephone numbers
    PhoneNumber,
    /// Payment card numbers
    CreditCard,
    /// US Social Security Numbers
    UsSsn,
    /// US bank account numbers
    UsBankNumber,
    /// US driver license numbers
    UsDriverLicense,
    /// US Individual Taxpayer Identification Numbers
    UsItin,
    /// US passport numbers
    UsPassport,
    /// IPv4 addresses, optionally with CIDR suffix
    IpAddress,
    /// Cities, countries and other place names
    Location,
    /// Street addresses
    StreetAddress,
    /// Dates and times
    DateTime,
    /// Nationality, religious or political group
    Nrp,
    /// Medical license numbers
    MedicalLicense,
    /// Web URLs
    Url,
    /// International bank account numbers
    IbanCode,
    /// Cryptocurrency wallet addresses
    Crypto,
    /// GUIDs / UUIDs
    Guid,
    /// Single latitude or longitude value
    Coordinate,
    /// Entity type defined by a custom pattern library
    Custom(String),
}

impl EntityType {
    /// All built-in entity types, in display order
    pub const BUILTIN: [EntityType; 20] = [
        EntityType::Person,
        EntityType::EmailAddress,
        EntityType::PhoneNumber,
        EntityType::CreditCard,
        EntityType::UsSsn,
        EntityType::UsBankNumber,
        EntityType::UsDriverLicense,
        EntityType::UsItin,
        EntityType::UsPassport,
        EntityType::IpAddress,
        EntityType::Location,
        EntityType::StreetAddress,
        EntityType::DateTime,
        EntityType::Nrp,
        EntityType::MedicalLicense,
        EntityType::Url,
        EntityType::IbanCode,
        EntityType::Crypto,
        EntityType::Guid,
        EntityType::Coordinate,
    ];

    /// Entity types enabled when no configuration says otherwise
    pub fn default_enabled() -> Vec<EntityType> {
        vec![
            EntityType::Person,
            EntityType::EmailAddress,
            EntityType::PhoneNumber,
            EntityType::CreditCard,
            EntityType::UsSsn,
            EntityType::IpAddress,
            EntityType::Location,
            EntityType::StreetAddress,
            EntityType::DateTime,
            EntityType::Guid,
        ]
    }

    /// Canonical upper-case label (e.g. `EMAIL_ADDRESS`)
    pub fn as_str(&self) -> &str {
        match self {
            Self::Person => "PERSON",
            Self::EmailAddress => "EMAIL_ADDRESS",
            Self::PhoneNumber => "PHONE_NUMBER",
            Self::CreditCard => "CREDIT_CARD",
            Self::UsSsn => "US_SSN",
            Self::UsBankNumber => "US_BANK_NUMBER",
            Self::UsDriverLicense => "US_DRIVER_LICENSE",
            Self::UsItin => "US_ITIN",
            Self::UsPassport => "US_PASSPORT",
            Self::IpAddress => "IP_ADDRESS",
            Self::Location => "LOCATION",
            Self::StreetAddress => "STREET_ADDRESS",
            Self::DateTime => "DATE_TIME",
            Self::Nrp => "NRP",
            Self::MedicalLicense => "MEDICAL_LICENSE",
            Self::Url => "URL",
            Self::IbanCode => "IBAN_CODE",
            Self::Crypto => "CRYPTO",
            Self::Guid => "GUID",
            Self::Coordinate => "COORDINATE",
            Self::Custom(label) => label,
        }
    }

    /// Human-readable description
    pub fn description(&self) -> &str {
        match self {
            Self::Person => "Person names (first, last, full names)",
            Self::EmailAddress => "Email addresses",
            Self::PhoneNumber => "Phone numbers (various formats)",
            Self::CreditCard => "Credit card numbers",
            Self::UsSsn => "US Social Security Numbers",
            Self::UsBankNumber => "US bank account numbers",
            Self::UsDriverLicense => "US driver's license numbers",
            Self::UsItin => "US Individual Taxpayer ID Numbers",
            Self::UsPassport => "US passport numbers",
            Self::IpAddress => "IPv4 addresses, with optional CIDR suffix",
            Self::Location => "Cities, countries, and place names",
            Self::StreetAddress => "Street addresses",
            Self::DateTime => "Dates and times",
            Self::Nrp => "Nationality, religious, or political group",
            Self::MedicalLicense => "Medical license numbers",
            Self::Url => "Web URLs",
            Self::IbanCode => "International Bank Account Numbers",
            Self::Crypto => "Cryptocurrency wallet addresses",
            Self::Guid => "GUIDs / UUIDs",
            Self::Coordinate => "GPS latitude or longitude values",
            Self::Custom(_) => "Custom pattern library entity",
        }
    }

    /// Whether this type comes from a custom pattern library
    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = std::convert::Infallible;

    /// Parse a label, case-insensitively; unknown labels become `Custom`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().to_uppercase();
        let builtin = EntityType::BUILTIN
            .iter()
            .find(|t| t.as_str() == label)
            .cloned();
        Ok(builtin.unwrap_or(EntityType::Custom(label)))
    }
}

impl From<&str> for EntityType {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(t) => t,
            Err(never) => match never {},
        }
    }
}

impl Serialize for EntityType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EntityType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(EntityType::from(s.as_str()))
    }
}
