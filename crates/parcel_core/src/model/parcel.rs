//! Parcel domain model.
//!
//! # Responsibility
//! - Define the tracked shipment record and its lifecycle states.
//! - Map lifecycle states to and from their persisted text form.
//!
//! # Invariants
//! - `number` is assigned by storage and never reused for another parcel.
//! - `client` and `created_at` never change after creation.
//! - `status` text values (`registered`, `sent`, `delivered`) are stable
//!   storage contracts and must not be renamed.

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Storage-assigned parcel identifier.
pub type ParcelNumber = i64;

/// Identifier of the client that owns a parcel.
pub type ClientId = i64;

/// Lifecycle state of a parcel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParcelStatus {
    /// Accepted for shipping. Address changes and deletion are allowed.
    Registered,
    /// Handed over to the carrier.
    Sent,
    /// Received by the addressee.
    Delivered,
}

impl ParcelStatus {
    /// Returns the persisted text value for this status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Registered => "registered",
            Self::Sent => "sent",
            Self::Delivered => "delivered",
        }
    }

    /// Returns the following lifecycle state, or `None` for the final one.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Registered => Some(Self::Sent),
            Self::Sent => Some(Self::Delivered),
            Self::Delivered => None,
        }
    }
}

impl Display for ParcelStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParcelStatus {
    type Err = ParcelValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "registered" => Ok(Self::Registered),
            "sent" => Ok(Self::Sent),
            "delivered" => Ok(Self::Delivered),
            other => Err(ParcelValidationError::UnknownStatus(other.to_string())),
        }
    }
}

/// Validation failures for parcel values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParcelValidationError {
    /// `created_at` is not an RFC 3339 timestamp.
    InvalidCreatedAt(String),
    /// Status text is not one of the known lifecycle values.
    UnknownStatus(String),
}

impl Display for ParcelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCreatedAt(value) => {
                write!(f, "created_at `{value}` is not an RFC 3339 timestamp")
            }
            Self::UnknownStatus(value) => write!(f, "unknown parcel status `{value}`"),
        }
    }
}

impl Error for ParcelValidationError {}

/// Tracked shipment record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parcel {
    /// Assigned by storage on insert. `0` until the parcel is persisted.
    pub number: ParcelNumber,
    pub client: ClientId,
    pub status: ParcelStatus,
    /// Mutable only while `status == ParcelStatus::Registered`.
    pub address: String,
    /// RFC 3339 creation time, supplied by the caller.
    pub created_at: String,
}

impl Parcel {
    /// Creates an unpersisted parcel in the `registered` state.
    pub fn new(
        client: ClientId,
        address: impl Into<String>,
        created_at: impl Into<String>,
    ) -> Self {
        Self {
            number: 0,
            client,
            status: ParcelStatus::Registered,
            address: address.into(),
            created_at: created_at.into(),
        }
    }

    /// Checks write-path invariants before persistence.
    pub fn validate(&self) -> Result<(), ParcelValidationError> {
        if DateTime::parse_from_rfc3339(&self.created_at).is_err() {
            return Err(ParcelValidationError::InvalidCreatedAt(
                self.created_at.clone(),
            ));
        }
        Ok(())
    }

    /// Returns whether address changes and deletion are still allowed.
    pub fn is_mutable(&self) -> bool {
        self.status == ParcelStatus::Registered
    }
}

impl Display for Parcel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "parcel #{} to `{}` for client {}, registered {}, status {}",
            self.number, self.address, self.client, self.created_at, self.status
        )
    }
}
