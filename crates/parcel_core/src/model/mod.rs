//! Domain model for tracked parcels.
//!
//! # Responsibility
//! - Define the canonical parcel record used by the store and services.
//!
//! # Invariants
//! - Every persisted parcel is identified by a storage-assigned `ParcelNumber`.
//! - Lifecycle state is a closed set; persisted text outside it is invalid data.

pub mod parcel;
