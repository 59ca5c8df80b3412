//! Parcel use-case service.
//!
//! # Responsibility
//! - Provide registration and lifecycle entry points for core callers.
//! - Own the forward-only status policy the store itself does not enforce.
//!
//! # Invariants
//! - Service APIs never bypass store guards.
//! - Status only moves `registered -> sent -> delivered`.

use crate::model::parcel::{ClientId, Parcel, ParcelNumber, ParcelStatus};
use crate::repo::parcel_repo::{ParcelStore, RepoResult};
use chrono::{SecondsFormat, Utc};
use log::info;

/// Use-case service wrapper around a parcel store.
pub struct ParcelService<S: ParcelStore> {
    store: S,
}

impl<S: ParcelStore> ParcelService<S> {
    /// Creates a service using the provided store implementation.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Registers a new parcel for `client`, stamped with the current UTC time.
    ///
    /// Returns the persisted parcel including its assigned number.
    pub fn register(&self, client: ClientId, address: impl Into<String>) -> RepoResult<Parcel> {
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let mut parcel = Parcel::new(client, address, created_at);
        parcel.number = self.store.add(&parcel)?;

        info!(
            "event=parcel_register module=service status=ok number={} client={}",
            parcel.number, parcel.client
        );
        Ok(parcel)
    }

    /// Lists all parcels of `client` and logs a summary line for each.
    pub fn client_parcels(&self, client: ClientId) -> RepoResult<Vec<Parcel>> {
        let parcels = self.store.get_by_client(client)?;
        for parcel in &parcels {
            info!("event=parcel_summary module=service {parcel}");
        }
        Ok(parcels)
    }

    /// Moves a parcel one step forward in its lifecycle.
    ///
    /// # Contract
    /// - Returns the new status after writing it.
    /// - Returns `Ok(None)` without writing when the parcel is already delivered.
    /// - Propagates `RepoError::NotFound` for unknown numbers.
    pub fn next_status(&self, number: ParcelNumber) -> RepoResult<Option<ParcelStatus>> {
        let parcel = self.store.get(number)?;
        let Some(next) = parcel.status.next() else {
            info!("event=parcel_next_status module=service status=skipped number={number} reason=final_state");
            return Ok(None);
        };

        self.store.set_status(number, next)?;
        info!(
            "event=parcel_next_status module=service status=ok number={number} from={} to={next}",
            parcel.status
        );
        Ok(Some(next))
    }

    /// Changes the delivery address while the parcel is still registered.
    ///
    /// Silently does nothing for unknown or already-sent parcels.
    pub fn change_address(&self, number: ParcelNumber, address: &str) -> RepoResult<()> {
        self.store.set_address(number, address)
    }

    /// Deletes the parcel while it is still registered.
    ///
    /// Silently does nothing for unknown or already-sent parcels.
    pub fn delete(&self, number: ParcelNumber) -> RepoResult<()> {
        self.store.delete(number)
    }
}
