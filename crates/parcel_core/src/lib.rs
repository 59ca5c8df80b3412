//! Core persistence logic for the parcel tracker.
//! This crate owns the parcel lifecycle rules and their SQLite storage.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::parcel::{ClientId, Parcel, ParcelNumber, ParcelStatus, ParcelValidationError};
pub use repo::parcel_repo::{ParcelStore, RepoError, RepoResult, SqliteParcelStore};
pub use service::parcel_service::ParcelService;
