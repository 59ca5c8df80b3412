//! Parcel store contract and SQLite implementation.
//!
//! # Responsibility
//! - Translate `Parcel` values to and from rows of the `parcel` table.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Every operation issues exactly one SQL statement.
//! - Address changes and deletes carry the `status = 'registered'` guard in
//!   their own `WHERE` clause, so check and write are a single atomic step.
//! - Writes that match zero rows still succeed; the affected-row count is
//!   logged but not returned.
//! - Read paths reject unknown persisted status text instead of masking it.

use crate::db::DbError;
use crate::model::parcel::{ClientId, Parcel, ParcelNumber, ParcelStatus};
use log::debug;
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const PARCEL_TABLE: &str = "parcel";
const PARCEL_COLUMNS: &[&str] = &["number", "client", "status", "address", "created_at"];

const PARCEL_SELECT_SQL: &str = "SELECT
    number,
    client,
    status,
    address,
    created_at
FROM parcel";

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for parcel persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Storage failure: connectivity, constraint violation, malformed
    /// statement or I/O.
    Db(DbError),
    /// A single-row read matched nothing.
    NotFound(ParcelNumber),
    InvalidData(String),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl RepoError {
    /// Returns whether this error is the "no such parcel" signal.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(number) => write!(f, "parcel not found: {number}"),
            Self::InvalidData(message) => write!(f, "invalid persisted parcel data: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "connection is missing required table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "table `{table}` is missing required column `{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_)
            | Self::InvalidData(_)
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence contract for parcels.
pub trait ParcelStore {
    /// Inserts a parcel and returns the storage-assigned number.
    /// `parcel.number` is ignored.
    fn add(&self, parcel: &Parcel) -> RepoResult<ParcelNumber>;
    /// Reads one parcel. Fails with `RepoError::NotFound` when absent.
    fn get(&self, number: ParcelNumber) -> RepoResult<Parcel>;
    /// Reads every parcel owned by `client`, in storage scan order.
    fn get_by_client(&self, client: ClientId) -> RepoResult<Vec<Parcel>>;
    /// Overwrites the status unconditionally.
    fn set_status(&self, number: ParcelNumber, status: ParcelStatus) -> RepoResult<()>;
    /// Overwrites the address if the parcel is still `registered`.
    fn set_address(&self, number: ParcelNumber, address: &str) -> RepoResult<()>;
    /// Removes the parcel if it is still `registered`.
    fn delete(&self, number: ParcelNumber) -> RepoResult<()>;
}

impl<S: ParcelStore + ?Sized> ParcelStore for &S {
    fn add(&self, parcel: &Parcel) -> RepoResult<ParcelNumber> {
        (**self).add(parcel)
    }

    fn get(&self, number: ParcelNumber) -> RepoResult<Parcel> {
        (**self).get(number)
    }

    fn get_by_client(&self, client: ClientId) -> RepoResult<Vec<Parcel>> {
        (**self).get_by_client(client)
    }

    fn set_status(&self, number: ParcelNumber, status: ParcelStatus) -> RepoResult<()> {
        (**self).set_status(number, status)
    }

    fn set_address(&self, number: ParcelNumber, address: &str) -> RepoResult<()> {
        (**self).set_address(number, address)
    }

    fn delete(&self, number: ParcelNumber) -> RepoResult<()> {
        (**self).delete(number)
    }
}

/// SQLite-backed parcel store borrowing a caller-owned connection.
pub struct SqliteParcelStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteParcelStore<'conn> {
    /// Constructs a store after checking that the `parcel` table and all of
    /// its columns are present on `conn`.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_parcel_table(conn)?;
        Ok(Self { conn })
    }
}

impl ParcelStore for SqliteParcelStore<'_> {
    fn add(&self, parcel: &Parcel) -> RepoResult<ParcelNumber> {
        let number = log_error("parcel_add", self.insert_row(parcel))?;
        debug!(
            "event=parcel_add module=repo status=ok number={number} client={}",
            parcel.client
        );
        Ok(number)
    }

    fn get(&self, number: ParcelNumber) -> RepoResult<Parcel> {
        match self.select_by_number(number) {
            Ok(Some(parcel)) => {
                debug!("event=parcel_get module=repo status=ok number={number}");
                Ok(parcel)
            }
            Ok(None) => {
                debug!("event=parcel_get module=repo status=not_found number={number}");
                Err(RepoError::NotFound(number))
            }
            Err(err) => log_error("parcel_get", Err(err)),
        }
    }

    fn get_by_client(&self, client: ClientId) -> RepoResult<Vec<Parcel>> {
        let parcels = log_error("parcel_list_by_client", self.select_by_client(client))?;
        debug!(
            "event=parcel_list_by_client module=repo status=ok client={client} count={}",
            parcels.len()
        );
        Ok(parcels)
    }

    fn set_status(&self, number: ParcelNumber, status: ParcelStatus) -> RepoResult<()> {
        let changed = log_error(
            "parcel_set_status",
            self.conn
                .execute(
                    "UPDATE parcel SET status = ?1 WHERE number = ?2;",
                    params![status.as_str(), number],
                )
                .map_err(RepoError::from),
        )?;

        debug!(
            "event=parcel_set_status module=repo status=ok number={number} new_status={status} changed={changed}"
        );
        Ok(())
    }

    fn set_address(&self, number: ParcelNumber, address: &str) -> RepoResult<()> {
        let changed = log_error(
            "parcel_set_address",
            self.conn
                .execute(
                    "UPDATE parcel
                     SET address = ?1
                     WHERE number = ?2
                       AND status = ?3;",
                    params![address, number, ParcelStatus::Registered.as_str()],
                )
                .map_err(RepoError::from),
        )?;

        debug!("event=parcel_set_address module=repo status=ok number={number} changed={changed}");
        Ok(())
    }

    fn delete(&self, number: ParcelNumber) -> RepoResult<()> {
        let changed = log_error(
            "parcel_delete",
            self.conn
                .execute(
                    "DELETE FROM parcel
                     WHERE number = ?1
                       AND status = ?2;",
                    params![number, ParcelStatus::Registered.as_str()],
                )
                .map_err(RepoError::from),
        )?;

        debug!("event=parcel_delete module=repo status=ok number={number} changed={changed}");
        Ok(())
    }
}

impl SqliteParcelStore<'_> {
    fn insert_row(&self, parcel: &Parcel) -> RepoResult<ParcelNumber> {
        self.conn.execute(
            "INSERT INTO parcel (client, status, address, created_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                parcel.client,
                parcel.status.as_str(),
                parcel.address.as_str(),
                parcel.created_at.as_str(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn select_by_number(&self, number: ParcelNumber) -> RepoResult<Option<Parcel>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PARCEL_SELECT_SQL} WHERE number = ?1;"))?;

        let mut rows = stmt.query([number])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_parcel_row(row)?)),
            None => Ok(None),
        }
    }

    fn select_by_client(&self, client: ClientId) -> RepoResult<Vec<Parcel>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PARCEL_SELECT_SQL} WHERE client = ?1;"))?;

        let mut rows = stmt.query([client])?;
        let mut parcels = Vec::new();
        while let Some(row) = rows.next()? {
            parcels.push(parse_parcel_row(row)?);
        }
        Ok(parcels)
    }
}

fn log_error<T>(event: &str, result: RepoResult<T>) -> RepoResult<T> {
    if let Err(err) = &result {
        debug!("event={event} module=repo status=error error={err}");
    }
    result
}

fn parse_parcel_row(row: &Row<'_>) -> RepoResult<Parcel> {
    let number: ParcelNumber = row.get("number")?;
    let status_text: String = row.get("status")?;
    let status = status_text.parse::<ParcelStatus>().map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid status `{status_text}` in parcel.status for number {number}"
        ))
    })?;

    Ok(Parcel {
        number,
        client: row.get("client")?,
        status,
        address: row.get("address")?,
        created_at: row.get("created_at")?,
    })
}

fn ensure_parcel_table(conn: &Connection) -> RepoResult<()> {
    let table_exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [PARCEL_TABLE],
        |row| row.get(0),
    )?;
    if table_exists == 0 {
        return Err(RepoError::MissingRequiredTable(PARCEL_TABLE));
    }

    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    let present = stmt
        .query_map([PARCEL_TABLE], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    if let Some(column) = PARCEL_COLUMNS
        .iter()
        .copied()
        .find(|column| !present.iter().any(|name| name == column))
    {
        return Err(RepoError::MissingRequiredColumn {
            table: PARCEL_TABLE,
            column,
        });
    }

    Ok(())
}
