//! SQLite repository implementation.
//!
//! Implements [`AttendanceStore`] from `rsvp_core::storage` using SQLite.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio_rusqlite::Connection;

use rsvp_core::friday::{Friday, Friend, Preferences};
use rsvp_core::storage::{AttendanceStore, DateRange, RepositoryError, Result};

use super::conversions::{
    max_guests_to_sql, parse_preferences, preferences_to_json, row_to_friday, row_to_friend,
};
use super::error::map_tokio_rusqlite_error;
use super::schema;

/// Helper to wrap rusqlite errors for tokio_rusqlite closures.
fn wrap_err(e: rusqlite::Error) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Rusqlite(e)
}

/// Helper to raise a domain error from inside a tokio_rusqlite closure.
fn domain_err(e: RepositoryError) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Other(Box::new(e))
}

/// SQLite-based attendance store.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Opens (or creates) a file-based database and ensures the schema exists.
    pub async fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Creates a repository backed by an in-memory database.
    ///
    /// Useful for testing - data is lost when the connection is dropped.
    pub async fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    async fn init_schema(conn: &Connection) -> Result<()> {
        conn.call(|conn| {
            conn.execute_batch(schema::CREATE_TABLES)
                .map_err(wrap_err)?;
            Ok(())
        })
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))
    }

    async fn query_fridays(&self, sql: &'static str, bounds: Option<(i64, i64)>) -> Result<Vec<Friday>> {
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(sql).map_err(wrap_err)?;
                let rows = match bounds {
                    Some((start, end)) => stmt.query_map([start, end], row_to_friday),
                    None => stmt.query_map([], row_to_friday),
                }
                .map_err(wrap_err)?;

                let mut fridays = Vec::new();
                for row_result in rows {
                    fridays.push(row_result.map_err(wrap_err)?);
                }
                Ok(fridays)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Friday", "*"))
    }
}

#[async_trait]
impl AttendanceStore for SqliteRepository {
    // ========================================================================
    // Friends
    // ========================================================================

    async fn get_friend_by_email(&self, email: &str) -> Result<Friend> {
        let email = email.to_string();
        let friend_id = email.clone();

        self.conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare(schema::SELECT_FRIEND_BY_EMAIL)
                    .map_err(wrap_err)?;
                stmt.query_row([&email], row_to_friend).map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Friend", friend_id))
    }

    async fn get_friend_by_id(&self, id: i64) -> Result<Friend> {
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(schema::SELECT_FRIEND_BY_ID).map_err(wrap_err)?;
                stmt.query_row([id], row_to_friend).map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Friend", id.to_string()))
    }

    async fn add_friend(&self, email: &str, name: &str) -> Result<()> {
        let email = email.to_string();
        let name = name.to_string();
        let friend_id = email.clone();

        self.conn
            .call(move |conn| {
                conn.execute(schema::UPSERT_FRIEND, rusqlite::params![email, name])
                    .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Friend", friend_id))
    }

    async fn remove_friend(&self, email: &str) -> Result<()> {
        let email = email.to_string();
        let friend_id = email.clone();

        self.conn
            .call(move |conn| {
                conn.execute(schema::DELETE_FRIEND, [&email])
                    .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Friend", friend_id))
    }

    async fn list_friends(&self) -> Result<Vec<Friend>> {
        self.conn
            .call(|conn| {
                let mut stmt = conn.prepare(schema::SELECT_ALL_FRIENDS).map_err(wrap_err)?;
                let rows = stmt.query_map([], row_to_friend).map_err(wrap_err)?;

                let mut friends = Vec::new();
                for row_result in rows {
                    friends.push(row_result.map_err(wrap_err)?);
                }
                Ok(friends)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Friend", "*"))
    }

    async fn get_preferences(&self, email: &str) -> Result<Preferences> {
        let email = email.to_string();
        let friend_id = email.clone();

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(schema::SELECT_PREFERENCES).map_err(wrap_err)?;
                let json: String = stmt
                    .query_row([&email], |row| row.get(0))
                    .map_err(wrap_err)?;
                parse_preferences(0, &json).map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Friend", friend_id))
    }

    async fn set_preferences(&self, email: &str, preferences: &Preferences) -> Result<()> {
        let json = preferences_to_json(preferences)?;
        let email = email.to_string();
        let friend_id = email.clone();

        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(schema::UPDATE_PREFERENCES, rusqlite::params![email, json])
                    .map_err(wrap_err)?;
                if rows == 0 {
                    Err(wrap_err(rusqlite::Error::QueryReturnedNoRows))
                } else {
                    Ok(())
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Friend", friend_id))
    }

    // ========================================================================
    // Fridays
    // ========================================================================

    async fn get_upcoming_fridays_after(
        &self,
        after: DateTime<Utc>,
        days_ahead: u32,
    ) -> Result<Vec<Friday>> {
        let window = DateRange::ahead(after, days_ahead)
            .map_err(|e| RepositoryError::InvalidData(e.to_string()))?;

        self.query_fridays(
            schema::SELECT_FRIDAYS_BETWEEN,
            Some((window.start.timestamp(), window.end.timestamp())),
        )
        .await
    }

    async fn does_friday_exist(&self, date: DateTime<Utc>) -> Result<bool> {
        let start_time = date.timestamp();

        self.conn
            .call(move |conn| {
                conn.query_row(schema::FRIDAY_EXISTS, [start_time], |row| row.get(0))
                    .map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Friday", start_time.to_string()))
    }

    async fn add_friday(&self, friday: &Friday) -> Result<()> {
        let start_time = friday.date.timestamp();
        let group = friday.group.clone();
        let details = friday.details.clone();
        let max_guests = max_guests_to_sql(friday.max_guests)?;
        let enabled = friday.enabled;

        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_FRIDAY,
                    rusqlite::params![start_time, group, details, max_guests, enabled],
                )
                .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Friday", start_time.to_string()))
    }

    async fn get_friday(&self, date: DateTime<Utc>) -> Result<Friday> {
        let start_time = date.timestamp();

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(schema::SELECT_FRIDAY).map_err(wrap_err)?;
                stmt.query_row([start_time], row_to_friday).map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Friday", start_time.to_string()))
    }

    async fn update_friday(&self, friday: &Friday) -> Result<()> {
        let start_time = friday.date.timestamp();
        let group = friday.group.clone();
        let details = friday.details.clone();
        let max_guests = max_guests_to_sql(friday.max_guests)?;
        let enabled = friday.enabled;

        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(
                        schema::UPDATE_FRIDAY,
                        rusqlite::params![start_time, group, details, max_guests, enabled],
                    )
                    .map_err(wrap_err)?;
                if rows == 0 {
                    Err(wrap_err(rusqlite::Error::QueryReturnedNoRows))
                } else {
                    Ok(())
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Friday", start_time.to_string()))
    }

    async fn remove_friday(&self, date: DateTime<Utc>) -> Result<()> {
        let start_time = date.timestamp();

        self.conn
            .call(move |conn| {
                conn.execute(schema::DELETE_FRIDAY, [start_time])
                    .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Friday", start_time.to_string()))
    }

    async fn list_fridays(&self) -> Result<Vec<Friday>> {
        self.query_fridays(schema::SELECT_ALL_FRIDAYS, None).await
    }

    async fn add_friend_to_friday(&self, email: &str, friday: &Friday) -> Result<()> {
        let email = email.to_string();
        let start_time = friday.date.timestamp();

        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(schema::APPEND_GUEST, rusqlite::params![email, start_time])
                    .map_err(wrap_err)?;
                if rows == 1 {
                    return Ok(());
                }

                // Nothing changed: find out whether that was success or refusal.
                let (present, count, max_guests): (bool, i64, i64) = conn
                    .query_row(
                        schema::GUEST_STATE,
                        rusqlite::params![email, start_time],
                        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
                    )
                    .map_err(wrap_err)?;

                if present {
                    Ok(())
                } else if count >= max_guests {
                    Err(domain_err(RepositoryError::CapacityReached {
                        id: start_time.to_string(),
                        max_guests: usize::try_from(max_guests).unwrap_or_default(),
                    }))
                } else {
                    Err(domain_err(RepositoryError::QueryFailed(format!(
                        "guest list for {start_time} was not updated"
                    ))))
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Friday", start_time.to_string()))
    }

    async fn remove_friend_from_friday(&self, email: &str, date: DateTime<Utc>) -> Result<()> {
        let email = email.to_string();
        let start_time = date.timestamp();

        self.conn
            .call(move |conn| {
                conn.execute(schema::REMOVE_GUEST, rusqlite::params![email, start_time])
                    .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Friday", start_time.to_string()))
    }
}
