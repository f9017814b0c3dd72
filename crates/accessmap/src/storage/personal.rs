//! Per-user records: saved locations and route history.

use rusqlite::{params, Row};

use super::values::{get_timestamp, now};
use super::Storage;
use crate::error::{Error, Result};
use crate::model::{NewRouteHistory, NewSavedLocation, RouteHistoryEntry, SavedLocation};

const SAVED_LOCATION_COLUMNS: &str = "id, user_id, name, address, latitude, longitude, \
     category, notes, created_at, updated_at";

const ROUTE_HISTORY_COLUMNS: &str = "id, user_id, from_address, to_address, from_latitude, \
     from_longitude, to_latitude, to_longitude, distance, duration, route_data, created_at";

impl Storage {
    /// A user's saved locations, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn saved_locations(&self, user_id: i64) -> Result<Vec<SavedLocation>> {
        self.query_rows(
            &format!(
                "SELECT {SAVED_LOCATION_COLUMNS} FROM saved_locations \
                 WHERE user_id = ?1 ORDER BY id"
            ),
            [user_id],
            row_to_saved_location,
        )
    }

    /// Save a location and return its row id.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank name, or an error if the
    /// insert fails.
    pub fn add_saved_location(&self, location: &NewSavedLocation) -> Result<i64> {
        if location.name.trim().is_empty() {
            return Err(Error::validation("name", "cannot be empty"));
        }
        self.conn.execute(
            r"
            INSERT INTO saved_locations (user_id, name, address, latitude, longitude, category,
                                         notes, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
            ",
            params![
                location.user_id,
                location.name,
                location.address,
                location.position.latitude,
                location.position.longitude,
                location.category,
                location.notes,
                now(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Delete a saved location owned by `user_id`.
    ///
    /// Returns `false` when the location does not exist or belongs to
    /// someone else.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_saved_location(&self, id: i64, user_id: i64) -> Result<bool> {
        let affected = self.conn.execute(
            "DELETE FROM saved_locations WHERE id = ?1 AND user_id = ?2",
            [id, user_id],
        )?;
        Ok(affected > 0)
    }

    /// A user's most recent routes, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn route_history(&self, user_id: i64, limit: usize) -> Result<Vec<RouteHistoryEntry>> {
        let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);
        self.query_rows(
            &format!(
                "SELECT {ROUTE_HISTORY_COLUMNS} FROM route_history \
                 WHERE user_id = ?1 ORDER BY created_at DESC, id DESC LIMIT ?2"
            ),
            [user_id, limit_i64],
            row_to_route,
        )
    }

    /// Record a planned route and return its row id.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn add_route_history(&self, route: &NewRouteHistory) -> Result<i64> {
        self.conn.execute(
            r"
            INSERT INTO route_history (user_id, from_address, to_address, from_latitude,
                                       from_longitude, to_latitude, to_longitude, distance,
                                       duration, route_data, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ",
            params![
                route.user_id,
                route.from_address,
                route.to_address,
                route.from.latitude,
                route.from.longitude,
                route.to.latitude,
                route.to.longitude,
                route.distance,
                route.duration,
                route.route_data,
                now(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }
}

fn row_to_saved_location(row: &Row<'_>) -> rusqlite::Result<SavedLocation> {
    Ok(SavedLocation {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        address: row.get(3)?,
        latitude: row.get(4)?,
        longitude: row.get(5)?,
        category: row.get(6)?,
        notes: row.get(7)?,
        created_at: get_timestamp(row, 8)?,
        updated_at: get_timestamp(row, 9)?,
    })
}

fn row_to_route(row: &Row<'_>) -> rusqlite::Result<RouteHistoryEntry> {
    Ok(RouteHistoryEntry {
        id: row.get(0)?,
        user_id: row.get(1)?,
        from_address: row.get(2)?,
        to_address: row.get(3)?,
        from_latitude: row.get(4)?,
        from_longitude: row.get(5)?,
        to_latitude: row.get(6)?,
        to_longitude: row.get(7)?,
        distance: row.get(8)?,
        duration: row.get(9)?,
        route_data: row.get(10)?,
        created_at: get_timestamp(row, 11)?,
    })
}
