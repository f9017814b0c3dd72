//! User accounts and sign-in sessions.
//!
//! Session tokens are random strings handed to the client once. Only their
//! blake3 hash is stored, so a leaked database cannot be replayed.

use std::time::Duration;

use chrono::Utc;
use rand::distr::Alphanumeric;
use rand::Rng;
use rusqlite::{params, OptionalExtension, Row};
use tracing::{debug, info};

use super::values::{get_timestamp, now, timestamp};
use super::Storage;
use crate::config::MAX_SESSION_TTL_HOURS;
use crate::error::{Error, Result};
use crate::model::{Preferences, Role, User, UserUpsert};

/// Length of an issued session token.
const TOKEN_LENGTH: usize = 43;

const USER_COLUMNS: &str = "users.id, users.open_id, users.name, users.email, \
     users.login_method, users.role, users.font_size, users.high_contrast, \
     users.voice_navigation, users.created_at, users.updated_at, users.last_signed_in";

/// Hash a session token for storage.
fn hash_token(token: &str) -> String {
    blake3::hash(token.as_bytes()).to_hex().to_string()
}

impl Storage {
    /// Create or refresh a user on sign-in.
    ///
    /// Fields left as `None` keep their stored values. When no role is
    /// given, the user whose open id equals `owner_open_id` becomes an
    /// admin; everyone else keeps their current role (`user` for new rows).
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty open id, or an error if the
    /// database operation fails.
    pub fn upsert_user(&self, upsert: &UserUpsert, owner_open_id: Option<&str>) -> Result<User> {
        if upsert.open_id.trim().is_empty() {
            return Err(Error::validation("openId", "cannot be empty"));
        }

        let role = upsert
            .role
            .or_else(|| (owner_open_id == Some(upsert.open_id.as_str())).then_some(Role::Admin));
        let now = now();

        self.conn.execute(
            r"
            INSERT INTO users (open_id, name, email, login_method, role,
                               created_at, updated_at, last_signed_in)
            VALUES (?1, ?2, ?3, ?4, COALESCE(?5, 'user'), ?6, ?6, ?6)
            ON CONFLICT(open_id) DO UPDATE SET
                name = COALESCE(excluded.name, users.name),
                email = COALESCE(excluded.email, users.email),
                login_method = COALESCE(excluded.login_method, users.login_method),
                role = COALESCE(?5, users.role),
                updated_at = excluded.updated_at,
                last_signed_in = excluded.last_signed_in
            ",
            params![
                upsert.open_id,
                upsert.name,
                upsert.email,
                upsert.login_method,
                role,
                now,
            ],
        )?;

        debug!("Upserted user {}", upsert.open_id);
        self.user_by_open_id(&upsert.open_id)?
            .ok_or_else(|| Error::internal(format!("user {} vanished after upsert", upsert.open_id)))
    }

    /// Look up a user by identity-provider subject.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn user_by_open_id(&self, open_id: &str) -> Result<Option<User>> {
        let user = self
            .conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE open_id = ?1"),
                [open_id],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    /// Look up a user by row id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn user_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = self
            .conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                [id],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    /// Apply a partial preferences update and return the updated user.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown user, or an error if the
    /// database operation fails.
    pub fn update_preferences(&self, user_id: i64, prefs: &Preferences) -> Result<User> {
        let affected = self.conn.execute(
            r"
            UPDATE users SET
                font_size = COALESCE(?1, font_size),
                high_contrast = COALESCE(?2, high_contrast),
                voice_navigation = COALESCE(?3, voice_navigation),
                updated_at = ?4
            WHERE id = ?5
            ",
            params![
                prefs.font_size,
                prefs.high_contrast,
                prefs.voice_navigation,
                now(),
                user_id,
            ],
        )?;
        if affected == 0 {
            return Err(Error::not_found("user", user_id));
        }
        self.user_by_id(user_id)?
            .ok_or_else(|| Error::not_found("user", user_id))
    }

    // === Sessions ===

    /// Issue a session for `user_id` valid for `ttl`, returning the raw token.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `ttl` exceeds [`MAX_SESSION_TTL_HOURS`],
    /// or an error if the insert fails.
    pub fn create_session(&self, user_id: i64, ttl: Duration) -> Result<String> {
        if ttl > Duration::from_secs(u64::from(MAX_SESSION_TTL_HOURS) * 60 * 60) {
            return Err(Error::validation(
                "sessionTtl",
                format!("{} hours is longer than {MAX_SESSION_TTL_HOURS}", ttl.as_secs() / 3600),
            ));
        }
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|_| Error::internal("session lifetime out of range"))?;
        let created = Utc::now();
        let expires = created
            .checked_add_signed(ttl)
            .ok_or_else(|| Error::internal("session expiry overflows"))?;

        let token: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LENGTH)
            .map(char::from)
            .collect();

        self.conn.execute(
            "INSERT INTO sessions (token_hash, user_id, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
            params![hash_token(&token), user_id, timestamp(created), timestamp(expires)],
        )?;

        debug!("Issued session for user {} until {}", user_id, expires);
        Ok(token)
    }

    /// Resolve a session token to its user, if the session is unexpired.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn user_for_session(&self, token: &str) -> Result<Option<User>> {
        let user = self
            .conn
            .query_row(
                &format!(
                    "SELECT {USER_COLUMNS} FROM sessions \
                     JOIN users ON users.id = sessions.user_id \
                     WHERE sessions.token_hash = ?1 AND sessions.expires_at > ?2"
                ),
                params![hash_token(token), now()],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    /// Revoke a session. Returns `true` if it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_session(&self, token: &str) -> Result<bool> {
        let affected = self.conn.execute(
            "DELETE FROM sessions WHERE token_hash = ?1",
            [hash_token(token)],
        )?;
        Ok(affected > 0)
    }

    /// Revoke every session of a user. Returns the number removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_user_sessions(&self, user_id: i64) -> Result<usize> {
        let affected = self
            .conn
            .execute("DELETE FROM sessions WHERE user_id = ?1", [user_id])?;
        Ok(affected)
    }

    /// Delete expired sessions. Returns the number removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn prune_expired_sessions(&self) -> Result<usize> {
        let affected = self
            .conn
            .execute("DELETE FROM sessions WHERE expires_at <= ?1", [now()])?;

        if affected > 0 {
            info!("Pruned {} expired sessions", affected);
        }
        Ok(affected)
    }
}

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        open_id: row.get(1)?,
        name: row.get(2)?,
        email: row.get(3)?,
        login_method: row.get(4)?,
        role: row.get(5)?,
        font_size: row.get(6)?,
        high_contrast: row.get(7)?,
        voice_navigation: row.get(8)?,
        created_at: get_timestamp(row, 9)?,
        updated_at: get_timestamp(row, 10)?,
        last_signed_in: get_timestamp(row, 11)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FontSize;
    use crate::storage::test_support::{storage, user};

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    #[test]
    fn test_new_user_defaults() {
        let storage = storage();
        let user = user(&storage, "alice");

        assert_eq!(user.role, Role::User);
        assert_eq!(user.font_size, FontSize::Large);
        assert!(user.high_contrast);
        assert!(user.voice_navigation);
        assert_eq!(user.name.as_deref(), Some("alice name"));
    }

    #[test]
    fn test_upsert_keeps_unspecified_fields() {
        let storage = storage();
        let first = storage
            .upsert_user(
                &UserUpsert {
                    open_id: "bob".to_string(),
                    name: Some("Bob".to_string()),
                    email: Some("bob@example.com".to_string()),
                    ..UserUpsert::default()
                },
                None,
            )
            .unwrap();

        let second = storage
            .upsert_user(
                &UserUpsert {
                    open_id: "bob".to_string(),
                    login_method: Some("email".to_string()),
                    ..UserUpsert::default()
                },
                None,
            )
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.name.as_deref(), Some("Bob"));
        assert_eq!(second.email.as_deref(), Some("bob@example.com"));
        assert_eq!(second.login_method.as_deref(), Some("email"));
        assert!(second.last_signed_in >= first.last_signed_in);
    }

    #[test]
    fn test_owner_is_promoted_to_admin() {
        let storage = storage();
        let owner = storage
            .upsert_user(
                &UserUpsert {
                    open_id: "owner".to_string(),
                    ..UserUpsert::default()
                },
                Some("owner"),
            )
            .unwrap();
        assert!(owner.is_admin());

        let other = storage
            .upsert_user(
                &UserUpsert {
                    open_id: "someone".to_string(),
                    ..UserUpsert::default()
                },
                Some("owner"),
            )
            .unwrap();
        assert!(!other.is_admin());
    }

    #[test]
    fn test_explicit_role_wins_and_sticks() {
        let storage = storage();
        storage
            .upsert_user(
                &UserUpsert {
                    open_id: "carol".to_string(),
                    role: Some(Role::Admin),
                    ..UserUpsert::default()
                },
                None,
            )
            .unwrap();

        let again = user(&storage, "carol");
        assert!(again.is_admin());
    }

    #[test]
    fn test_empty_open_id_rejected() {
        let storage = storage();
        let err = storage
            .upsert_user(&UserUpsert::default(), None)
            .unwrap_err();
        assert!(err.is_validation_error());
    }

    #[test]
    fn test_update_preferences_partial() {
        let storage = storage();
        let user = user(&storage, "dave");

        let updated = storage
            .update_preferences(
                user.id,
                &Preferences {
                    font_size: Some(FontSize::ExtraLarge),
                    ..Preferences::default()
                },
            )
            .unwrap();
        assert_eq!(updated.font_size, FontSize::ExtraLarge);
        assert!(updated.high_contrast);

        let updated = storage
            .update_preferences(
                user.id,
                &Preferences {
                    high_contrast: Some(false),
                    ..Preferences::default()
                },
            )
            .unwrap();
        assert_eq!(updated.font_size, FontSize::ExtraLarge);
        assert!(!updated.high_contrast);
        assert!(updated.voice_navigation);
    }

    #[test]
    fn test_update_preferences_unknown_user() {
        let storage = storage();
        let err = storage
            .update_preferences(42, &Preferences::default())
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { entity: "user", .. }));
    }

    #[test]
    fn test_session_round_trip() {
        let storage = storage();
        let user = user(&storage, "erin");

        let token = storage.create_session(user.id, DAY).unwrap();
        assert_eq!(token.len(), TOKEN_LENGTH);

        let resolved = storage.user_for_session(&token).unwrap().unwrap();
        assert_eq!(resolved.id, user.id);
        assert!(storage.user_for_session("not-a-token").unwrap().is_none());

        assert!(storage.delete_session(&token).unwrap());
        assert!(!storage.delete_session(&token).unwrap());
        assert!(storage.user_for_session(&token).unwrap().is_none());
    }

    #[test]
    fn test_tokens_are_stored_hashed() {
        let storage = storage();
        let user = user(&storage, "frank");
        let token = storage.create_session(user.id, DAY).unwrap();

        let stored: String = storage
            .conn
            .query_row("SELECT token_hash FROM sessions", [], |row| row.get(0))
            .unwrap();
        assert_ne!(stored, token);
        assert_eq!(stored, hash_token(&token));
    }

    #[test]
    fn test_expired_sessions_are_ignored_and_pruned() {
        let storage = storage();
        let user = user(&storage, "grace");
        let token = storage.create_session(user.id, Duration::ZERO).unwrap();
        let live = storage.create_session(user.id, DAY).unwrap();

        assert!(storage.user_for_session(&token).unwrap().is_none());
        assert_eq!(storage.prune_expired_sessions().unwrap(), 1);
        assert!(storage.user_for_session(&live).unwrap().is_some());
    }

    #[test]
    fn test_session_lifetime_is_capped() {
        let storage = storage();
        let user = user(&storage, "ivan");
        let longest = Duration::from_secs(u64::from(MAX_SESSION_TTL_HOURS) * 60 * 60);

        let token = storage.create_session(user.id, longest).unwrap();
        assert!(storage.user_for_session(&token).unwrap().is_some());

        let err = storage
            .create_session(user.id, Duration::from_secs(u64::from(u32::MAX) * 60 * 60))
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }), "{err}");
        assert_eq!(storage.count("sessions").unwrap(), 1);
    }

    #[test]
    fn test_delete_user_sessions() {
        let storage = storage();
        let user = user(&storage, "heidi");
        storage.create_session(user.id, DAY).unwrap();
        storage.create_session(user.id, DAY).unwrap();

        assert_eq!(storage.delete_user_sessions(user.id).unwrap(), 2);
        assert_eq!(storage.count("sessions").unwrap(), 0);
    }
}
