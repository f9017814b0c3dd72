//! Accessibility notes and the photos attached to them.

use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

use super::values::{get_timestamp, now};
use super::Storage;
use crate::error::{Error, Result};
use crate::geo::{within_radius, LatLng};
use crate::model::{AccessibilityNote, FacilityType, NewAccessibilityNote, NewNotePhoto, NotePhoto};

const NOTE_COLUMNS: &str = "id, user_id, facility_type, facility_id, location_name, latitude, \
     longitude, rating, condition, comment, is_verified, created_at, updated_at";

const PHOTO_COLUMNS: &str =
    "id, note_id, photo_url, photo_key, caption, uploaded_by, created_at";

impl Storage {
    /// Notes within `radius_km` of `center`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn notes_near(&self, center: LatLng, radius_km: f64) -> Result<Vec<AccessibilityNote>> {
        let candidates = self.query_rows(
            &format!("SELECT {NOTE_COLUMNS} FROM accessibility_notes ORDER BY id"),
            [],
            row_to_note,
        )?;
        Ok(within_radius(candidates, center, radius_km))
    }

    /// Notes about one facility, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn notes_for_facility(
        &self,
        facility_type: FacilityType,
        facility_id: i64,
    ) -> Result<Vec<AccessibilityNote>> {
        self.query_rows(
            &format!(
                "SELECT {NOTE_COLUMNS} FROM accessibility_notes \
                 WHERE facility_type = ?1 AND facility_id = ?2 \
                 ORDER BY created_at DESC, id DESC"
            ),
            params![facility_type, facility_id],
            row_to_note,
        )
    }

    /// Notes written by one user, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn notes_by_user(&self, user_id: i64) -> Result<Vec<AccessibilityNote>> {
        self.query_rows(
            &format!(
                "SELECT {NOTE_COLUMNS} FROM accessibility_notes \
                 WHERE user_id = ?1 ORDER BY created_at DESC, id DESC"
            ),
            [user_id],
            row_to_note,
        )
    }

    /// Look up a note by row id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn note(&self, id: i64) -> Result<Option<AccessibilityNote>> {
        let note = self
            .conn
            .query_row(
                &format!("SELECT {NOTE_COLUMNS} FROM accessibility_notes WHERE id = ?1"),
                [id],
                row_to_note,
            )
            .optional()?;
        Ok(note)
    }

    /// Store a note and return its row id.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an out-of-range rating or blank
    /// location name, or an error if the insert fails.
    pub fn add_note(&self, note: &NewAccessibilityNote) -> Result<i64> {
        note.validate()?;
        self.conn.execute(
            r"
            INSERT INTO accessibility_notes (user_id, facility_type, facility_id, location_name,
                                             latitude, longitude, rating, condition, comment,
                                             is_verified, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)
            ",
            params![
                note.user_id,
                note.facility_type,
                note.facility_id,
                note.location_name,
                note.position.latitude,
                note.position.longitude,
                note.rating,
                note.condition,
                note.comment,
                note.is_verified,
                now(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!("Stored note {} about {}", id, note.facility_type);
        Ok(id)
    }

    /// Attach a photo to an existing note and return the photo's row id.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if the note does not exist, or an error if
    /// the insert fails.
    pub fn add_note_photo(&self, photo: &NewNotePhoto) -> Result<i64> {
        if self.note(photo.note_id)?.is_none() {
            return Err(Error::not_found("note", photo.note_id));
        }
        if photo.photo_url.trim().is_empty() {
            return Err(Error::validation("photoUrl", "cannot be empty"));
        }
        self.conn.execute(
            r"
            INSERT INTO note_photos (note_id, photo_url, photo_key, caption, uploaded_by, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
            params![
                photo.note_id,
                photo.photo_url,
                photo.photo_key,
                photo.caption,
                photo.uploaded_by,
                now(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Photos of a note in upload order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn note_photos(&self, note_id: i64) -> Result<Vec<NotePhoto>> {
        self.query_rows(
            &format!("SELECT {PHOTO_COLUMNS} FROM note_photos WHERE note_id = ?1 ORDER BY id"),
            [note_id],
            row_to_photo,
        )
    }
}

fn row_to_note(row: &Row<'_>) -> rusqlite::Result<AccessibilityNote> {
    Ok(AccessibilityNote {
        id: row.get(0)?,
        user_id: row.get(1)?,
        facility_type: row.get(2)?,
        facility_id: row.get(3)?,
        location_name: row.get(4)?,
        latitude: row.get(5)?,
        longitude: row.get(6)?,
        rating: row.get(7)?,
        condition: row.get(8)?,
        comment: row.get(9)?,
        is_verified: row.get(10)?,
        created_at: get_timestamp(row, 11)?,
        updated_at: get_timestamp(row, 12)?,
    })
}

fn row_to_photo(row: &Row<'_>) -> rusqlite::Result<NotePhoto> {
    Ok(NotePhoto {
        id: row.get(0)?,
        note_id: row.get(1)?,
        photo_url: row.get(2)?,
        photo_key: row.get(3)?,
        caption: row.get(4)?,
        uploaded_by: row.get(5)?,
        created_at: get_timestamp(row, 6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NoteCondition;
    use crate::storage::test_support::{storage, user};

    fn note_at(user_id: i64, latitude: f64, longitude: f64) -> NewAccessibilityNote {
        NewAccessibilityNote {
            user_id,
            facility_type: FacilityType::Lift,
            facility_id: Some(1),
            location_name: "Central Lift".to_string(),
            position: LatLng {
                latitude,
                longitude,
            },
            rating: 4,
            condition: NoteCondition::Good,
            comment: "Door closes quickly".to_string(),
            is_verified: false,
        }
    }

    fn photo(note_id: i64, uploaded_by: i64) -> NewNotePhoto {
        NewNotePhoto {
            note_id,
            photo_url: "https://cdn.example.com/notes/1.jpg".to_string(),
            photo_key: "notes/1.jpg".to_string(),
            caption: Some("Entrance".to_string()),
            uploaded_by,
        }
    }

    #[test]
    fn test_add_and_get_note() {
        let storage = storage();
        let alice = user(&storage, "alice");
        let id = storage.add_note(&note_at(alice.id, 22.2819, 114.1578)).unwrap();

        let note = storage.note(id).unwrap().unwrap();
        assert_eq!(note.rating, 4);
        assert_eq!(note.condition, NoteCondition::Good);
        assert_eq!(note.facility_type, FacilityType::Lift);
        assert!(!note.is_verified);
    }

    #[test]
    fn test_add_note_rejects_bad_rating() {
        let storage = storage();
        let alice = user(&storage, "alice");
        let mut note = note_at(alice.id, 22.2819, 114.1578);
        note.rating = 6;

        assert!(storage.add_note(&note).unwrap_err().is_validation_error());
        assert_eq!(storage.count("accessibility_notes").unwrap(), 0);
    }

    #[test]
    fn test_notes_near() {
        let storage = storage();
        let alice = user(&storage, "alice");
        storage.add_note(&note_at(alice.id, 22.2819, 114.1578)).unwrap();
        storage.add_note(&note_at(alice.id, 22.3193, 114.1694)).unwrap();

        let center = LatLng {
            latitude: 22.2819,
            longitude: 114.1578,
        };
        assert_eq!(storage.notes_near(center, 1.0).unwrap().len(), 1);
        assert_eq!(storage.notes_near(center, 10.0).unwrap().len(), 2);
    }

    #[test]
    fn test_notes_for_facility_and_user() {
        let storage = storage();
        let alice = user(&storage, "alice");
        let bob = user(&storage, "bob");

        let first = storage.add_note(&note_at(alice.id, 22.28, 114.15)).unwrap();
        let second = storage.add_note(&note_at(bob.id, 22.28, 114.15)).unwrap();
        let mut general = note_at(alice.id, 22.28, 114.15);
        general.facility_type = FacilityType::General;
        general.facility_id = None;
        storage.add_note(&general).unwrap();

        let lift_notes = storage.notes_for_facility(FacilityType::Lift, 1).unwrap();
        let ids: Vec<_> = lift_notes.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![second, first]);
        assert!(storage
            .notes_for_facility(FacilityType::Footbridge, 1)
            .unwrap()
            .is_empty());

        assert_eq!(storage.notes_by_user(alice.id).unwrap().len(), 2);
        assert_eq!(storage.notes_by_user(bob.id).unwrap().len(), 1);
    }

    #[test]
    fn test_photos_require_existing_note() {
        let storage = storage();
        let alice = user(&storage, "alice");

        let err = storage.add_note_photo(&photo(99, alice.id)).unwrap_err();
        assert!(matches!(err, Error::NotFound { entity: "note", .. }));

        let note_id = storage.add_note(&note_at(alice.id, 22.28, 114.15)).unwrap();
        storage.add_note_photo(&photo(note_id, alice.id)).unwrap();
        storage.add_note_photo(&photo(note_id, alice.id)).unwrap();

        let photos = storage.note_photos(note_id).unwrap();
        assert_eq!(photos.len(), 2);
        assert_eq!(photos[0].caption.as_deref(), Some("Entrance"));
        assert!(storage.note_photos(note_id + 1).unwrap().is_empty());
    }
}
