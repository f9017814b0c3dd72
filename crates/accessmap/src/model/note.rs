//! Crowd-sourced accessibility notes and their photos.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::geo::{LatLng, Located};

/// Lowest note rating.
pub const MIN_RATING: u8 = 1;

/// Highest note rating.
pub const MAX_RATING: u8 = 5;

/// Kind of facility a note is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacilityType {
    /// A lift.
    Lift,
    /// A footbridge.
    Footbridge,
    /// A zebra crossing.
    ZebraCrossing,
    /// An MTR station.
    MtrStation,
    /// A bus stop.
    BusStop,
    /// Anything else.
    General,
}

impl FacilityType {
    /// The stored representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lift => "lift",
            Self::Footbridge => "footbridge",
            Self::ZebraCrossing => "zebra_crossing",
            Self::MtrStation => "mtr_station",
            Self::BusStop => "bus_stop",
            Self::General => "general",
        }
    }
}

impl fmt::Display for FacilityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FacilityType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lift" => Ok(Self::Lift),
            "footbridge" => Ok(Self::Footbridge),
            "zebra_crossing" => Ok(Self::ZebraCrossing),
            "mtr_station" => Ok(Self::MtrStation),
            "bus_stop" => Ok(Self::BusStop),
            "general" => Ok(Self::General),
            other => Err(Error::validation(
                "facilityType",
                format!("unknown facility type '{other}'"),
            )),
        }
    }
}

/// Observed condition of a facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteCondition {
    /// No problems.
    Excellent,
    /// Minor wear.
    Good,
    /// Usable with some difficulty.
    Fair,
    /// Hard to use.
    Poor,
    /// Not usable by wheelchair users.
    Inaccessible,
}

impl NoteCondition {
    /// The stored representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
            Self::Inaccessible => "inaccessible",
        }
    }
}

impl fmt::Display for NoteCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoteCondition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "excellent" => Ok(Self::Excellent),
            "good" => Ok(Self::Good),
            "fair" => Ok(Self::Fair),
            "poor" => Ok(Self::Poor),
            "inaccessible" => Ok(Self::Inaccessible),
            other => Err(Error::validation(
                "condition",
                format!("unknown condition '{other}'"),
            )),
        }
    }
}

/// A user-submitted note about a place's accessibility.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessibilityNote {
    /// Row id.
    pub id: i64,
    /// Author.
    pub user_id: i64,
    /// Kind of facility.
    pub facility_type: FacilityType,
    /// Facility row id, when the note is about a known facility.
    pub facility_id: Option<i64>,
    /// Where the note was taken.
    pub location_name: String,
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
    /// Rating from 1 to 5.
    pub rating: u8,
    /// Observed condition.
    pub condition: NoteCondition,
    /// Free-text comment.
    pub comment: String,
    /// Written by an administrator.
    pub is_verified: bool,
    /// When the note was submitted.
    pub created_at: DateTime<Utc>,
    /// When the note was last modified.
    pub updated_at: DateTime<Utc>,
}

/// Payload for submitting a note.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccessibilityNote {
    /// Author.
    pub user_id: i64,
    /// Kind of facility.
    pub facility_type: FacilityType,
    /// Facility row id.
    pub facility_id: Option<i64>,
    /// Where the note was taken.
    pub location_name: String,
    /// Position of the note.
    pub position: LatLng,
    /// Rating from 1 to 5.
    pub rating: u8,
    /// Observed condition.
    pub condition: NoteCondition,
    /// Free-text comment.
    pub comment: String,
    /// Written by an administrator.
    pub is_verified: bool,
}

impl NewAccessibilityNote {
    /// Check the rating and text fields.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an out-of-range rating or a blank
    /// location name.
    pub fn validate(&self) -> Result<(), Error> {
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(Error::validation(
                "rating",
                format!("must be between {MIN_RATING} and {MAX_RATING}"),
            ));
        }
        if self.location_name.trim().is_empty() {
            return Err(Error::validation("locationName", "cannot be empty"));
        }
        Ok(())
    }
}

/// A photo attached to a note.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotePhoto {
    /// Row id.
    pub id: i64,
    /// Note the photo belongs to.
    pub note_id: i64,
    /// Public URL of the stored image.
    pub photo_url: String,
    /// Object-store key of the image.
    pub photo_key: String,
    /// Caption.
    pub caption: Option<String>,
    /// Uploader.
    pub uploaded_by: i64,
    /// When the photo was attached.
    pub created_at: DateTime<Utc>,
}

/// Payload for attaching a photo.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotePhoto {
    /// Note the photo belongs to.
    pub note_id: i64,
    /// Public URL of the stored image.
    pub photo_url: String,
    /// Object-store key of the image.
    pub photo_key: String,
    /// Caption.
    pub caption: Option<String>,
    /// Uploader.
    pub uploaded_by: i64,
}

impl Located for AccessibilityNote {
    fn position(&self) -> Option<LatLng> {
        Some(LatLng {
            latitude: self.latitude,
            longitude: self.longitude,
        })
    }
}
