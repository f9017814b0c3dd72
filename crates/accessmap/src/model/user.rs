//! Users, their display preferences, saved locations and route history.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::geo::{LatLng, Located};

/// Authorization role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular user.
    #[default]
    User,
    /// Administrator; submissions are marked verified.
    Admin,
}

impl Role {
    /// The stored representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(Error::validation("role", format!("unknown role '{other}'"))),
        }
    }
}

/// Preferred interface text size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FontSize {
    /// Standard size.
    #[serde(rename = "normal")]
    Normal,
    /// Enlarged text.
    #[default]
    #[serde(rename = "large")]
    Large,
    /// Largest text.
    #[serde(rename = "extra-large")]
    ExtraLarge,
}

impl FontSize {
    /// The stored representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Large => "large",
            Self::ExtraLarge => "extra-large",
        }
    }
}

impl fmt::Display for FontSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FontSize {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Self::Normal),
            "large" => Ok(Self::Large),
            "extra-large" => Ok(Self::ExtraLarge),
            other => Err(Error::validation(
                "fontSize",
                format!("unknown font size '{other}'"),
            )),
        }
    }
}

/// A signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Row id.
    pub id: i64,
    /// Identity-provider subject, unique.
    pub open_id: String,
    /// Display name.
    pub name: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// How the user signed in.
    pub login_method: Option<String>,
    /// Authorization role.
    pub role: Role,
    /// Preferred text size.
    pub font_size: FontSize,
    /// High-contrast theme enabled.
    pub high_contrast: bool,
    /// Spoken navigation enabled.
    pub voice_navigation: bool,
    /// When the user first signed in.
    pub created_at: DateTime<Utc>,
    /// When the row was last modified.
    pub updated_at: DateTime<Utc>,
    /// Most recent sign-in.
    pub last_signed_in: DateTime<Utc>,
}

impl User {
    /// Whether the user is an administrator.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Reporter tag used on submissions.
    #[must_use]
    pub fn reporter_tag(&self) -> String {
        format!("user:{}", self.id)
    }
}

/// Fields to create or refresh a user on sign-in.
///
/// `None` leaves the stored value untouched on update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpsert {
    /// Identity-provider subject.
    pub open_id: String,
    /// Display name.
    pub name: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// How the user signed in.
    pub login_method: Option<String>,
    /// Explicit role.
    pub role: Option<Role>,
}

/// Partial update of display preferences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    /// Preferred text size.
    #[serde(default)]
    pub font_size: Option<FontSize>,
    /// High-contrast theme.
    #[serde(default)]
    pub high_contrast: Option<bool>,
    /// Spoken navigation.
    #[serde(default)]
    pub voice_navigation: Option<bool>,
}

impl Preferences {
    /// True when no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.font_size.is_none() && self.high_contrast.is_none() && self.voice_navigation.is_none()
    }
}

/// A place a user bookmarked.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedLocation {
    /// Row id.
    pub id: i64,
    /// Owner.
    pub user_id: i64,
    /// Label.
    pub name: String,
    /// Street address.
    pub address: Option<String>,
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
    /// e.g. `home`, `work`, `favorite`.
    pub category: Option<String>,
    /// Free-text notes.
    pub notes: Option<String>,
    /// When the location was saved.
    pub created_at: DateTime<Utc>,
    /// When the row was last modified.
    pub updated_at: DateTime<Utc>,
}

/// Payload for saving a location.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSavedLocation {
    /// Owner.
    pub user_id: i64,
    /// Label.
    pub name: String,
    /// Street address.
    pub address: Option<String>,
    /// Position.
    pub position: LatLng,
    /// Category.
    pub category: Option<String>,
    /// Free-text notes.
    pub notes: Option<String>,
}

/// A route the user planned.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteHistoryEntry {
    /// Row id.
    pub id: i64,
    /// Owner.
    pub user_id: i64,
    /// Start address as shown to the user.
    pub from_address: String,
    /// End address as shown to the user.
    pub to_address: String,
    /// Start latitude.
    pub from_latitude: f64,
    /// Start longitude.
    pub from_longitude: f64,
    /// End latitude.
    pub to_latitude: f64,
    /// End longitude.
    pub to_longitude: f64,
    /// Route length as reported by the directions service.
    pub distance: Option<f64>,
    /// Travel time in seconds.
    pub duration: Option<i64>,
    /// Opaque serialized route from the directions service.
    pub route_data: Option<String>,
    /// When the route was planned.
    pub created_at: DateTime<Utc>,
}

/// Payload for recording a planned route.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRouteHistory {
    /// Owner.
    pub user_id: i64,
    /// Start address.
    pub from_address: String,
    /// End address.
    pub to_address: String,
    /// Start position.
    pub from: LatLng,
    /// End position.
    pub to: LatLng,
    /// Route length.
    pub distance: Option<f64>,
    /// Travel time in seconds.
    pub duration: Option<i64>,
    /// Opaque serialized route.
    pub route_data: Option<String>,
}

impl Located for SavedLocation {
    fn position(&self) -> Option<LatLng> {
        Some(LatLng {
            latitude: self.latitude,
            longitude: self.longitude,
        })
    }
}
