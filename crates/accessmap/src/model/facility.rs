//! Accessibility facilities: lifts, footbridges, zebra crossings, the
//! pedestrian network, lift status reports and popular destinations.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::optional_position;
use crate::error::Error;
use crate::geo::{LatLng, Located};

/// A lift (elevator) serving pedestrians.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lift {
    /// Row id.
    pub id: i64,
    /// Operator-assigned lift number, unique.
    pub lift_number: String,
    /// Human-readable location.
    pub location: String,
    /// Street address.
    pub address: Option<String>,
    /// Administrative district.
    pub district: Option<String>,
    /// Latitude, when surveyed.
    pub latitude: Option<f64>,
    /// Longitude, when surveyed.
    pub longitude: Option<f64>,
    /// Lift category, e.g. `passenger`.
    #[serde(rename = "type")]
    pub lift_type: Option<String>,
    /// Usable by wheelchair users.
    pub is_accessible: bool,
    /// Currently in service.
    pub is_operational: bool,
    /// Date of the last statutory inspection.
    pub last_inspection: Option<DateTime<Utc>>,
    /// Free-text notes.
    pub notes: Option<String>,
    /// When the row was created.
    pub created_at: DateTime<Utc>,
    /// When the row was last modified.
    pub updated_at: DateTime<Utc>,
}

/// Payload for inserting a lift.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLift {
    /// Operator-assigned lift number, unique.
    pub lift_number: String,
    /// Human-readable location.
    pub location: String,
    /// Street address.
    #[serde(default)]
    pub address: Option<String>,
    /// Administrative district.
    #[serde(default)]
    pub district: Option<String>,
    /// Latitude, when surveyed.
    #[serde(default)]
    pub latitude: Option<f64>,
    /// Longitude, when surveyed.
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Lift category.
    #[serde(default, rename = "type")]
    pub lift_type: Option<String>,
    /// Usable by wheelchair users.
    #[serde(default = "default_true")]
    pub is_accessible: bool,
    /// Currently in service.
    #[serde(default = "default_true")]
    pub is_operational: bool,
    /// Date of the last statutory inspection.
    #[serde(default)]
    pub last_inspection: Option<DateTime<Utc>>,
    /// Free-text notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// A pedestrian footbridge.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Footbridge {
    /// Row id.
    pub id: i64,
    /// Highways structure number, unique.
    pub bridge_number: String,
    /// Display name.
    pub name: String,
    /// Human-readable location.
    pub location: String,
    /// Administrative district.
    pub district: Option<String>,
    /// Latitude, when surveyed.
    pub latitude: Option<f64>,
    /// Longitude, when surveyed.
    pub longitude: Option<f64>,
    /// Has a lift.
    pub has_lift: bool,
    /// Has an escalator.
    pub has_escalator: bool,
    /// Has a ramp.
    pub has_ramp: bool,
    /// Step-free end to end.
    pub is_accessible: bool,
    /// Free-text notes.
    pub notes: Option<String>,
    /// When the row was created.
    pub created_at: DateTime<Utc>,
    /// When the row was last modified.
    pub updated_at: DateTime<Utc>,
}

/// Payload for inserting a footbridge.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFootbridge {
    /// Highways structure number, unique.
    pub bridge_number: String,
    /// Display name.
    pub name: String,
    /// Human-readable location.
    pub location: String,
    /// Administrative district.
    #[serde(default)]
    pub district: Option<String>,
    /// Latitude, when surveyed.
    #[serde(default)]
    pub latitude: Option<f64>,
    /// Longitude, when surveyed.
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Has a lift.
    #[serde(default)]
    pub has_lift: bool,
    /// Has an escalator.
    #[serde(default)]
    pub has_escalator: bool,
    /// Has a ramp.
    #[serde(default)]
    pub has_ramp: bool,
    /// Step-free end to end.
    #[serde(default)]
    pub is_accessible: bool,
    /// Free-text notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// A marked (zebra) pedestrian crossing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZebraCrossing {
    /// Row id.
    pub id: i64,
    /// Display name, usually the two streets.
    pub name: String,
    /// Human-readable location.
    pub location: String,
    /// Administrative district.
    pub district: Option<String>,
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
    /// Crossing time can be extended with an Octopus card.
    pub has_octopus_extension: bool,
    /// Has an audible signal.
    pub has_audio_signal: bool,
    /// Width of the crossing in metres.
    pub crossing_width: Option<f64>,
    /// Free-text notes.
    pub notes: Option<String>,
    /// When the row was created.
    pub created_at: DateTime<Utc>,
    /// When the row was last modified.
    pub updated_at: DateTime<Utc>,
}

/// Payload for inserting a zebra crossing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewZebraCrossing {
    /// Display name.
    pub name: String,
    /// Human-readable location.
    pub location: String,
    /// Administrative district.
    #[serde(default)]
    pub district: Option<String>,
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
    /// Crossing time can be extended with an Octopus card.
    #[serde(default)]
    pub has_octopus_extension: bool,
    /// Has an audible signal.
    #[serde(default)]
    pub has_audio_signal: bool,
    /// Width of the crossing in metres.
    #[serde(default)]
    pub crossing_width: Option<f64>,
    /// Free-text notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// A node of the 3D pedestrian network.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PedestrianNode {
    /// Row id.
    pub id: i64,
    /// Network node id, unique.
    pub node_id: String,
    /// Display name.
    pub name: Option<String>,
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
    /// Elevation in metres.
    pub elevation: Option<f64>,
    /// e.g. `crossing`, `junction`, `entrance`.
    pub node_type: Option<String>,
    /// Reachable step-free.
    pub is_accessible: bool,
    /// e.g. `lift`, `escalator`, `ramp`, `stairs`, `level`.
    pub facility_type: Option<String>,
    /// When the row was created.
    pub created_at: DateTime<Utc>,
    /// When the row was last modified.
    pub updated_at: DateTime<Utc>,
}

/// Payload for inserting a pedestrian node.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPedestrianNode {
    /// Network node id, unique.
    pub node_id: String,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
    /// Elevation in metres.
    #[serde(default)]
    pub elevation: Option<f64>,
    /// Node category.
    #[serde(default)]
    pub node_type: Option<String>,
    /// Reachable step-free.
    #[serde(default = "default_true")]
    pub is_accessible: bool,
    /// Vertical circulation at this node.
    #[serde(default)]
    pub facility_type: Option<String>,
}

/// A directed link between two pedestrian nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PedestrianLink {
    /// Row id.
    pub id: i64,
    /// Network link id, unique.
    pub link_id: String,
    /// Network id of the start node.
    pub from_node_id: String,
    /// Network id of the end node.
    pub to_node_id: String,
    /// Length in metres.
    pub distance: f64,
    /// e.g. `footbridge`, `subway`, `street`, `indoor`.
    pub link_type: Option<String>,
    /// Usable by wheelchair users.
    pub is_accessible: bool,
    /// Includes stairs.
    pub has_stairs: bool,
    /// Includes a ramp.
    pub has_ramp: bool,
    /// Includes a lift.
    pub has_lift: bool,
    /// Gradient in percent.
    pub slope: Option<f64>,
    /// e.g. `paved`.
    pub surface: Option<String>,
    /// Clear width in metres.
    pub width: Option<f64>,
    /// When the row was created.
    pub created_at: DateTime<Utc>,
    /// When the row was last modified.
    pub updated_at: DateTime<Utc>,
}

/// Payload for inserting a pedestrian link.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPedestrianLink {
    /// Network link id, unique.
    pub link_id: String,
    /// Network id of the start node.
    pub from_node_id: String,
    /// Network id of the end node.
    pub to_node_id: String,
    /// Length in metres.
    pub distance: f64,
    /// Link category.
    #[serde(default)]
    pub link_type: Option<String>,
    /// Usable by wheelchair users.
    #[serde(default = "default_true")]
    pub is_accessible: bool,
    /// Includes stairs.
    #[serde(default)]
    pub has_stairs: bool,
    /// Includes a ramp.
    #[serde(default)]
    pub has_ramp: bool,
    /// Includes a lift.
    #[serde(default)]
    pub has_lift: bool,
    /// Gradient in percent.
    #[serde(default)]
    pub slope: Option<f64>,
    /// Surface material.
    #[serde(default)]
    pub surface: Option<String>,
    /// Clear width in metres.
    #[serde(default)]
    pub width: Option<f64>,
}

/// Reported state of a lift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiftStatus {
    /// Working normally.
    Operational,
    /// Broken down.
    OutOfService,
    /// Closed for planned works.
    UnderMaintenance,
    /// State could not be determined.
    Unknown,
}

impl LiftStatus {
    /// The stored representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Operational => "operational",
            Self::OutOfService => "out_of_service",
            Self::UnderMaintenance => "under_maintenance",
            Self::Unknown => "unknown",
        }
    }

    /// Whether a lift in this state cannot be used.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::OutOfService | Self::UnderMaintenance)
    }
}

impl fmt::Display for LiftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LiftStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "operational" => Ok(Self::Operational),
            "out_of_service" => Ok(Self::OutOfService),
            "under_maintenance" => Ok(Self::UnderMaintenance),
            "unknown" => Ok(Self::Unknown),
            other => Err(Error::validation(
                "status",
                format!("unknown lift status '{other}'"),
            )),
        }
    }
}

/// A status report filed against a lift.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiftStatusReport {
    /// Row id.
    pub id: i64,
    /// Lift the report is about.
    pub lift_id: i64,
    /// Reported state.
    pub status: LiftStatus,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Expected repair date.
    pub estimated_fix_date: Option<NaiveDate>,
    /// Reporter, `user:<id>` or a system name.
    pub reported_by: String,
    /// Filed by an administrator.
    pub is_verified: bool,
    /// When the report was filed.
    pub created_at: DateTime<Utc>,
}

/// Payload for filing a lift status report.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLiftStatusReport {
    /// Lift the report is about.
    pub lift_id: i64,
    /// Reported state.
    pub status: LiftStatus,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Expected repair date.
    pub estimated_fix_date: Option<NaiveDate>,
    /// Reporter identity.
    pub reported_by: String,
    /// Filed by an administrator.
    pub is_verified: bool,
}

/// A lift whose latest report says it cannot be used.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiftOutage {
    /// The affected lift.
    pub lift: Lift,
    /// The report that took it out of service.
    pub report: LiftStatusReport,
}

/// A popular destination offered as a quick pick.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    /// Row id.
    pub id: i64,
    /// English name.
    pub name: String,
    /// Chinese name.
    pub name_zh: String,
    /// e.g. `Shopping`, `Medical`, `Transport`.
    pub category: String,
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
    /// Accessibility score from 1 to 5.
    pub accessibility_rating: u8,
    /// When the row was created.
    pub created_at: DateTime<Utc>,
}

/// Payload for inserting a destination.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDestination {
    /// English name.
    pub name: String,
    /// Chinese name.
    pub name_zh: String,
    /// Category.
    pub category: String,
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
    /// Accessibility score from 1 to 5.
    pub accessibility_rating: u8,
}

fn default_true() -> bool {
    true
}

impl Located for Lift {
    fn position(&self) -> Option<LatLng> {
        optional_position(self.latitude, self.longitude)
    }
}

impl Located for Footbridge {
    fn position(&self) -> Option<LatLng> {
        optional_position(self.latitude, self.longitude)
    }
}

impl Located for ZebraCrossing {
    fn position(&self) -> Option<LatLng> {
        Some(LatLng {
            latitude: self.latitude,
            longitude: self.longitude,
        })
    }
}

impl Located for PedestrianNode {
    fn position(&self) -> Option<LatLng> {
        Some(LatLng {
            latitude: self.latitude,
            longitude: self.longitude,
        })
    }
}

impl Located for Destination {
    fn position(&self) -> Option<LatLng> {
        Some(LatLng {
            latitude: self.latitude,
            longitude: self.longitude,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lift_status_round_trips_through_str() {
        for status in [
            LiftStatus::Operational,
            LiftStatus::OutOfService,
            LiftStatus::UnderMaintenance,
            LiftStatus::Unknown,
        ] {
            assert_eq!(status.as_str().parse::<LiftStatus>().unwrap(), status);
        }
        assert!("broken".parse::<LiftStatus>().is_err());
    }

    #[test]
    fn test_lift_status_unavailable() {
        assert!(LiftStatus::OutOfService.is_unavailable());
        assert!(LiftStatus::UnderMaintenance.is_unavailable());
        assert!(!LiftStatus::Operational.is_unavailable());
        assert!(!LiftStatus::Unknown.is_unavailable());
    }

    #[test]
    fn test_lift_status_serde_matches_storage() {
        let json = serde_json::to_string(&LiftStatus::UnderMaintenance).unwrap();
        assert_eq!(json, "\"under_maintenance\"");
    }

    #[test]
    fn test_new_lift_defaults() {
        let lift: NewLift = serde_json::from_str(
            r#"{"liftNumber": "HF001-L1", "location": "Central", "type": "passenger"}"#,
        )
        .unwrap();
        assert!(lift.is_accessible);
        assert!(lift.is_operational);
        assert_eq!(lift.lift_type.as_deref(), Some("passenger"));
        assert!(lift.latitude.is_none());
    }

    #[test]
    fn test_new_footbridge_defaults_to_inaccessible() {
        let bridge: NewFootbridge = serde_json::from_str(
            r#"{"bridgeNumber": "HF089", "name": "Wan Chai", "location": "Wan Chai"}"#,
        )
        .unwrap();
        assert!(!bridge.is_accessible);
        assert!(!bridge.has_lift);
    }

    #[test]
    fn test_lift_without_coordinates_has_no_position() {
        let now = Utc::now();
        let lift = Lift {
            id: 1,
            lift_number: "L1".to_string(),
            location: "Somewhere".to_string(),
            address: None,
            district: None,
            latitude: Some(22.3),
            longitude: None,
            lift_type: None,
            is_accessible: true,
            is_operational: true,
            last_inspection: None,
            notes: None,
            created_at: now,
            updated_at: now,
        };
        assert!(lift.position().is_none());

        let json = serde_json::to_value(&lift).unwrap();
        assert!(json.get("liftNumber").is_some());
        assert!(json.get("isOperational").is_some());
        assert!(json.get("type").is_some());
    }
}
