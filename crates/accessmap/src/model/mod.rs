//! Domain records served by accessmap.
//!
//! Every stored record comes in two shapes: the row as read back from
//! storage (with its id and timestamps) and a `New*` payload used to insert
//! it. Records serialize with camelCase field names, which is what the web
//! client consumes.

pub mod facility;
pub mod note;
pub mod user;

pub use facility::{
    Destination, Footbridge, Lift, LiftOutage, LiftStatus, LiftStatusReport, NewDestination,
    NewFootbridge, NewLift, NewLiftStatusReport, NewPedestrianLink, NewPedestrianNode,
    NewZebraCrossing, PedestrianLink, PedestrianNode, ZebraCrossing,
};
pub use note::{
    AccessibilityNote, FacilityType, NewAccessibilityNote, NewNotePhoto, NoteCondition, NotePhoto,
};
pub use user::{
    FontSize, NewRouteHistory, NewSavedLocation, Preferences, Role, RouteHistoryEntry,
    SavedLocation, User, UserUpsert,
};

use crate::geo::LatLng;

/// Build an optional position from nullable coordinate columns.
pub(crate) fn optional_position(latitude: Option<f64>, longitude: Option<f64>) -> Option<LatLng> {
    match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Some(LatLng {
            latitude,
            longitude,
        }),
        _ => None,
    }
}
