//! HTTP route handlers and router configuration.

mod auth;
mod facilities;
mod lift_status;
mod notes;
mod personal;

use std::sync::Arc;

use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::state::AppState;
use crate::error::{Error, Result};
use crate::geo::{check_radius, parse_decimal, parse_finite, LatLng};

/// Handler result carrying a JSON body.
pub type ApiResult<T> = std::result::Result<Json<T>, Error>;

/// Body returned by mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Ack {
    /// Always `true`; failures are reported as errors.
    pub success: bool,
}

impl Ack {
    fn ok() -> Json<Self> {
        Json(Self { success: true })
    }
}

/// A decimal accepted either as a JSON number or as a string such as
/// `"22.3193"`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Decimal {
    /// JSON number.
    Number(f64),
    /// Decimal string.
    Text(String),
}

impl Decimal {
    fn coordinate(&self, field: &'static str) -> Result<f64> {
        match self {
            Self::Number(value) => Ok(*value),
            Self::Text(text) => parse_decimal(field, text),
        }
    }

    /// Any finite number, in whatever notation it was sent.
    fn value(&self, field: &'static str) -> Result<f64> {
        match self {
            Self::Number(value) if value.is_finite() => Ok(*value),
            Self::Number(value) => Err(Error::validation(
                field,
                format!("{value} is not a finite number"),
            )),
            Self::Text(text) => parse_finite(field, text),
        }
    }
}

/// Validate a latitude/longitude pair that will be stored.
fn position(latitude: &Decimal, longitude: &Decimal) -> Result<LatLng> {
    LatLng::new(
        latitude.coordinate("latitude")?,
        longitude.coordinate("longitude")?,
    )
}

/// Validate a search centre. Any finite in-range pair is accepted.
fn query_point(latitude: &Decimal, longitude: &Decimal) -> Result<LatLng> {
    LatLng::new(latitude.value("latitude")?, longitude.value("longitude")?)
}

/// Resolve an optional query radius against the configured default and cap.
fn radius(state: &AppState, radius_km: Option<f64>) -> Result<f64> {
    let query = &state.config.query;
    check_radius(
        radius_km.unwrap_or(query.default_radius_km),
        query.max_radius_km,
    )
}

/// Build the main application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors_enabled = state.config.server.cors_enabled;

    let router = Router::new()
        .route("/health", get(health))
        // Session
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/preferences", patch(auth::update_preferences))
        // Facility datasets
        .route("/api/accessibility/lifts", get(facilities::lifts))
        .route("/api/accessibility/lifts/nearby", get(facilities::lifts_nearby))
        .route("/api/accessibility/footbridges", get(facilities::footbridges))
        .route(
            "/api/accessibility/footbridges/accessible",
            get(facilities::accessible_footbridges),
        )
        .route(
            "/api/accessibility/zebra-crossings",
            get(facilities::zebra_crossings),
        )
        .route(
            "/api/accessibility/zebra-crossings/octopus",
            get(facilities::octopus_zebra_crossings),
        )
        .route("/api/accessibility/nodes", get(facilities::nodes))
        .route(
            "/api/accessibility/nodes/accessible",
            get(facilities::accessible_nodes),
        )
        .route("/api/accessibility/links", get(facilities::links))
        .route(
            "/api/accessibility/links/accessible",
            get(facilities::accessible_links),
        )
        .route("/api/destinations", get(facilities::destinations))
        // Per-user records
        .route(
            "/api/saved-locations",
            get(personal::saved_locations).post(personal::add_saved_location),
        )
        .route(
            "/api/saved-locations/{id}",
            delete(personal::delete_saved_location),
        )
        .route(
            "/api/route-history",
            get(personal::route_history).post(personal::add_route_history),
        )
        // Lift status
        .route(
            "/api/lift-status",
            get(lift_status::all_statuses).post(lift_status::report),
        )
        .route(
            "/api/lift-status/out-of-service",
            get(lift_status::out_of_service),
        )
        .route("/api/lift-status/{lift_id}", get(lift_status::status))
        // Accessibility notes
        .route("/api/notes", post(notes::add))
        .route("/api/notes/nearby", get(notes::nearby))
        .route("/api/notes/mine", get(notes::mine))
        .route(
            "/api/notes/facility/{facility_type}/{facility_id}",
            get(notes::by_facility),
        )
        .route(
            "/api/notes/{note_id}/photos",
            get(notes::photos).post(notes::add_photo),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if cors_enabled {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        router
    }
}

/// Liveness check.
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
