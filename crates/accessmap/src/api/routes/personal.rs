//! Saved locations and route history of the signed-in user.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use tracing::debug;

use super::{position, Ack, ApiResult, Decimal};
use crate::api::extract::{ApiJson, ApiPath, ApiQuery, CurrentUser};
use crate::api::state::AppState;
use crate::error::Error;
use crate::model::{NewRouteHistory, NewSavedLocation, RouteHistoryEntry, SavedLocation};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SavedLocationInput {
    name: String,
    address: Option<String>,
    latitude: Decimal,
    longitude: Decimal,
    category: Option<String>,
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct HistoryQuery {
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RouteInput {
    from_address: String,
    to_address: String,
    from_latitude: Decimal,
    from_longitude: Decimal,
    to_latitude: Decimal,
    to_longitude: Decimal,
    distance: Option<Decimal>,
    duration: Option<i64>,
    route_data: Option<String>,
}

pub(super) async fn saved_locations(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Vec<SavedLocation>> {
    Ok(Json(state.storage()?.saved_locations(user.id)?))
}

pub(super) async fn add_saved_location(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ApiJson(input): ApiJson<SavedLocationInput>,
) -> ApiResult<Ack> {
    let location = NewSavedLocation {
        user_id: user.id,
        name: input.name,
        address: input.address,
        position: position(&input.latitude, &input.longitude)?,
        category: input.category,
        notes: input.notes,
    };
    state.storage()?.add_saved_location(&location)?;
    Ok(Ack::ok())
}

/// Delete one of the caller's saved locations. Other users' rows are
/// reported as missing.
pub(super) async fn delete_saved_location(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Ack> {
    if !state.storage()?.delete_saved_location(id, user.id)? {
        debug!(id, user_id = user.id, "Saved location not deleted");
        return Err(Error::not_found("saved location", id));
    }
    Ok(Ack::ok())
}

/// Newest routes first. `?limit=` is clamped to the configured maximum.
pub(super) async fn route_history(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ApiQuery(query): ApiQuery<HistoryQuery>,
) -> ApiResult<Vec<RouteHistoryEntry>> {
    let limits = &state.config.query;
    let limit = query
        .limit
        .unwrap_or(limits.default_history_limit)
        .min(limits.max_history_limit);
    Ok(Json(state.storage()?.route_history(user.id, limit)?))
}

pub(super) async fn add_route_history(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ApiJson(input): ApiJson<RouteInput>,
) -> ApiResult<Ack> {
    let route = NewRouteHistory {
        user_id: user.id,
        from_address: input.from_address,
        to_address: input.to_address,
        from: position(&input.from_latitude, &input.from_longitude)?,
        to: position(&input.to_latitude, &input.to_longitude)?,
        distance: input
            .distance
            .map(|distance| distance.value("distance"))
            .transpose()?,
        duration: input.duration,
        route_data: input.route_data,
    };
    state.storage()?.add_route_history(&route)?;
    Ok(Ack::ok())
}
