//! Public facility datasets.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use super::{query_point, radius, ApiResult, Decimal};
use crate::api::extract::ApiQuery;
use crate::api::state::AppState;
use crate::model::{Destination, Footbridge, Lift, PedestrianLink, PedestrianNode, ZebraCrossing};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct NearbyLiftsQuery {
    lat: Decimal,
    lng: Decimal,
    radius_km: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct DestinationQuery {
    category: Option<String>,
}

pub(super) async fn lifts(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Lift>> {
    Ok(Json(state.storage()?.operational_lifts()?))
}

pub(super) async fn lifts_nearby(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<NearbyLiftsQuery>,
) -> ApiResult<Vec<Lift>> {
    let center = query_point(&query.lat, &query.lng)?;
    let radius_km = radius(&state, query.radius_km)?;
    Ok(Json(state.storage()?.lifts_near(center, radius_km)?))
}

pub(super) async fn footbridges(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Footbridge>> {
    Ok(Json(state.storage()?.footbridges()?))
}

pub(super) async fn accessible_footbridges(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Vec<Footbridge>> {
    Ok(Json(state.storage()?.accessible_footbridges()?))
}

pub(super) async fn zebra_crossings(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Vec<ZebraCrossing>> {
    Ok(Json(state.storage()?.zebra_crossings()?))
}

pub(super) async fn octopus_zebra_crossings(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Vec<ZebraCrossing>> {
    Ok(Json(state.storage()?.octopus_zebra_crossings()?))
}

pub(super) async fn nodes(State(state): State<Arc<AppState>>) -> ApiResult<Vec<PedestrianNode>> {
    Ok(Json(state.storage()?.pedestrian_nodes()?))
}

pub(super) async fn accessible_nodes(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Vec<PedestrianNode>> {
    Ok(Json(state.storage()?.accessible_pedestrian_nodes()?))
}

pub(super) async fn links(State(state): State<Arc<AppState>>) -> ApiResult<Vec<PedestrianLink>> {
    Ok(Json(state.storage()?.pedestrian_links()?))
}

/// Links a wheelchair can use: accessible and stair-free.
pub(super) async fn accessible_links(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Vec<PedestrianLink>> {
    Ok(Json(state.storage()?.accessible_pedestrian_links()?))
}

/// All destinations, or only those in `?category=` (exact match).
pub(super) async fn destinations(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<DestinationQuery>,
) -> ApiResult<Vec<Destination>> {
    let storage = state.storage()?;
    let destinations = match query.category.as_deref() {
        Some(category) => storage.destinations_by_category(category)?,
        None => storage.destinations()?,
    };
    Ok(Json(destinations))
}
