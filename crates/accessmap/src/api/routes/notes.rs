//! Crowd-sourced accessibility notes and their photos.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{position, query_point, radius, Ack, ApiResult, Decimal};
use crate::api::extract::{ApiJson, ApiPath, ApiQuery, CurrentUser};
use crate::api::state::AppState;
use crate::model::{
    AccessibilityNote, FacilityType, NewAccessibilityNote, NewNotePhoto, NoteCondition, NotePhoto,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct NotesNearbyQuery {
    latitude: Decimal,
    longitude: Decimal,
    radius_km: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct NoteInput {
    facility_type: FacilityType,
    facility_id: Option<i64>,
    location_name: String,
    latitude: Decimal,
    longitude: Decimal,
    rating: u8,
    condition: NoteCondition,
    #[serde(default)]
    comment: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PhotoInput {
    photo_url: String,
    photo_key: String,
    caption: Option<String>,
}

/// Answer to a note submission.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct NoteCreated {
    success: bool,
    note_id: i64,
}

/// Submit a note. Notes written by administrators are marked verified.
pub(super) async fn add(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ApiJson(input): ApiJson<NoteInput>,
) -> ApiResult<NoteCreated> {
    let note = NewAccessibilityNote {
        user_id: user.id,
        facility_type: input.facility_type,
        facility_id: input.facility_id,
        location_name: input.location_name,
        position: position(&input.latitude, &input.longitude)?,
        rating: input.rating,
        condition: input.condition,
        comment: input.comment,
        is_verified: user.is_admin(),
    };
    let note_id = state.storage()?.add_note(&note)?;
    info!(note_id, user_id = user.id, "Accessibility note submitted");
    Ok(Json(NoteCreated {
        success: true,
        note_id,
    }))
}

pub(super) async fn nearby(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<NotesNearbyQuery>,
) -> ApiResult<Vec<AccessibilityNote>> {
    let center = query_point(&query.latitude, &query.longitude)?;
    let radius_km = radius(&state, query.radius_km)?;
    Ok(Json(state.storage()?.notes_near(center, radius_km)?))
}

pub(super) async fn mine(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Vec<AccessibilityNote>> {
    Ok(Json(state.storage()?.notes_by_user(user.id)?))
}

pub(super) async fn by_facility(
    State(state): State<Arc<AppState>>,
    ApiPath((facility_type, facility_id)): ApiPath<(String, i64)>,
) -> ApiResult<Vec<AccessibilityNote>> {
    let facility_type: FacilityType = facility_type.parse()?;
    Ok(Json(
        state
            .storage()?
            .notes_for_facility(facility_type, facility_id)?,
    ))
}

pub(super) async fn photos(
    State(state): State<Arc<AppState>>,
    ApiPath(note_id): ApiPath<i64>,
) -> ApiResult<Vec<NotePhoto>> {
    Ok(Json(state.storage()?.note_photos(note_id)?))
}

pub(super) async fn add_photo(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ApiPath(note_id): ApiPath<i64>,
    ApiJson(input): ApiJson<PhotoInput>,
) -> ApiResult<Ack> {
    let photo = NewNotePhoto {
        note_id,
        photo_url: input.photo_url,
        photo_key: input.photo_key,
        caption: input.caption,
        uploaded_by: user.id,
    };
    state.storage()?.add_note_photo(&photo)?;
    Ok(Ack::ok())
}
