//! Lift status reports.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use super::{Ack, ApiResult};
use crate::api::extract::{ApiJson, ApiPath, CurrentUser};
use crate::api::state::AppState;
use crate::model::{LiftOutage, LiftStatus, LiftStatusReport, NewLiftStatusReport};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ReportInput {
    lift_id: i64,
    status: LiftStatus,
    notes: Option<String>,
    estimated_fix_date: Option<NaiveDate>,
}

/// Latest report of every reported lift, keyed by lift id.
pub(super) async fn all_statuses(
    State(state): State<Arc<AppState>>,
) -> ApiResult<BTreeMap<i64, LiftStatusReport>> {
    Ok(Json(state.storage()?.latest_lift_statuses()?))
}

pub(super) async fn out_of_service(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Vec<LiftOutage>> {
    Ok(Json(state.storage()?.out_of_service_lifts()?))
}

/// Latest report of one lift, `null` when it was never reported.
pub(super) async fn status(
    State(state): State<Arc<AppState>>,
    ApiPath(lift_id): ApiPath<i64>,
) -> ApiResult<Option<LiftStatusReport>> {
    Ok(Json(state.storage()?.latest_lift_status(lift_id)?))
}

/// File a report as the signed-in user. Administrator reports are verified.
pub(super) async fn report(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ApiJson(input): ApiJson<ReportInput>,
) -> ApiResult<Ack> {
    let report = NewLiftStatusReport {
        lift_id: input.lift_id,
        status: input.status,
        notes: input.notes,
        estimated_fix_date: input.estimated_fix_date,
        reported_by: user.reporter_tag(),
        is_verified: user.is_admin(),
    };
    state.storage()?.report_lift_status(&report)?;
    Ok(Ack::ok())
}
