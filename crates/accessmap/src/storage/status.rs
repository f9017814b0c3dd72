//! Lift status reports.
//!
//! Reports are append-only. The status of a lift is its most recent
//! report, ties on `created_at` broken by row id.

use std::collections::BTreeMap;

use rusqlite::{params, OptionalExtension, Row};
use tracing::info;

use super::values::{date, get_optional_date, get_timestamp, now};
use super::Storage;
use crate::error::{Error, Result};
use crate::model::{LiftOutage, LiftStatusReport, NewLiftStatusReport};

const REPORT_COLUMNS: &str = "r.id, r.lift_id, r.status, r.notes, r.estimated_fix_date, \
     r.reported_by, r.is_verified, r.created_at";

/// Restricts `r` to the latest report of its lift.
const LATEST_ONLY: &str = "r.id = (SELECT l.id FROM lift_status_reports l \
     WHERE l.lift_id = r.lift_id ORDER BY l.created_at DESC, l.id DESC LIMIT 1)";

impl Storage {
    /// File a status report against an existing lift and return its row id.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if the lift does not exist, or an error if
    /// the insert fails.
    pub fn report_lift_status(&self, report: &NewLiftStatusReport) -> Result<i64> {
        if self.lift(report.lift_id)?.is_none() {
            return Err(Error::not_found("lift", report.lift_id));
        }
        self.conn.execute(
            r"
            INSERT INTO lift_status_reports (lift_id, status, notes, estimated_fix_date,
                                             reported_by, is_verified, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
            params![
                report.lift_id,
                report.status,
                report.notes,
                report.estimated_fix_date.map(date),
                report.reported_by,
                report.is_verified,
                now(),
            ],
        )?;
        info!(
            "Lift {} reported {} by {}",
            report.lift_id, report.status, report.reported_by
        );
        Ok(self.conn.last_insert_rowid())
    }

    /// The latest report for a lift, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn latest_lift_status(&self, lift_id: i64) -> Result<Option<LiftStatusReport>> {
        let report = self
            .conn
            .query_row(
                &format!(
                    "SELECT {REPORT_COLUMNS} FROM lift_status_reports r \
                     WHERE r.lift_id = ?1 ORDER BY r.created_at DESC, r.id DESC LIMIT 1"
                ),
                [lift_id],
                row_to_report,
            )
            .optional()?;
        Ok(report)
    }

    /// The latest report of every lift that has one, keyed by lift id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn latest_lift_statuses(&self) -> Result<BTreeMap<i64, LiftStatusReport>> {
        let reports = self.query_rows(
            &format!(
                "SELECT {REPORT_COLUMNS} FROM lift_status_reports r \
                 WHERE {LATEST_ONLY} ORDER BY r.lift_id"
            ),
            [],
            row_to_report,
        )?;
        Ok(reports
            .into_iter()
            .map(|report| (report.lift_id, report))
            .collect())
    }

    /// Lifts whose latest report is out of service or under maintenance.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn out_of_service_lifts(&self) -> Result<Vec<LiftOutage>> {
        let mut outages = Vec::new();
        for (lift_id, report) in self.latest_lift_statuses()? {
            if !report.status.is_unavailable() {
                continue;
            }
            if let Some(lift) = self.lift(lift_id)? {
                outages.push(LiftOutage { lift, report });
            }
        }
        Ok(outages)
    }
}

fn row_to_report(row: &Row<'_>) -> rusqlite::Result<LiftStatusReport> {
    Ok(LiftStatusReport {
        id: row.get(0)?,
        lift_id: row.get(1)?,
        status: row.get(2)?,
        notes: row.get(3)?,
        estimated_fix_date: get_optional_date(row, 4)?,
        reported_by: row.get(5)?,
        is_verified: row.get(6)?,
        created_at: get_timestamp(row, 7)?,
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::model::LiftStatus;
    use crate::storage::facilities::fixtures;
    use crate::storage::test_support::storage;

    fn report(lift_id: i64, status: LiftStatus) -> NewLiftStatusReport {
        NewLiftStatusReport {
            lift_id,
            status,
            notes: None,
            estimated_fix_date: None,
            reported_by: "user:1".to_string(),
            is_verified: false,
        }
    }

    #[test]
    fn test_report_requires_existing_lift() {
        let storage = storage();
        let err = storage
            .report_lift_status(&report(7, LiftStatus::OutOfService))
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { entity: "lift", .. }));
    }

    #[test]
    fn test_latest_status_wins() {
        let storage = storage();
        let lift = storage
            .insert_lift(&fixtures::lift("HF001-L1", None, None))
            .unwrap();
        assert!(storage.latest_lift_status(lift).unwrap().is_none());

        storage
            .report_lift_status(&report(lift, LiftStatus::OutOfService))
            .unwrap();
        let mut repaired = report(lift, LiftStatus::Operational);
        repaired.is_verified = true;
        storage.report_lift_status(&repaired).unwrap();

        let latest = storage.latest_lift_status(lift).unwrap().unwrap();
        assert_eq!(latest.status, LiftStatus::Operational);
        assert!(latest.is_verified);
    }

    #[test]
    fn test_estimated_fix_date_round_trip() {
        let storage = storage();
        let lift = storage
            .insert_lift(&fixtures::lift("HF001-L1", None, None))
            .unwrap();
        let fix = NaiveDate::from_ymd_opt(2026, 11, 2).unwrap();
        let mut broken = report(lift, LiftStatus::UnderMaintenance);
        broken.estimated_fix_date = Some(fix);
        broken.notes = Some("Cable replacement".to_string());
        storage.report_lift_status(&broken).unwrap();

        let latest = storage.latest_lift_status(lift).unwrap().unwrap();
        assert_eq!(latest.estimated_fix_date, Some(fix));
        assert_eq!(latest.notes.as_deref(), Some("Cable replacement"));
    }

    #[test]
    fn test_latest_statuses_map_and_outages() {
        let storage = storage();
        let a = storage.insert_lift(&fixtures::lift("A", None, None)).unwrap();
        let b = storage.insert_lift(&fixtures::lift("B", None, None)).unwrap();
        let c = storage.insert_lift(&fixtures::lift("C", None, None)).unwrap();
        storage.insert_lift(&fixtures::lift("D", None, None)).unwrap();

        storage
            .report_lift_status(&report(a, LiftStatus::OutOfService))
            .unwrap();
        storage
            .report_lift_status(&report(b, LiftStatus::OutOfService))
            .unwrap();
        storage
            .report_lift_status(&report(b, LiftStatus::Operational))
            .unwrap();
        storage
            .report_lift_status(&report(c, LiftStatus::UnderMaintenance))
            .unwrap();

        let statuses = storage.latest_lift_statuses().unwrap();
        assert_eq!(statuses.len(), 3);
        assert_eq!(statuses[&a].status, LiftStatus::OutOfService);
        assert_eq!(statuses[&b].status, LiftStatus::Operational);

        let outages = storage.out_of_service_lifts().unwrap();
        let numbers: Vec<_> = outages.iter().map(|o| o.lift.lift_number.as_str()).collect();
        assert_eq!(numbers, vec!["A", "C"]);
        assert_eq!(outages[1].report.status, LiftStatus::UnderMaintenance);
    }
}
