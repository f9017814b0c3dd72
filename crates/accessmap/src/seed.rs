//! Reference dataset loading.
//!
//! A sample Hong Kong dataset is compiled into the binary. Each table is
//! filled only while it is empty, so seeding an existing database is a
//! no-op for the tables that already hold data.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::model::{
    NewDestination, NewFootbridge, NewLift, NewPedestrianLink, NewPedestrianNode,
    NewZebraCrossing,
};
use crate::storage::Storage;

const BUILTIN_DATASET: &str = include_str!("../data/seed.json");

/// Rows to load, grouped by table.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeedData {
    /// Lifts.
    pub lifts: Vec<NewLift>,
    /// Footbridges.
    pub footbridges: Vec<NewFootbridge>,
    /// Zebra crossings.
    pub zebra_crossings: Vec<NewZebraCrossing>,
    /// Pedestrian network nodes.
    pub pedestrian_nodes: Vec<NewPedestrianNode>,
    /// Pedestrian network links.
    pub pedestrian_links: Vec<NewPedestrianLink>,
    /// Popular destinations.
    pub destinations: Vec<NewDestination>,
}

impl SeedData {
    /// The dataset shipped with accessmap.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded dataset does not parse.
    pub fn builtin() -> Result<Self> {
        Ok(serde_json::from_str(BUILTIN_DATASET)?)
    }

    /// Read a dataset in the same JSON layout from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Outcome of seeding one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSeed {
    /// Table name.
    pub table: &'static str,
    /// Rows inserted.
    pub inserted: usize,
    /// The table already held rows and was left alone.
    pub skipped: bool,
}

/// Outcome of a seeding run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    /// Per-table results in load order.
    pub tables: Vec<TableSeed>,
}

impl SeedReport {
    /// Total rows inserted.
    #[must_use]
    pub fn total_inserted(&self) -> usize {
        self.tables.iter().map(|t| t.inserted).sum()
    }
}

/// Load `data` into every empty table inside one transaction.
///
/// # Errors
///
/// Returns an error if any insert fails; nothing is committed in that case.
pub fn seed(storage: &Storage, data: &SeedData) -> Result<SeedReport> {
    let tx = storage.begin()?;
    let mut report = SeedReport::default();

    report.tables.push(seed_table(
        storage,
        "lifts",
        &data.lifts,
        Storage::insert_lift,
    )?);
    report.tables.push(seed_table(
        storage,
        "footbridges",
        &data.footbridges,
        Storage::insert_footbridge,
    )?);
    report.tables.push(seed_table(
        storage,
        "zebra_crossings",
        &data.zebra_crossings,
        Storage::insert_zebra_crossing,
    )?);
    report.tables.push(seed_table(
        storage,
        "pedestrian_nodes",
        &data.pedestrian_nodes,
        Storage::insert_pedestrian_node,
    )?);
    report.tables.push(seed_table(
        storage,
        "pedestrian_links",
        &data.pedestrian_links,
        Storage::insert_pedestrian_link,
    )?);
    report.tables.push(seed_table(
        storage,
        "destinations",
        &data.destinations,
        Storage::insert_destination,
    )?);

    tx.commit()?;
    info!("Seeded {} rows", report.total_inserted());
    Ok(report)
}

fn seed_table<T>(
    storage: &Storage,
    table: &'static str,
    rows: &[T],
    insert: impl Fn(&Storage, &T) -> Result<i64>,
) -> Result<TableSeed> {
    if storage.count(table)? > 0 {
        debug!("Table {} already populated, skipping", table);
        return Ok(TableSeed {
            table,
            inserted: 0,
            skipped: true,
        });
    }
    for row in rows {
        insert(storage, row)?;
    }
    debug!("Inserted {} rows into {}", rows.len(), table);
    Ok(TableSeed {
        table,
        inserted: rows.len(),
        skipped: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_dataset_parses() {
        let data = SeedData::builtin().unwrap();
        assert_eq!(data.lifts.len(), 5);
        assert_eq!(data.footbridges.len(), 5);
        assert_eq!(data.zebra_crossings.len(), 5);
        assert_eq!(data.pedestrian_nodes.len(), 5);
        assert_eq!(data.pedestrian_links.len(), 4);
        assert!(data.destinations.len() > 50);
        assert!(data
            .destinations
            .iter()
            .all(|d| (1..=5).contains(&d.accessibility_rating)));
    }

    #[test]
    fn test_seed_empty_database() {
        let storage = Storage::open_in_memory().unwrap();
        let data = SeedData::builtin().unwrap();
        let report = seed(&storage, &data).unwrap();

        assert_eq!(report.tables.len(), 6);
        assert!(report.tables.iter().all(|t| !t.skipped));
        assert_eq!(storage.operational_lifts().unwrap().len(), 5);

        // HF089 in Wan Chai has stairs only
        let accessible = storage.accessible_footbridges().unwrap();
        assert_eq!(accessible.len(), 4);
        assert!(accessible.iter().all(|b| b.bridge_number != "HF089"));

        assert_eq!(storage.octopus_zebra_crossings().unwrap().len(), 4);
        assert_eq!(storage.accessible_pedestrian_links().unwrap().len(), 4);
    }

    #[test]
    fn test_seed_is_idempotent() {
        let storage = Storage::open_in_memory().unwrap();
        let data = SeedData::builtin().unwrap();
        let first = seed(&storage, &data).unwrap();
        let second = seed(&storage, &data).unwrap();

        assert_eq!(second.total_inserted(), 0);
        assert!(second.tables.iter().all(|t| t.skipped));
        assert_eq!(
            storage.count("destinations").unwrap(),
            i64::try_from(data.destinations.len()).unwrap()
        );
        assert_eq!(first.total_inserted(), 24 + data.destinations.len());
    }

    #[test]
    fn test_seed_only_fills_empty_tables() {
        let storage = Storage::open_in_memory().unwrap();
        let data = SeedData::builtin().unwrap();
        storage.insert_lift(&data.lifts[0]).unwrap();

        let report = seed(&storage, &data).unwrap();
        assert!(report.tables[0].skipped);
        assert_eq!(storage.count("lifts").unwrap(), 1);
        assert_eq!(storage.count("footbridges").unwrap(), 5);
    }

    #[test]
    fn test_failed_seed_rolls_back() {
        let storage = Storage::open_in_memory().unwrap();
        let mut data = SeedData::builtin().unwrap();
        let duplicate = data.pedestrian_links[0].clone();
        data.pedestrian_links.push(duplicate);

        assert!(seed(&storage, &data).is_err());
        assert_eq!(storage.count("lifts").unwrap(), 0);
        assert_eq!(storage.count("pedestrian_links").unwrap(), 0);
    }

    #[test]
    fn test_lifts_near_mong_kok() {
        let storage = Storage::open_in_memory().unwrap();
        seed(&storage, &SeedData::builtin().unwrap()).unwrap();

        let mong_kok = crate::geo::LatLng::new(22.3193, 114.1694).unwrap();
        let near = storage.lifts_near(mong_kok, 1.0).unwrap();
        assert_eq!(near.len(), 1);
        assert_eq!(near[0].lift_number, "HF205-L1");
    }
}
