//! Facility datasets: lifts, footbridges, zebra crossings, the pedestrian
//! network and popular destinations.

use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

use super::values::{get_optional_timestamp, get_timestamp, now, timestamp};
use super::Storage;
use crate::error::Result;
use crate::geo::{within_radius, LatLng};
use crate::model::{
    Destination, Footbridge, Lift, NewDestination, NewFootbridge, NewLift, NewPedestrianLink,
    NewPedestrianNode, NewZebraCrossing, PedestrianLink, PedestrianNode, ZebraCrossing,
};

const LIFT_COLUMNS: &str = "id, lift_number, location, address, district, latitude, longitude, \
     lift_type, is_accessible, is_operational, last_inspection, notes, created_at, updated_at";

const FOOTBRIDGE_COLUMNS: &str = "id, bridge_number, name, location, district, latitude, \
     longitude, has_lift, has_escalator, has_ramp, is_accessible, notes, created_at, updated_at";

const ZEBRA_CROSSING_COLUMNS: &str = "id, name, location, district, latitude, longitude, \
     has_octopus_extension, has_audio_signal, crossing_width, notes, created_at, updated_at";

const NODE_COLUMNS: &str = "id, node_id, name, latitude, longitude, elevation, node_type, \
     is_accessible, facility_type, created_at, updated_at";

const LINK_COLUMNS: &str = "id, link_id, from_node_id, to_node_id, distance, link_type, \
     is_accessible, has_stairs, has_ramp, has_lift, slope, surface, width, created_at, updated_at";

const DESTINATION_COLUMNS: &str =
    "id, name, name_zh, category, latitude, longitude, accessibility_rating, created_at";

impl Storage {
    // === Lifts ===

    /// Every lift currently in service.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn operational_lifts(&self) -> Result<Vec<Lift>> {
        self.query_rows(
            &format!("SELECT {LIFT_COLUMNS} FROM lifts WHERE is_operational = 1 ORDER BY id"),
            [],
            row_to_lift,
        )
    }

    /// Operational, accessible lifts within `radius_km` of `center`.
    ///
    /// Lifts without surveyed coordinates are never returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn lifts_near(&self, center: LatLng, radius_km: f64) -> Result<Vec<Lift>> {
        let candidates = self.query_rows(
            &format!(
                "SELECT {LIFT_COLUMNS} FROM lifts \
                 WHERE is_operational = 1 AND is_accessible = 1 ORDER BY id"
            ),
            [],
            row_to_lift,
        )?;
        let total = candidates.len();
        let nearby = within_radius(candidates, center, radius_km);
        debug!(
            "{} of {} lifts within {} km of {}",
            nearby.len(),
            total,
            radius_km,
            center
        );
        Ok(nearby)
    }

    /// Look up a lift by row id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn lift(&self, id: i64) -> Result<Option<Lift>> {
        let lift = self
            .conn
            .query_row(
                &format!("SELECT {LIFT_COLUMNS} FROM lifts WHERE id = ?1"),
                [id],
                row_to_lift,
            )
            .optional()?;
        Ok(lift)
    }

    /// Insert a lift and return its row id.
    ///
    /// # Errors
    ///
    /// Returns an error if the lift number is already taken or the insert fails.
    pub fn insert_lift(&self, lift: &NewLift) -> Result<i64> {
        let now = now();
        self.conn.execute(
            r"
            INSERT INTO lifts (lift_number, location, address, district, latitude, longitude,
                               lift_type, is_accessible, is_operational, last_inspection, notes,
                               created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)
            ",
            params![
                lift.lift_number,
                lift.location,
                lift.address,
                lift.district,
                lift.latitude,
                lift.longitude,
                lift.lift_type,
                lift.is_accessible,
                lift.is_operational,
                lift.last_inspection.map(timestamp),
                lift.notes,
                now,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    // === Footbridges ===

    /// Every footbridge.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn footbridges(&self) -> Result<Vec<Footbridge>> {
        self.query_rows(
            &format!("SELECT {FOOTBRIDGE_COLUMNS} FROM footbridges ORDER BY id"),
            [],
            row_to_footbridge,
        )
    }

    /// Footbridges that are step-free end to end.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn accessible_footbridges(&self) -> Result<Vec<Footbridge>> {
        self.query_rows(
            &format!(
                "SELECT {FOOTBRIDGE_COLUMNS} FROM footbridges WHERE is_accessible = 1 ORDER BY id"
            ),
            [],
            row_to_footbridge,
        )
    }

    /// Insert a footbridge and return its row id.
    ///
    /// # Errors
    ///
    /// Returns an error if the bridge number is already taken or the insert fails.
    pub fn insert_footbridge(&self, bridge: &NewFootbridge) -> Result<i64> {
        let now = now();
        self.conn.execute(
            r"
            INSERT INTO footbridges (bridge_number, name, location, district, latitude, longitude,
                                     has_lift, has_escalator, has_ramp, is_accessible, notes,
                                     created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)
            ",
            params![
                bridge.bridge_number,
                bridge.name,
                bridge.location,
                bridge.district,
                bridge.latitude,
                bridge.longitude,
                bridge.has_lift,
                bridge.has_escalator,
                bridge.has_ramp,
                bridge.is_accessible,
                bridge.notes,
                now,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    // === Zebra crossings ===

    /// Every zebra crossing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn zebra_crossings(&self) -> Result<Vec<ZebraCrossing>> {
        self.query_rows(
            &format!("SELECT {ZEBRA_CROSSING_COLUMNS} FROM zebra_crossings ORDER BY id"),
            [],
            row_to_zebra_crossing,
        )
    }

    /// Crossings whose green phase can be extended with an Octopus card.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn octopus_zebra_crossings(&self) -> Result<Vec<ZebraCrossing>> {
        self.query_rows(
            &format!(
                "SELECT {ZEBRA_CROSSING_COLUMNS} FROM zebra_crossings \
                 WHERE has_octopus_extension = 1 ORDER BY id"
            ),
            [],
            row_to_zebra_crossing,
        )
    }

    /// Insert a zebra crossing and return its row id.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn insert_zebra_crossing(&self, crossing: &NewZebraCrossing) -> Result<i64> {
        let now = now();
        self.conn.execute(
            r"
            INSERT INTO zebra_crossings (name, location, district, latitude, longitude,
                                         has_octopus_extension, has_audio_signal, crossing_width,
                                         notes, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)
            ",
            params![
                crossing.name,
                crossing.location,
                crossing.district,
                crossing.latitude,
                crossing.longitude,
                crossing.has_octopus_extension,
                crossing.has_audio_signal,
                crossing.crossing_width,
                crossing.notes,
                now,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    // === Pedestrian network ===

    /// Every pedestrian network node.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn pedestrian_nodes(&self) -> Result<Vec<PedestrianNode>> {
        self.query_rows(
            &format!("SELECT {NODE_COLUMNS} FROM pedestrian_nodes ORDER BY id"),
            [],
            row_to_node,
        )
    }

    /// Nodes reachable step-free.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn accessible_pedestrian_nodes(&self) -> Result<Vec<PedestrianNode>> {
        self.query_rows(
            &format!(
                "SELECT {NODE_COLUMNS} FROM pedestrian_nodes WHERE is_accessible = 1 ORDER BY id"
            ),
            [],
            row_to_node,
        )
    }

    /// Insert a pedestrian node and return its row id.
    ///
    /// # Errors
    ///
    /// Returns an error if the node id is already taken or the insert fails.
    pub fn insert_pedestrian_node(&self, node: &NewPedestrianNode) -> Result<i64> {
        let now = now();
        self.conn.execute(
            r"
            INSERT INTO pedestrian_nodes (node_id, name, latitude, longitude, elevation, node_type,
                                          is_accessible, facility_type, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
            ",
            params![
                node.node_id,
                node.name,
                node.latitude,
                node.longitude,
                node.elevation,
                node.node_type,
                node.is_accessible,
                node.facility_type,
                now,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Every pedestrian network link.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn pedestrian_links(&self) -> Result<Vec<PedestrianLink>> {
        self.query_rows(
            &format!("SELECT {LINK_COLUMNS} FROM pedestrian_links ORDER BY id"),
            [],
            row_to_link,
        )
    }

    /// Links usable by wheelchair users: accessible and without stairs.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn accessible_pedestrian_links(&self) -> Result<Vec<PedestrianLink>> {
        self.query_rows(
            &format!(
                "SELECT {LINK_COLUMNS} FROM pedestrian_links \
                 WHERE is_accessible = 1 AND has_stairs = 0 ORDER BY id"
            ),
            [],
            row_to_link,
        )
    }

    /// Insert a pedestrian link and return its row id.
    ///
    /// Endpoints are stored as given; they are not checked against the
    /// node table.
    ///
    /// # Errors
    ///
    /// Returns an error if the link id is already taken or the insert fails.
    pub fn insert_pedestrian_link(&self, link: &NewPedestrianLink) -> Result<i64> {
        let now = now();
        self.conn.execute(
            r"
            INSERT INTO pedestrian_links (link_id, from_node_id, to_node_id, distance, link_type,
                                          is_accessible, has_stairs, has_ramp, has_lift, slope,
                                          surface, width, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13)
            ",
            params![
                link.link_id,
                link.from_node_id,
                link.to_node_id,
                link.distance,
                link.link_type,
                link.is_accessible,
                link.has_stairs,
                link.has_ramp,
                link.has_lift,
                link.slope,
                link.surface,
                link.width,
                now,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    // === Destinations ===

    /// Every popular destination.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn destinations(&self) -> Result<Vec<Destination>> {
        self.query_rows(
            &format!("SELECT {DESTINATION_COLUMNS} FROM destinations ORDER BY id"),
            [],
            row_to_destination,
        )
    }

    /// Destinations in one category. The match is case-sensitive.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn destinations_by_category(&self, category: &str) -> Result<Vec<Destination>> {
        self.query_rows(
            &format!(
                "SELECT {DESTINATION_COLUMNS} FROM destinations WHERE category = ?1 ORDER BY id"
            ),
            [category],
            row_to_destination,
        )
    }

    /// Insert a destination and return its row id.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn insert_destination(&self, destination: &NewDestination) -> Result<i64> {
        self.conn.execute(
            r"
            INSERT INTO destinations (name, name_zh, category, latitude, longitude,
                                      accessibility_rating, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
            params![
                destination.name,
                destination.name_zh,
                destination.category,
                destination.latitude,
                destination.longitude,
                destination.accessibility_rating,
                now(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }
}

fn row_to_lift(row: &Row<'_>) -> rusqlite::Result<Lift> {
    Ok(Lift {
        id: row.get(0)?,
        lift_number: row.get(1)?,
        location: row.get(2)?,
        address: row.get(3)?,
        district: row.get(4)?,
        latitude: row.get(5)?,
        longitude: row.get(6)?,
        lift_type: row.get(7)?,
        is_accessible: row.get(8)?,
        is_operational: row.get(9)?,
        last_inspection: get_optional_timestamp(row, 10)?,
        notes: row.get(11)?,
        created_at: get_timestamp(row, 12)?,
        updated_at: get_timestamp(row, 13)?,
    })
}

fn row_to_footbridge(row: &Row<'_>) -> rusqlite::Result<Footbridge> {
    Ok(Footbridge {
        id: row.get(0)?,
        bridge_number: row.get(1)?,
        name: row.get(2)?,
        location: row.get(3)?,
        district: row.get(4)?,
        latitude: row.get(5)?,
        longitude: row.get(6)?,
        has_lift: row.get(7)?,
        has_escalator: row.get(8)?,
        has_ramp: row.get(9)?,
        is_accessible: row.get(10)?,
        notes: row.get(11)?,
        created_at: get_timestamp(row, 12)?,
        updated_at: get_timestamp(row, 13)?,
    })
}

fn row_to_zebra_crossing(row: &Row<'_>) -> rusqlite::Result<ZebraCrossing> {
    Ok(ZebraCrossing {
        id: row.get(0)?,
        name: row.get(1)?,
        location: row.get(2)?,
        district: row.get(3)?,
        latitude: row.get(4)?,
        longitude: row.get(5)?,
        has_octopus_extension: row.get(6)?,
        has_audio_signal: row.get(7)?,
        crossing_width: row.get(8)?,
        notes: row.get(9)?,
        created_at: get_timestamp(row, 10)?,
        updated_at: get_timestamp(row, 11)?,
    })
}

fn row_to_node(row: &Row<'_>) -> rusqlite::Result<PedestrianNode> {
    Ok(PedestrianNode {
        id: row.get(0)?,
        node_id: row.get(1)?,
        name: row.get(2)?,
        latitude: row.get(3)?,
        longitude: row.get(4)?,
        elevation: row.get(5)?,
        node_type: row.get(6)?,
        is_accessible: row.get(7)?,
        facility_type: row.get(8)?,
        created_at: get_timestamp(row, 9)?,
        updated_at: get_timestamp(row, 10)?,
    })
}

fn row_to_link(row: &Row<'_>) -> rusqlite::Result<PedestrianLink> {
    Ok(PedestrianLink {
        id: row.get(0)?,
        link_id: row.get(1)?,
        from_node_id: row.get(2)?,
        to_node_id: row.get(3)?,
        distance: row.get(4)?,
        link_type: row.get(5)?,
        is_accessible: row.get(6)?,
        has_stairs: row.get(7)?,
        has_ramp: row.get(8)?,
        has_lift: row.get(9)?,
        slope: row.get(10)?,
        surface: row.get(11)?,
        width: row.get(12)?,
        created_at: get_timestamp(row, 13)?,
        updated_at: get_timestamp(row, 14)?,
    })
}

fn row_to_destination(row: &Row<'_>) -> rusqlite::Result<Destination> {
    Ok(Destination {
        id: row.get(0)?,
        name: row.get(1)?,
        name_zh: row.get(2)?,
        category: row.get(3)?,
        latitude: row.get(4)?,
        longitude: row.get(5)?,
        accessibility_rating: row.get(6)?,
        created_at: get_timestamp(row, 7)?,
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::model::{NewFootbridge, NewLift, NewPedestrianLink, NewPedestrianNode};

    pub(crate) fn lift(number: &str, lat: Option<f64>, lng: Option<f64>) -> NewLift {
        NewLift {
            lift_number: number.to_string(),
            location: format!("{number} location"),
            address: None,
            district: Some("Central and Western".to_string()),
            latitude: lat,
            longitude: lng,
            lift_type: Some("passenger".to_string()),
            is_accessible: true,
            is_operational: true,
            last_inspection: None,
            notes: None,
        }
    }

    pub(crate) fn footbridge(number: &str, accessible: bool) -> NewFootbridge {
        NewFootbridge {
            bridge_number: number.to_string(),
            name: format!("{number} bridge"),
            location: "Admiralty".to_string(),
            district: None,
            latitude: Some(22.2793),
            longitude: Some(114.1646),
            has_lift: accessible,
            has_escalator: false,
            has_ramp: false,
            is_accessible: accessible,
            notes: None,
        }
    }

    pub(crate) fn node(node_id: &str, accessible: bool) -> NewPedestrianNode {
        NewPedestrianNode {
            node_id: node_id.to_string(),
            name: None,
            latitude: 22.2819,
            longitude: 114.1578,
            elevation: Some(5.0),
            node_type: Some("junction".to_string()),
            is_accessible: accessible,
            facility_type: Some("level".to_string()),
        }
    }

    pub(crate) fn link(link_id: &str, accessible: bool, stairs: bool) -> NewPedestrianLink {
        NewPedestrianLink {
            link_id: link_id.to_string(),
            from_node_id: "NODE-001".to_string(),
            to_node_id: "NODE-002".to_string(),
            distance: 120.0,
            link_type: Some("street".to_string()),
            is_accessible: accessible,
            has_stairs: stairs,
            has_ramp: false,
            has_lift: false,
            slope: None,
            surface: Some("paved".to_string()),
            width: Some(2.5),
        }
    }
}
