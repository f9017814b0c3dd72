//! `SQLite` schema definitions for accessmap.
//!
//! This module contains the SQL statements for creating and managing
//! the database schema. Timestamps are RFC 3339 UTC strings with fixed
//! microsecond precision so they sort lexically.

/// SQL statement to create the users table.
pub const CREATE_USERS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    open_id TEXT NOT NULL UNIQUE,
    name TEXT,
    email TEXT,
    login_method TEXT,
    role TEXT NOT NULL DEFAULT 'user',
    font_size TEXT NOT NULL DEFAULT 'large',
    high_contrast INTEGER NOT NULL DEFAULT 1,
    voice_navigation INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    last_signed_in TEXT NOT NULL
)
";

/// SQL statement to create the sessions table.
pub const CREATE_SESSIONS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS sessions (
    token_hash TEXT PRIMARY KEY,
    user_id INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    expires_at TEXT NOT NULL
)
";

/// SQL statement to create the lifts table.
pub const CREATE_LIFTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS lifts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    lift_number TEXT NOT NULL UNIQUE,
    location TEXT NOT NULL,
    address TEXT,
    district TEXT,
    latitude REAL,
    longitude REAL,
    lift_type TEXT,
    is_accessible INTEGER NOT NULL DEFAULT 1,
    is_operational INTEGER NOT NULL DEFAULT 1,
    last_inspection TEXT,
    notes TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
";

/// SQL statement to create the footbridges table.
pub const CREATE_FOOTBRIDGES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS footbridges (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    bridge_number TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    location TEXT NOT NULL,
    district TEXT,
    latitude REAL,
    longitude REAL,
    has_lift INTEGER NOT NULL DEFAULT 0,
    has_escalator INTEGER NOT NULL DEFAULT 0,
    has_ramp INTEGER NOT NULL DEFAULT 0,
    is_accessible INTEGER NOT NULL DEFAULT 0,
    notes TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
";

/// SQL statement to create the zebra crossings table.
pub const CREATE_ZEBRA_CROSSINGS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS zebra_crossings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    location TEXT NOT NULL,
    district TEXT,
    latitude REAL NOT NULL,
    longitude REAL NOT NULL,
    has_octopus_extension INTEGER NOT NULL DEFAULT 0,
    has_audio_signal INTEGER NOT NULL DEFAULT 0,
    crossing_width REAL,
    notes TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
";

/// SQL statement to create the pedestrian nodes table.
pub const CREATE_PEDESTRIAN_NODES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS pedestrian_nodes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    node_id TEXT NOT NULL UNIQUE,
    name TEXT,
    latitude REAL NOT NULL,
    longitude REAL NOT NULL,
    elevation REAL,
    node_type TEXT,
    is_accessible INTEGER NOT NULL DEFAULT 1,
    facility_type TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
";

/// SQL statement to create the pedestrian links table.
pub const CREATE_PEDESTRIAN_LINKS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS pedestrian_links (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    link_id TEXT NOT NULL UNIQUE,
    from_node_id TEXT NOT NULL,
    to_node_id TEXT NOT NULL,
    distance REAL NOT NULL,
    link_type TEXT,
    is_accessible INTEGER NOT NULL DEFAULT 1,
    has_stairs INTEGER NOT NULL DEFAULT 0,
    has_ramp INTEGER NOT NULL DEFAULT 0,
    has_lift INTEGER NOT NULL DEFAULT 0,
    slope REAL,
    surface TEXT,
    width REAL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
";

/// SQL statement to create the saved locations table.
pub const CREATE_SAVED_LOCATIONS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS saved_locations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    address TEXT,
    latitude REAL NOT NULL,
    longitude REAL NOT NULL,
    category TEXT,
    notes TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
";

/// SQL statement to create the route history table.
pub const CREATE_ROUTE_HISTORY_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS route_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    from_address TEXT NOT NULL,
    to_address TEXT NOT NULL,
    from_latitude REAL NOT NULL,
    from_longitude REAL NOT NULL,
    to_latitude REAL NOT NULL,
    to_longitude REAL NOT NULL,
    distance REAL,
    duration INTEGER,
    route_data TEXT,
    created_at TEXT NOT NULL
)
";

/// SQL statement to create the accessibility notes table.
pub const CREATE_NOTES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS accessibility_notes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    facility_type TEXT NOT NULL,
    facility_id INTEGER,
    location_name TEXT NOT NULL,
    latitude REAL NOT NULL,
    longitude REAL NOT NULL,
    rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
    condition TEXT NOT NULL,
    comment TEXT NOT NULL,
    is_verified INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
";

/// SQL statement to create the note photos table.
pub const CREATE_NOTE_PHOTOS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS note_photos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    note_id INTEGER NOT NULL,
    photo_url TEXT NOT NULL,
    photo_key TEXT NOT NULL,
    caption TEXT,
    uploaded_by INTEGER NOT NULL,
    created_at TEXT NOT NULL
)
";

/// SQL statement to create the lift status reports table.
pub const CREATE_LIFT_STATUS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS lift_status_reports (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    lift_id INTEGER NOT NULL,
    status TEXT NOT NULL,
    notes TEXT,
    estimated_fix_date TEXT,
    reported_by TEXT NOT NULL,
    is_verified INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
)
";

/// SQL statement to create the popular destinations table.
pub const CREATE_DESTINATIONS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS destinations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    name_zh TEXT NOT NULL,
    category TEXT NOT NULL,
    latitude REAL NOT NULL,
    longitude REAL NOT NULL,
    accessibility_rating INTEGER NOT NULL,
    created_at TEXT NOT NULL
)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// Secondary indexes.
pub const CREATE_INDEXES: &str = r"
CREATE INDEX IF NOT EXISTS idx_lifts_district ON lifts(district);
CREATE INDEX IF NOT EXISTS idx_footbridges_accessible ON footbridges(is_accessible);
CREATE INDEX IF NOT EXISTS idx_zebra_crossings_octopus ON zebra_crossings(has_octopus_extension);
CREATE INDEX IF NOT EXISTS idx_pedestrian_nodes_accessible ON pedestrian_nodes(is_accessible);
CREATE INDEX IF NOT EXISTS idx_pedestrian_links_from ON pedestrian_links(from_node_id);
CREATE INDEX IF NOT EXISTS idx_pedestrian_links_to ON pedestrian_links(to_node_id);
CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id);
CREATE INDEX IF NOT EXISTS idx_saved_locations_user ON saved_locations(user_id);
CREATE INDEX IF NOT EXISTS idx_route_history_user ON route_history(user_id, created_at DESC);
CREATE INDEX IF NOT EXISTS idx_notes_facility ON accessibility_notes(facility_type, facility_id);
CREATE INDEX IF NOT EXISTS idx_notes_user ON accessibility_notes(user_id);
CREATE INDEX IF NOT EXISTS idx_note_photos_note ON note_photos(note_id);
CREATE INDEX IF NOT EXISTS idx_lift_status_lift ON lift_status_reports(lift_id, created_at DESC);
CREATE INDEX IF NOT EXISTS idx_destinations_category ON destinations(category);
";

/// All table creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_USERS_TABLE,
    CREATE_SESSIONS_TABLE,
    CREATE_LIFTS_TABLE,
    CREATE_FOOTBRIDGES_TABLE,
    CREATE_ZEBRA_CROSSINGS_TABLE,
    CREATE_PEDESTRIAN_NODES_TABLE,
    CREATE_PEDESTRIAN_LINKS_TABLE,
    CREATE_SAVED_LOCATIONS_TABLE,
    CREATE_ROUTE_HISTORY_TABLE,
    CREATE_NOTES_TABLE,
    CREATE_NOTE_PHOTOS_TABLE,
    CREATE_LIFT_STATUS_TABLE,
    CREATE_DESTINATIONS_TABLE,
    CREATE_METADATA_TABLE,
];
