//! `accessmap` - CLI and HTTP server for the accessmap data service.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::{bail, Context};
use clap::Parser;
use tracing::info;

use accessmap::cli::{
    Cli, Command, ConfigCommand, NearbyCommand, NearbyKind, SeedCommand, ServeCommand,
    SessionCommand,
};
use accessmap::geo::{check_radius, LatLng};
use accessmap::model::{Role, UserUpsert};
use accessmap::seed::{seed, SeedData, SeedReport};
use accessmap::{init_logging, Config, Storage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone())?;

    match cli.command {
        Command::Serve(cmd) => handle_serve(config, cmd).await,
        Command::Seed(cmd) => handle_seed(&config, &cmd),
        Command::Nearby(cmd) => handle_nearby(&config, &cmd),
        Command::Session(cmd) => handle_session(&config, cmd),
        Command::Status(cmd) => handle_status(&config, cmd.json),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn open_storage(config: &Config) -> anyhow::Result<Storage> {
    let path = config.database_path();
    Storage::open(&path).with_context(|| format!("opening {}", path.display()))
}

async fn handle_serve(mut config: Config, cmd: ServeCommand) -> anyhow::Result<()> {
    if let Some(bind) = cmd.bind {
        config.server.bind_address = bind;
        config.validate()?;
    }

    let storage = open_storage(&config)?;
    if cmd.seed {
        let report = seed(&storage, &SeedData::builtin()?)?;
        info!("Seeded {} rows before serving", report.total_inserted());
    }

    accessmap::api::serve(config, storage).await?;
    Ok(())
}

fn handle_seed(config: &Config, cmd: &SeedCommand) -> anyhow::Result<()> {
    let data = match &cmd.file {
        Some(path) => SeedData::from_path(path)
            .with_context(|| format!("reading seed data from {}", path.display()))?,
        None => SeedData::builtin()?,
    };

    let storage = open_storage(config)?;
    let report = seed(&storage, &data)?;
    print_seed_report(&report);
    Ok(())
}

fn print_seed_report(report: &SeedReport) {
    for table in &report.tables {
        if table.skipped {
            println!("  {:<18} skipped (already populated)", table.table);
        } else {
            println!("  {:<18} {} rows", table.table, table.inserted);
        }
    }
    println!("Inserted {} rows.", report.total_inserted());
}

fn handle_nearby(config: &Config, cmd: &NearbyCommand) -> anyhow::Result<()> {
    let center = LatLng::parse_point(&cmd.lat, &cmd.lng)?;
    let radius_km = check_radius(
        cmd.radius.unwrap_or(config.query.default_radius_km),
        config.query.max_radius_km,
    )?;
    let storage = open_storage(config)?;

    match cmd.kind {
        NearbyKind::Lifts => {
            let lifts = storage.lifts_near(center, radius_km)?;
            if cmd.json {
                println!("{}", serde_json::to_string_pretty(&lifts)?);
                return Ok(());
            }
            println!("{} lifts within {radius_km} km of {center}", lifts.len());
            for lift in &lifts {
                println!("  {:<12} {}", lift.lift_number, lift.location);
            }
        }
        NearbyKind::Notes => {
            let notes = storage.notes_near(center, radius_km)?;
            if cmd.json {
                println!("{}", serde_json::to_string_pretty(&notes)?);
                return Ok(());
            }
            println!("{} notes within {radius_km} km of {center}", notes.len());
            for note in &notes {
                println!(
                    "  [{}/5 {}] {}: {}",
                    note.rating, note.condition, note.location_name, note.comment
                );
            }
        }
    }
    Ok(())
}

fn handle_session(config: &Config, cmd: SessionCommand) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    match cmd {
        SessionCommand::Issue {
            open_id,
            name,
            email,
            admin,
        } => {
            let upsert = UserUpsert {
                open_id,
                name,
                email,
                login_method: Some("cli".to_string()),
                role: admin.then_some(Role::Admin),
            };
            let user = storage.upsert_user(&upsert, config.auth.owner_open_id.as_deref())?;
            let token = storage.create_session(user.id, config.session_ttl())?;
            info!("Issued session for {} ({})", user.open_id, user.role);
            println!("{token}");
        }
        SessionCommand::Revoke { token } => {
            if !storage.delete_session(&token)? {
                bail!("no such session");
            }
            println!("Session revoked.");
        }
        SessionCommand::RevokeAll { open_id } => {
            let Some(user) = storage.user_by_open_id(&open_id)? else {
                bail!("no user with open id {open_id}");
            };
            let revoked = storage.delete_user_sessions(user.id)?;
            println!("Revoked {revoked} sessions.");
        }
        SessionCommand::Prune => {
            let pruned = storage.prune_expired_sessions()?;
            println!("Pruned {pruned} expired sessions.");
        }
    }
    Ok(())
}

fn handle_status(config: &Config, json: bool) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let stats = storage.stats()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("accessmap status");
    println!("----------------");
    println!("Database:      {}", stats.path.display());
    println!("Size:          {} bytes", stats.db_size_bytes);
    println!("Listen:        {}", config.server.bind_address);
    println!();
    for (table, rows) in &stats.row_counts {
        println!("  {table:<20} {rows}");
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Server]");
                println!("  Bind address:       {}", config.server.bind_address);
                println!("  CORS enabled:       {}", config.server.cors_enabled);
                println!(
                    "  Session prune (min): {}",
                    config.server.session_prune_interval_minutes
                );
                println!();
                println!("[Auth]");
                println!("  Cookie name:        {}", config.auth.cookie_name);
                println!("  Session TTL (h):    {}", config.auth.session_ttl_hours);
                println!("  Secure cookies:     {}", config.auth.secure_cookies);
                println!(
                    "  Owner open id:      {}",
                    config.auth.owner_open_id.as_deref().unwrap_or("(none)")
                );
                println!();
                println!("[Query]");
                println!("  Default radius km:  {}", config.query.default_radius_km);
                println!("  Max radius km:      {}", config.query.max_radius_km);
                println!(
                    "  History limit:      {} (max {})",
                    config.query.default_history_limit, config.query.max_history_limit
                );
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => bail!("configuration error: {e}"),
            }
        }
    }
    Ok(())
}
