pub mod config;
pub mod directory;
mod error;
pub mod helpers;
pub mod host;
pub mod queue;
pub mod sessions;
pub mod tracker;
pub mod validation;

pub use error::StartupError;

use admintime_db::Ledger;
use tracing::info;

use crate::config::Config;
use crate::directory::{AdminDirectory, StaticDirectory};
use crate::host::{EventRouter, PlayerLookup, PlayerSlots};
use crate::tracker::SessionTracker;

/// Build an event router for this server from explicit parts.
///
/// `lookup` resolves host player slots; pass [`PlayerSlots`] to learn them
/// from connect events. Fails if the server id is empty. Must be called from
/// within a Tokio runtime.
pub fn create_router<D: AdminDirectory, L: PlayerLookup>(
    directory: D,
    lookup: L,
    ledger: Ledger,
    server_id: &str,
    write_queue_capacity: usize,
) -> Result<EventRouter<D, L>, StartupError> {
    if server_id.trim().is_empty() {
        return Err(StartupError::EmptyServerId);
    }
    let tracker = SessionTracker::new(directory, ledger, write_queue_capacity);
    Ok(EventRouter::new(tracker, lookup, server_id))
}

/// Open the ledger, load the admin directory and wire up the router.
///
/// Any failure here should abort startup.
pub async fn start(config: &Config) -> Result<EventRouter<StaticDirectory>, StartupError> {
    let ledger = Ledger::open(&config.database_url).await?;
    let directory = StaticDirectory::load(&config.admins_path)?;
    let router = create_router(
        directory,
        PlayerSlots::new(),
        ledger,
        &config.server_id,
        config.write_queue_capacity,
    )?;
    info!(server_id = %config.server_id, "admin time tracker ready");
    Ok(router)
}
