use admintime_db::Ledger;
use tracing::debug;

use crate::directory::{AdminDirectory, AdminInfo};
use crate::queue::{LedgerOp, WriteQueue};
use crate::sessions::SpectatorSessions;
use crate::validation::{AdminId, parse_admin_id};

/// Team numbering used by the game host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Team {
    None,
    Spectator,
    Terrorist,
    CounterTerrorist,
    Unknown(i32),
}

impl From<i32> for Team {
    fn from(value: i32) -> Self {
        match value {
            0 => Team::None,
            1 => Team::Spectator,
            2 => Team::Terrorist,
            3 => Team::CounterTerrorist,
            other => Team::Unknown(other),
        }
    }
}

/// Turns admin connect, disconnect and team-change events into ledger writes.
///
/// Handlers never fail and never wait on the database: writes go through the
/// [`WriteQueue`], and anything that is not a known admin is ignored.
pub struct SessionTracker<D> {
    directory: D,
    sessions: SpectatorSessions,
    queue: WriteQueue,
}

impl<D: AdminDirectory> SessionTracker<D> {
    /// Create a tracker writing to `ledger` through a queue of `queue_capacity` writes.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(directory: D, ledger: Ledger, queue_capacity: usize) -> Self {
        Self {
            directory,
            sessions: SpectatorSessions::new(),
            queue: WriteQueue::start(ledger, queue_capacity),
        }
    }

    /// Record a known admin connecting; the display name comes from the directory.
    pub async fn on_admin_connected(&self, identity: &str, server_id: &str, now: i64) {
        let Some((admin_id, info)) = self.resolve(identity) else {
            return;
        };

        self.queue.submit(LedgerOp::Connect {
            admin_id,
            admin_name: info.name,
            server_id: server_id.to_string(),
            at: now,
        });
    }

    /// Close the admin's session, flushing any open spectator window.
    pub async fn on_admin_disconnected(&self, identity: &str, server_id: &str, now: i64) {
        let Some((admin_id, _)) = self.resolve(identity) else {
            return;
        };

        self.queue.submit(LedgerOp::Disconnect {
            admin_id,
            server_id: server_id.to_string(),
            at: now,
        });

        // Still spectating when they left: close the window here
        if let Some(seconds) = self.sessions.leave(&admin_id, now).await {
            self.queue.submit(LedgerOp::SpectatorTime {
                admin_id,
                server_id: server_id.to_string(),
                seconds,
            });
        }
    }

    /// Open or close the admin's spectator window on moves into or out of spectator.
    pub async fn on_team_changed(
        &self,
        identity: &str,
        server_id: &str,
        old_team: Team,
        new_team: Team,
        now: i64,
    ) {
        let Some((admin_id, _)) = self.resolve(identity) else {
            return;
        };

        if new_team == Team::Spectator {
            // Re-entering restarts the window rather than extending it
            if let Some(previous) = self.sessions.joined_at(&admin_id).await {
                debug!(admin_id = %admin_id, previous, now, "restarting spectator window");
            }
            self.sessions.enter(admin_id, now).await;
            debug!(admin_id = %admin_id, now, "admin entered spectator");
        } else if old_team == Team::Spectator {
            match self.sessions.leave(&admin_id, now).await {
                Some(seconds) => {
                    self.queue.submit(LedgerOp::SpectatorTime {
                        admin_id,
                        server_id: server_id.to_string(),
                        seconds,
                    });
                }
                None => {
                    debug!(admin_id = %admin_id, "left spectator with no open window");
                }
            }
        }
    }

    /// Number of admins currently in spectator.
    pub fn spectating_count(&self) -> usize {
        self.sessions.len()
    }

    /// Wait until all writes submitted so far have been applied.
    pub async fn flush(&self) {
        self.queue.flush().await;
    }

    /// Stop accepting writes and wait for queued ones to finish.
    pub async fn shutdown(self) {
        self.queue.shutdown().await;
    }

    fn resolve(&self, identity: &str) -> Option<(AdminId, AdminInfo)> {
        let admin_id = match parse_admin_id(identity) {
            Ok(id) => id,
            Err(e) => {
                debug!(identity, error = %e, "ignoring event for invalid identity");
                return None;
            }
        };
        let info = self.directory.lookup(&admin_id)?;
        Some((admin_id, info))
    }
}
