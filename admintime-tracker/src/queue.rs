//! Bounded, fire-and-forget queue between event handlers and the ledger.
//!
//! Handlers submit with [`WriteQueue::submit`], which never waits. A single
//! worker applies writes in submission order, so writes for one admin land in
//! the order their events arrived and at most one query is in flight. When the
//! queue is full the write is logged and dropped; failed writes are logged and
//! not retried.

use std::fmt;

use admintime_db::Ledger;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::validation::AdminId;

/// A single ledger mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerOp {
    Connect {
        admin_id: AdminId,
        admin_name: String,
        server_id: String,
        at: i64,
    },
    Disconnect {
        admin_id: AdminId,
        server_id: String,
        at: i64,
    },
    SpectatorTime {
        admin_id: AdminId,
        server_id: String,
        seconds: i64,
    },
}

impl LedgerOp {
    pub fn admin_id(&self) -> &AdminId {
        match self {
            LedgerOp::Connect { admin_id, .. }
            | LedgerOp::Disconnect { admin_id, .. }
            | LedgerOp::SpectatorTime { admin_id, .. } => admin_id,
        }
    }

    pub fn server_id(&self) -> &str {
        match self {
            LedgerOp::Connect { server_id, .. }
            | LedgerOp::Disconnect { server_id, .. }
            | LedgerOp::SpectatorTime { server_id, .. } => server_id,
        }
    }

    async fn apply(self, ledger: &Ledger) -> admintime_db::Result<()> {
        match self {
            LedgerOp::Connect {
                admin_id,
                admin_name,
                server_id,
                at,
            } => {
                ledger
                    .record_connect(admin_id.to_string(), admin_name, server_id, at)
                    .await
            }
            LedgerOp::Disconnect {
                admin_id,
                server_id,
                at,
            } => ledger
                .record_disconnect(admin_id.to_string(), server_id, at)
                .await
                .map(|_| ()),
            LedgerOp::SpectatorTime {
                admin_id,
                server_id,
                seconds,
            } => ledger
                .add_spectator_time(admin_id.to_string(), server_id, seconds)
                .await
                .map(|_| ()),
        }
    }
}

impl fmt::Display for LedgerOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerOp::Connect { .. } => f.write_str("connect"),
            LedgerOp::Disconnect { .. } => f.write_str("disconnect"),
            LedgerOp::SpectatorTime { .. } => f.write_str("spectator_time"),
        }
    }
}

enum Job {
    Write(LedgerOp),
    Barrier(oneshot::Sender<()>),
}

/// Handle to the ledger write worker.
pub struct WriteQueue {
    tx: mpsc::Sender<Job>,
    worker: JoinHandle<()>,
}

impl WriteQueue {
    /// Spawn the worker. `capacity` bounds how many writes may wait.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(ledger: Ledger, capacity: usize) -> Self {
        let (tx, mut rx) = mpsc::channel::<Job>(capacity.max(1));

        let worker = tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                match job {
                    Job::Write(op) => {
                        let admin_id = *op.admin_id();
                        let server_id = op.server_id().to_string();
                        let kind = op.to_string();
                        if let Err(err) = op.apply(&ledger).await {
                            error!(
                                admin_id = %admin_id,
                                server_id = %server_id,
                                op = %kind,
                                ?err,
                                "ledger write failed"
                            );
                        }
                    }
                    Job::Barrier(done) => {
                        let _ = done.send(());
                    }
                }
            }
            debug!("write queue drained");
        });

        Self { tx, worker }
    }

    /// Queue a write without waiting. Returns false if the write was dropped.
    pub fn submit(&self, op: LedgerOp) -> bool {
        match self.tx.try_send(Job::Write(op)) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(Job::Write(op))) => {
                warn!(
                    admin_id = %op.admin_id(),
                    server_id = %op.server_id(),
                    op = %op,
                    "write queue full, dropping ledger write"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(Job::Write(op))) => {
                error!(
                    admin_id = %op.admin_id(),
                    server_id = %op.server_id(),
                    op = %op,
                    "write queue closed, dropping ledger write"
                );
                false
            }
            Err(_) => false,
        }
    }

    /// Wait until every write submitted before this call has been applied.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(Job::Barrier(done_tx)).await.is_ok() {
            let _ = done_rx.await;
        }
    }

    /// Stop accepting writes and wait for the queued ones to finish.
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(err) = self.worker.await {
            error!(?err, "write queue worker panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::parse_admin_id;

    fn admin() -> AdminId {
        parse_admin_id("76561198000000001").unwrap()
    }

    #[tokio::test]
    async fn test_writes_apply_in_order() {
        let ledger = Ledger::open_in_memory().await.unwrap();
        let queue = WriteQueue::start(ledger.clone(), 16);

        assert!(queue.submit(LedgerOp::Connect {
            admin_id: admin(),
            admin_name: "Alice".to_string(),
            server_id: "1".to_string(),
            at: 1000,
        }));
        assert!(queue.submit(LedgerOp::SpectatorTime {
            admin_id: admin(),
            server_id: "1".to_string(),
            seconds: 40,
        }));
        assert!(queue.submit(LedgerOp::Disconnect {
            admin_id: admin(),
            server_id: "1".to_string(),
            at: 1200,
        }));
        queue.flush().await;

        let record = ledger
            .get_record(admin().to_string(), "1".to_string())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.spectator_time, 40);
        assert_eq!(record.played_time, 200);
        assert_eq!(record.disconnect_time, 1200);
    }

    #[tokio::test]
    async fn test_full_queue_drops_writes() {
        let ledger = Ledger::open_in_memory().await.unwrap();
        let queue = WriteQueue::start(ledger, 1);

        // current_thread runtime: the worker cannot drain until we yield
        let op = LedgerOp::SpectatorTime {
            admin_id: admin(),
            server_id: "1".to_string(),
            seconds: 5,
        };
        assert!(queue.submit(op.clone()));
        assert!(!queue.submit(op));

        queue.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_drains_pending_writes() {
        let ledger = Ledger::open_in_memory().await.unwrap();
        let queue = WriteQueue::start(ledger.clone(), 16);

        queue.submit(LedgerOp::Connect {
            admin_id: admin(),
            admin_name: "Alice".to_string(),
            server_id: "1".to_string(),
            at: 1000,
        });
        queue.shutdown().await;

        assert!(
            ledger
                .get_record(admin().to_string(), "1".to_string())
                .await
                .unwrap()
                .is_some()
        );
    }

    #[test]
    fn test_op_display() {
        let op = LedgerOp::Disconnect {
            admin_id: admin(),
            server_id: "1".to_string(),
            at: 0,
        };
        assert_eq!(op.to_string(), "disconnect");
        assert_eq!(op.server_id(), "1");
    }
}
