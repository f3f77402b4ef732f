//! Adapter between host runtime callbacks and the [`SessionTracker`].
//!
//! The host reports disconnects and team changes by player slot. The router
//! resolves slots through a [`PlayerLookup`]; the built-in [`PlayerSlots`]
//! registry learns slots from connect events.

use scc::HashMap;
use serde::Deserialize;
use tracing::debug;

use crate::directory::AdminDirectory;
use crate::tracker::{SessionTracker, Team};

/// A callback delivered by the host runtime.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostEvent {
    /// Player finished connecting
    FullConnect {
        slot: i32,
        identity: String,
        address: String,
    },
    /// Player slot was released
    ClientDisconnect { slot: i32 },
    /// Player switched teams
    PlayerTeam {
        slot: i32,
        old_team: i32,
        new_team: i32,
    },
}

/// Host facility for resolving a player slot to a stable identity.
pub trait PlayerLookup: Send + Sync {
    fn identity_for_slot(&self, slot: i32) -> impl Future<Output = Option<String>> + Send;

    /// Called when a player in `slot` finishes connecting.
    fn player_connected(&self, _slot: i32, _identity: &str) -> impl Future<Output = ()> + Send {
        async {}
    }

    /// Called after the player in `slot` has disconnected.
    fn player_disconnected(&self, _slot: i32) -> impl Future<Output = ()> + Send {
        async {}
    }
}

/// Slot registry populated from connect events.
pub struct PlayerSlots {
    slots: HashMap<i32, String>,
}

impl PlayerSlots {
    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
        }
    }

    pub async fn assign(&self, slot: i32, identity: String) {
        self.slots.upsert_async(slot, identity).await;
    }

    pub async fn release(&self, slot: i32) -> Option<String> {
        self.slots
            .remove_async(&slot)
            .await
            .map(|(_, identity)| identity)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PlayerSlots {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerLookup for PlayerSlots {
    async fn identity_for_slot(&self, slot: i32) -> Option<String> {
        self.slots
            .read_async(&slot, |_, identity| identity.clone())
            .await
    }

    async fn player_connected(&self, slot: i32, identity: &str) {
        self.assign(slot, identity.to_string()).await;
    }

    async fn player_disconnected(&self, slot: i32) {
        self.release(slot).await;
    }
}

/// Routes host events for one server to the tracker.
pub struct EventRouter<D, L = PlayerSlots> {
    tracker: SessionTracker<D>,
    lookup: L,
    server_id: String,
}

impl<D: AdminDirectory, L: PlayerLookup> EventRouter<D, L> {
    pub fn new(tracker: SessionTracker<D>, lookup: L, server_id: impl Into<String>) -> Self {
        Self {
            tracker,
            lookup,
            server_id: server_id.into(),
        }
    }

    pub fn tracker(&self) -> &SessionTracker<D> {
        &self.tracker
    }

    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    pub async fn dispatch(&self, event: HostEvent, now: i64) {
        match event {
            HostEvent::FullConnect {
                slot,
                identity,
                address,
            } => {
                debug!(slot, identity = %identity, address = %address, "player connected");
                self.lookup.player_connected(slot, &identity).await;
                self.tracker
                    .on_admin_connected(&identity, &self.server_id, now)
                    .await;
            }
            HostEvent::ClientDisconnect { slot } => {
                let Some(identity) = self.resolve(slot).await else {
                    return;
                };
                self.tracker
                    .on_admin_disconnected(&identity, &self.server_id, now)
                    .await;
                self.lookup.player_disconnected(slot).await;
            }
            HostEvent::PlayerTeam {
                slot,
                old_team,
                new_team,
            } => {
                let Some(identity) = self.resolve(slot).await else {
                    return;
                };
                self.tracker
                    .on_team_changed(
                        &identity,
                        &self.server_id,
                        Team::from(old_team),
                        Team::from(new_team),
                        now,
                    )
                    .await;
            }
        }
    }

    /// Stop the tracker, waiting for queued writes.
    pub async fn shutdown(self) {
        self.tracker.shutdown().await;
    }

    async fn resolve(&self, slot: i32) -> Option<String> {
        let identity = self.lookup.identity_for_slot(slot).await;
        if identity.is_none() {
            debug!(slot, "ignoring event for unknown slot");
        }
        identity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_host_events() {
        let event: HostEvent = serde_json::from_str(
            r#"{"event":"full_connect","slot":3,"identity":"76561198000000001","address":"10.0.0.5:27005"}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            HostEvent::FullConnect {
                slot: 3,
                identity: "76561198000000001".to_string(),
                address: "10.0.0.5:27005".to_string(),
            }
        );

        let event: HostEvent =
            serde_json::from_str(r#"{"event":"player_team","slot":3,"old_team":2,"new_team":1}"#)
                .unwrap();
        assert_eq!(
            event,
            HostEvent::PlayerTeam {
                slot: 3,
                old_team: 2,
                new_team: 1,
            }
        );

        let event: HostEvent =
            serde_json::from_str(r#"{"event":"client_disconnect","slot":3}"#).unwrap();
        assert_eq!(event, HostEvent::ClientDisconnect { slot: 3 });
    }

    #[test]
    fn test_unknown_event_is_rejected() {
        let result = serde_json::from_str::<HostEvent>(r#"{"event":"round_start"}"#);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_slot_registry() {
        let slots = PlayerSlots::new();

        slots.assign(4, "76561198000000001".to_string()).await;
        assert_eq!(
            slots.identity_for_slot(4).await.as_deref(),
            Some("76561198000000001")
        );

        // Slot reused by another player
        slots.assign(4, "76561198000000002".to_string()).await;
        assert_eq!(
            slots.identity_for_slot(4).await.as_deref(),
            Some("76561198000000002")
        );

        assert_eq!(
            slots.release(4).await.as_deref(),
            Some("76561198000000002")
        );
        assert!(slots.is_empty());
        assert_eq!(slots.identity_for_slot(4).await, None);
    }
}
