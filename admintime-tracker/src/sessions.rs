use scc::HashMap;

use crate::validation::AdminId;

/// In-memory spectator join times, keyed by admin.
///
/// Purely ephemeral: anything open when the process stops is lost.
pub struct SpectatorSessions {
    joined: HashMap<AdminId, i64>,
}

impl SpectatorSessions {
    pub fn new() -> Self {
        Self {
            joined: HashMap::new(),
        }
    }

    /// Start (or restart) the spectator window for an admin.
    pub async fn enter(&self, id: AdminId, now: i64) {
        self.joined.upsert_async(id, now).await;
    }

    /// Close the window and return how long it was open, if one was open.
    pub async fn leave(&self, id: &AdminId, now: i64) -> Option<i64> {
        self.joined
            .remove_async(id)
            .await
            .map(|(_, joined_at)| now.saturating_sub(joined_at).max(0))
    }

    /// When the admin entered spectator, if they are spectating.
    pub async fn joined_at(&self, id: &AdminId) -> Option<i64> {
        self.joined.read_async(id, |_, joined_at| *joined_at).await
    }

    pub fn len(&self) -> usize {
        self.joined.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SpectatorSessions {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::parse_admin_id;

    #[tokio::test]
    async fn test_enter_and_leave() {
        let sessions = SpectatorSessions::new();
        let id = parse_admin_id("76561198000000001").unwrap();

        sessions.enter(id, 1050).await;
        assert_eq!(sessions.joined_at(&id).await, Some(1050));

        assert_eq!(sessions.leave(&id, 1090).await, Some(40));
        assert!(sessions.is_empty());
        assert_eq!(sessions.leave(&id, 1100).await, None);
    }

    #[tokio::test]
    async fn test_reenter_restarts_window() {
        let sessions = SpectatorSessions::new();
        let id = parse_admin_id("76561198000000001").unwrap();

        sessions.enter(id, 1000).await;
        sessions.enter(id, 1060).await;

        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions.leave(&id, 1100).await, Some(40));
    }

    #[tokio::test]
    async fn test_clock_going_backwards_yields_zero() {
        let sessions = SpectatorSessions::new();
        let id = parse_admin_id("76561198000000001").unwrap();

        sessions.enter(id, 2000).await;
        assert_eq!(sessions.leave(&id, 1990).await, Some(0));
    }

    #[tokio::test]
    async fn test_extreme_timestamps_do_not_overflow() {
        let sessions = SpectatorSessions::new();
        let id = parse_admin_id("76561198000000001").unwrap();

        sessions.enter(id, i64::MIN).await;
        assert_eq!(sessions.leave(&id, i64::MAX).await, Some(i64::MAX));

        sessions.enter(id, i64::MAX).await;
        assert_eq!(sessions.leave(&id, i64::MIN).await, Some(0));
    }
}
