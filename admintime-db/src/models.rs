/// `disconnect_time` value meaning the admin is currently online.
pub const ONLINE_SENTINEL: i64 = -1;

/// Accumulated time for one admin on one server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminTimeRecord {
  /// Surrogate key assigned by the database
  pub id: i64,
  /// Stable external identity (SteamID64 as a string)
  pub admin_id: String,
  /// Display name observed on the most recent connect
  pub admin_name: String,
  /// Unix timestamp of the current or most recent connect
  pub connect_time: i64,
  /// Unix timestamp of the last disconnect, or [`ONLINE_SENTINEL`]
  pub disconnect_time: i64,
  /// Total seconds connected, across all closed sessions
  pub played_time: i64,
  /// Total seconds spent in spectator
  pub spectator_time: i64,
  pub server_id: String,
}

impl AdminTimeRecord {
  /// Whether the record is in the online state (no disconnect since the last connect).
  pub fn is_online(&self) -> bool {
    self.disconnect_time == ONLINE_SENTINEL
  }
}
