use std::time::{SystemTime, UNIX_EPOCH};

pub fn now() -> i64 {
  SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .map(|d| d.as_secs() as i64)
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_now_is_after_2020() {
    assert!(now() > 1_577_836_800);
  }
}
