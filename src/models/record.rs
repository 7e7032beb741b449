use chrono::Utc;
use serde::{Deserialize, Serialize};

/// One observed caller address, most recent first in the stored list.
/// `pings` counts consecutive requests from the same address; `lastseen`
/// is refreshed each time the record is touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerRecord {
    pub caller: String,
    pub pings: u64,
    pub lastseen: String,
}

impl CallerRecord {
    pub fn new(caller: impl Into<String>) -> Self {
        CallerRecord {
            caller: caller.into(),
            pings: 1,
            lastseen: timestamp_now(),
        }
    }
}

/// Current UTC time in the on-disk timestamp format.
pub fn timestamp_now() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_starts_at_one_ping() {
        let record = CallerRecord::new("203.0.113.5");
        assert_eq!(record.caller, "203.0.113.5");
        assert_eq!(record.pings, 1);
        assert!(record.lastseen.ends_with(" UTC"));
    }

    #[test]
    fn timestamp_format_shape() {
        let ts = timestamp_now();
        // e.g. "2024-01-01 00:00:00 UTC"
        assert_eq!(ts.len(), 23);
        assert_eq!(&ts[4..5], "-");
        assert_eq!(&ts[10..11], " ");
        assert_eq!(&ts[13..14], ":");
    }
}
