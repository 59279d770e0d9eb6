//! Update record pairing the cached domain set with its refresh time.

use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::domain_set::BlockedDomainSet;

/// Cached blocklist plus the time of the last successful update.
///
/// `last_updated_at` is `None` when no fetch has ever succeeded. That is not
/// the same as an empty list that was updated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlocklistUpdateRecord {
    pub domains: BlockedDomainSet,
    #[serde(with = "option_millis")]
    pub last_updated_at: Option<SystemTime>,
}

/// Convert a time to milliseconds since the Unix epoch.
pub fn to_millis(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Convert milliseconds since the Unix epoch to a time.
pub fn from_millis(millis: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_millis(millis)
}

pub(crate) mod millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::SystemTime;

    pub fn serialize<S>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        super::to_millis(*time).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<SystemTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let ms = u64::deserialize(deserializer)?;
        Ok(super::from_millis(ms))
    }
}

pub(crate) mod option_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::SystemTime;

    pub fn serialize<S>(time: &Option<SystemTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        time.map(super::to_millis).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<SystemTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let ms: Option<u64> = Option::deserialize(deserializer)?;
        Ok(ms.map(super::from_millis))
    }
}

impl BlocklistUpdateRecord {
    /// Whether a fetch has ever succeeded.
    pub fn has_been_updated(&self) -> bool {
        self.last_updated_at.is_some()
    }

    /// Check if an update is needed based on the given interval.
    ///
    /// Returns `true` if:
    /// - No update time is recorded
    /// - The elapsed time since the last update reaches the interval
    pub fn needs_update(&self, interval: Duration) -> bool {
        match self.last_updated_at {
            None => true,
            Some(last) => {
                let elapsed = SystemTime::now().duration_since(last).unwrap_or(Duration::MAX);
                elapsed >= interval
            }
        }
    }
}
