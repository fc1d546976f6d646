use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable background image identifier, assigned at creation and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(Uuid);

impl ImageId {
    /// Generate a fresh identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One persisted background image.
///
/// The payload is immutable after creation; records are only ever inserted
/// and deleted. `seq` is the insertion sequence and breaks `created_at`
/// ties, so the presented order survives restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    pub id: ImageId,
    pub created_at: DateTime<Utc>,
    pub seq: u64,
    #[serde(with = "base64_bytes")]
    pub payload: Vec<u8>,
}

impl ImageRecord {
    /// Ordering key: ascending `created_at`, ties by insertion sequence.
    pub(crate) fn sort_key(&self) -> (DateTime<Utc>, u64) {
        (self.created_at, self.seq)
    }
}

/// Change notification emitted after each durable mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreEvent {
    Added { id: ImageId },
    Removed { id: ImageId },
}

/// Serde adapter: payload bytes as base64 text inside JSON documents.
mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        STANDARD.encode(bytes).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        STANDARD.decode(text).map_err(serde::de::Error::custom)
    }
}
