use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use uuid::Uuid;

lazy_static! {
    // 12 bytes rendered as hex, the native id format of a document store.
    static ref RECORD_ID_REGEX: regex::Regex = regex::Regex::new(r"^[0-9a-fA-F]{24}$").unwrap();

    // Seeded randomly so ids generated by different processes in the same second diverge.
    static ref ID_COUNTER: AtomicU32 = {
        let seed = Uuid::new_v4();
        let bytes = seed.as_bytes();
        AtomicU32::new(u32::from_be_bytes([0, bytes[0], bytes[1], bytes[2]]))
    };
}

/// Opaque identifier shared by users and tasks.
///
/// Always 24 lowercase hex characters: a 4-byte seconds timestamp, 5 random
/// bytes and a 3-byte counter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Generates a fresh identifier, unique within this process.
    pub fn generate() -> Self {
        let seconds = chrono::Utc::now().timestamp() as u32;
        let random = Uuid::new_v4();
        let counter = ID_COUNTER.fetch_add(1, Ordering::Relaxed) & 0x00ff_ffff;

        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(&random.as_bytes()[..5]);
        bytes[9..].copy_from_slice(&counter.to_be_bytes()[1..]);

        RecordId(bytes.iter().map(|b| format!("{:02x}", b)).collect())
    }

    /// Parses a client supplied identifier. Returns `None` unless the input is
    /// exactly 24 hex characters.
    pub fn parse(raw: &str) -> Option<Self> {
        if RECORD_ID_REGEX.is_match(raw) {
            Some(RecordId(raw.to_ascii_lowercase()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}
