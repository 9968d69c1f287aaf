pub mod config;
pub mod paging;
pub mod session;
pub mod text;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

pub use config::{ConversationLimits, ModelConfig};
pub use paging::{compute_oldest, heuristic_has_more, merge_page, Identified, MessagePage, Placement};
pub use session::{ChatSession, SessionMessage};
pub use text::{truncate_with_ellipsis, ELLIPSIS};

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current time truncated to milliseconds.
///
/// Document stores keep millisecond datetimes, so every timestamp the
/// system produces is truncated up front to compare equal after a round trip.
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sender_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Sender::User).unwrap(), "\"user\"");
        assert_eq!(serde_json::to_string(&Sender::Assistant).unwrap(), "\"assistant\"");

        let parsed: Sender = serde_json::from_str("\"assistant\"").unwrap();
        assert_eq!(parsed, Sender::Assistant);
    }

    #[test]
    fn test_now_millis_has_no_sub_millisecond_part() {
        let now = now_millis();
        assert_eq!(now.timestamp_subsec_nanos() % 1_000_000, 0);
    }
}
