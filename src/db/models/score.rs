use serde::{Deserialize, Serialize};

use super::event::UserId;

/// Summed `value` for one participant, grouped by a chosen side of the
/// exchange. Computed on demand from the event records, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub id: UserId,
    pub score: i64,
}
