use core::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::{StoreError, StoreResult};

pub const GIVE: i64 = 1;
pub const TAKE_AWAY: i64 = -1;

/// Chat-platform user on either side of an exchange.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        UserId(value)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        UserId(value.to_string())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One recorded give/take-away action between two users.
///
/// Append-only: once stored a record is never updated or deleted by this
/// layer. `id` is backend-assigned and absent until persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub to: UserId,
    pub from: UserId,
    pub value: i64,
    pub given_at: DateTime<Utc>,
}

impl Event {
    pub fn new(to: UserId, from: UserId, value: i64, given_at: DateTime<Utc>) -> Self {
        Self {
            id: None,
            to,
            from,
            value,
            given_at,
        }
    }

    pub fn give(to: UserId, from: UserId, given_at: DateTime<Utc>) -> Self {
        Self::new(to, from, GIVE, given_at)
    }

    pub fn take_away(to: UserId, from: UserId, given_at: DateTime<Utc>) -> Self {
        Self::new(to, from, TAKE_AWAY, given_at)
    }

    /// A unit of recognition is exactly one point in either direction, and
    /// both participants must be named. Checked before any I/O is attempted.
    pub fn validate(&self) -> StoreResult<()> {
        if self.value != GIVE && self.value != TAKE_AWAY {
            return Err(StoreError::Validation(format!(
                "event value must be +1 or -1, got {}",
                self.value
            )));
        }

        if self.to.as_str().is_empty() || self.from.as_str().is_empty() {
            return Err(StoreError::Validation(
                "event requires both a recipient and a sender".into(),
            ));
        }

        Ok(())
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

#[cfg(test)]
mod test {
    use chrono::Utc;

    use super::*;

    #[test]
    fn unit_values_pass_validation() {
        let now = Utc::now();
        assert!(Event::give("bob".into(), "alice".into(), now).validate().is_ok());
        assert!(
            Event::take_away("bob".into(), "alice".into(), now)
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn out_of_range_value_is_rejected() {
        let event = Event::new("bob".into(), "alice".into(), 5, Utc::now());
        assert!(matches!(event.validate(), Err(StoreError::Validation(_))));
    }

    #[test]
    fn unnamed_participant_is_rejected() {
        let event = Event::give("".into(), "alice".into(), Utc::now());
        assert!(matches!(event.validate(), Err(StoreError::Validation(_))));
    }
}
