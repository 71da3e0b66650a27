use core::fmt;
use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::models::event::{Event, UserId};
use crate::db::{StoreError, StoreResult};

/// Relational operator of a single predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    Eq,
    Gt,
    Lt,
}

impl Op {
    pub fn as_str(&self) -> &'static str {
        match self {
            Op::Eq => "==",
            Op::Gt => ">",
            Op::Lt => "<",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Backend-neutral predicate value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Str(String),
    Int(i64),
    Time(DateTime<Utc>),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Str(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Str(value)
    }
}

impl From<&UserId> for FieldValue {
    fn from(value: &UserId) -> Self {
        FieldValue::Str(value.as_str().to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Time(value)
    }
}

/// One `{key, operator, value}` predicate of a query descriptor.
///
/// A descriptor is a slice of conditions ANDed together; order never changes
/// the result set, only how a backend chooses to execute it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub key: String,
    pub op: Op,
    pub value: FieldValue,
}

impl Condition {
    pub fn new(key: impl Into<String>, op: Op, value: impl Into<FieldValue>) -> Self {
        Self {
            key: key.into(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::new(key, Op::Eq, value)
    }

    pub fn gt(key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::new(key, Op::Gt, value)
    }

    pub fn lt(key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::new(key, Op::Lt, value)
    }

    /// Linear-scan evaluation against one record; this is the whole query
    /// engine of the in-memory backend. An unknown key or a type mismatch
    /// matches nothing.
    pub fn matches(&self, event: &Event) -> bool {
        let Some(actual) = field_of(event, &self.key) else {
            return false;
        };

        let ord = match (&actual, &self.value) {
            (FieldValue::Str(a), FieldValue::Str(b)) => a.cmp(b),
            (FieldValue::Int(a), FieldValue::Int(b)) => a.cmp(b),
            (FieldValue::Time(a), FieldValue::Time(b)) => a.cmp(b),
            _ => return false,
        };

        match self.op {
            Op::Eq => ord == Ordering::Equal,
            Op::Gt => ord == Ordering::Greater,
            Op::Lt => ord == Ordering::Less,
        }
    }
}

fn field_of(event: &Event, key: &str) -> Option<FieldValue> {
    match key {
        "to" => Some(FieldValue::Str(event.to.as_str().to_string())),
        "from" => Some(FieldValue::Str(event.from.as_str().to_string())),
        "value" => Some(FieldValue::Int(event.value)),
        "given_at" => Some(FieldValue::Time(event.given_at)),
        "id" | "_id" => event.id.clone().map(FieldValue::Str),
        _ => None,
    }
}

/// Rejects a malformed descriptor before any I/O is attempted.
pub fn validate(query: &[Condition]) -> StoreResult<()> {
    for condition in query {
        if condition.key.is_empty() {
            return Err(StoreError::Validation(
                "query condition with an empty key".into(),
            ));
        }
    }

    Ok(())
}

/// Which side of an exchange a query addresses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListType {
    #[default]
    To,
    From,
}

impl ListType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListType::To => "to",
            ListType::From => "from",
        }
    }

    /// The other side of the exchange.
    pub fn inverse(&self) -> Self {
        match self {
            ListType::To => ListType::From,
            ListType::From => ListType::To,
        }
    }
}

impl fmt::Display for ListType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ListType {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "to" => Ok(ListType::To),
            "from" => Ok(ListType::From),
            other => Err(StoreError::Validation(format!(
                "list type must be 'to' or 'from', got '{other}'"
            ))),
        }
    }
}

/// Scope narrowing for scoreboard queries.
///
/// When `user` is set the filter lands on the *inverse* field of
/// `list_type`: the board answers "who is on the other side of this user's
/// exchanges", not "this user's own records".
#[derive(Debug, Clone, Default)]
pub struct ScoreboardScope {
    pub user: Option<UserId>,
    pub list_type: ListType,
    pub today: bool,
}

impl ScoreboardScope {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_user(user: impl Into<UserId>, list_type: ListType) -> Self {
        Self {
            user: Some(user.into()),
            list_type,
            ..Self::default()
        }
    }

    pub fn today(mut self) -> Self {
        self.today = true;
        self
    }
}
