use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::instrument;

use crate::db::models::event::{Event, UserId};
use crate::db::models::score::ScoreSummary;
use crate::db::query::{Condition, ListType, ScoreboardScope};
use crate::db::{EVENT_COLLECTION, StoreError, StoreResult};
use crate::util::day::DayBounds;
use crate::util::env::Env;

pub mod firestore;
pub mod generic;
pub mod mongo;
pub mod reduce;

#[cfg(test)]
mod tests;

/// The storage contract every backend satisfies.
///
/// Backends implement `store`/`find`/`sum` natively; the convenience queries
/// are provided compositions over those three, so they behave identically
/// everywhere. Identical descriptors yield logically equivalent result sets
/// on every backend, and nothing here mutates a stored record.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Appends one validated event and returns it with its backend-assigned
    /// id. A single atomic insert: it either lands whole or not at all.
    async fn store(&self, collection: &str, event: Event) -> StoreResult<Event>;

    /// All records matching the AND of the descriptor, in backend-defined
    /// order. An empty descriptor returns the whole collection.
    async fn find(&self, collection: &str, query: &[Condition]) -> StoreResult<Vec<Event>>;

    /// Summed `value` per distinct `group_key` participant among records
    /// that carry a recipient and satisfy the optional extra filter, ranked
    /// score-descending.
    async fn sum(
        &self,
        collection: &str,
        filter: Option<&Condition>,
        group_key: ListType,
    ) -> StoreResult<Vec<ScoreSummary>>;

    #[instrument(skip(self, at))]
    async fn give(&self, to: &UserId, from: &UserId, at: DateTime<Utc>) -> StoreResult<Event> {
        self.store(EVENT_COLLECTION, Event::give(to.clone(), from.clone(), at))
            .await
    }

    #[instrument(skip(self, at))]
    async fn take_away(&self, to: &UserId, from: &UserId, at: DateTime<Utc>) -> StoreResult<Event> {
        self.store(
            EVENT_COLLECTION,
            Event::take_away(to.clone(), from.clone(), at),
        )
        .await
    }

    /// Records on the `list_type` side of `user` within today's window.
    #[instrument(skip(self))]
    async fn find_from_today(
        &self,
        user: &UserId,
        list_type: ListType,
    ) -> StoreResult<Vec<Event>> {
        let day = DayBounds::today();
        let query = vec![
            Condition::eq(list_type.as_str(), user),
            Condition::gt("given_at", day.start),
            Condition::lt("given_at", day.end),
        ];

        self.find(EVENT_COLLECTION, &query).await
    }

    #[instrument(skip(self))]
    async fn get_score(&self, user: &UserId, list_type: ListType) -> StoreResult<Vec<Event>> {
        self.find(EVENT_COLLECTION, &[Condition::eq(list_type.as_str(), user)])
            .await
    }

    /// The arithmetic sum of `value` over [`Driver::get_score`].
    async fn get_score_total(&self, user: &UserId, list_type: ListType) -> StoreResult<i64> {
        let records = self.get_score(user, list_type).await?;
        Ok(records.iter().map(|e| e.value).sum())
    }

    /// Scoped scoreboard records. A user scope filters on the *inverse*
    /// field of its list type: the board answers "who is on the other side
    /// of this user's exchanges".
    #[instrument(skip(self))]
    async fn get_scoreboard(&self, scope: &ScoreboardScope) -> StoreResult<Vec<Event>> {
        let mut query = Vec::new();

        if let Some(user) = &scope.user {
            query.push(Condition::eq(scope.list_type.inverse().as_str(), user));
        }

        if scope.today {
            let day = DayBounds::today();
            query.push(Condition::gt("given_at", day.start));
            query.push(Condition::lt("given_at", day.end));
        }

        self.find(EVENT_COLLECTION, &query).await
    }
}

/// Configuration key selecting a backend implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverKind {
    Mongodb,
    Firestore,
    Array,
    File,
}

impl DriverKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriverKind::Mongodb => "mongodb",
            DriverKind::Firestore => "firestore",
            DriverKind::Array => "array",
            DriverKind::File => "file",
        }
    }
}

impl core::fmt::Display for DriverKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DriverKind {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mongodb" => Ok(DriverKind::Mongodb),
            "firestore" => Ok(DriverKind::Firestore),
            "array" => Ok(DriverKind::Array),
            "file" => Ok(DriverKind::File),
            other => Err(StoreError::Config(format!(
                "unknown storage driver '{other}'"
            ))),
        }
    }
}

/// Constructs the backend `env.driver` selects, injecting its settings by
/// parameter. Fails fast; no retries happen here or anywhere below.
#[instrument(skip(env), fields(driver = %env.driver))]
pub async fn connect(env: &Env) -> StoreResult<Box<dyn Driver>> {
    match env.driver.parse::<DriverKind>()? {
        DriverKind::Mongodb => Ok(Box::new(
            mongo::MongoDriver::connect(env.mongodb_url()?, env.mongodb_database()?).await?,
        )),
        DriverKind::Firestore => Ok(Box::new(
            firestore::FirestoreDriver::connect(env.firestore_project_id()?).await?,
        )),
        DriverKind::Array => Ok(Box::new(generic::GenericDriver::in_memory())),
        DriverKind::File => Ok(Box::new(
            generic::GenericDriver::file(env.store_path()?).await?,
        )),
    }
}
