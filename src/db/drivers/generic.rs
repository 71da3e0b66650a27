//! Resident-collection backend, optionally persisted to a flat JSON file.
//!
//! Intended for local testing and small deployments with no external
//! storage dependency. Operations are synchronous internally but exposed
//! through the same async contract as the network backends.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::db::drivers::{Driver, reduce};
use crate::db::models::event::Event;
use crate::db::models::score::ScoreSummary;
use crate::db::query::{self, Condition, ListType};
use crate::db::{StoreError, StoreResult};

/// Append-only event collection held in memory. The lock gives concurrent
/// logical callers a single-writer discipline the network backends get from
/// their servers.
pub struct GenericDriver {
    entries: RwLock<Vec<Event>>,
    path: Option<PathBuf>,
}

impl GenericDriver {
    pub fn in_memory() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            path: None,
        }
    }

    /// Opens a file-backed collection, treating a missing file as empty.
    /// An unreadable or undecodable file fails construction.
    pub async fn file(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();

        let entries: Vec<Event> = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                StoreError::Config(format!("undecodable store file {}: {e}", path.display()))
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                return Err(StoreError::Config(format!(
                    "unreadable store file {}: {e}",
                    path.display()
                )));
            }
        };

        debug!(path = %path.display(), records = entries.len(), "opened flat store");

        Ok(Self {
            entries: RwLock::new(entries),
            path: Some(path),
        })
    }

    async fn persist(&self, entries: &[Event]) -> StoreResult<()> {
        if let Some(path) = &self.path {
            let bytes = serde_json::to_vec_pretty(entries)?;
            tokio::fs::write(path, bytes).await?;
        }

        Ok(())
    }
}

#[async_trait]
impl Driver for GenericDriver {
    #[instrument(skip(self, event), fields(to = %event.to, from = %event.from))]
    async fn store(&self, _collection: &str, event: Event) -> StoreResult<Event> {
        event.validate()?;
        let event = event.with_id(Uuid::new_v4().to_string());

        let mut entries = self.entries.write().await;
        entries.push(event.clone());

        // keep memory and disk in step: a failed rewrite unwinds the append
        if let Err(e) = self.persist(&entries).await {
            entries.pop();
            return Err(e);
        }

        Ok(event)
    }

    #[instrument(skip(self, query), fields(conditions = query.len()))]
    async fn find(&self, _collection: &str, query: &[Condition]) -> StoreResult<Vec<Event>> {
        query::validate(query)?;

        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .filter(|event| query.iter().all(|c| c.matches(event)))
            .cloned()
            .collect())
    }

    #[instrument(skip(self, filter))]
    async fn sum(
        &self,
        collection: &str,
        filter: Option<&Condition>,
        group_key: ListType,
    ) -> StoreResult<Vec<ScoreSummary>> {
        let query: Vec<Condition> = filter.cloned().into_iter().collect();
        let matching = self.find(collection, &query).await?;

        Ok(reduce::sum_by(&matching, group_key))
    }
}
