use thiserror::Error;

pub mod drivers;
pub mod models;
pub mod query;

pub mod prelude {
    pub use crate::db::EVENT_COLLECTION;
    pub use crate::db::{StoreError, StoreResult};

    pub use crate::db::models::event::{Event, UserId};
    pub use crate::db::models::score::ScoreSummary;
    pub use crate::db::query::{Condition, FieldValue, ListType, Op, ScoreboardScope};

    pub use crate::db::drivers::{Driver, DriverKind, connect};
}

/// Single logical namespace all give/take persistence lands in.
pub const EVENT_COLLECTION: &str = "kudos";

pub type StoreResult<T> = core::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("driver configuration error: {0}")]
    Config(String),

    #[error("driver configuration error: {0}")]
    MissingConfig(#[from] crate::util::env::EnvError),

    #[error("mongodb error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("firestore error: {0}")]
    Firestore(#[from] firestore::errors::FirestoreError),

    #[error("flat store io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("flat store encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("malformed stored record: {0}")]
    Malformed(String),
}
