use thiserror::Error;

pub type EnvResult<T> = core::result::Result<T, EnvError>;

#[derive(Debug, Error)]
pub enum EnvError {
    #[error("error while fetching .env variables: {0}")]
    DotenvyError(#[from] dotenvy::Error),

    #[error("missing variable for the selected driver: {0}")]
    MissingVar(&'static str),
}

/// Storage-layer settings, resolved once from the process environment
/// (`.env` files included via dotenvy).
///
/// Only `KUDOS_DRIVER` is read eagerly; each backend's own settings are
/// required lazily when that backend is actually selected, so an `array`
/// deployment needs no variables at all.
#[derive(Debug, Clone, Default)]
pub struct Env {
    pub driver: String,
    pub mongodb_url: Option<String>,
    pub mongodb_database: Option<String>,
    pub firestore_project_id: Option<String>,
    pub store_path: Option<String>,
}

impl Env {
    pub fn init() -> EnvResult<Self> {
        Ok(Self {
            driver: dotenvy::var("KUDOS_DRIVER").unwrap_or_else(|_| "array".to_string()),
            mongodb_url: dotenvy::var("MONGODB_URL").ok(),
            mongodb_database: dotenvy::var("MONGODB_DATABASE").ok(),
            firestore_project_id: dotenvy::var("FIRESTORE_PROJECT_ID").ok(),
            store_path: dotenvy::var("KUDOS_STORE_PATH").ok(),
        })
    }

    /// Settings for a specific backend, for callers that bypass the
    /// environment entirely.
    pub fn for_driver(driver: impl Into<String>) -> Self {
        Self {
            driver: driver.into(),
            ..Self::default()
        }
    }

    pub fn mongodb_url(&self) -> EnvResult<&str> {
        self.mongodb_url
            .as_deref()
            .ok_or(EnvError::MissingVar("MONGODB_URL"))
    }

    pub fn mongodb_database(&self) -> EnvResult<&str> {
        self.mongodb_database
            .as_deref()
            .ok_or(EnvError::MissingVar("MONGODB_DATABASE"))
    }

    pub fn firestore_project_id(&self) -> EnvResult<&str> {
        self.firestore_project_id
            .as_deref()
            .ok_or(EnvError::MissingVar("FIRESTORE_PROJECT_ID"))
    }

    pub fn store_path(&self) -> EnvResult<&str> {
        self.store_path
            .as_deref()
            .ok_or(EnvError::MissingVar("KUDOS_STORE_PATH"))
    }
}
