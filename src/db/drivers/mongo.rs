//! Document-database backend. Filtering and grouping are pushed to the
//! server: `find` runs one translated filter document, `sum` a native
//! aggregation pipeline.

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{Bson, Document, doc};
use mongodb::{Client, Collection, Database};
use tracing::{debug, instrument};

use crate::db::drivers::Driver;
use crate::db::models::event::Event;
use crate::db::models::score::ScoreSummary;
use crate::db::query::{self, Condition, FieldValue, ListType, Op};
use crate::db::{StoreError, StoreResult};

pub struct MongoDriver {
    db: Database,
}

impl MongoDriver {
    /// Fails fast on an unparseable connection string; the server itself is
    /// only reached by the first operation.
    #[instrument(skip(url))]
    pub async fn connect(url: &str, database: &str) -> StoreResult<Self> {
        let client = Client::with_uri_str(url)
            .await
            .map_err(|e| StoreError::Config(format!("mongodb connection: {e}")))?;

        Ok(Self {
            db: client.database(database),
        })
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.db.collection(name)
    }
}

#[async_trait]
impl Driver for MongoDriver {
    #[instrument(skip(self, event), fields(to = %event.to, from = %event.from))]
    async fn store(&self, collection: &str, event: Event) -> StoreResult<Event> {
        event.validate()?;

        let result = self
            .collection(collection)
            .insert_one(event_document(&event))
            .await?;

        let id = match result.inserted_id {
            Bson::ObjectId(oid) => oid.to_hex(),
            other => other.to_string(),
        };

        Ok(event.with_id(id))
    }

    #[instrument(skip(self, query), fields(conditions = query.len()))]
    async fn find(&self, collection: &str, query: &[Condition]) -> StoreResult<Vec<Event>> {
        query::validate(query)?;

        let filter = filter_document(query);
        debug!(?filter, "running translated find");

        let mut cursor = self.collection(collection).find(filter).await?;
        let mut events = Vec::new();
        while let Some(document) = cursor.try_next().await? {
            events.push(event_from_document(&document)?);
        }

        Ok(events)
    }

    #[instrument(skip(self, filter))]
    async fn sum(
        &self,
        collection: &str,
        filter: Option<&Condition>,
        group_key: ListType,
    ) -> StoreResult<Vec<ScoreSummary>> {
        if let Some(condition) = filter {
            query::validate(std::slice::from_ref(condition))?;
        }

        let pipeline = sum_pipeline(filter, group_key);
        let mut cursor = self.collection(collection).aggregate(pipeline).await?;

        let mut board = Vec::new();
        while let Some(document) = cursor.try_next().await? {
            board.push(ScoreSummary {
                id: document
                    .get_str("_id")
                    .map_err(|_| malformed("_id"))?
                    .into(),
                score: int_field(&document, "score")?,
            });
        }

        Ok(board)
    }
}

fn bson_value(value: &FieldValue) -> Bson {
    match value {
        FieldValue::Str(s) => Bson::String(s.clone()),
        FieldValue::Int(i) => Bson::Int64(*i),
        FieldValue::Time(t) => {
            Bson::DateTime(mongodb::bson::DateTime::from_millis(t.timestamp_millis()))
        }
    }
}

/// Folds the descriptor into one filter document. Range operators on the
/// same key share a single operator document, so the two predicates of a
/// day window AND correctly instead of overwriting each other.
fn filter_document(query: &[Condition]) -> Document {
    let mut filter = Document::new();

    for condition in query {
        match condition.op {
            Op::Eq => {
                filter.insert(condition.key.clone(), bson_value(&condition.value));
            }
            Op::Gt | Op::Lt => {
                let mut range = match filter.remove(&condition.key) {
                    Some(Bson::Document(existing)) => existing,
                    _ => Document::new(),
                };

                let operator = if condition.op == Op::Gt { "$gt" } else { "$lt" };
                range.insert(operator, bson_value(&condition.value));
                filter.insert(condition.key.clone(), range);
            }
        }
    }

    filter
}

/// Server-side counterpart of [`super::reduce::sum_by`].
fn sum_pipeline(filter: Option<&Condition>, group_key: ListType) -> Vec<Document> {
    let mut pipeline = vec![doc! { "$match": { "to": { "$exists": true } } }];

    if let Some(condition) = filter {
        pipeline.push(doc! { "$match": filter_document(std::slice::from_ref(condition)) });
    }

    pipeline.push(doc! {
        "$group": {
            "_id": format!("${}", group_key.as_str()),
            "score": { "$sum": "$value" },
        }
    });
    pipeline.push(doc! { "$sort": { "score": -1 } });

    pipeline
}

fn event_document(event: &Event) -> Document {
    doc! {
        "to": event.to.as_str(),
        "from": event.from.as_str(),
        "value": event.value,
        "given_at": mongodb::bson::DateTime::from_millis(event.given_at.timestamp_millis()),
    }
}

fn event_from_document(document: &Document) -> StoreResult<Event> {
    let id = match document.get("_id") {
        Some(Bson::ObjectId(oid)) => Some(oid.to_hex()),
        Some(Bson::String(s)) => Some(s.clone()),
        _ => None,
    };

    let to = document.get_str("to").map_err(|_| malformed("to"))?;
    let from = document.get_str("from").map_err(|_| malformed("from"))?;
    let value = int_field(document, "value")?;
    let given_at = document
        .get_datetime("given_at")
        .map_err(|_| malformed("given_at"))?;
    let given_at = chrono::DateTime::from_timestamp_millis(given_at.timestamp_millis())
        .ok_or_else(|| malformed("given_at"))?;

    Ok(Event {
        id,
        to: to.into(),
        from: from.into(),
        value,
        given_at,
    })
}

// integers come back as Int32 or Int64 depending on what wrote them
fn int_field(document: &Document, key: &str) -> StoreResult<i64> {
    match document.get(key) {
        Some(Bson::Int32(v)) => Ok(i64::from(*v)),
        Some(Bson::Int64(v)) => Ok(*v),
        _ => Err(malformed(key)),
    }
}

fn malformed(field: &str) -> StoreError {
    StoreError::Malformed(format!("missing or ill-typed field '{field}'"))
}
