//! Client-side grouping for backends without a native aggregation operator.
//!
//! Kept separate from the drivers so a backend that later grows a pipeline
//! can swap this out without touching its query translation.

use std::collections::HashMap;

use crate::db::models::event::Event;
use crate::db::models::score::ScoreSummary;
use crate::db::query::ListType;

/// Sums `value` per distinct `group_key` participant, ranked
/// score-descending.
///
/// Records without a recipient are skipped, matching the precondition the
/// pipeline-backed driver expresses as an `$exists` match. Equal scores
/// order id-ascending so repeated runs return an identical board.
pub fn sum_by(events: &[Event], group_key: ListType) -> Vec<ScoreSummary> {
    let mut totals: HashMap<&str, i64> = HashMap::new();

    for event in events {
        if event.to.as_str().is_empty() {
            continue;
        }

        let id = match group_key {
            ListType::To => event.to.as_str(),
            ListType::From => event.from.as_str(),
        };

        *totals.entry(id).or_default() += event.value;
    }

    let mut board: Vec<ScoreSummary> = totals
        .into_iter()
        .map(|(id, score)| ScoreSummary {
            id: id.into(),
            score,
        })
        .collect();

    board.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.id.0.cmp(&b.id.0)));
    board
}
