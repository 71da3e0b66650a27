//! Contract tests, run against the generic backend as the oracle. The
//! network backends share every composition exercised here through the
//! trait's provided methods, and their query translations are covered by
//! their own unit tests.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use crate::db::drivers::Driver;
use crate::db::drivers::generic::GenericDriver;
use crate::db::models::event::Event;
use crate::db::models::score::ScoreSummary;
use crate::db::query::{Condition, ListType, ScoreboardScope};
use crate::db::{EVENT_COLLECTION, StoreError};
use crate::util::day::DayBounds;

fn june_first(h: u32, m: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, h, m, s).unwrap()
}

#[tokio::test]
async fn give_round_trips_through_find() {
    let driver = GenericDriver::in_memory();
    let stored = driver
        .give(&"bob".into(), &"alice".into(), june_first(12, 0, 0))
        .await
        .unwrap();

    assert!(stored.id.is_some());

    let found = driver
        .find(
            EVENT_COLLECTION,
            &[Condition::eq("to", "bob"), Condition::eq("from", "alice")],
        )
        .await
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].value, 1);
    assert_eq!(found[0].given_at, june_first(12, 0, 0));
}

#[tokio::test]
async fn take_away_round_trips_through_find() {
    let driver = GenericDriver::in_memory();
    driver
        .take_away(&"bob".into(), &"alice".into(), june_first(12, 0, 0))
        .await
        .unwrap();

    let found = driver
        .find(EVENT_COLLECTION, &[Condition::eq("to", "bob")])
        .await
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].value, -1);
}

#[tokio::test]
async fn score_total_matches_the_arithmetic_sum() {
    let driver = GenericDriver::in_memory();
    let at = june_first(10, 0, 0);

    for _ in 0..3 {
        driver.give(&"bob".into(), &"alice".into(), at).await.unwrap();
    }
    driver
        .take_away(&"bob".into(), &"carl".into(), at)
        .await
        .unwrap();

    assert_eq!(
        driver
            .get_score_total(&"bob".into(), ListType::To)
            .await
            .unwrap(),
        2
    );
    assert_eq!(
        driver
            .get_score(&"bob".into(), ListType::To)
            .await
            .unwrap()
            .len(),
        4
    );
}

#[tokio::test]
async fn board_follows_gives_and_take_aways() {
    let driver = GenericDriver::in_memory();
    let at = june_first(10, 0, 0);

    driver.give(&"bob".into(), &"alice".into(), at).await.unwrap();
    let board = driver.sum(EVENT_COLLECTION, None, ListType::To).await.unwrap();
    assert_eq!(board, vec![ScoreSummary { id: "bob".into(), score: 1 }]);

    driver
        .take_away(&"bob".into(), &"carl".into(), at)
        .await
        .unwrap();
    let board = driver.sum(EVENT_COLLECTION, None, ListType::To).await.unwrap();
    assert_eq!(board, vec![ScoreSummary { id: "bob".into(), score: 0 }]);
}

#[tokio::test]
async fn sum_honors_the_extra_filter() {
    let driver = GenericDriver::in_memory();
    let at = june_first(10, 0, 0);

    driver.give(&"bob".into(), &"alice".into(), at).await.unwrap();
    driver.give(&"bob".into(), &"carl".into(), at).await.unwrap();
    driver.give(&"dana".into(), &"alice".into(), at).await.unwrap();

    let filter = Condition::eq("from", "alice");
    let board = driver
        .sum(EVENT_COLLECTION, Some(&filter), ListType::To)
        .await
        .unwrap();

    assert_eq!(
        board,
        vec![
            ScoreSummary { id: "bob".into(), score: 1 },
            ScoreSummary { id: "dana".into(), score: 1 },
        ]
    );
}

#[tokio::test]
async fn scoreboard_filters_on_the_inverse_field() {
    let driver = GenericDriver::in_memory();
    let at = june_first(10, 0, 0);

    driver.give(&"alice".into(), &"bob".into(), at).await.unwrap();
    driver.give(&"carl".into(), &"alice".into(), at).await.unwrap();

    // "who gave to alice": list type `from` inverts onto the `to` field
    let board = driver
        .get_scoreboard(&ScoreboardScope::for_user("alice", ListType::From))
        .await
        .unwrap();

    assert_eq!(board.len(), 1);
    assert_eq!(board[0].to, "alice".into());
    assert_eq!(board[0].from, "bob".into());

    let board = driver
        .get_scoreboard(&ScoreboardScope::for_user("alice", ListType::To))
        .await
        .unwrap();

    assert_eq!(board.len(), 1);
    assert_eq!(board[0].from, "alice".into());
}

#[tokio::test]
async fn unscoped_scoreboard_returns_every_record() {
    let driver = GenericDriver::in_memory();
    let at = june_first(10, 0, 0);

    driver.give(&"alice".into(), &"bob".into(), at).await.unwrap();
    driver.give(&"carl".into(), &"alice".into(), at).await.unwrap();

    let board = driver.get_scoreboard(&ScoreboardScope::all()).await.unwrap();
    assert_eq!(board.len(), 2);
}

#[tokio::test]
async fn day_window_predicates_are_strict() {
    let driver = GenericDriver::in_memory();
    let day = DayBounds::of(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());

    driver.give(&"bob".into(), &"a".into(), day.start).await.unwrap();
    driver
        .give(&"bob".into(), &"b".into(), day.start + Duration::seconds(1))
        .await
        .unwrap();
    driver.give(&"bob".into(), &"c".into(), day.end).await.unwrap();

    let windowed = driver
        .find(
            EVENT_COLLECTION,
            &[
                Condition::eq("to", "bob"),
                Condition::gt("given_at", day.start),
                Condition::lt("given_at", day.end),
            ],
        )
        .await
        .unwrap();

    // only the event one second inside the window survives both boundaries
    assert_eq!(windowed.len(), 1);
    assert_eq!(windowed[0].from, "b".into());
}

#[tokio::test]
async fn find_from_today_sees_a_fresh_event() {
    let driver = GenericDriver::in_memory();
    driver
        .give(&"bob".into(), &"alice".into(), Utc::now())
        .await
        .unwrap();

    let today = driver
        .find_from_today(&"bob".into(), ListType::To)
        .await
        .unwrap();
    assert_eq!(today.len(), 1);

    let sent_today = driver
        .find_from_today(&"bob".into(), ListType::From)
        .await
        .unwrap();
    assert!(sent_today.is_empty());
}

#[tokio::test]
async fn empty_descriptor_returns_the_whole_collection() {
    let driver = GenericDriver::in_memory();
    let at = june_first(10, 0, 0);

    for user in ["bob", "carl", "dana"] {
        driver.give(&user.into(), &"alice".into(), at).await.unwrap();
    }

    let all = driver.find(EVENT_COLLECTION, &[]).await.unwrap();
    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn invalid_input_is_rejected_before_io() {
    let driver = GenericDriver::in_memory();

    let bad_value = Event::new("bob".into(), "alice".into(), 5, Utc::now());
    assert!(matches!(
        driver.store(EVENT_COLLECTION, bad_value).await,
        Err(StoreError::Validation(_))
    ));

    assert!(matches!(
        driver.find(EVENT_COLLECTION, &[Condition::eq("", "bob")]).await,
        Err(StoreError::Validation(_))
    ));

    let all = driver.find(EVENT_COLLECTION, &[]).await.unwrap();
    assert!(all.is_empty());
}

#[tokio::test]
async fn equal_scores_rank_id_ascending() {
    let driver = GenericDriver::in_memory();
    let at = june_first(10, 0, 0);

    for user in ["zoe", "amy", "mia"] {
        driver.give(&user.into(), &"alice".into(), at).await.unwrap();
    }

    let ids: Vec<String> = driver
        .sum(EVENT_COLLECTION, None, ListType::To)
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.id.0)
        .collect();

    assert_eq!(ids, vec!["amy", "mia", "zoe"]);
}

#[tokio::test]
async fn file_store_survives_a_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kudos.json");

    {
        let driver = GenericDriver::file(&path).await.unwrap();
        driver
            .give(&"bob".into(), &"alice".into(), june_first(9, 0, 0))
            .await
            .unwrap();
        driver
            .take_away(&"bob".into(), &"carl".into(), june_first(9, 5, 0))
            .await
            .unwrap();
    }

    let reopened = GenericDriver::file(&path).await.unwrap();
    let all = reopened.find(EVENT_COLLECTION, &[]).await.unwrap();

    assert_eq!(all.len(), 2);
    assert_eq!(
        reopened
            .get_score_total(&"bob".into(), ListType::To)
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn corrupt_file_fails_construction() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kudos.json");
    tokio::fs::write(&path, b"not json").await.unwrap();

    assert!(matches!(
        GenericDriver::file(&path).await,
        Err(StoreError::Config(_))
    ));
}

#[tokio::test]
async fn missing_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let driver = GenericDriver::file(dir.path().join("fresh.json")).await.unwrap();

    let all = driver.find(EVENT_COLLECTION, &[]).await.unwrap();
    assert!(all.is_empty());
}
