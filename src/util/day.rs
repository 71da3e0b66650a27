use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

/// Start and end instants of one calendar day (UTC).
///
/// Today-scoped queries pair these with strict `>`/`<` predicates, so both
/// boundary instants sit outside the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayBounds {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayBounds {
    pub fn today() -> Self {
        Self::of(Utc::now().date_naive())
    }

    pub fn of(date: NaiveDate) -> Self {
        let start = date.and_time(NaiveTime::MIN).and_utc();
        let end = date
            .succ_opt()
            .unwrap_or(NaiveDate::MAX)
            .and_time(NaiveTime::MIN)
            .and_utc();

        Self { start, end }
    }
}

#[cfg(test)]
mod test {
    use chrono::{Duration, NaiveDate};

    use super::*;

    #[test]
    fn bounds_span_exactly_one_day() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let day = DayBounds::of(date);

        assert_eq!(day.end - day.start, Duration::days(1));
        assert_eq!(day.start.date_naive(), date);
    }

    #[test]
    fn today_contains_now() {
        let day = DayBounds::today();
        let now = Utc::now();

        assert!(day.start <= now && now < day.end);
    }
}
