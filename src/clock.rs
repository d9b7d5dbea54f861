use chrono::{DateTime, NaiveDate, Utc};

/// Time source for the core. The pipeline and scheduler only ever need the
/// current instant and "today" in the single reference timezone (UTC); they
/// never read the wall clock directly, which keeps both fully testable.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Today's calendar date in the reference timezone.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    /// Midnight at the start of today, reference timezone. The scheduler's
    /// "already sent today" check is anchored here.
    fn start_of_today(&self) -> DateTime<Utc> {
        self.today()
            .and_hms_opt(0, 0, 0)
            .unwrap_or_default()
            .and_utc()
    }
}

/// Production clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Fixed clock for tests and replay.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn start_of_today_is_midnight() {
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 3, 12, 14, 30, 5).unwrap());
        assert_eq!(
            clock.start_of_today(),
            Utc.with_ymd_and_hms(2026, 3, 12, 0, 0, 0).unwrap()
        );
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2026, 3, 12).unwrap());
    }
}
