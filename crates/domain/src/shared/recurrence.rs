use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RappelFrequency {
    Daily,
    Weekly,
    Monthly,
}

impl Default for RappelFrequency {
    fn default() -> Self {
        Self::Daily
    }
}

impl RappelFrequency {
    /// Moves `from` forward by `interval` periods of this frequency.
    /// Returns `None` if the result does not fit in a `DateTime`.
    pub fn step(&self, from: DateTime<Utc>, interval: u32) -> Option<DateTime<Utc>> {
        let interval = interval.max(1);
        match self {
            Self::Daily => from.checked_add_signed(Duration::days(interval as i64)),
            Self::Weekly => from.checked_add_signed(Duration::weeks(interval as i64)),
            Self::Monthly => from.checked_add_months(Months::new(interval)),
        }
    }

    /// The first occurrence strictly after `now`, counting whole periods
    /// from `anchor`. Every occurrence is `anchor` plus a multiple of
    /// `interval` periods, so monthly ones keep the anchor's day of month.
    pub fn next_after(
        &self,
        anchor: DateTime<Utc>,
        interval: u32,
        now: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        let interval = interval.max(1);
        // Skip the occurrences that were missed while the rappel was not sent
        // instead of firing once for each of them. The estimate never goes
        // past `now`, the loop finds the exact occurrence.
        let elapsed = (now - anchor).num_seconds().max(0);
        let mut periods = u32::try_from(elapsed / self.longest_period_secs(interval))
            .ok()?
            .max(1);
        loop {
            let next = self.step(anchor, interval.checked_mul(periods)?)?;
            if next > now {
                return Some(next);
            }
            periods = periods.checked_add(1)?;
        }
    }

    fn longest_period_secs(&self, interval: u32) -> i64 {
        let days = match self {
            Self::Daily => 1,
            Self::Weekly => 7,
            Self::Monthly => 31,
        };
        days * 86_400 * interval as i64
    }
}

impl Display for RappelFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let freq = match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        };
        write!(f, "{}", freq)
    }
}

#[derive(Error, Debug)]
pub enum InvalidFrequencyError {
    #[error("Invalid rappel frequency specified: {0}")]
    Malformed(String),
}

impl FromStr for RappelFrequency {
    type Err = InvalidFrequencyError;

    fn from_str(freq: &str) -> Result<Self, Self::Err> {
        match freq.trim().to_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            _ => Err(InvalidFrequencyError::Malformed(freq.to_string())),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::{Datelike, TimeZone};

    fn dt(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn parses_frequencies() {
        assert_eq!(
            "daily".parse::<RappelFrequency>().unwrap(),
            RappelFrequency::Daily
        );
        assert_eq!(
            "Weekly".parse::<RappelFrequency>().unwrap(),
            RappelFrequency::Weekly
        );
        assert_eq!(
            "MONTHLY".parse::<RappelFrequency>().unwrap(),
            RappelFrequency::Monthly
        );
        assert!("yearly".parse::<RappelFrequency>().is_err());
        assert!("".parse::<RappelFrequency>().is_err());
    }

    #[test]
    fn steps_by_interval() {
        let from = dt(2021, 1, 31, 9);
        assert_eq!(
            RappelFrequency::Daily.step(from, 2).unwrap(),
            dt(2021, 2, 2, 9)
        );
        assert_eq!(
            RappelFrequency::Weekly.step(from, 1).unwrap(),
            dt(2021, 2, 7, 9)
        );
        // End of month is clamped
        assert_eq!(
            RappelFrequency::Monthly.step(from, 1).unwrap(),
            dt(2021, 2, 28, 9)
        );
        // Interval 0 behaves like 1
        assert_eq!(
            RappelFrequency::Daily.step(from, 0).unwrap(),
            dt(2021, 2, 1, 9)
        );
    }

    #[test]
    fn next_after_is_strictly_after_now() {
        let now = dt(2021, 3, 10, 12);

        let next = RappelFrequency::Daily
            .next_after(dt(2021, 3, 10, 9), 1, now)
            .unwrap();
        assert_eq!(next, dt(2021, 3, 11, 9));

        // Anchor exactly one period before now
        let next = RappelFrequency::Daily
            .next_after(dt(2021, 3, 9, 12), 1, now)
            .unwrap();
        assert_eq!(next, dt(2021, 3, 11, 12));

        // Anchor far in the past skips all missed occurrences
        let next = RappelFrequency::Weekly
            .next_after(dt(2020, 1, 1, 12), 1, now)
            .unwrap();
        assert!(next > now);
        assert!(next <= now + Duration::weeks(1));
        assert_eq!(next.weekday(), dt(2020, 1, 1, 12).weekday());

        let next = RappelFrequency::Monthly
            .next_after(dt(2020, 6, 15, 8), 2, now)
            .unwrap();
        assert_eq!(next, dt(2021, 4, 15, 8));
    }

    #[test]
    fn monthly_catch_up_keeps_day_of_month() {
        let anchor = dt(2021, 1, 31, 9);

        let next = RappelFrequency::Monthly
            .next_after(anchor, 1, dt(2021, 3, 1, 9))
            .unwrap();
        assert_eq!(next, dt(2021, 3, 31, 9));

        let next = RappelFrequency::Monthly
            .next_after(anchor, 1, dt(2021, 4, 5, 9))
            .unwrap();
        assert_eq!(next, dt(2021, 4, 30, 9));

        let next = RappelFrequency::Monthly
            .next_after(anchor, 1, dt(2021, 5, 1, 9))
            .unwrap();
        assert_eq!(next, dt(2021, 5, 31, 9));
    }

    #[test]
    fn anchor_in_the_future_steps_once() {
        let now = dt(2021, 3, 10, 12);
        let next = RappelFrequency::Daily
            .next_after(dt(2021, 3, 12, 9), 1, now)
            .unwrap();
        assert_eq!(next, dt(2021, 3, 13, 9));
    }
}
