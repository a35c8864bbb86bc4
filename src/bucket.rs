//! Bucket keys: the partition identifiers of the ledger.
//!
//! A key is `DD-MM SUFFIX`, where the suffix names either a shift (`1SH`,
//! `2SH`) or the drinks feed. Two events land in the same bucket if and only
//! if they render to the same string, so the format here is a storage
//! contract and never depends on locale.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const DRINKS_SUFFIX: &str = "НАПОЇ";

/// Hour and minute at which the second shift starts.
pub const SECOND_SHIFT_START: (u32, u32) = (14, 30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shift {
    First,
    Second,
}

impl Shift {
    pub fn at(time: NaiveTime) -> Self {
        if (time.hour(), time.minute()) < SECOND_SHIFT_START {
            Shift::First
        } else {
            Shift::Second
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            Shift::First => "1SH",
            Shift::Second => "2SH",
        }
    }
}

/// What a bucket collects: waste for one shift, or the whole day's drinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Feed {
    Shift(Shift),
    Drinks,
}

impl Feed {
    pub fn suffix(self) -> &'static str {
        match self {
            Feed::Shift(shift) => shift.suffix(),
            Feed::Drinks => DRINKS_SUFFIX,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("malformed bucket key: {0:?}")]
pub struct ParseBucketKeyError(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct BucketKey {
    month: u32,
    day: u32,
    feed: Feed,
}

impl BucketKey {
    pub fn shift(date: NaiveDate, shift: Shift) -> Self {
        Self::on(date, Feed::Shift(shift))
    }

    pub fn drinks(date: NaiveDate) -> Self {
        Self::on(date, Feed::Drinks)
    }

    /// The shift bucket an event at `at` (local wall-clock time) belongs to.
    pub fn shift_at(at: NaiveDateTime) -> Self {
        Self::shift(at.date(), Shift::at(at.time()))
    }

    fn on(date: NaiveDate, feed: Feed) -> Self {
        Self {
            month: date.month(),
            day: date.day(),
            feed,
        }
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn feed(&self) -> Feed {
        self.feed
    }

    pub fn is_drinks(&self) -> bool {
        self.feed == Feed::Drinks
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02} {}", self.day, self.month, self.feed.suffix())
    }
}

impl FromStr for BucketKey {
    type Err = ParseBucketKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ParseBucketKeyError(s.to_string());

        let (date, suffix) = s.split_once(' ').ok_or_else(malformed)?;
        let (day, month) = date.split_once('-').ok_or_else(malformed)?;
        let day = two_digits(day).ok_or_else(malformed)?;
        let month = two_digits(month).ok_or_else(malformed)?;
        if !(1..=31).contains(&day) || !(1..=12).contains(&month) {
            return Err(malformed());
        }

        let feed = match suffix {
            "1SH" => Feed::Shift(Shift::First),
            "2SH" => Feed::Shift(Shift::Second),
            DRINKS_SUFFIX => Feed::Drinks,
            _ => return Err(malformed()),
        };

        Ok(Self { month, day, feed })
    }
}

fn two_digits(part: &str) -> Option<u32> {
    if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

impl From<BucketKey> for String {
    fn from(key: BucketKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for BucketKey {
    type Error = ParseBucketKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Both shift buckets for each of the last `days` days, today first.
pub fn recent_shift_keys(today: NaiveDate, days: u32) -> Vec<BucketKey> {
    let mut keys = Vec::with_capacity(days as usize * 2);
    for offset in 0..days {
        let date = today - Duration::days(i64::from(offset));
        keys.push(BucketKey::shift(date, Shift::First));
        keys.push(BucketKey::shift(date, Shift::Second));
    }
    keys
}

pub fn recent_drink_keys(today: NaiveDate, days: u32) -> Vec<BucketKey> {
    (0..days)
        .map(|offset| BucketKey::drinks(today - Duration::days(i64::from(offset))))
        .collect()
}

pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Monday and Sunday of the week containing `today` shifted by `offset` weeks.
pub fn week_range(today: NaiveDate, offset: i64) -> (NaiveDate, NaiveDate) {
    let start = week_start(today + Duration::weeks(offset));
    (start, start + Duration::days(6))
}

pub fn week_drink_keys(today: NaiveDate, offset: i64) -> Vec<BucketKey> {
    let (start, _) = week_range(today, offset);
    (0..7)
        .map(|day| BucketKey::drinks(start + Duration::days(day)))
        .collect()
}
