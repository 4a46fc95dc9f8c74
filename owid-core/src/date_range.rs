use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Inclusive first/last date of a series.
///
/// The cutoff slider is constrained to these bounds; anything outside is
/// clamped rather than rejected.
#[derive(Clone, Eq, PartialEq, Copy, Debug, Serialize, Deserialize)]
pub struct DateBounds {
    pub first: NaiveDate,
    pub last: NaiveDate,
}

impl DateBounds {
    /// Bounds over an iterator of dates, `None` if it is empty.
    pub fn from_dates<I>(dates: I) -> Option<Self>
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        dates.into_iter().fold(None, |bounds, date| match bounds {
            None => Some(DateBounds {
                first: date,
                last: date,
            }),
            Some(DateBounds { first, last }) => Some(DateBounds {
                first: first.min(date),
                last: last.max(date),
            }),
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.first <= date && date <= self.last
    }

    pub fn clamp(&self, date: NaiveDate) -> NaiveDate {
        date.clamp(self.first, self.last)
    }
}
