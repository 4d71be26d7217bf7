use std::fmt;

use jiff::{civil::Date, ToSpan, Zoned};

/// An inclusive range of calendar days, `[start, end]`.
/// A range with `start > end` is valid and contains no days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: Date,
    end: Date,
}

impl DateRange {
    pub fn new(start: Date, end: Date) -> DateRange {
        DateRange { start, end }
    }

    /// Either end that is not given is tomorrow, in the local time zone.
    pub fn or_tomorrow(start: Option<Date>, end: Option<Date>) -> Result<DateRange, jiff::Error> {
        let tomorrow = Zoned::now().date().tomorrow()?;
        Ok(DateRange::new(
            start.unwrap_or(tomorrow),
            end.unwrap_or(tomorrow),
        ))
    }

    pub fn start(&self) -> Date {
        self.start
    }

    pub fn end(&self) -> Date {
        self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    pub fn days(&self) -> Vec<Date> {
        self.iter().collect()
    }

    pub fn iter(&self) -> Days {
        Days {
            current: Some(self.start),
            end: self.end,
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

impl IntoIterator for DateRange {
    type Item = Date;
    type IntoIter = Days;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterate over the days of a [`DateRange`] in ascending order.
#[derive(Debug, Clone)]
pub struct Days {
    current: Option<Date>,
    end: Date,
}

impl Iterator for Days {
    type Item = Date;

    fn next(&mut self) -> Option<Date> {
        let day = self.current.filter(|d| *d <= self.end)?;
        self.current = if day < self.end {
            day.checked_add(1.day()).ok()
        } else {
            None
        };
        Some(day)
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use super::*;

    #[test]
    fn days_in_range() {
        let range = DateRange::new(date(2024, 2, 27), date(2024, 3, 2));
        assert_eq!(
            range.days(),
            vec![
                date(2024, 2, 27),
                date(2024, 2, 28),
                date(2024, 2, 29),
                date(2024, 3, 1),
                date(2024, 3, 2),
            ]
        );
        assert_eq!(range.to_string(), "[2024-02-27, 2024-03-02]");
    }

    #[test]
    fn single_day() {
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 1));
        assert_eq!(range.days(), vec![date(2024, 1, 1)]);
        assert!(!range.is_empty());
    }

    #[test]
    fn reversed_range_is_empty() {
        let range = DateRange::new(date(2024, 1, 3), date(2024, 1, 1));
        assert!(range.is_empty());
        assert_eq!(range.into_iter().count(), 0);
    }

    #[test]
    fn range_ending_on_last_representable_day() {
        let range = DateRange::new(Date::MAX.yesterday().unwrap(), Date::MAX);
        assert_eq!(range.days().len(), 2);
    }

    #[test]
    fn default_is_tomorrow_only() {
        let range = DateRange::or_tomorrow(None, None).unwrap();
        assert_eq!(range.start(), range.end());
        assert!(range.start() > Zoned::now().date().yesterday().unwrap());
    }

    #[test]
    fn given_ends_are_kept() {
        let range = DateRange::or_tomorrow(Some(date(2024, 1, 1)), Some(date(2024, 1, 3))).unwrap();
        assert_eq!(range, DateRange::new(date(2024, 1, 1), date(2024, 1, 3)));

        let range = DateRange::or_tomorrow(Some(date(2024, 1, 1)), None).unwrap();
        assert_eq!(range.start(), date(2024, 1, 1));
        assert!(range.end() > Zoned::now().date().yesterday().unwrap());
    }
}
