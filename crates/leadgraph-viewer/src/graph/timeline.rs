use chrono::{Days, NaiveDate};
use leadgraph_core::DateRange;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DateCursor {
    range: Option<DateRange>,
    current: Option<NaiveDate>,
}

impl DateCursor {
    pub fn range(&self) -> Option<DateRange> {
        self.range
    }

    pub fn current(&self) -> Option<NaiveDate> {
        self.current
    }

    // a cursor parked on the old latest date follows the new one
    pub fn rebase(&mut self, range: Option<DateRange>) -> bool {
        let before = self.current;
        let was_at_end = match (self.range, self.current) {
            (Some(old), Some(cur)) => cur >= old.max,
            _ => true,
        };
        self.range = range;
        self.current = match (range, before) {
            (None, _) => None,
            (Some(r), Some(cur)) if !was_at_end => Some(r.clamp(cur)),
            (Some(r), _) => Some(r.max),
        };
        self.current != before
    }

    pub fn set(&mut self, date: NaiveDate) -> bool {
        let Some(range) = self.range else {
            return false;
        };
        let date = range.clamp(date);
        if self.current == Some(date) {
            return false;
        }
        self.current = Some(date);
        true
    }

    pub fn offset_days(&self) -> i64 {
        match (self.range, self.current) {
            (Some(r), Some(cur)) => (cur - r.min).num_days(),
            _ => 0,
        }
    }

    pub fn set_offset_days(&mut self, offset: i64) -> bool {
        let Some(range) = self.range else {
            return false;
        };
        let offset = offset.clamp(0, range.span_days());
        match range.min.checked_add_days(Days::new(offset as u64)) {
            Some(date) => self.set(date),
            None => false,
        }
    }

    pub fn advance(&mut self, days: u64) -> bool {
        let (Some(range), Some(cur)) = (self.range, self.current) else {
            return false;
        };
        if cur >= range.max {
            return false;
        }
        let next = cur.checked_add_days(Days::new(days.max(1))).unwrap_or(range.max);
        self.set(next)
    }

    pub fn rewind(&mut self) -> bool {
        match self.range {
            Some(r) => self.set(r.min),
            None => false,
        }
    }
}
