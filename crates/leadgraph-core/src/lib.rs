use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub String);

/// Leadership rating attached to a record. Nominally 1..=5, but values are
/// carried as-is; consumers clamp where they need a bounded level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Level(pub i64);

impl Level {
    pub const MIN: i64 = 1;
    pub const MAX: i64 = 5;

    pub fn clamped(self) -> u8 {
        self.0.clamp(Self::MIN, Self::MAX) as u8
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipRecord {
    #[serde(default, deserialize_with = "loose_string")]
    pub id: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub organizer: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub organizee: String,
    #[serde(default, deserialize_with = "loose_date")]
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "loose_level")]
    pub leadership: Option<Level>,
    #[serde(default, deserialize_with = "loose_string")]
    pub event: String,
}

impl RelationshipRecord {
    pub fn new(
        organizer: impl Into<String>,
        organizee: impl Into<String>,
        date: NaiveDate,
        leadership: i64,
        event: impl Into<String>,
    ) -> Self {
        Self {
            id: String::new(),
            organizer: organizer.into(),
            organizee: organizee.into(),
            date: Some(date),
            leadership: Some(Level(leadership)),
            event: event.into(),
        }
    }

    /// Both parties present; only these records become edges.
    pub fn is_linkable(&self) -> bool {
        !self.organizer.trim().is_empty() && !self.organizee.trim().is_empty()
    }

    pub fn organizer_id(&self) -> Option<EntityId> {
        non_empty_id(&self.organizer)
    }

    pub fn organizee_id(&self) -> Option<EntityId> {
        non_empty_id(&self.organizee)
    }
}

fn non_empty_id(s: &str) -> Option<EntityId> {
    if s.trim().is_empty() {
        None
    } else {
        Some(EntityId(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub min: NaiveDate,
    pub max: NaiveDate,
}

impl DateRange {
    /// Span of every dated record, or `None` when nothing carries a date.
    pub fn of(records: &[RelationshipRecord]) -> Option<Self> {
        let mut dates = records.iter().filter_map(|r| r.date);
        let first = dates.next()?;
        let (min, max) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
        Some(Self { min, max })
    }

    pub fn span_days(&self) -> i64 {
        (self.max - self.min).num_days()
    }

    pub fn clamp(&self, date: NaiveDate) -> NaiveDate {
        date.clamp(self.min, self.max)
    }
}

/// Decode a JSON array of records. Missing ids are filled with `rec-<index>`.
pub fn decode_records(json: &str) -> serde_json::Result<Vec<RelationshipRecord>> {
    let mut records: Vec<RelationshipRecord> = serde_json::from_str(json)?;
    assign_missing_ids(&mut records);
    Ok(records)
}

pub fn assign_missing_ids(records: &mut [RelationshipRecord]) {
    for (i, r) in records.iter_mut().enumerate() {
        if r.id.trim().is_empty() {
            r.id = format!("rec-{i}");
        }
    }
}

pub fn demo_records() -> Vec<RelationshipRecord> {
    decode_records(include_str!("../data/demo_records.json")).unwrap_or_default()
}

// ----- lenient field decoding -----

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Int(i64),
    Float(f64),
    Text(String),
    Other(serde_json::Value),
}

fn loose_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Option::<Loose>::deserialize(d)? {
        Some(Loose::Text(s)) => s,
        Some(Loose::Int(i)) => i.to_string(),
        Some(Loose::Float(f)) => f.to_string(),
        Some(Loose::Other(_)) | None => String::new(),
    })
}

fn loose_level<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Level>, D::Error> {
    Ok(match Option::<Loose>::deserialize(d)? {
        Some(Loose::Int(i)) => Some(Level(i)),
        Some(Loose::Float(f)) if f.is_finite() => Some(Level(f.round() as i64)),
        Some(Loose::Text(s)) => s.trim().parse::<i64>().ok().map(Level),
        _ => None,
    })
}

fn loose_date<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
    Ok(match Option::<Loose>::deserialize(d)? {
        Some(Loose::Text(s)) => parse_date(&s),
        _ => None,
    })
}

/// `YYYY-MM-DD`, or an RFC 3339 timestamp whose date part is kept.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}
