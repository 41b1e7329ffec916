use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use leadgraph_core::{DateRange, EntityId, Level, RelationshipRecord};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum TimeWindow {
    Initial,
    Middle,
    Current,
}

impl TimeWindow {
    pub const ALL: [TimeWindow; 3] = [Self::Initial, Self::Middle, Self::Current];

    pub fn name(self) -> &'static str {
        match self {
            Self::Initial => "Initial",
            Self::Middle => "Middle",
            Self::Current => "Current",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Bucket {
    pub window: TimeWindow,
    pub level: u8,
}

impl Bucket {
    pub fn new(window: TimeWindow, level: Level) -> Self {
        Self {
            window,
            level: level.clamped(),
        }
    }

    pub fn label(&self) -> String {
        format!("{} Level {}", self.window.name(), self.level)
    }

    pub fn all() -> Vec<Bucket> {
        TimeWindow::ALL
            .iter()
            .flat_map(|&window| {
                (Level::MIN..=Level::MAX)
                    .rev()
                    .map(move |l| Bucket::new(window, Level(l)))
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowEdge {
    pub source: Bucket,
    pub target: Bucket,
    pub count: usize,
    pub entity_ids: Vec<EntityId>,
}

impl FlowEdge {
    pub fn summary(&self) -> String {
        format!(
            "{} organizee(s) moved from Level {} to Level {}",
            self.entity_ids.len(),
            self.source.level,
            self.target.level
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Windows {
    pub period1_end: NaiveDateTime,
    pub period2_end: NaiveDateTime,
}

impl Windows {
    pub fn from_range(range: DateRange) -> Self {
        let start = at_midnight(range.min);
        let span = at_midnight(range.max) - start;
        Self {
            period1_end: start + span / 3,
            period2_end: start + (span * 2) / 3,
        }
    }

    pub fn classify(&self, date: NaiveDate) -> TimeWindow {
        let t = at_midnight(date);
        if t <= self.period1_end {
            TimeWindow::Initial
        } else if t <= self.period2_end {
            TimeWindow::Middle
        } else {
            TimeWindow::Current
        }
    }
}

fn at_midnight(d: NaiveDate) -> NaiveDateTime {
    d.and_time(NaiveTime::MIN)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Representative {
    pub initial: Level,
    pub middle: Level,
    pub current: Level,
}

pub fn representative_levels(
    timeline: &[(NaiveDate, Level)],
    windows: &Windows,
) -> Option<Representative> {
    let first = timeline.first()?.1;
    let first_in = |w: TimeWindow| {
        timeline
            .iter()
            .find(|(d, _)| windows.classify(*d) == w)
            .map(|(_, l)| *l)
    };

    let initial = first_in(TimeWindow::Initial).unwrap_or(first);
    let current = first_in(TimeWindow::Current);
    // Middle falls back to Current before Initial; kept as-is, see DESIGN.md.
    let middle = first_in(TimeWindow::Middle)
        .or(current)
        .unwrap_or(initial);
    let current = current.unwrap_or(middle);

    Some(Representative {
        initial,
        middle,
        current,
    })
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FlowModel {
    pub windows: Option<Windows>,
    pub buckets: Vec<Bucket>,
    pub flows: Vec<FlowEdge>,
    pub levels: Vec<(EntityId, Representative)>,
}

impl FlowModel {
    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }
}

pub fn build_flows(records: &[RelationshipRecord]) -> FlowModel {
    let Some(range) = DateRange::of(records) else {
        return FlowModel::default();
    };
    let windows = Windows::from_range(range);

    // timelines per organizee, in order of first appearance
    let mut order: Vec<EntityId> = Vec::new();
    let mut timelines: HashMap<EntityId, Vec<(NaiveDate, Level)>> = HashMap::new();
    for r in records {
        let (Some(id), Some(date), Some(level)) = (r.organizee_id(), r.date, r.leadership) else {
            continue;
        };
        let timeline = timelines.entry(id.clone()).or_insert_with(|| {
            order.push(id);
            Vec::new()
        });
        timeline.push((date, level));
    }

    let mut flows: Vec<FlowEdge> = Vec::new();
    let mut by_pair: HashMap<(Bucket, Bucket), usize> = HashMap::new();
    let mut levels = Vec::with_capacity(order.len());

    for id in order {
        let Some(mut timeline) = timelines.remove(&id) else {
            continue;
        };
        timeline.sort_by_key(|(d, _)| *d);
        let Some(rep) = representative_levels(&timeline, &windows) else {
            continue;
        };

        let steps = [
            (
                Bucket::new(TimeWindow::Initial, rep.initial),
                Bucket::new(TimeWindow::Middle, rep.middle),
            ),
            (
                Bucket::new(TimeWindow::Middle, rep.middle),
                Bucket::new(TimeWindow::Current, rep.current),
            ),
        ];
        for (source, target) in steps {
            match by_pair.get(&(source, target)) {
                Some(&i) => {
                    flows[i].count += 1;
                    flows[i].entity_ids.push(id.clone());
                }
                None => {
                    by_pair.insert((source, target), flows.len());
                    flows.push(FlowEdge {
                        source,
                        target,
                        count: 1,
                        entity_ids: vec![id.clone()],
                    });
                }
            }
        }
        levels.push((id, rep));
    }

    if flows.is_empty() {
        return FlowModel::default();
    }

    FlowModel {
        windows: Some(windows),
        buckets: Bucket::all(),
        flows,
        levels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn rec(organizee: &str, date: NaiveDate, level: i64) -> RelationshipRecord {
        RelationshipRecord::new("Org", organizee, date, level, "e")
    }

    fn from(m: &FlowModel, w: TimeWindow) -> impl Iterator<Item = &FlowEdge> {
        m.flows.iter().filter(move |f| f.source.window == w)
    }

    fn rep_of<'a>(m: &'a FlowModel, id: &str) -> &'a Representative {
        &m.levels.iter().find(|(e, _)| e.0 == id).unwrap().1
    }

    #[test]
    fn windows_split_range_in_thirds() {
        let w = Windows::from_range(DateRange {
            min: day(1, 1),
            max: day(1, 31),
        });
        assert_eq!(w.classify(day(1, 1)), TimeWindow::Initial);
        assert_eq!(w.classify(day(1, 11)), TimeWindow::Initial);
        assert_eq!(w.classify(day(1, 12)), TimeWindow::Middle);
        assert_eq!(w.classify(day(1, 21)), TimeWindow::Middle);
        assert_eq!(w.classify(day(1, 22)), TimeWindow::Current);
    }

    #[test]
    fn carry_forward_for_initial_only_entity() {
        let records = vec![
            rec("Tom", day(1, 1), 2),
            rec("Other", day(6, 1), 4),
        ];
        let m = build_flows(&records);
        let tom = rep_of(&m, "Tom");
        assert_eq!((tom.initial, tom.middle, tom.current), (Level(2), Level(2), Level(2)));

        let i2m2 = m
            .flows
            .iter()
            .find(|f| {
                f.source == Bucket::new(TimeWindow::Initial, Level(2))
                    && f.target == Bucket::new(TimeWindow::Middle, Level(2))
            })
            .unwrap();
        assert!(i2m2.count >= 1);
        assert!(i2m2.entity_ids.contains(&EntityId("Tom".into())));
        let m2c2 = m
            .flows
            .iter()
            .find(|f| {
                f.source == Bucket::new(TimeWindow::Middle, Level(2))
                    && f.target == Bucket::new(TimeWindow::Current, Level(2))
            })
            .unwrap();
        assert!(m2c2.count >= 1);
    }

    #[test]
    fn middle_prefers_current_over_initial() {
        let records = vec![
            rec("Ann", day(1, 1), 1),
            rec("Ann", day(1, 31), 5),
        ];
        let m = build_flows(&records);
        let ann = rep_of(&m, "Ann");
        assert_eq!((ann.initial, ann.middle, ann.current), (Level(1), Level(5), Level(5)));
    }

    #[test]
    fn first_entry_of_each_window_wins() {
        let records = vec![
            rec("Eve", day(1, 20), 4),
            rec("Eve", day(1, 12), 3),
            rec("Eve", day(1, 25), 2),
            rec("Eve", day(1, 30), 5),
            rec("Eve", day(1, 1), 1),
            rec("Eve", day(1, 2), 2),
        ];
        let m = build_flows(&records);
        let eve = rep_of(&m, "Eve");
        assert_eq!((eve.initial, eve.middle, eve.current), (Level(1), Level(3), Level(2)));
    }

    #[test]
    fn late_starter_uses_first_rating_as_initial() {
        let records = vec![
            rec("Kim", day(1, 25), 3),
            rec("Lee", day(1, 1), 1),
            rec("Lee", day(1, 31), 1),
        ];
        let m = build_flows(&records);
        let kim = rep_of(&m, "Kim");
        assert_eq!((kim.initial, kim.middle, kim.current), (Level(3), Level(3), Level(3)));
    }

    #[test]
    fn one_transition_per_stage_per_entity() {
        let records = leadgraph_core::demo_records();
        let m = build_flows(&records);
        let entities: Vec<_> = m.levels.iter().map(|(e, _)| e.clone()).collect();
        assert_eq!(entities.len(), 5);

        for e in &entities {
            for w in [TimeWindow::Initial, TimeWindow::Middle] {
                let n: usize = from(&m, w)
                    .map(|f| f.entity_ids.iter().filter(|id| *id == e).count())
                    .sum();
                assert_eq!(n, 1, "{e:?} from {w:?}");
            }
        }
        let total: usize = from(&m, TimeWindow::Initial).map(|f| f.count).sum();
        assert_eq!(total, entities.len());
        assert!(m.flows.iter().all(|f| f.count == f.entity_ids.len()));
    }

    #[test]
    fn merges_identical_transitions() {
        let records = vec![
            rec("A", day(1, 1), 2),
            rec("B", day(1, 1), 2),
            rec("A", day(1, 31), 2),
            rec("B", day(1, 31), 2),
        ];
        let m = build_flows(&records);
        assert_eq!(m.flows.len(), 2);
        assert_eq!(m.flows[0].count, 2);
        assert_eq!(
            m.flows[0].entity_ids,
            vec![EntityId("A".into()), EntityId("B".into())]
        );
        assert_eq!(m.flows[0].summary(), "2 organizee(s) moved from Level 2 to Level 2");
    }

    #[test]
    fn single_day_collapses_levels() {
        let records = vec![
            rec("A", day(3, 3), 4),
            rec("B", day(3, 3), 1),
            rec("A", day(3, 3), 2),
        ];
        let m = build_flows(&records);
        for (_, r) in &m.levels {
            assert_eq!(r.initial, r.middle);
            assert_eq!(r.middle, r.current);
        }
        assert_eq!(rep_of(&m, "A").initial, Level(4));
    }

    #[test]
    fn organizer_only_entities_are_skipped() {
        let records = vec![
            RelationshipRecord::new("Boss", "", day(1, 1), 3, "e"),
            rec("A", day(1, 2), 3),
        ];
        let m = build_flows(&records);
        assert_eq!(m.levels.len(), 1);
        assert!(m.flows.iter().all(|f| !f.entity_ids.contains(&EntityId("Boss".into()))));
    }

    #[test]
    fn out_of_range_levels_land_in_edge_buckets() {
        let records = vec![rec("A", day(1, 1), 9), rec("B", day(1, 1), -2)];
        let m = build_flows(&records);
        assert!(m.flows.iter().all(|f| (1..=5).contains(&f.source.level)));
        assert!(m.flows.iter().any(|f| f.source.level == 5));
        assert!(m.flows.iter().any(|f| f.source.level == 1));
    }

    #[test]
    fn empty_input_has_no_buckets() {
        let m = build_flows(&[]);
        assert!(m.buckets.is_empty());
        assert!(m.flows.is_empty());
        assert!(m.windows.is_none());
    }

    #[test]
    fn bucket_grid_is_complete() {
        let all = Bucket::all();
        assert_eq!(all.len(), 15);
        assert_eq!(all[0], Bucket::new(TimeWindow::Initial, Level(5)));
        assert_eq!(all[14], Bucket::new(TimeWindow::Current, Level(1)));
        assert_eq!(all[5].label(), "Middle Level 5");
    }
}
