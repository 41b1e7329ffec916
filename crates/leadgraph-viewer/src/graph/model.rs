use chrono::NaiveDate;
use leadgraph_core::{EntityId, Level, RelationshipRecord};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    pub id: EntityId,
    pub leadership: Option<Level>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphEdge {
    pub source: EntityId,
    pub target: EntityId,
    pub date: NaiveDate,
    pub event: String,
    pub pair_count: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NetworkModel {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub max_pair_count: usize,
}

impl NetworkModel {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

pub fn pair_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

pub fn records_until(records: &[RelationshipRecord], cursor: NaiveDate) -> Vec<&RelationshipRecord> {
    records
        .iter()
        .filter(|r| r.date.is_some_and(|d| d <= cursor))
        .collect()
}

pub fn build_network(records: &[RelationshipRecord], cursor: NaiveDate) -> NetworkModel {
    let filtered = records_until(records, cursor);

    // latest rating per organizee; the first record wins same-day ties
    let mut latest: HashMap<&str, (NaiveDate, Option<Level>)> = HashMap::new();
    for r in filtered.iter() {
        let (Some(date), false) = (r.date, r.organizee.trim().is_empty()) else {
            continue;
        };
        match latest.get(r.organizee.as_str()) {
            Some((seen, _)) if *seen >= date => {}
            _ => {
                latest.insert(r.organizee.as_str(), (date, r.leadership));
            }
        }
    }

    let ids: BTreeSet<EntityId> = filtered
        .iter()
        .flat_map(|r| [r.organizer_id(), r.organizee_id()])
        .flatten()
        .collect();

    let nodes: Vec<GraphNode> = ids
        .into_iter()
        .map(|id| GraphNode {
            leadership: latest.get(id.0.as_str()).and_then(|(_, l)| *l),
            id,
        })
        .collect();

    let mut pair_counts: HashMap<(String, String), usize> = HashMap::new();
    for r in filtered.iter().filter(|r| r.is_linkable()) {
        *pair_counts
            .entry(pair_key(&r.organizer, &r.organizee))
            .or_insert(0) += 1;
    }

    let edges: Vec<GraphEdge> = filtered
        .iter()
        .filter(|r| r.is_linkable())
        .filter_map(|r| {
            Some(GraphEdge {
                source: r.organizer_id()?,
                target: r.organizee_id()?,
                date: r.date?,
                event: r.event.clone(),
                pair_count: pair_counts
                    .get(&pair_key(&r.organizer, &r.organizee))
                    .copied()
                    .unwrap_or(1),
            })
        })
        .collect();

    let max_pair_count = pair_counts.values().copied().max().unwrap_or(1).max(1);

    NetworkModel {
        nodes,
        edges,
        max_pair_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rec(a: &str, b: &str, date: NaiveDate, level: i64) -> RelationshipRecord {
        RelationshipRecord::new(a, b, date, level, "meeting")
    }

    fn mixed_records() -> Vec<RelationshipRecord> {
        vec![
            rec("A", "B", day(2024, 1, 1), 3),
            rec("B", "A", day(2024, 1, 5), 2),
            rec("A", "C", day(2024, 2, 1), 4),
            rec("D", "", day(2024, 2, 2), 1),
            rec("", "E", day(2024, 2, 3), 5),
            rec("C", "B", day(2024, 3, 1), 5),
            RelationshipRecord {
                date: None,
                ..rec("X", "Y", day(2024, 1, 1), 1)
            },
        ]
    }

    #[test]
    fn same_day_ratings_keep_the_first() {
        let records = vec![
            rec("A", "B", day(2024, 1, 1), 3),
            rec("C", "B", day(2024, 1, 1), 5),
        ];
        let net = build_network(&records, day(2024, 1, 1));
        let b = net.nodes.iter().find(|n| n.id.0 == "B").unwrap();
        assert_eq!(b.leadership, Some(Level(3)));
    }

    #[test]
    fn two_meetings_between_same_pair() {
        let records = vec![
            rec("A", "B", day(2024, 1, 1), 3),
            rec("A", "B", day(2024, 2, 1), 4),
        ];
        let net = build_network(&records, day(2024, 2, 1));

        assert_eq!(net.nodes.len(), 2);
        assert_eq!(net.edges.len(), 2);
        assert!(net.edges.iter().all(|e| e.pair_count == 2));
        let b = net.nodes.iter().find(|n| n.id.0 == "B").unwrap();
        assert_eq!(b.leadership, Some(Level(4)));
        let a = net.nodes.iter().find(|n| n.id.0 == "A").unwrap();
        assert_eq!(a.leadership, None);
        assert_eq!(net.max_pair_count, 2);
    }

    #[test]
    fn edges_never_dangle() {
        let records = mixed_records();
        for cursor in [day(2023, 12, 1), day(2024, 1, 5), day(2024, 2, 2), day(2024, 12, 31)] {
            let net = build_network(&records, cursor);
            let ids: HashSet<_> = net.nodes.iter().map(|n| &n.id).collect();
            for e in &net.edges {
                assert!(ids.contains(&e.source), "{:?}", e);
                assert!(ids.contains(&e.target), "{:?}", e);
            }
        }
    }

    #[test]
    fn pair_count_is_direction_free_and_uniform() {
        let records = mixed_records();
        let net = build_network(&records, day(2024, 12, 31));
        let mut by_pair: HashMap<(String, String), Vec<usize>> = HashMap::new();
        for e in &net.edges {
            by_pair
                .entry(pair_key(&e.source.0, &e.target.0))
                .or_default()
                .push(e.pair_count);
        }
        for (pair, counts) in by_pair {
            assert!(counts.iter().all(|c| *c == counts.len()), "{pair:?}");
        }
        let ab = net
            .edges
            .iter()
            .find(|e| e.source.0 == "B" && e.target.0 == "A")
            .unwrap();
        assert_eq!(ab.pair_count, 2);
    }

    #[test]
    fn half_records_still_contribute_nodes() {
        let net = build_network(&mixed_records(), day(2024, 2, 3));
        let ids: Vec<_> = net.nodes.iter().map(|n| n.id.0.as_str()).collect();
        assert!(ids.contains(&"D"));
        assert!(ids.contains(&"E"));
        assert!(!ids.contains(&""));
        assert!(!ids.contains(&"X"));
        assert_eq!(net.edges.len(), 3);
        let e = net.nodes.iter().find(|n| n.id.0 == "E").unwrap();
        assert_eq!(e.leadership, Some(Level(5)));
    }

    #[test]
    fn earlier_cursor_is_a_subgraph() {
        let records = mixed_records();
        let cursors = [day(2024, 3, 1), day(2024, 2, 2), day(2024, 1, 5), day(2024, 1, 1)];
        let mut prev: Option<(usize, NetworkModel)> = None;
        for cursor in cursors {
            let net = build_network(&records, cursor);
            let filtered = records_until(&records, cursor).len();
            if let Some((later_filtered, later)) = &prev {
                assert!(filtered <= *later_filtered);
                let later_nodes: HashSet<_> = later.nodes.iter().map(|n| &n.id).collect();
                assert!(net.nodes.iter().all(|n| later_nodes.contains(&n.id)));
                let later_edges: HashSet<_> = later
                    .edges
                    .iter()
                    .map(|e| (&e.source, &e.target, e.date))
                    .collect();
                assert!(net
                    .edges
                    .iter()
                    .all(|e| later_edges.contains(&(&e.source, &e.target, e.date))));
                assert!(net.edges.len() <= later.edges.len());
            }
            prev = Some((filtered, net));
        }
    }

    #[test]
    fn latest_rating_tracks_cursor() {
        let records = mixed_records();
        let early = build_network(&records, day(2024, 1, 5));
        let late = build_network(&records, day(2024, 3, 1));
        let b_early = early.nodes.iter().find(|n| n.id.0 == "B").unwrap();
        let b_late = late.nodes.iter().find(|n| n.id.0 == "B").unwrap();
        assert_eq!(b_early.leadership, Some(Level(3)));
        assert_eq!(b_late.leadership, Some(Level(5)));
    }

    #[test]
    fn empty_input_builds_nothing() {
        let net = build_network(&[], day(2024, 1, 1));
        assert!(net.is_empty());
        assert!(net.edges.is_empty());
        assert_eq!(net.max_pair_count, 1);
    }
}
