use bevy::math::Vec2;
use chrono::NaiveDate;
use leadgraph_core::{DateRange, EntityId, RelationshipRecord};
use serde::Serialize;

use crate::flow::{build_flows, FlowModel};
use crate::graph::{build_network, NetworkModel, SimParams, Simulation};

const DUMP_SURFACE: Vec2 = Vec2::new(960.0, 600.0);
const DUMP_MAX_TICKS: usize = 10_000;

#[derive(Debug, Serialize)]
pub struct NodePosition {
    pub id: EntityId,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Serialize)]
pub struct DumpReport {
    pub records: usize,
    pub range: Option<DateRange>,
    pub cursor: Option<NaiveDate>,
    pub network: NetworkModel,
    pub positions: Vec<NodePosition>,
    pub flow: FlowModel,
}

impl DumpReport {
    pub fn new(records: &[RelationshipRecord], params: &SimParams) -> Self {
        let range = DateRange::of(records);
        let cursor = range.map(|r| r.max);
        let network = cursor
            .map(|c| build_network(records, c))
            .unwrap_or_default();

        let mut sim = Simulation::new(&network, DUMP_SURFACE, params.clone());
        let ticks = sim.run_to_rest(DUMP_MAX_TICKS);
        tracing::debug!(ticks, nodes = sim.nodes.len(), "layout settled");
        let positions = sim
            .nodes
            .iter()
            .map(|n| NodePosition {
                id: n.id.clone(),
                x: n.pos.x,
                y: n.pos.y,
            })
            .collect();

        Self {
            records: records.len(),
            range,
            cursor,
            network,
            positions,
            flow: build_flows(records),
        }
    }
}
