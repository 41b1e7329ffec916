use bevy::color::Srgba;
use leadgraph_core::EntityId;
use std::collections::HashSet;

use crate::graph::model::NetworkModel;
use crate::scale::{accent, darker, edge_base, edge_dim, link_width_scale, node_fill};
use crate::util::search::SearchQuery;

pub const NODE_RADIUS: f32 = 8.0;
pub const FOCUS_RADIUS: f32 = 12.0;

const EDGE_OPACITY: f32 = 0.6;
const EDGE_MATCH_OPACITY: f32 = 0.8;
const EDGE_DIM_OPACITY: f32 = 0.2;
const HOVER_WIDTH_FACTOR: f32 = 1.5;

#[derive(Debug, Clone, PartialEq)]
pub struct NodeStyle {
    pub fill: Srgba,
    pub radius: f32,
    pub bold: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeStyle {
    pub color: Srgba,
    pub width: f32,
    pub opacity: f32,
    pub highlighted: bool,
}

#[derive(Debug, Clone, Default)]
pub struct NetworkStyles {
    pub nodes: Vec<NodeStyle>,
    pub edges: Vec<EdgeStyle>,
}

pub fn style_network(
    model: &NetworkModel,
    search: &SearchQuery,
    hovered: Option<&EntityId>,
) -> NetworkStyles {
    let width = link_width_scale(model.max_pair_count);
    let matched: HashSet<&EntityId> = if search.is_active() {
        model
            .nodes
            .iter()
            .filter(|n| search.matches(&n.id.0))
            .map(|n| &n.id)
            .collect()
    } else {
        HashSet::new()
    };

    let mut nodes: Vec<NodeStyle> = model
        .nodes
        .iter()
        .map(|n| {
            let base = node_fill(n.leadership);
            if !search.is_active() {
                NodeStyle {
                    fill: base,
                    radius: NODE_RADIUS,
                    bold: false,
                }
            } else if matched.contains(&n.id) {
                NodeStyle {
                    fill: base,
                    radius: FOCUS_RADIUS,
                    bold: true,
                }
            } else {
                NodeStyle {
                    fill: darker(base, 1.0),
                    radius: NODE_RADIUS,
                    bold: false,
                }
            }
        })
        .collect();

    let mut edges: Vec<EdgeStyle> = model
        .edges
        .iter()
        .map(|e| {
            let w = width.apply(e.pair_count as f32);
            if !search.is_active() {
                EdgeStyle {
                    color: edge_base(),
                    width: w,
                    opacity: EDGE_OPACITY,
                    highlighted: false,
                }
            } else if matched.contains(&e.source) || matched.contains(&e.target) {
                EdgeStyle {
                    color: accent(),
                    width: w,
                    opacity: EDGE_MATCH_OPACITY,
                    highlighted: true,
                }
            } else {
                EdgeStyle {
                    color: edge_dim(),
                    width: w,
                    opacity: EDGE_DIM_OPACITY,
                    highlighted: false,
                }
            }
        })
        .collect();

    if let Some(h) = hovered {
        if let Some(i) = model.nodes.iter().position(|n| &n.id == h) {
            nodes[i].fill = accent();
            nodes[i].radius = FOCUS_RADIUS;
        }
        for (e, style) in model.edges.iter().zip(edges.iter_mut()) {
            let base = width.apply(e.pair_count as f32);
            if &e.source == h || &e.target == h {
                style.color = accent();
                style.width = base * HOVER_WIDTH_FACTOR;
                style.highlighted = true;
            } else {
                style.color = edge_base();
                style.width = base;
                style.highlighted = false;
            }
        }
    }

    NetworkStyles { nodes, edges }
}
