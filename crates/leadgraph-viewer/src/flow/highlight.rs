use bevy::math::Vec2;
use std::collections::HashSet;

use crate::flow::model::{Bucket, FlowEdge, FlowModel};
use crate::util::search::SearchQuery;

pub const RIBBON_OPACITY: f32 = 0.5;
pub const RIBBON_HOVER_OPACITY: f32 = 0.8;
pub const RIBBON_DIM_OPACITY: f32 = 0.1;
pub const RIBBON_MATCH_OPACITY: f32 = 0.8;
pub const BUCKET_DIM_OPACITY: f32 = 0.3;

const TOOLTIP_OFFSET: f32 = 10.0;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowStyles {
    pub ribbons: Vec<f32>,
    pub buckets: Vec<f32>,
}

pub fn style_flows(model: &FlowModel, search: &SearchQuery, hovered: Option<usize>) -> FlowStyles {
    let mut ribbons = vec![RIBBON_OPACITY; model.flows.len()];
    let mut buckets = vec![1.0; model.buckets.len()];

    if search.is_active() {
        ribbons.iter_mut().for_each(|o| *o = RIBBON_DIM_OPACITY);
        buckets.iter_mut().for_each(|o| *o = BUCKET_DIM_OPACITY);

        let mut lit: HashSet<Bucket> = HashSet::new();
        for (i, f) in model.flows.iter().enumerate() {
            if f.entity_ids.iter().any(|id| search.matches(&id.0)) {
                ribbons[i] = RIBBON_MATCH_OPACITY;
                lit.insert(f.source);
                lit.insert(f.target);
            }
        }
        for (b, o) in model.buckets.iter().zip(buckets.iter_mut()) {
            if lit.contains(b) {
                *o = 1.0;
            }
        }
    }

    if let Some(o) = hovered.and_then(|i| ribbons.get_mut(i)) {
        *o = RIBBON_HOVER_OPACITY;
    }

    FlowStyles { ribbons, buckets }
}

pub fn tooltip_lines(flow: &FlowEdge) -> Vec<String> {
    std::iter::once(flow.summary())
        .chain(flow.entity_ids.iter().map(|id| id.0.clone()))
        .collect()
}

pub fn place_tooltip(pointer: Vec2, size: Vec2, viewport: Vec2) -> Vec2 {
    let mut at = pointer + Vec2::splat(TOOLTIP_OFFSET);
    if at.x + size.x > viewport.x {
        at.x = pointer.x - size.x - TOOLTIP_OFFSET;
    }
    if at.y + size.y > viewport.y {
        at.y = pointer.y - size.y - TOOLTIP_OFFSET;
    }
    let max = (viewport - size).max(Vec2::ZERO);
    at.clamp(Vec2::ZERO, max)
}
