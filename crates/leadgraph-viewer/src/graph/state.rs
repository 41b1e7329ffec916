use bevy::math::Vec2;
use leadgraph_core::{DateRange, EntityId, RelationshipRecord};
use std::sync::Arc;

use crate::graph::highlight::{style_network, NetworkStyles};
use crate::graph::layout::{SimParams, Simulation};
use crate::graph::model::{build_network, NetworkModel};
use crate::graph::timeline::DateCursor;
use crate::graph::view::ViewTransform;
use crate::util::search::SearchQuery;

pub struct NetworkState {
    records: Arc<Vec<RelationshipRecord>>,
    pub cursor: DateCursor,
    search: SearchQuery,
    pub model: NetworkModel,
    pub sim: Simulation,
    pub styles: NetworkStyles,
    pub view: ViewTransform,
    pub hovered: Option<EntityId>,
    pub dragging: Option<EntityId>,
    pub playing: bool,
    params: SimParams,
    size: Vec2,
    dirty_graph: bool,
    dirty_style: bool,
    rebuilds: u64,
}

impl NetworkState {
    pub fn new(params: SimParams, view: ViewTransform) -> Self {
        let model = NetworkModel::default();
        let size = Vec2::new(800.0, 600.0);
        Self {
            records: Arc::new(Vec::new()),
            cursor: DateCursor::default(),
            search: SearchQuery::Empty,
            sim: Simulation::new(&model, size, params.clone()),
            model,
            styles: NetworkStyles::default(),
            view,
            hovered: None,
            dragging: None,
            playing: false,
            params,
            size,
            dirty_graph: true,
            dirty_style: true,
            rebuilds: 0,
        }
    }

    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    pub fn set_records(&mut self, records: Arc<Vec<RelationshipRecord>>) {
        self.cursor.rebase(DateRange::of(&records));
        self.records = records;
        self.dirty_graph = true;
    }

    pub fn set_cursor_offset(&mut self, days: i64) -> bool {
        let changed = self.cursor.set_offset_days(days);
        self.dirty_graph |= changed;
        changed
    }

    pub fn rewind(&mut self) {
        self.dirty_graph |= self.cursor.rewind();
    }

    pub fn advance_playback(&mut self, days: u64) {
        if !self.playing {
            return;
        }
        if self.cursor.advance(days) {
            self.dirty_graph = true;
        } else {
            self.playing = false;
        }
    }

    pub fn set_search(&mut self, term: &str) {
        self.search = SearchQuery::parse(term);
        self.dirty_style = true;
    }

    pub fn resize(&mut self, size: Vec2) {
        if size == self.size {
            return;
        }
        self.size = size;
        self.sim.resize(size);
    }

    pub fn set_hovered(&mut self, id: Option<EntityId>) {
        if self.hovered != id {
            self.hovered = id;
            self.dirty_style = true;
        }
    }

    pub fn begin_drag(&mut self, id: EntityId) {
        if self.sim.drag_start(&id) {
            self.dragging = Some(id);
        }
    }

    pub fn drag_to(&mut self, layout_pos: Vec2) {
        if let Some(id) = &self.dragging {
            self.sim.drag_to(id, layout_pos);
        }
    }

    pub fn end_drag(&mut self) {
        if let Some(id) = self.dragging.take() {
            self.sim.drag_end(&id);
        }
    }

    pub fn refresh(&mut self) {
        if self.dirty_graph {
            self.rebuild();
        }
        if self.dirty_style {
            self.styles = style_network(&self.model, &self.search, self.hovered.as_ref());
            self.dirty_style = false;
        }
    }

    pub fn step(&mut self) -> bool {
        self.refresh();
        if self.sim.is_hot() {
            self.sim.tick();
            true
        } else {
            false
        }
    }

    fn rebuild(&mut self) {
        self.dirty_graph = false;
        self.dirty_style = true;
        self.rebuilds += 1;

        let held = self.dragging.as_ref().and_then(|id| {
            self.sim
                .nodes
                .iter()
                .find(|n| &n.id == id)
                .and_then(|n| n.pin)
        });
        self.sim.stop();

        self.model = match self.cursor.current() {
            Some(cursor) => build_network(&self.records, cursor),
            None => NetworkModel::default(),
        };
        self.sim = Simulation::new(&self.model, self.size, self.params.clone());

        if let (Some(id), Some(at)) = (self.dragging.clone(), held) {
            if self.sim.drag_start(&id) {
                self.sim.drag_to(&id, at);
            } else {
                self.dragging = None;
            }
        }
        if let Some(h) = &self.hovered {
            if !self.model.nodes.iter().any(|n| &n.id == h) {
                self.hovered = None;
            }
        }

        tracing::debug!(
            nodes = self.model.nodes.len(),
            edges = self.model.edges.len(),
            cursor = ?self.cursor.current(),
            "network rebuilt"
        );
    }
}
