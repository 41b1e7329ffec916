use bevy::math::Vec2;
use leadgraph_core::RelationshipRecord;
use std::sync::Arc;

use crate::flow::highlight::{style_flows, FlowStyles};
use crate::flow::layout::{layout_flows, FlowLayout, FlowParams};
use crate::flow::model::{build_flows, FlowModel};
use crate::util::search::SearchQuery;

pub struct FlowState {
    records: Arc<Vec<RelationshipRecord>>,
    search: SearchQuery,
    pub model: FlowModel,
    pub layout: FlowLayout,
    pub styles: FlowStyles,
    pub hovered: Option<usize>,
    params: FlowParams,
    size: Vec2,
    dirty_model: bool,
    dirty_layout: bool,
    dirty_style: bool,
    layouts: u64,
}

impl FlowState {
    pub fn new(params: FlowParams) -> Self {
        Self {
            records: Arc::new(Vec::new()),
            search: SearchQuery::Empty,
            model: FlowModel::default(),
            layout: FlowLayout::default(),
            styles: FlowStyles::default(),
            hovered: None,
            params,
            size: Vec2::new(800.0, 600.0),
            dirty_model: true,
            dirty_layout: true,
            dirty_style: true,
            layouts: 0,
        }
    }

    pub fn layouts(&self) -> u64 {
        self.layouts
    }

    pub fn set_records(&mut self, records: Arc<Vec<RelationshipRecord>>) {
        self.records = records;
        self.dirty_model = true;
    }

    pub fn set_search(&mut self, term: &str) {
        self.search = SearchQuery::parse(term);
        self.dirty_style = true;
    }

    pub fn resize(&mut self, size: Vec2) {
        if size != self.size {
            self.size = size;
            self.dirty_layout = true;
        }
    }

    pub fn set_hovered(&mut self, flow: Option<usize>) {
        if self.hovered != flow {
            self.hovered = flow;
            self.dirty_style = true;
        }
    }

    pub fn refresh(&mut self) {
        if self.dirty_model {
            self.model = build_flows(&self.records);
            self.hovered = None;
            self.dirty_model = false;
            self.dirty_layout = true;
            tracing::debug!(
                flows = self.model.flows.len(),
                entities = self.model.levels.len(),
                "flows rebuilt"
            );
        }
        if self.dirty_layout {
            self.layout = layout_flows(&self.model, self.size, &self.params);
            self.layouts += 1;
            self.dirty_layout = false;
            self.dirty_style = true;
        }
        if self.dirty_style {
            self.styles = style_flows(&self.model, &self.search, self.hovered);
            self.dirty_style = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::highlight::{RIBBON_DIM_OPACITY, RIBBON_HOVER_OPACITY};
    use crate::flow::model::TimeWindow;

    fn state() -> FlowState {
        let mut st = FlowState::new(FlowParams::default());
        st.set_records(Arc::new(leadgraph_core::demo_records()));
        st.refresh();
        st
    }

    #[test]
    fn resize_relays_out() {
        let mut st = state();
        assert_eq!(st.layouts(), 1);
        let current_x = |st: &FlowState| {
            st.layout
                .buckets
                .iter()
                .find(|b| b.bucket.window == TimeWindow::Current)
                .map(|b| b.min.x)
        };
        let before = current_x(&st);
        st.resize(Vec2::new(1600.0, 1000.0));
        st.refresh();
        assert_eq!(st.layouts(), 2);
        assert_eq!(st.layout.size, Vec2::new(1600.0, 1000.0));
        assert!(current_x(&st) > before);

        st.resize(Vec2::new(1600.0, 1000.0));
        st.refresh();
        assert_eq!(st.layouts(), 2);
    }

    #[test]
    fn search_and_hover_only_restyle() {
        let mut st = state();
        st.set_search("zzz-nobody");
        st.set_hovered(Some(0));
        st.refresh();
        assert_eq!(st.layouts(), 1);
        assert_eq!(st.styles.ribbons[0], RIBBON_HOVER_OPACITY);
        assert!(st.styles.ribbons[1..].iter().all(|o| *o == RIBBON_DIM_OPACITY));
    }

    #[test]
    fn new_records_drop_stale_hover() {
        let mut st = state();
        st.set_hovered(Some(3));
        st.set_records(Arc::new(Vec::new()));
        st.refresh();
        assert!(st.hovered.is_none());
        assert!(st.layout.is_empty());
        assert!(st.styles.ribbons.is_empty());
    }
}
