use bevy::prelude::Resource;
use leadgraph_core::RelationshipRecord;
use std::sync::Arc;

use crate::flow::FlowState;
use crate::graph::view::ViewTransform;
use crate::graph::NetworkState;
use crate::store::{Incoming, IncomingKind};
use crate::util::config::{ViewMode, ViewerConfig};

#[derive(Resource)]
pub struct ViewerState {
    pub mode: ViewMode,
    pub search: String,
    applied_search: Option<String>,
    pub records: Arc<Vec<RelationshipRecord>>,
    pub origin: Option<String>,
    pub last_error: Option<String>,
    pub playback_step_days: u64,
    pub network: NetworkState,
    pub flow: FlowState,
    config: ViewerConfig,
}

impl ViewerState {
    pub fn from_config(cfg: &ViewerConfig) -> Self {
        Self {
            mode: cfg.view_mode,
            search: String::new(),
            applied_search: None,
            records: Arc::new(Vec::new()),
            origin: None,
            last_error: None,
            playback_step_days: cfg.playback_step_days.max(1),
            network: NetworkState::new(
                cfg.simulation.clone(),
                ViewTransform::with_bounds(cfg.min_zoom, cfg.max_zoom),
            ),
            flow: FlowState::new(cfg.flow.clone()),
            config: cfg.clone(),
        }
    }

    pub fn config_snapshot(&self) -> ViewerConfig {
        ViewerConfig {
            view_mode: self.mode,
            ..self.config.clone()
        }
    }

    // a failed load keeps whatever was shown before
    pub fn apply(&mut self, msg: Incoming) {
        match msg.kind {
            IncomingKind::Loaded(records) => {
                let records = Arc::new(records);
                self.network.set_records(Arc::clone(&records));
                self.flow.set_records(Arc::clone(&records));
                self.records = records;
                self.origin = Some(msg.origin);
                self.last_error = None;
            }
            IncomingKind::Error(err) => {
                tracing::warn!(origin = %msg.origin, %err, "keeping previous records");
                self.last_error = Some(err);
            }
        }
    }

    pub fn sync_search(&mut self) {
        if self.applied_search.as_deref() == Some(self.search.as_str()) {
            return;
        }
        self.network.set_search(&self.search);
        self.flow.set_search(&self.search);
        self.applied_search = Some(self.search.clone());
    }
}
