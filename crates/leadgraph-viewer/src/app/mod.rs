use bevy::prelude::*;

use crate::app::resources::{PlaybackClock, RecordsRx};
use crate::state::ViewerState;
use crate::util::config::ViewerConfig;

pub mod resources;

pub struct LeadGraphViewerPlugin {
    pub config: ViewerConfig,
    pub search: Option<String>,
}

impl Plugin for LeadGraphViewerPlugin {
    fn build(&self, app: &mut App) {
        let mut st = ViewerState::from_config(&self.config);
        if let Some(term) = &self.search {
            st.search = term.clone();
        }
        let step = std::time::Duration::from_millis(self.config.playback_interval_ms.max(1));
        app.insert_resource(st)
            .insert_resource(PlaybackClock(Timer::new(step, TimerMode::Repeating)))
            .add_systems(Startup, crate::render::setup_scene)
            .add_systems(
                Update,
                (
                    pump_records,
                    crate::ui::ui_panel,
                    advance_playback,
                    crate::render::draw_scene,
                )
                    .chain(),
            );
    }
}

fn pump_records(mut st: ResMut<ViewerState>, rx: Res<RecordsRx>) {
    for msg in rx.0.try_iter() {
        st.apply(msg);
    }
}

fn advance_playback(time: Res<Time>, mut clock: ResMut<PlaybackClock>, mut st: ResMut<ViewerState>) {
    if !st.network.playing {
        clock.0.reset();
        return;
    }
    if clock.0.tick(time.delta()).just_finished() {
        let days = st.playback_step_days;
        st.network.advance_playback(days);
    }
}
