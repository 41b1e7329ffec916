use bevy::prelude::ResMut;
use bevy_egui::{egui, EguiContexts};
use chrono::Days;

use crate::state::ViewerState;
use crate::ui::PANEL_W;
use crate::util::config::{self, ViewMode};

pub fn ui_panel(mut contexts: EguiContexts, mut st: ResMut<ViewerState>) {
    let st = &mut *st;
    egui::SidePanel::left("left")
        .exact_width(PANEL_W)
        .show(contexts.ctx_mut(), |ui| {
            ui.heading("LeadGraph");
            match &st.origin {
                Some(origin) => ui.label(format!("records: {} ({origin})", st.records.len())),
                None => ui.label("records: loading…"),
            };
            if let Some(err) = &st.last_error {
                ui.colored_label(egui::Color32::from_rgb(0xd6, 0x27, 0x28), err);
            }
            ui.separator();

            ui.horizontal(|ui| {
                ui.label("View:");
                for mode in [ViewMode::Network, ViewMode::Flow] {
                    ui.selectable_value(&mut st.mode, mode, mode.label());
                }
            });

            ui.add_space(8.0);
            ui.label("Search (regex or text):");
            ui.text_edit_singleline(&mut st.search);

            ui.add_space(8.0);
            ui.separator();
            match st.mode {
                ViewMode::Network => network_section(ui, st),
                ViewMode::Flow => flow_section(ui, st),
            }

            ui.add_space(10.0);
            ui.separator();
            if ui.button("Save settings").clicked() {
                match config::save(&st.config_snapshot()) {
                    Ok(()) => tracing::info!("viewer config saved"),
                    Err(err) => tracing::warn!("failed to save viewer config: {err:#}"),
                }
            }
        });

    st.sync_search();
}

fn network_section(ui: &mut egui::Ui, st: &mut ViewerState) {
    let net = &mut st.network;
    ui.heading("Network");
    ui.label(format!("nodes: {}", net.model.nodes.len()));
    ui.label(format!("edges: {}", net.model.edges.len()));
    ui.label(format!("max pair count: {}", net.model.max_pair_count));

    ui.add_space(8.0);
    let Some(range) = net.cursor.range() else {
        ui.label("No dated records.");
        return;
    };

    ui.label("As of:");
    let mut offset = net.cursor.offset_days();
    let start = range.min;
    let slider = egui::Slider::new(&mut offset, 0..=range.span_days())
        .show_value(true)
        .custom_formatter(move |v, _| {
            start
                .checked_add_days(Days::new(v.max(0.0) as u64))
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        });
    if ui.add(slider).changed() {
        net.playing = false;
        net.set_cursor_offset(offset);
    }

    ui.horizontal(|ui| {
        let label = if net.playing { "Pause" } else { "Play" };
        if ui.button(label).clicked() {
            if !net.playing && net.cursor.current() == Some(range.max) {
                net.rewind();
            }
            net.playing = !net.playing;
        }
        if ui.button("Rewind").clicked() {
            net.playing = false;
            net.rewind();
        }
    });

    ui.add_space(8.0);
    ui.label(format!("layout energy: {:.3}", net.sim.alpha()));
    ui.horizontal(|ui| {
        ui.label(format!("zoom: {:.2}×", net.view.scale));
        if ui.button("Reset view").clicked() {
            net.view.reset();
        }
    });
    if let Some(h) = &net.hovered {
        ui.label(format!("hover: {}", h.0));
    }
}

fn flow_section(ui: &mut egui::Ui, st: &mut ViewerState) {
    let flow = &st.flow;
    ui.heading("Leadership flow");
    ui.label(format!("organizees: {}", flow.model.levels.len()));
    ui.label(format!("transitions: {}", flow.model.flows.len()));
    if let Some(w) = &flow.model.windows {
        ui.label(format!("Initial ≤ {}", w.period1_end.date()));
        ui.label(format!("Middle ≤ {}", w.period2_end.date()));
    }
    ui.label("Hover a ribbon for details.");
}
