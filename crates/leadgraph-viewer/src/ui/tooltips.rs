use bevy_egui::egui;

use crate::flow::highlight::place_tooltip;

pub fn render_tooltip(
    ctx: &egui::Context,
    id: &str,
    pointer: egui::Pos2,
    viewport: egui::Rect,
    lines: impl IntoIterator<Item = String>,
) {
    let area_id = egui::Id::new(id);
    let size = ctx
        .memory(|m| m.area_rect(area_id))
        .map(|r| r.size())
        .unwrap_or(egui::vec2(180.0, 60.0));

    let local = place_tooltip(
        bevy::math::Vec2::new(pointer.x - viewport.min.x, pointer.y - viewport.min.y),
        bevy::math::Vec2::new(size.x, size.y),
        bevy::math::Vec2::new(viewport.width(), viewport.height()),
    );

    egui::Area::new(area_id)
        .order(egui::Order::Tooltip)
        .fixed_pos(viewport.min + egui::vec2(local.x, local.y))
        .show(ctx, |ui| {
            ui.group(|ui| {
                for line in lines {
                    ui.label(line);
                }
            });
        });
}
