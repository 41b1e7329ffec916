pub mod flow;
pub mod network;

use bevy::color::Srgba;
use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::state::ViewerState;
use crate::util::config::ViewMode;

pub use flow::draw_flow;
pub use network::draw_network;

pub fn setup_scene(mut commands: Commands) {
    commands.spawn(Camera2dBundle::default());
}

pub fn draw_scene(mut contexts: EguiContexts, mut st: ResMut<ViewerState>) {
    let st = &mut *st;
    let ctx = contexts.ctx_mut();
    egui::CentralPanel::default()
        .frame(egui::Frame::none().fill(egui::Color32::WHITE))
        .show(ctx, |ui| match st.mode {
            ViewMode::Network => draw_network(ui, &mut st.network),
            ViewMode::Flow => draw_flow(ui, &mut st.flow),
        });
}

pub(crate) fn color32(c: Srgba, opacity: f32) -> egui::Color32 {
    let byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    egui::Color32::from_rgba_unmultiplied(
        byte(c.red),
        byte(c.green),
        byte(c.blue),
        byte(c.alpha * opacity),
    )
}

pub(crate) fn local(rect: egui::Rect, p: egui::Pos2) -> Vec2 {
    Vec2::new(p.x - rect.min.x, p.y - rect.min.y)
}

pub(crate) fn screen(rect: egui::Rect, p: Vec2) -> egui::Pos2 {
    egui::pos2(rect.min.x + p.x, rect.min.y + p.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_conversion_applies_opacity() {
        let c = color32(Srgba::rgb_u8(0xff, 0x7f, 0x0e), 0.5);
        assert_eq!(c, egui::Color32::from_rgba_unmultiplied(0xff, 0x7f, 0x0e, 128));
    }

    #[test]
    fn local_and_screen_are_inverse() {
        let rect = egui::Rect::from_min_size(egui::pos2(260.0, 12.0), egui::vec2(400.0, 300.0));
        let p = egui::pos2(300.0, 40.0);
        assert_eq!(screen(rect, local(rect, p)), p);
    }
}
