use bevy::math::Vec2;
use bevy_egui::egui::{self, Align2, Color32, FontId, Sense, Shape, Stroke};

use crate::flow::highlight::tooltip_lines;
use crate::flow::FlowState;
use crate::render::{color32, local, screen};

const LABEL_COLOR: Color32 = Color32::from_rgb(0x33, 0x33, 0x33);

pub fn draw_flow(ui: &mut egui::Ui, flow: &mut FlowState) {
    let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::hover());
    let painter = ui.painter_at(rect);
    flow.resize(Vec2::new(rect.width(), rect.height()));
    flow.refresh();

    let hovered = response
        .hover_pos()
        .and_then(|p| flow.layout.ribbon_at(local(rect, p)));
    flow.set_hovered(hovered);
    flow.refresh();

    if flow.layout.is_empty() {
        painter.text(
            rect.center(),
            Align2::CENTER_CENTER,
            "No leadership history to show.",
            FontId::proportional(14.0),
            LABEL_COLOR,
        );
        return;
    }

    let segments = flow.layout.segments.max(1);
    for ribbon in &flow.layout.ribbons {
        let opacity = flow.styles.ribbons.get(ribbon.flow).copied().unwrap_or(0.5);
        let width = ribbon.stroke_width();
        let points = ribbon.samples(segments);
        let n = points.len().saturating_sub(1).max(1) as f32;
        let shapes = points.windows(2).enumerate().map(|(i, w)| {
            let t = (i as f32 + 0.5) / n;
            Shape::line_segment(
                [screen(rect, w[0]), screen(rect, w[1])],
                Stroke::new(width, color32(ribbon.color_at(t), opacity)),
            )
        });
        painter.extend(shapes);
    }

    for (rect_b, opacity) in flow.layout.buckets.iter().zip(&flow.styles.buckets) {
        let min = screen(rect, rect_b.min);
        let max = screen(rect, rect_b.max);
        let r = egui::Rect::from_min_max(min, egui::pos2(max.x, max.y.max(min.y + 1.0)));
        painter.rect_filled(r, 0.0, color32(rect_b.color, *opacity));

        let left_half = rect_b.min.x < flow.layout.size.x * 0.5;
        let (anchor, align) = if left_half {
            (egui::pos2(r.max.x + 6.0, r.center().y), Align2::LEFT_CENTER)
        } else {
            (egui::pos2(r.min.x - 6.0, r.center().y), Align2::RIGHT_CENTER)
        };
        painter.text(
            anchor,
            align,
            rect_b.bucket.label(),
            FontId::proportional(12.0),
            LABEL_COLOR.gamma_multiply(*opacity),
        );
    }

    if let (Some(i), Some(p)) = (flow.hovered, response.hover_pos()) {
        if let Some(edge) = flow.model.flows.get(i) {
            crate::ui::render_tooltip(ui.ctx(), "flow-tooltip", p, rect, tooltip_lines(edge));
        }
    }
}
