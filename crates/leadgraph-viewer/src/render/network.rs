use bevy::math::Vec2;
use bevy_egui::egui::{self, Align2, Color32, FontId, PointerButton, Sense, Stroke};

use crate::graph::highlight::NODE_RADIUS;
use crate::graph::NetworkState;
use crate::render::{color32, local, screen};

const HIT_SLACK: f32 = 2.0;
const ZOOM_SPEED: f32 = 0.0018;
const LABEL_COLOR: Color32 = Color32::from_rgb(0x33, 0x33, 0x33);

pub fn draw_network(ui: &mut egui::Ui, net: &mut NetworkState) {
    let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
    let painter = ui.painter_at(rect);
    net.resize(Vec2::new(rect.width(), rect.height()));

    if response.hovered() {
        let scroll = ui.input(|i| i.smooth_scroll_delta.y);
        if scroll.abs() > f32::EPSILON {
            let anchor = response
                .hover_pos()
                .map(|p| local(rect, p))
                .unwrap_or(Vec2::new(rect.width(), rect.height()) * 0.5);
            net.view.zoom_at(anchor, (scroll * ZOOM_SPEED).exp());
        }
    }

    let pick_radius = (NODE_RADIUS + HIT_SLACK) / net.view.scale;
    let pointer = response.interact_pointer_pos().or(response.hover_pos());

    if response.drag_started_by(PointerButton::Primary) {
        if let Some(p) = pointer {
            let at = net.view.to_layout(local(rect, p));
            if let Some(id) = net.sim.node_at(at, pick_radius).cloned() {
                net.begin_drag(id);
            }
        }
    }
    if response.dragged() {
        match (net.dragging.is_some(), pointer) {
            (true, Some(p)) => {
                let at = net.view.to_layout(local(rect, p));
                net.drag_to(at);
            }
            (false, _) => {
                let d = response.drag_delta();
                net.view.pan(Vec2::new(d.x, d.y));
            }
            _ => {}
        }
    }
    if response.drag_stopped() {
        net.end_drag();
    }

    let hovered = if net.dragging.is_some() {
        net.dragging.clone()
    } else {
        response
            .hover_pos()
            .and_then(|p| net.sim.node_at(net.view.to_layout(local(rect, p)), pick_radius))
            .cloned()
    };
    net.set_hovered(hovered);

    net.step();
    if net.sim.is_hot() || net.playing {
        ui.ctx().request_repaint();
    }

    if net.model.is_empty() {
        painter.text(
            rect.center(),
            Align2::CENTER_CENTER,
            "No relationships up to this date.",
            FontId::proportional(14.0),
            LABEL_COLOR,
        );
        return;
    }

    let view = net.view;
    let to_screen = |p: Vec2| screen(rect, view.to_screen(p));

    // highlighted edges go on top
    let mut order: Vec<usize> = (0..net.model.edges.len()).collect();
    order.sort_by_key(|&i| net.styles.edges.get(i).is_some_and(|s| s.highlighted));
    for i in order {
        let (e, Some(style)) = (&net.model.edges[i], net.styles.edges.get(i)) else {
            continue;
        };
        let (Some(a), Some(b)) = (net.sim.position(&e.source), net.sim.position(&e.target)) else {
            continue;
        };
        painter.line_segment(
            [to_screen(a), to_screen(b)],
            Stroke::new(style.width * view.scale.sqrt(), color32(style.color, style.opacity)),
        );
    }

    for ((node, sim), style) in net
        .model
        .nodes
        .iter()
        .zip(&net.sim.nodes)
        .zip(&net.styles.nodes)
    {
        let center = to_screen(sim.pos);
        let radius = style.radius * view.scale.sqrt();
        let ring = if sim.pinned() {
            Stroke::new(2.0, LABEL_COLOR)
        } else {
            Stroke::new(1.5, Color32::WHITE)
        };
        painter.circle(center, radius, color32(style.fill, 1.0), ring);
        let (size, color) = if style.bold {
            (14.0, Color32::BLACK)
        } else {
            (12.0, LABEL_COLOR)
        };
        painter.text(
            center + egui::vec2(radius + 4.0, 0.0),
            Align2::LEFT_CENTER,
            &node.id.0,
            FontId::proportional(size),
            color,
        );
    }

    if let (Some(id), Some(p)) = (&net.hovered, response.hover_pos()) {
        if let Some(node) = net.model.nodes.iter().find(|n| &n.id == id) {
            let level = node
                .leadership
                .map(|l| format!("Level {}", l.0))
                .unwrap_or_else(|| "Level unknown".to_string());
            let degree = net
                .model
                .edges
                .iter()
                .filter(|e| &e.source == id || &e.target == id)
                .count();
            crate::ui::render_tooltip(
                ui.ctx(),
                "network-tooltip",
                p,
                rect,
                [id.0.clone(), level, format!("{degree} relationship(s)")],
            );
        }
    }
}
