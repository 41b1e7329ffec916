pub mod panel;
pub mod tooltips;

pub use panel::ui_panel;
pub use tooltips::render_tooltip;

pub const PANEL_W: f32 = 260.0;
