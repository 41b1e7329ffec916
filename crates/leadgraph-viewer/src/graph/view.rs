use bevy::math::Vec2;

pub const MIN_ZOOM: f32 = 0.1;
pub const MAX_ZOOM: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub offset: Vec2,
    pub scale: f32,
    pub min_scale: f32,
    pub max_scale: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            scale: 1.0,
            min_scale: MIN_ZOOM,
            max_scale: MAX_ZOOM,
        }
    }
}

impl ViewTransform {
    pub fn with_bounds(min_scale: f32, max_scale: f32) -> Self {
        let min_scale = min_scale.max(f32::EPSILON);
        Self {
            min_scale,
            max_scale: max_scale.max(min_scale),
            ..Self::default()
        }
    }

    pub fn to_screen(&self, p: Vec2) -> Vec2 {
        p * self.scale + self.offset
    }

    pub fn to_layout(&self, s: Vec2) -> Vec2 {
        (s - self.offset) / self.scale
    }

    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    pub fn zoom_at(&mut self, anchor: Vec2, factor: f32) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let before = self.to_layout(anchor);
        self.scale = (self.scale * factor).clamp(self.min_scale, self.max_scale);
        self.offset = anchor - before * self.scale;
    }

    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.scale = 1.0;
    }
}
