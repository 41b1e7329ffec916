use bevy::color::{Color, Lcha, Mix, Srgba};
use leadgraph_core::Level;

pub const LEVEL_LOW_HEX: &str = "#a8e6cf";
pub const LEVEL_HIGH_HEX: &str = "#1b4332";

pub fn accent() -> Srgba {
    Srgba::rgb_u8(0xff, 0x7f, 0x0e)
}

pub fn unknown_level() -> Srgba {
    hex_or_black(LEVEL_HIGH_HEX)
}

pub fn edge_base() -> Srgba {
    Srgba::rgb_u8(0x99, 0x99, 0x99)
}

pub fn edge_dim() -> Srgba {
    Srgba::rgb_u8(0xdd, 0xdd, 0xdd)
}

fn hex_or_black(hex: &str) -> Srgba {
    Srgba::hex(hex).unwrap_or(Srgba::BLACK)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: (f32, f32),
    pub range: (f32, f32),
    pub clamp: bool,
}

impl LinearScale {
    pub fn new(domain: (f32, f32), range: (f32, f32)) -> Self {
        Self {
            domain,
            range,
            clamp: false,
        }
    }

    pub fn clamped(mut self) -> Self {
        self.clamp = true;
        self
    }

    pub fn apply(&self, x: f32) -> f32 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        let mut t = if span.abs() <= f32::EPSILON {
            0.5
        } else {
            (x - d0) / span
        };
        if self.clamp {
            t = t.clamp(0.0, 1.0);
        }
        r0 + (r1 - r0) * t
    }
}

pub fn link_distance_scale(max_count: usize, longest: f32, shortest: f32) -> LinearScale {
    LinearScale::new((1.0, max_count.max(1) as f32), (longest, shortest)).clamped()
}

pub fn link_width_scale(max_count: usize) -> LinearScale {
    LinearScale::new((1.0, max_count.max(1) as f32), (1.0, 6.0))
}

pub fn level_color(level: Level) -> Srgba {
    let t = (level.clamped() as f32 - 1.0) / 4.0;
    let lo = Lcha::from(Color::Srgba(hex_or_black(LEVEL_LOW_HEX)));
    let hi = Lcha::from(Color::Srgba(hex_or_black(LEVEL_HIGH_HEX)));
    Color::Lcha(lo.mix(&hi, t)).to_srgba()
}

pub fn node_fill(level: Option<Level>) -> Srgba {
    level.map(level_color).unwrap_or_else(unknown_level)
}

pub fn darker(c: Srgba, k: f32) -> Srgba {
    let f = 0.7_f32.powf(k);
    Srgba::new(c.red * f, c.green * f, c.blue * f, c.alpha)
}

pub fn lerp_color(a: Srgba, b: Srgba, t: f32) -> Srgba {
    a.mix(&b, t.clamp(0.0, 1.0))
}
