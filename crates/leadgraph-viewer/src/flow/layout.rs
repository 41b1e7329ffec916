use bevy::color::Srgba;
use bevy::math::Vec2;
use leadgraph_core::Level;
use serde::{Deserialize, Serialize};

use crate::flow::model::{Bucket, FlowModel, TimeWindow};
use crate::scale::{lerp_color, level_color};

const MIN_EXTENT: f32 = 1.0;
const HIT_SLACK: f32 = 2.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowParams {
    pub node_width: f32,
    pub padding: f32,
    pub margin: f32,
    pub curve_segments: usize,
}

impl Default for FlowParams {
    fn default() -> Self {
        Self {
            node_width: 30.0,
            padding: 10.0,
            margin: 20.0,
            curve_segments: 24,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BucketRect {
    pub bucket: Bucket,
    pub min: Vec2,
    pub max: Vec2,
    pub value: usize,
    pub color: Srgba,
}

impl BucketRect {
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ribbon {
    // index into FlowModel::flows
    pub flow: usize,
    pub from: Vec2,
    pub to: Vec2,
    pub width: f32,
    pub source_color: Srgba,
    pub target_color: Srgba,
}

impl Ribbon {
    pub fn point(&self, t: f32) -> Vec2 {
        let t = t.clamp(0.0, 1.0);
        let mx = (self.from.x + self.to.x) * 0.5;
        let c1 = Vec2::new(mx, self.from.y);
        let c2 = Vec2::new(mx, self.to.y);
        let u = 1.0 - t;
        self.from * (u * u * u)
            + c1 * (3.0 * u * u * t)
            + c2 * (3.0 * u * t * t)
            + self.to * (t * t * t)
    }

    pub fn samples(&self, segments: usize) -> Vec<Vec2> {
        let n = segments.max(1);
        (0..=n).map(|i| self.point(i as f32 / n as f32)).collect()
    }

    pub fn color_at(&self, t: f32) -> Srgba {
        lerp_color(self.source_color, self.target_color, t)
    }

    pub fn stroke_width(&self) -> f32 {
        self.width.max(1.0)
    }

    pub fn y_at(&self, x: f32) -> Option<f32> {
        if x < self.from.x || x > self.to.x {
            return None;
        }
        // x(t) is monotonic since both control points share the mid x
        let (mut lo, mut hi) = (0.0_f32, 1.0_f32);
        for _ in 0..32 {
            let mid = (lo + hi) * 0.5;
            if self.point(mid).x < x {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        Some(self.point((lo + hi) * 0.5).y)
    }
}

#[derive(Debug, Clone, Default)]
pub struct FlowLayout {
    pub size: Vec2,
    pub buckets: Vec<BucketRect>,
    pub ribbons: Vec<Ribbon>,
    pub segments: usize,
}

impl FlowLayout {
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn bucket(&self, bucket: &Bucket) -> Option<&BucketRect> {
        self.buckets.iter().find(|b| &b.bucket == bucket)
    }

    pub fn ribbon_at(&self, p: Vec2) -> Option<usize> {
        self.ribbons
            .iter()
            .rev()
            .find(|r| {
                r.y_at(p.x)
                    .is_some_and(|y| (p.y - y).abs() <= r.stroke_width() * 0.5 + HIT_SLACK)
            })
            .map(|r| r.flow)
    }
}

pub fn layout_flows(model: &FlowModel, size: Vec2, params: &FlowParams) -> FlowLayout {
    let size = size.max(Vec2::splat(MIN_EXTENT));
    if model.buckets.is_empty() {
        return FlowLayout {
            size,
            segments: params.curve_segments,
            ..FlowLayout::default()
        };
    }

    let x0 = params.margin;
    let y0 = params.margin;
    let inner = (size - Vec2::splat(2.0 * params.margin)).max(Vec2::splat(MIN_EXTENT));
    let node_width = params.node_width.min(inner.x / 3.0).max(0.0);
    let column_step = (inner.x - node_width) / 2.0;

    let value_of = |b: &Bucket| {
        let (mut incoming, mut outgoing) = (0, 0);
        for f in &model.flows {
            if &f.source == b {
                outgoing += f.count;
            }
            if &f.target == b {
                incoming += f.count;
            }
        }
        incoming.max(outgoing)
    };

    let columns: Vec<Vec<(Bucket, usize)>> = TimeWindow::ALL
        .iter()
        .map(|&w| {
            let mut col: Vec<(Bucket, usize)> = model
                .buckets
                .iter()
                .filter(|b| b.window == w)
                .map(|b| (*b, value_of(b)))
                .collect();
            col.sort_by(|a, b| b.0.level.cmp(&a.0.level));
            col
        })
        .collect();

    let rows = columns.iter().map(Vec::len).max().unwrap_or(1).max(1);
    let padding = if rows > 1 {
        params.padding.min(inner.y / (rows - 1) as f32)
    } else {
        params.padding
    };

    let ky = columns
        .iter()
        .filter_map(|col| {
            let total: usize = col.iter().map(|(_, v)| v).sum();
            if total == 0 {
                return None;
            }
            let gaps = col.len().saturating_sub(1) as f32 * padding;
            Some(((inner.y - gaps) / total as f32).max(0.0))
        })
        .fold(f32::INFINITY, f32::min);
    let ky = if ky.is_finite() { ky } else { 0.0 };

    let mut buckets = Vec::with_capacity(model.buckets.len());
    for (c, col) in columns.iter().enumerate() {
        let used: f32 = col.iter().map(|(_, v)| *v as f32 * ky).sum::<f32>()
            + col.len().saturating_sub(1) as f32 * padding;
        let mut y = y0 + ((inner.y - used) * 0.5).max(0.0);
        let x = x0 + column_step * c as f32;
        for (bucket, value) in col {
            let h = *value as f32 * ky;
            buckets.push(BucketRect {
                bucket: *bucket,
                min: Vec2::new(x, y),
                max: Vec2::new(x + node_width, y + h),
                value: *value,
                color: level_color(Level(bucket.level as i64)),
            });
            y += h + padding;
        }
    }

    let top_of = |b: &Bucket| {
        buckets
            .iter()
            .find(|r| &r.bucket == b)
            .map(|r| (r.min, r.max))
    };

    // stack links: outgoing by target position, incoming by source position
    let mut order: Vec<usize> = (0..model.flows.len()).collect();
    let row_y = |b: &Bucket| top_of(b).map(|(min, _)| min.y).unwrap_or(0.0);

    let mut out_offset = vec![0.0_f32; buckets.len()];
    let mut in_offset = vec![0.0_f32; buckets.len()];
    let index_of = |b: &Bucket| buckets.iter().position(|r| &r.bucket == b);

    let mut from_y = vec![0.0_f32; model.flows.len()];
    order.sort_by(|&a, &b| {
        row_y(&model.flows[a].target)
            .total_cmp(&row_y(&model.flows[b].target))
            .then(a.cmp(&b))
    });
    for &i in &order {
        let f = &model.flows[i];
        let w = f.count as f32 * ky;
        if let Some(s) = index_of(&f.source) {
            from_y[i] = buckets[s].min.y + out_offset[s] + w * 0.5;
            out_offset[s] += w;
        }
    }

    let mut to_y = vec![0.0_f32; model.flows.len()];
    order.sort_by(|&a, &b| {
        row_y(&model.flows[a].source)
            .total_cmp(&row_y(&model.flows[b].source))
            .then(a.cmp(&b))
    });
    for &i in &order {
        let f = &model.flows[i];
        let w = f.count as f32 * ky;
        if let Some(t) = index_of(&f.target) {
            to_y[i] = buckets[t].min.y + in_offset[t] + w * 0.5;
            in_offset[t] += w;
        }
    }

    let ribbons = model
        .flows
        .iter()
        .enumerate()
        .filter_map(|(i, f)| {
            let (_, smax) = top_of(&f.source)?;
            let (tmin, _) = top_of(&f.target)?;
            Some(Ribbon {
                flow: i,
                from: Vec2::new(smax.x, from_y[i]),
                to: Vec2::new(tmin.x, to_y[i]),
                width: f.count as f32 * ky,
                source_color: level_color(Level(f.source.level as i64)),
                target_color: level_color(Level(f.target.level as i64)),
            })
        })
        .collect();

    FlowLayout {
        size,
        buckets,
        ribbons,
        segments: params.curve_segments,
    }
}
