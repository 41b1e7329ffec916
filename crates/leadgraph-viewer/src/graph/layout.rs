use bevy::math::Vec2;
use leadgraph_core::EntityId;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::graph::model::NetworkModel;
use crate::scale::link_distance_scale;

pub const MIN_EXTENT: f32 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimParams {
    // negative repels
    pub charge: f32,
    pub collide_radius: f32,
    pub center_pull: f32,
    pub margin: f32,
    pub link_distance_long: f32,
    pub link_distance_short: f32,
    pub velocity_decay: f32,
    pub alpha_min: f32,
    pub alpha_drag: f32,
    pub alpha_resize: f32,
    pub initial_spread: f32,
    pub seed: u64,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            charge: -100.0,
            collide_radius: 40.0,
            center_pull: 0.1,
            margin: 40.0,
            link_distance_long: 100.0,
            link_distance_short: 30.0,
            velocity_decay: 0.4,
            alpha_min: 0.001,
            alpha_drag: 0.3,
            alpha_resize: 0.3,
            initial_spread: 100.0,
            seed: 0x1ead,
        }
    }
}

impl SimParams {
    pub fn alpha_decay(&self) -> f32 {
        1.0 - self.alpha_min.max(1e-6).powf(1.0 / 300.0)
    }
}

#[derive(Debug, Clone)]
pub struct SimNode {
    pub id: EntityId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub pin: Option<Vec2>,
}

impl SimNode {
    pub fn pinned(&self) -> bool {
        self.pin.is_some()
    }
}

#[derive(Debug, Clone)]
struct SimLink {
    source: usize,
    target: usize,
    distance: f32,
    strength: f32,
    bias: f32,
}

pub struct Simulation {
    pub nodes: Vec<SimNode>,
    links: Vec<SimLink>,
    index: HashMap<EntityId, usize>,
    params: SimParams,
    size: Vec2,
    alpha: f32,
    alpha_target: f32,
    stopped: bool,
    rng: StdRng,
}

impl Simulation {
    pub fn new(model: &NetworkModel, size: Vec2, params: SimParams) -> Self {
        let size = size.max(Vec2::splat(MIN_EXTENT));
        let mut rng = StdRng::seed_from_u64(params.seed);
        let center = size * 0.5;

        let mut index = HashMap::with_capacity(model.nodes.len());
        let nodes: Vec<SimNode> = model
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| {
                index.insert(n.id.clone(), i);
                let jitter = Vec2::new(rng.gen::<f32>() - 0.5, rng.gen::<f32>() - 0.5);
                SimNode {
                    id: n.id.clone(),
                    pos: center + jitter * params.initial_spread,
                    vel: Vec2::ZERO,
                    pin: None,
                }
            })
            .collect();

        let distance = link_distance_scale(
            model.max_pair_count,
            params.link_distance_long,
            params.link_distance_short,
        );

        let ends: Vec<(usize, usize, usize)> = model
            .edges
            .iter()
            .filter_map(|e| {
                let s = *index.get(&e.source)?;
                let t = *index.get(&e.target)?;
                Some((s, t, e.pair_count))
            })
            .collect();

        let mut degree = vec![0usize; nodes.len()];
        for &(s, t, _) in &ends {
            degree[s] += 1;
            degree[t] += 1;
        }

        let links = ends
            .into_iter()
            .map(|(s, t, count)| {
                let (ds, dt) = (degree[s].max(1) as f32, degree[t].max(1) as f32);
                SimLink {
                    source: s,
                    target: t,
                    distance: distance.apply(count as f32),
                    strength: 1.0 / ds.min(dt),
                    bias: ds / (ds + dt),
                }
            })
            .collect();

        Self {
            nodes,
            links,
            index,
            params,
            size,
            alpha: 1.0,
            alpha_target: 0.0,
            stopped: false,
            rng,
        }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn is_hot(&self) -> bool {
        !self.stopped
            && !self.nodes.is_empty()
            && (self.alpha >= self.params.alpha_min || self.alpha_target > self.alpha)
    }

    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn reheat(&mut self, alpha: f32) {
        self.alpha = alpha;
        self.stopped = false;
    }

    pub fn position(&self, id: &EntityId) -> Option<Vec2> {
        self.index.get(id).map(|&i| self.nodes[i].pos)
    }

    pub fn center(&self) -> Vec2 {
        self.size * 0.5
    }

    pub fn resize(&mut self, size: Vec2) {
        let size = size.max(Vec2::splat(MIN_EXTENT));
        if size == self.size {
            return;
        }
        self.size = size;
        self.reheat(self.params.alpha_resize);
    }

    pub fn pin(&mut self, id: &EntityId, at: Vec2) -> bool {
        let Some(&i) = self.index.get(id) else {
            return false;
        };
        let node = &mut self.nodes[i];
        node.pin = Some(at);
        node.pos = at;
        node.vel = Vec2::ZERO;
        true
    }

    pub fn drag_start(&mut self, id: &EntityId) -> bool {
        let Some(at) = self.position(id) else {
            return false;
        };
        self.alpha_target = self.params.alpha_drag;
        self.stopped = false;
        self.pin(id, at)
    }

    pub fn drag_to(&mut self, id: &EntityId, at: Vec2) {
        if let Some(&i) = self.index.get(id) {
            self.nodes[i].pin = Some(at);
        }
    }

    pub fn drag_end(&mut self, id: &EntityId) {
        self.alpha_target = 0.0;
        if let Some(&i) = self.index.get(id) {
            self.nodes[i].pin = None;
        }
    }

    pub fn node_at(&self, at: Vec2, radius: f32) -> Option<&EntityId> {
        self.nodes
            .iter()
            .map(|n| (n.pos.distance_squared(at), &n.id))
            .filter(|(d2, _)| *d2 <= radius * radius)
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, id)| id)
    }

    pub fn run_to_rest(&mut self, max_ticks: usize) -> usize {
        let mut ticks = 0;
        while self.is_hot() && ticks < max_ticks {
            self.tick();
            ticks += 1;
        }
        ticks
    }

    pub fn tick(&mut self) {
        if self.nodes.is_empty() {
            return;
        }
        self.alpha += (self.alpha_target - self.alpha) * self.params.alpha_decay();
        let alpha = self.alpha;

        self.apply_links(alpha);
        self.apply_charge(alpha);
        self.apply_center();
        self.apply_collide();
        self.apply_pull(alpha);

        let keep = 1.0 - self.params.velocity_decay;
        let (lo, hi) = self.bounds();
        for n in self.nodes.iter_mut() {
            match n.pin {
                Some(p) => {
                    n.pos = p;
                    n.vel = Vec2::ZERO;
                }
                None => {
                    n.vel *= keep;
                    n.pos += n.vel;
                }
            }
            n.pos = n.pos.clamp(lo, hi);
        }

        if self.alpha < self.params.alpha_min && self.alpha_target < self.params.alpha_min {
            self.stopped = true;
        }
    }

    fn bounds(&self) -> (Vec2, Vec2) {
        let lo = Vec2::splat(self.params.margin.max(0.0)).min(self.size * 0.5);
        let hi = (self.size - lo).max(lo);
        (lo, hi)
    }

    fn jiggle(&mut self) -> f32 {
        (self.rng.gen::<f32>() - 0.5) * 1e-6
    }

    fn nudge_zero(&mut self, mut d: Vec2) -> Vec2 {
        if d.x == 0.0 {
            d.x = self.jiggle();
        }
        if d.y == 0.0 {
            d.y = self.jiggle();
        }
        d
    }

    fn apply_links(&mut self, alpha: f32) {
        for li in 0..self.links.len() {
            let SimLink {
                source,
                target,
                distance,
                strength,
                bias,
            } = self.links[li].clone();
            let (s, t) = (&self.nodes[source], &self.nodes[target]);
            let raw = (t.pos + t.vel) - (s.pos + s.vel);
            let d = self.nudge_zero(raw);
            let len = d.length().max(f32::MIN_POSITIVE);
            let d = d * ((len - distance) / len * alpha * strength);
            self.nodes[target].vel -= d * bias;
            self.nodes[source].vel += d * (1.0 - bias);
        }
    }

    fn apply_charge(&mut self, alpha: f32) {
        let strength = self.params.charge;
        let positions: Vec<Vec2> = self.nodes.iter().map(|n| n.pos).collect();
        for i in 0..positions.len() {
            for j in 0..positions.len() {
                if i == j {
                    continue;
                }
                let d = self.nudge_zero(positions[j] - positions[i]);
                let mut l = d.length_squared();
                if l < 1.0 {
                    l = l.sqrt();
                }
                let l = l.max(f32::MIN_POSITIVE);
                self.nodes[i].vel += d * (strength * alpha / l);
            }
        }
    }

    fn apply_center(&mut self) {
        let n = self.nodes.len() as f32;
        let mean = self.nodes.iter().map(|n| n.pos).sum::<Vec2>() / n;
        let shift = mean - self.center();
        for node in self.nodes.iter_mut() {
            node.pos -= shift;
        }
    }

    fn apply_collide(&mut self) {
        let r = self.params.collide_radius.max(0.0);
        if r == 0.0 {
            return;
        }
        let reach = r + r;
        for i in 0..self.nodes.len() {
            let xi = self.nodes[i].pos + self.nodes[i].vel;
            for j in (i + 1)..self.nodes.len() {
                let xj = self.nodes[j].pos + self.nodes[j].vel;
                let d = xi - xj;
                if d.length_squared() >= reach * reach {
                    continue;
                }
                let d = self.nudge_zero(d);
                let len = d.length().max(f32::MIN_POSITIVE);
                let d = d * ((reach - len) / len);
                // equal radii split the push evenly
                self.nodes[i].vel += d * 0.5;
                self.nodes[j].vel -= d * 0.5;
            }
        }
    }

    fn apply_pull(&mut self, alpha: f32) {
        let center = self.center();
        let k = self.params.center_pull * alpha;
        for n in self.nodes.iter_mut() {
            n.vel += (center - n.pos) * k;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::model::build_network;
    use chrono::NaiveDate;
    use leadgraph_core::RelationshipRecord;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn model(pairs: &[(&str, &str)]) -> NetworkModel {
        let records: Vec<_> = pairs
            .iter()
            .enumerate()
            .map(|(i, (a, b))| RelationshipRecord::new(*a, *b, day(1, 1 + i as u32), 3, "e"))
            .collect();
        build_network(&records, day(12, 31))
    }

    fn id(s: &str) -> EntityId {
        EntityId(s.to_string())
    }

    #[test]
    fn same_seed_same_first_step() {
        let m = model(&[("A", "B"), ("B", "C"), ("C", "A"), ("D", "A")]);
        let size = Vec2::new(640.0, 480.0);
        let mut a = Simulation::new(&m, size, SimParams::default());
        let mut b = Simulation::new(&m, size, SimParams::default());
        a.tick();
        b.tick();
        for (x, y) in a.nodes.iter().zip(b.nodes.iter()) {
            assert_eq!(x.pos, y.pos);
        }
    }

    #[test]
    fn cools_down_and_stays_in_viewport() {
        let m = model(&[("A", "B"), ("B", "C"), ("C", "D"), ("E", "F")]);
        let size = Vec2::new(500.0, 300.0);
        let mut sim = Simulation::new(&m, size, SimParams::default());
        let ticks = sim.run_to_rest(10_000);

        assert!((280..=320).contains(&ticks), "ticks = {ticks}");
        assert!(!sim.is_hot());
        for n in &sim.nodes {
            assert!(n.pos.x >= 40.0 && n.pos.x <= 460.0, "{:?}", n.pos);
            assert!(n.pos.y >= 40.0 && n.pos.y <= 260.0, "{:?}", n.pos);
        }
    }

    #[test]
    fn isolated_nodes_spread_apart() {
        let records = vec![
            RelationshipRecord::new("Solo", "", day(1, 1), 1, "e"),
            RelationshipRecord::new("", "Other", day(1, 2), 2, "e"),
        ];
        let m = build_network(&records, day(12, 31));
        assert_eq!(m.edges.len(), 0);

        let mut sim = Simulation::new(&m, Vec2::new(800.0, 800.0), SimParams::default());
        assert_eq!(sim.links.len(), 0);
        sim.run_to_rest(1_000);
        let d = sim.nodes[0].pos.distance(sim.nodes[1].pos);
        assert!(d > 40.0, "d = {d}");
    }

    #[test]
    fn frequent_pairs_sit_closer() {
        let m = model(&[("A", "B"), ("A", "B"), ("B", "A"), ("C", "D")]);
        let params = SimParams {
            collide_radius: 5.0,
            ..SimParams::default()
        };
        let mut sim = Simulation::new(&m, Vec2::new(900.0, 900.0), params);
        sim.run_to_rest(1_000);
        let pos = |s: &str| sim.position(&id(s)).unwrap();
        let tight = pos("A").distance(pos("B"));
        let loose = pos("C").distance(pos("D"));
        assert!(tight < loose, "tight {tight} loose {loose}");
    }

    #[test]
    fn drag_pins_and_keeps_layout_hot() {
        let m = model(&[("A", "B"), ("B", "C")]);
        let mut sim = Simulation::new(&m, Vec2::new(600.0, 600.0), SimParams::default());
        sim.run_to_rest(10_000);
        assert!(!sim.is_hot());

        assert!(sim.drag_start(&id("B")));
        assert!(sim.is_hot());
        let target = Vec2::new(100.0, 120.0);
        sim.drag_to(&id("B"), target);
        for _ in 0..500 {
            sim.tick();
        }
        assert!(sim.is_hot());
        assert_eq!(sim.position(&id("B")), Some(target));

        sim.drag_end(&id("B"));
        assert!(!sim.nodes.iter().any(SimNode::pinned));
        let ticks = sim.run_to_rest(10_000);
        assert!(ticks > 0 && ticks < 10_000);
    }

    #[test]
    fn resize_reheats_without_rebuilding() {
        let m = model(&[("A", "B")]);
        let mut sim = Simulation::new(&m, Vec2::new(400.0, 400.0), SimParams::default());
        sim.run_to_rest(10_000);
        sim.resize(Vec2::new(1000.0, 400.0));
        assert!(sim.is_hot());
        assert!((sim.alpha() - 0.3).abs() < 1e-6);
        assert_eq!(sim.nodes.len(), 2);
        sim.run_to_rest(10_000);
        let mean_x = sim.nodes.iter().map(|n| n.pos.x).sum::<f32>() / 2.0;
        assert!((mean_x - 500.0).abs() < 60.0, "mean_x = {mean_x}");
    }

    #[test]
    fn zero_sized_surface_does_not_break() {
        let m = model(&[("A", "B"), ("C", "D")]);
        let mut sim = Simulation::new(&m, Vec2::ZERO, SimParams::default());
        sim.run_to_rest(50);
        assert!(sim.nodes.iter().all(|n| n.pos.is_finite()));
    }

    #[test]
    fn empty_model_is_never_hot() {
        let mut sim = Simulation::new(&NetworkModel::default(), Vec2::new(10.0, 10.0), SimParams::default());
        assert!(!sim.is_hot());
        assert_eq!(sim.run_to_rest(10), 0);
    }

    #[test]
    fn hit_test_finds_nearest_node() {
        let m = model(&[("A", "B")]);
        let mut sim = Simulation::new(&m, Vec2::new(400.0, 400.0), SimParams::default());
        sim.pin(&id("A"), Vec2::new(50.0, 50.0));
        sim.pin(&id("B"), Vec2::new(300.0, 300.0));
        assert_eq!(sim.node_at(Vec2::new(55.0, 52.0), 12.0), Some(&id("A")));
        assert_eq!(sim.node_at(Vec2::new(150.0, 150.0), 12.0), None);
    }
}
