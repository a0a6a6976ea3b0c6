// Spores wander over the canvas, leave ink behind them and now and then
// branch. Blind spores only ever turn at random. Sighted spores also
// look along their row and column of the guidance raster, head for the
// brighter side and slow down as they cross bright areas.

use std::f64::consts::PI;

use geo::Coordinate;
use log::{debug, trace};
use rand::rngs::StdRng;
use rand::Rng;

use crate::canvas::{Canvas, ChannelMask};
use crate::config::Config;
use crate::guidance::GuidanceRaster;

pub type Point2D = Coordinate<f64>;
pub type SimRng = StdRng;

// Sighted spores pick a new cardinal heading on the first tick and then
// on every 50th.
pub const RESAMPLE_PERIOD: usize = 50;
// Guidance luminance is divided by this before being taken off the speed.
pub const SPEED_DECAY_DIVISOR: f64 = 100_000.0;
pub const SPLIT_ANGLE: f64 = PI / 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Blind,
    Sighted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    North,
    South,
    West,
    East,
}

impl Direction {
    // y grows downwards, so north is 3π/2.
    pub fn heading(self) -> f64 {
        match self {
            Direction::East => 0.0,
            Direction::South => PI / 2.0,
            Direction::West => PI,
            Direction::North => 3.0 * PI / 2.0,
        }
    }
}

// Everything a spore touches during a tick. Owned by the run.
pub struct RunContext<'a> {
    pub canvas : Canvas,
    pub config : &'a Config,
    pub rng : &'a mut SimRng,
    pub guidance : Option<&'a GuidanceRaster>,
    pub tick : usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spore {
    position : Point2D,
    angle : f64,
    speed : f64,
    channels : ChannelMask,
    sense : Sense,
}

impl Spore {
    pub fn new(sense : Sense, x : f64, y : f64, angle : f64, speed : f64, channels : ChannelMask) -> Spore {
        Spore {
            position : Point2D { x, y },
            angle,
            speed,
            channels,
            sense,
        }
    }

    pub fn position(self : &Self) -> Point2D {
        self.position
    }

    pub fn angle(self : &Self) -> f64 {
        self.angle
    }

    pub fn speed(self : &Self) -> f64 {
        self.speed
    }

    pub fn channels(self : &Self) -> ChannelMask {
        self.channels
    }

    pub fn sense(self : &Self) -> Sense {
        self.sense
    }

    pub fn contained_in(self : &Self, width : u32, height : u32) -> bool {
        (0.0..width as f64).contains(&self.position.x) && (0.0..height as f64).contains(&self.position.y)
    }

    // One full tick: move, pick the next heading, paint.
    pub fn tick(self : &mut Self, ctx : &mut RunContext) {
        let (width, height) = (ctx.canvas.width(), ctx.canvas.height());
        self.advance(width, height);
        self.decide_angle(ctx);
        self.deposit(ctx);
    }

    // Step forward. Leaving the canvas turns the spore around and puts it
    // back on the nearest edge pixel.
    pub fn advance(self : &mut Self, width : u32, height : u32) {
        let (w, h) = (width as f64, height as f64);
        self.position.x += self.speed * self.angle.cos();
        self.position.y += self.speed * self.angle.sin();

        let p = &mut self.position;
        if p.x < 0.0 || p.x >= w || p.y < 0.0 || p.y >= h {
            self.angle += PI;
        }
        p.x = clamp_to_edge(p.x, w);
        p.y = clamp_to_edge(p.y, h);
    }

    pub fn decide_angle(self : &mut Self, ctx : &mut RunContext) {
        if let (Sense::Sighted, Some(guidance)) = (self.sense, ctx.guidance) {
            let (xf, yf) = (self.position.x.floor() as u32, self.position.y.floor() as u32);

            if ctx.tick == 0 || (ctx.tick + 1) % RESAMPLE_PERIOD == 0 {
                match pick_direction(guidance, xf, yf, ctx.rng) {
                    Some(direction) => self.angle = direction.heading(),
                    None => debug!("no guidance light around ({}, {}), keeping heading", xf, yf),
                }
            }

            if self.speed > 0.0 {
                self.speed = (self.speed - guidance.luminance_at(xf, yf) / SPEED_DECAY_DIVISOR).max(0.0);
            }
        }

        self.angle += (ctx.rng.gen::<f64>() - 0.5) * ctx.config.angle_change_modifier;
    }

    pub fn deposit(self : &Self, ctx : &mut RunContext) {
        ctx.canvas.deposit(self.position.x, self.position.y, ctx.config.pen_intensity, self.channels);
    }

    // Branch off a new spore of the same kind, turned by π/8. The child
    // starts out at the configured speed.
    pub fn split(self : &Self, config : &Config) -> Spore {
        Spore::new(
            self.sense,
            self.position.x,
            self.position.y,
            self.angle + SPLIT_ANGLE,
            config.speed,
            self.channels,
        )
    }
}

fn clamp_to_edge(v : f64, limit : f64) -> f64 {
    if v < 0.0 {
        0.0
    } else if v >= limit {
        limit - 1.0
    } else {
        v
    }
}

// Weighted draw over the four cardinal directions. None when the spore
// sees no light at all.
fn pick_direction(guidance : &GuidanceRaster, x : u32, y : u32, rng : &mut SimRng) -> Option<Direction> {
    let weights = guidance.weights_from(x, y);
    let total = weights.total();
    if total == 0 {
        return None;
    }

    let mut r = rng.gen_range(0..total);
    let choices = [
        (weights.north, Direction::North),
        (weights.south, Direction::South),
        (weights.west, Direction::West),
        (weights.east, Direction::East),
    ];
    for (weight, direction) in choices {
        if r < weight {
            trace!("weights {:?} at ({}, {}) -> {:?}", weights, x, y, direction);
            return Some(direction);
        }
        r -= weight;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use rand::SeedableRng;

    const EPS: f64 = 1e-9;

    fn blind(x : f64, y : f64, angle : f64, speed : f64) -> Spore {
        Spore::new(Sense::Blind, x, y, angle, speed, ChannelMask::ALL)
    }

    fn context<'a>(config : &'a Config, rng : &'a mut SimRng, guidance : Option<&'a GuidanceRaster>, w : u32, h : u32) -> RunContext<'a> {
        RunContext { canvas : Canvas::new(w, h), config, rng, guidance, tick : 0 }
    }

    #[test]
    fn advance_moves_along_heading() {
        let mut spore = blind(5.0, 5.0, PI / 2.0, 2.0);
        spore.advance(10, 10);
        assert!((spore.position().x - 5.0).abs() < EPS);
        assert!((spore.position().y - 7.0).abs() < EPS);
        assert!((spore.angle() - PI / 2.0).abs() < EPS);
    }

    #[test]
    fn leaving_right_edge_reflects_and_clamps() {
        let mut spore = blind(9.5, 4.0, 0.0, 1.0);
        spore.advance(10, 10);
        assert_eq!(spore.position().x, 9.0);
        assert!((spore.position().y - 4.0).abs() < EPS);
        assert!((spore.angle() - PI).abs() < EPS);
    }

    #[test]
    fn leaving_top_and_left_clamps_to_zero() {
        let mut spore = blind(0.2, 0.2, 5.0 * PI / 4.0, 1.0);
        spore.advance(10, 10);
        assert_eq!(spore.position().x, 0.0);
        assert_eq!(spore.position().y, 0.0);
        assert!((spore.angle() - 9.0 * PI / 4.0).abs() < EPS);
    }

    #[test]
    fn both_axes_clamped_on_corner_exit() {
        let mut spore = blind(9.8, 9.8, PI / 4.0, 1.0);
        spore.advance(10, 10);
        assert_eq!(spore.position().x, 9.0);
        assert_eq!(spore.position().y, 9.0);
    }

    #[test]
    fn blind_turn_stays_within_modifier() {
        let config = Config { angle_change_modifier: 0.5, ..Config::default() };
        let mut rng = SimRng::seed_from_u64(7);
        let mut ctx = context(&config, &mut rng, None, 10, 10);
        let mut spore = blind(5.0, 5.0, 1.0, 0.0);
        for _ in 0..100 {
            let before = spore.angle();
            spore.decide_angle(&mut ctx);
            assert!((spore.angle() - before).abs() <= 0.25);
        }
        assert_eq!(spore.speed(), 0.0);
    }

    #[test]
    fn sighted_snaps_towards_only_bright_side() {
        // Only the column to the right of the spore is lit, so east is
        // the only direction with weight.
        let img = RgbImage::from_fn(8, 8, |x, _| if x == 6 { Rgb([255, 255, 255]) } else { Rgb([0, 0, 0]) });
        let guidance = GuidanceRaster::new(img);
        let config = Config { angle_change_modifier: 0.0, ..Config::default() };
        let mut rng = SimRng::seed_from_u64(1);
        let mut ctx = context(&config, &mut rng, Some(&guidance), 8, 8);
        let mut spore = Spore::new(Sense::Sighted, 2.0, 3.0, 2.0, 0.2, ChannelMask::ALL);
        spore.decide_angle(&mut ctx);
        assert_eq!(spore.angle(), Direction::East.heading());
    }

    #[test]
    fn direction_draw_follows_weights() {
        // From (1, 2) only one pixel above and one to the right are lit,
        // so north and east share the draw in proportion to their light.
        let mut img = RgbImage::new(4, 4);
        img.put_pixel(1, 0, Rgb([255, 255, 255]));
        img.put_pixel(3, 2, Rgb([170, 170, 170]));
        let guidance = GuidanceRaster::new(img);
        let weights = guidance.weights_from(1, 2);
        assert!(weights.north > 0 && weights.east > 0);
        assert_eq!(weights.south + weights.west, 0);

        let mut rng = SimRng::seed_from_u64(17);
        let draws = 20_000;
        let mut north = 0;
        for _ in 0..draws {
            match pick_direction(&guidance, 1, 2, &mut rng) {
                Some(Direction::North) => north += 1,
                Some(Direction::East) => {}
                other => panic!("unexpected direction {:?}", other),
            }
        }
        let expected = weights.north as f64 / weights.total() as f64;
        let observed = north as f64 / draws as f64;
        assert!((observed - expected).abs() < 0.02, "observed {} expected {}", observed, expected);
    }

    #[test]
    fn sighted_keeps_heading_in_the_dark() {
        let guidance = GuidanceRaster::new(RgbImage::new(6, 6));
        let config = Config { angle_change_modifier: 0.0, ..Config::default() };
        let mut rng = SimRng::seed_from_u64(1);
        let mut ctx = context(&config, &mut rng, Some(&guidance), 6, 6);
        let mut spore = Spore::new(Sense::Sighted, 2.0, 2.0, 1.25, 0.2, ChannelMask::ALL);
        spore.decide_angle(&mut ctx);
        assert_eq!(spore.angle(), 1.25);
        assert_eq!(spore.speed(), 0.2);
    }

    #[test]
    fn sighted_resamples_only_on_schedule() {
        let img = RgbImage::from_fn(8, 8, |x, _| if x == 0 { Rgb([255, 255, 255]) } else { Rgb([0, 0, 0]) });
        let guidance = GuidanceRaster::new(img);
        let config = Config { angle_change_modifier: 0.0, ..Config::default() };
        let mut rng = SimRng::seed_from_u64(3);
        let mut ctx = context(&config, &mut rng, Some(&guidance), 8, 8);
        let mut spore = Spore::new(Sense::Sighted, 4.0, 4.0, 0.5, 0.0, ChannelMask::ALL);

        ctx.tick = 1;
        spore.decide_angle(&mut ctx);
        assert_eq!(spore.angle(), 0.5);

        ctx.tick = 49;
        spore.decide_angle(&mut ctx);
        assert_eq!(spore.angle(), Direction::West.heading());
    }

    #[test]
    fn speed_decays_over_light_and_stops_at_zero() {
        let guidance = GuidanceRaster::new(RgbImage::from_pixel(4, 4, Rgb([255, 255, 255])));
        let config = Config::default();
        let mut rng = SimRng::seed_from_u64(9);
        let mut ctx = context(&config, &mut rng, Some(&guidance), 4, 4);
        let mut spore = Spore::new(Sense::Sighted, 1.0, 1.0, 0.0, 0.004, ChannelMask::ALL);

        ctx.tick = 1;
        spore.decide_angle(&mut ctx);
        let expected = 0.004 - guidance.luminance_at(1, 1) / SPEED_DECAY_DIVISOR;
        assert!((spore.speed() - expected).abs() < EPS);

        spore.decide_angle(&mut ctx);
        assert_eq!(spore.speed(), 0.0);
        spore.decide_angle(&mut ctx);
        assert_eq!(spore.speed(), 0.0);
    }

    #[test]
    fn split_turns_child_and_leaves_parent() {
        let config = Config { speed: 0.7, ..Config::default() };
        let parent = Spore::new(Sense::Sighted, 3.5, 2.25, 1.0, 0.1, ChannelMask::GREEN);
        let child = parent.split(&config);
        assert_eq!(child.position(), parent.position());
        assert!((child.angle() - (1.0 + PI / 8.0)).abs() < EPS);
        assert_eq!(child.channels(), ChannelMask::GREEN);
        assert_eq!(child.sense(), Sense::Sighted);
        assert_eq!(child.speed(), 0.7);
        assert_eq!(parent.angle(), 1.0);
        assert_eq!(parent.speed(), 0.1);
    }

    #[test]
    fn tick_paints_at_new_position() {
        let config = Config { pen_intensity: 4.0, angle_change_modifier: 0.0, ..Config::default() };
        let mut rng = SimRng::seed_from_u64(0);
        let mut ctx = context(&config, &mut rng, None, 6, 6);
        let mut spore = blind(1.0, 1.0, 0.0, 1.0);
        spore.tick(&mut ctx);
        assert!((ctx.canvas[(2, 1)].r - 4.0).abs() < 1e-5);
        assert_eq!(ctx.canvas[(1, 1)].r, 0.0);
    }
}
