// Floating point accumulation image that the spores paint into.
//
// Each pixel holds unclamped red, green and blue ink totals. Ink is only
// ever added; clamping to the displayable range happens on export.

use std::ops::{Add, AddAssign, BitOr, Index, IndexMut, Sub, SubAssign};

use image::{Rgb, RgbImage};
use ndarray::{Array, Ix2, ShapeBuilder};

// Which colour channels a spore is allowed to paint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelMask(u8);

impl ChannelMask {
    pub const NONE: ChannelMask = ChannelMask(0);
    pub const RED: ChannelMask = ChannelMask(0x1);
    pub const GREEN: ChannelMask = ChannelMask(0x2);
    pub const BLUE: ChannelMask = ChannelMask(0x4);
    pub const ALL: ChannelMask = ChannelMask(0x7);

    pub fn contains(self, other: ChannelMask) -> bool {
        self.0 & other.0 == other.0
    }
}

impl Default for ChannelMask {
    fn default() -> Self {
        ChannelMask::ALL
    }
}

impl BitOr for ChannelMask {
    type Output = ChannelMask;

    fn bitor(self, rhs: ChannelMask) -> ChannelMask {
        ChannelMask(self.0 | rhs.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pixel {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Pixel {
    pub fn new(r: f32, g: f32, b: f32) -> Pixel {
        Pixel { r, g, b }
    }

    pub fn splat(value: f32) -> Pixel {
        Pixel::new(value, value, value)
    }

    // Same value on the allowed channels, zero elsewhere.
    pub fn masked(value: f32, mask: ChannelMask) -> Pixel {
        let pick = |channel: ChannelMask| if mask.contains(channel) { value } else { 0.0 };
        Pixel::new(pick(ChannelMask::RED), pick(ChannelMask::GREEN), pick(ChannelMask::BLUE))
    }

    pub fn luminance(self : &Self) -> f64 {
        0.3 * self.r as f64 + 0.59 * self.g as f64 + 0.11 * self.b as f64
    }

    fn to_rgb(self : &Self) -> Rgb<u8> {
        Rgb([export_channel(self.r), export_channel(self.g), export_channel(self.b)])
    }
}

// Clamp then round half away from zero. NaN exports as black.
fn export_channel(value: f32) -> u8 {
    value.clamp(0.0, 255.0).round() as u8
}

impl Add for Pixel {
    type Output = Pixel;

    fn add(self, rhs: Pixel) -> Pixel {
        Pixel::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b)
    }
}

impl AddAssign for Pixel {
    fn add_assign(&mut self, rhs: Pixel) {
        *self = *self + rhs;
    }
}

impl Sub for Pixel {
    type Output = Pixel;

    fn sub(self, rhs: Pixel) -> Pixel {
        Pixel::new(self.r - rhs.r, self.g - rhs.g, self.b - rhs.b)
    }
}

impl SubAssign for Pixel {
    fn sub_assign(&mut self, rhs: Pixel) {
        *self = *self - rhs;
    }
}

pub struct Canvas {
    data : Array<Pixel, Ix2>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Canvas {
        Canvas {
            data : Array::from_elem((width as usize, height as usize).f(), Pixel::default()),
        }
    }

    pub fn width(self : &Self) -> u32 {
        self.data.dim().0 as u32
    }

    pub fn height(self : &Self) -> u32 {
        self.data.dim().1 as u32
    }

    pub fn get(self : &Self, x: usize, y: usize) -> Option<&Pixel> {
        self.data.get((x, y))
    }

    // Bulk read in column-major (x, y) order.
    pub fn pixels(self : &Self) -> impl Iterator<Item = &Pixel> {
        self.data.iter()
    }

    pub fn total(self : &Self) -> Pixel {
        self.data.iter().fold(Pixel::default(), |acc, px| acc + *px)
    }

    // Bilinear splat of `intensity` ink around a continuous point.
    //
    // Only the ceiling lattice coordinate wraps to zero at the far edge;
    // the floor coordinate is used as is. Callers keep the point inside
    // [0, width) x [0, height).
    pub fn deposit(self : &mut Self, x: f64, y: f64, intensity: f32, mask: ChannelMask) {
        let (width, height) = self.data.dim();
        let (x1, y1) = (x.floor() as usize, y.floor() as usize);
        let (mut x2, mut y2) = (x.ceil() as usize, y.ceil() as usize);
        if x2 >= width {
            x2 = 0;
        }
        if y2 >= height {
            y2 = 0;
        }

        let (rx2, ry2) = (x - x1 as f64, y - y1 as f64);
        let (rx1, ry1) = (1.0 - rx2, 1.0 - ry2);
        let ink = |rx: f64, ry: f64| Pixel::masked((intensity as f64 * rx * ry) as f32, mask);

        self.data[(x1, y1)] += ink(rx1, ry1);
        self.data[(x2, y1)] += ink(rx2, ry1);
        self.data[(x1, y2)] += ink(rx1, ry2);
        self.data[(x2, y2)] += ink(rx2, ry2);
    }

    pub fn to_display_raster(self : &Self) -> RgbImage {
        let (width, height) = self.data.dim();
        let mut img = RgbImage::new(width as u32, height as u32);
        for ((x, y), px) in self.data.indexed_iter() {
            img.put_pixel(x as u32, y as u32, px.to_rgb());
        }
        img
    }
}

impl Index<(usize, usize)> for Canvas {
    type Output = Pixel;

    fn index(&self, index: (usize, usize)) -> &Pixel {
        &self.data[index]
    }
}

impl IndexMut<(usize, usize)> for Canvas {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut Pixel {
        &mut self.data[index]
    }
}
