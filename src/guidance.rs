// Read-only overlay image that sighted spores steer by.

use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::map::map_colors;

pub fn luminance(px: &Rgb<u8>) -> f64 {
    let [r, g, b] = px.0;
    0.3 * r as f64 + 0.59 * g as f64 + 0.11 * b as f64
}

// Summed brightness seen from one point, looking along its row and column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Weights {
    pub north : u64,
    pub south : u64,
    pub west : u64,
    pub east : u64,
}

impl Weights {
    pub fn total(self : &Self) -> u64 {
        self.north + self.south + self.west + self.east
    }
}

pub struct GuidanceRaster {
    rgb : RgbImage,
    // Luminance truncated to whole bytes, used for direction weights.
    lum : GrayImage,
}

impl GuidanceRaster {
    pub fn new(rgb : RgbImage) -> GuidanceRaster {
        let lum = map_colors(&rgb, |px| Luma([luminance(&px) as u8]));
        GuidanceRaster { rgb, lum }
    }

    pub fn width(self : &Self) -> u32 {
        self.rgb.width()
    }

    pub fn height(self : &Self) -> u32 {
        self.rgb.height()
    }

    pub fn pixel(self : &Self, x : u32, y : u32) -> &Rgb<u8> {
        self.rgb.get_pixel(x, y)
    }

    pub fn luminance_at(self : &Self, x : u32, y : u32) -> f64 {
        luminance(self.pixel(x, y))
    }

    // North covers the rows above (x, y), south the rows from y down;
    // west and east split the row the same way.
    pub fn weights_from(self : &Self, x : u32, y : u32) -> Weights {
        let lum = |i, j| self.lum.get_pixel(i, j).0[0] as u64;
        Weights {
            north : (0..y).map(|j| lum(x, j)).sum(),
            south : (y..self.height()).map(|j| lum(x, j)).sum(),
            west : (0..x).map(|i| lum(i, y)).sum(),
            east : (x..self.width()).map(|i| lum(i, y)).sum(),
        }
    }
}

impl From<RgbImage> for GuidanceRaster {
    fn from(rgb : RgbImage) -> GuidanceRaster {
        GuidanceRaster::new(rgb)
    }
}
