//! Static assignment of radar pixels to feature modules.
//!
//! The disc around the radar station is cut into `ring_count` concentric
//! rings and `cut_count` angular sectors. Module `ring * cut_count + sector`
//! holds the pixels of one ring sector. Two extra modules follow:
//!
//! - the **bullseye**, a small disc at the station that overrides the ring
//!   sectors underneath it, and
//! - the **tripwire**, a circle of pixels sampled around a sensitive point,
//!   kept as its own pixel list because it overlaps the ring sectors.
//!
//! ```text
//!         sector 3*c/4
//!              │
//!  sector c/2 ─┼─ sector 0   (col increases to the right)
//!              │
//!         sector c/4          (row increases downward)
//! ```
//!
//! Angles come from `atan2(d_row, d_col)` in image coordinates, so sector
//! numbers increase clockwise on screen.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::types::Pixel;

/// Lookup value for pixels outside the disc.
pub const UNASSIGNED: i32 = -1;

/// Largest disc radius a configuration may ask for. The lookup grid holds
/// `(2 * radius + 1)²` entries.
pub const MAX_RADIUS: u32 = 2048;

/// Geometry parameters the partition is computed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionGeometry {
    /// Station position.
    pub centre: Pixel,
    /// Outer radius of the disc in pixels.
    pub radius: u32,
    /// Number of concentric rings.
    pub ring_count: u32,
    /// Number of angular sectors per ring.
    pub cut_count: u32,
    /// Radius of the bullseye disc at the station.
    pub bullseye_radius: u32,
    /// Centre of the tripwire circle, usually a sensitive pixel.
    pub tripwire_centre: Pixel,
    /// Radius of the tripwire circle.
    pub tripwire_radius: u32,
}

impl PartitionGeometry {
    /// Number of ring sector modules.
    pub fn ring_module_count(&self) -> usize {
        self.ring_count as usize * self.cut_count as usize
    }

    /// Total modules including bullseye and tripwire.
    pub fn module_count(&self) -> usize {
        self.ring_module_count() + 2
    }

    /// Return a copy of this geometry in the coordinates of a grid
    /// downsampled by `scale`.
    pub fn scaled(&self, scale: u32) -> Self {
        let s = scale.max(1);
        let div = |p: Pixel| Pixel::new(p.row / s as i32, p.col / s as i32);
        Self {
            centre: div(self.centre),
            radius: self.radius / s,
            ring_count: self.ring_count,
            cut_count: self.cut_count,
            bullseye_radius: self.bullseye_radius / s,
            tripwire_centre: div(self.tripwire_centre),
            tripwire_radius: self.tripwire_radius / s,
        }
    }
}

/// Pixel to module lookup for one geometry.
///
/// The lookup grid covers the square bounding the disc; positions outside
/// the square are unassigned as well.
#[derive(Debug, Clone)]
pub struct ModulePartition {
    geometry: PartitionGeometry,
    origin: Pixel,
    side: usize,
    lookup: Vec<i32>,
    tripwire: Vec<Pixel>,
}

impl ModulePartition {
    /// Compute the partition for `geometry`.
    ///
    /// Ring and cut counts of zero are raised to one. Floating-point
    /// boundary cases are clamped into range rather than rejected.
    pub fn build(geometry: PartitionGeometry) -> Self {
        let geometry = PartitionGeometry {
            ring_count: geometry.ring_count.max(1),
            cut_count: geometry.cut_count.max(1),
            ..geometry
        };

        let r = geometry.radius as i64;
        let r2 = r * r;
        let side = (2 * r + 1) as usize;
        let origin = Pixel::new(
            geometry.centre.row - geometry.radius as i32,
            geometry.centre.col - geometry.radius as i32,
        );
        let bullseye = geometry.ring_module_count() as i32;
        let b2 = geometry.bullseye_radius as i64 * geometry.bullseye_radius as i64;

        let mut lookup = vec![UNASSIGNED; side * side];
        for d_row in -r..=r {
            for d_col in -r..=r {
                let d2 = d_row * d_row + d_col * d_col;
                if d2 > r2 {
                    continue;
                }

                let module = if d2 <= b2 {
                    bullseye
                } else {
                    let ring = ring_index(d2, geometry.radius, geometry.ring_count);
                    let sector = angular_index(d_row, d_col, geometry.cut_count);
                    (ring * geometry.cut_count as usize + sector) as i32
                };

                let idx = (d_row + r) as usize * side + (d_col + r) as usize;
                lookup[idx] = module;
            }
        }

        let tripwire = tripwire_pixels(geometry.tripwire_centre, geometry.tripwire_radius);

        tracing::debug!(
            centre = %geometry.centre,
            radius = geometry.radius,
            rings = geometry.ring_count,
            cuts = geometry.cut_count,
            tripwire_pixels = tripwire.len(),
            "Built module partition"
        );

        Self {
            geometry,
            origin,
            side,
            lookup,
            tripwire,
        }
    }

    pub fn geometry(&self) -> &PartitionGeometry {
        &self.geometry
    }

    /// Number of ring sector modules.
    pub fn ring_module_count(&self) -> usize {
        self.geometry.ring_module_count()
    }

    /// Index of the bullseye module.
    pub fn bullseye_index(&self) -> usize {
        self.ring_module_count()
    }

    /// Index of the tripwire module.
    pub fn tripwire_index(&self) -> usize {
        self.ring_module_count() + 1
    }

    /// Total modules including bullseye and tripwire.
    pub fn module_count(&self) -> usize {
        self.geometry.module_count()
    }

    /// Raw lookup value for `pixel`: a module index or [`UNASSIGNED`].
    ///
    /// The tripwire never appears here; see [`Self::tripwire_pixels`].
    pub fn lookup(&self, pixel: Pixel) -> i32 {
        let (d_row, d_col) = pixel.delta_from(self.origin);
        if d_row < 0 || d_col < 0 || d_row >= self.side as i64 || d_col >= self.side as i64 {
            return UNASSIGNED;
        }
        self.lookup[d_row as usize * self.side + d_col as usize]
    }

    /// Module holding `pixel`, or `None` outside the disc.
    pub fn module_at(&self, pixel: Pixel) -> Option<usize> {
        match self.lookup(pixel) {
            UNASSIGNED => None,
            m => Some(m as usize),
        }
    }

    /// Pixels of the tripwire circle, deduplicated, in sampling order.
    pub fn tripwire_pixels(&self) -> &[Pixel] {
        &self.tripwire
    }

    /// Iterate over every assigned pixel and its module.
    pub fn assigned(&self) -> impl Iterator<Item = (Pixel, usize)> + '_ {
        let side = self.side;
        let origin = self.origin;
        self.lookup
            .iter()
            .enumerate()
            .filter(|&(_, &m)| m != UNASSIGNED)
            .map(move |(i, &m)| {
                let pixel = Pixel::new(
                    origin.row + (i / side) as i32,
                    origin.col + (i % side) as i32,
                );
                (pixel, m as usize)
            })
    }

    /// Pixel lists for every module, indexed by module number.
    ///
    /// Within a module pixels are ordered row-major, except the tripwire
    /// which keeps its sampling order.
    pub fn module_pixels(&self) -> Vec<Vec<Pixel>> {
        let mut modules = vec![Vec::new(); self.module_count()];
        for (pixel, module) in self.assigned() {
            modules[module].push(pixel);
        }
        modules[self.tripwire_index()] = self.tripwire.clone();
        modules
    }
}

/// Ring index of a pixel at squared distance `d2` from the centre.
///
/// A result of `ring_count` or more can only come from the disc boundary and
/// is clamped to the outermost ring.
pub fn ring_index(d2: i64, radius: u32, ring_count: u32) -> usize {
    if radius == 0 {
        return 0;
    }
    let ring = ((d2 as f64).sqrt() / radius as f64 * ring_count as f64).floor();
    clamp_index(ring, ring_count, "ring")
}

/// Angular sector of the offset (`d_row`, `d_col`).
pub fn angular_index(d_row: i64, d_col: i64, cut_count: u32) -> usize {
    sector_for_angle((d_row as f64).atan2(d_col as f64), cut_count)
}

/// Angular sector for an angle in radians, normalised to `[0, 2π)` first.
pub fn sector_for_angle(angle: f64, cut_count: u32) -> usize {
    let angle = if angle < 0.0 { angle + TAU } else { angle };
    let sector = (angle / TAU * cut_count as f64).floor();
    clamp_index(sector, cut_count, "sector")
}

fn clamp_index(value: f64, count: u32, _what: &'static str) -> usize {
    let max = count.saturating_sub(1) as f64;
    if value < 0.0 || value > max {
        #[cfg(debug_assertions)]
        tracing::trace!(value, count, kind = _what, "Clamped out-of-range partition index");
        return value.clamp(0.0, max) as usize;
    }
    value as usize
}

/// Sample the tripwire circle with a vertical then a horizontal sweep.
fn tripwire_pixels(centre: Pixel, radius: u32) -> Vec<Pixel> {
    let r = radius as i32;
    let mut pixels: Vec<Pixel> = Vec::new();
    let mut push = |p: Pixel| {
        if !pixels.contains(&p) {
            pixels.push(p);
        }
    };

    for step in -r..=r {
        let reach = ((r * r - step * step) as f64).sqrt() as i32;

        let row = centre.row + step;
        let col = centre.col + reach;
        push(Pixel::new(row, col));
        push(Pixel::new(row, 2 * centre.col - col));

        let col = centre.col + step;
        let row = centre.row + reach;
        push(Pixel::new(row, col));
        push(Pixel::new(2 * centre.row - row, col));
    }

    pixels
}
