//! Row-major accumulator of linear-RGB sums (§3 "Pixel buffer").
//!
//! Each channel is stored as an `AtomicU32` holding the bit pattern of an
//! `f32`. Workers write to disjoint pixels (tile ownership is exclusive, see
//! [`super::tile::TileQueue`]) so a `Relaxed` store/load is sufficient; no
//! two threads ever race on the same index, and the host is explicitly
//! allowed to observe a pixel mid-write as either its old or new value
//! (§3 "benign races ... are acceptable"). Grounded on the
//! `Vec<AtomicU32>` framebuffer used for exactly this reason in
//! `other_examples/888a1be0_ArthurMelin-crusty__src-raytracer-mod.rs.rs`.

use crate::error::RenderError;
use crate::math::Color;
use std::sync::atomic::{AtomicU32, Ordering};

pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    r: Vec<AtomicU32>,
    g: Vec<AtomicU32>,
    b: Vec<AtomicU32>,
}

impl PixelBuffer {
    /// Allocates the three per-channel accumulators, reporting allocation
    /// failure as [`RenderError::OutOfMemory`] instead of aborting the
    /// process (§7 "Resource exhaustion").
    pub fn try_new(width: u32, height: u32) -> Result<Self, RenderError> {
        let len = (width as usize) * (height as usize);
        Ok(Self {
            width,
            height,
            r: try_filled(len)?,
            g: try_filled(len)?,
            b: try_filled(len)?,
        })
    }

    #[cfg(test)]
    pub fn new(width: u32, height: u32) -> Self {
        Self::try_new(width, height).expect("test allocation should never fail")
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + x as usize
    }

    pub fn write(&self, x: u32, y: u32, color: Color) {
        let idx = self.index(x, y);
        self.r[idx].store(color.x.to_bits(), Ordering::Relaxed);
        self.g[idx].store(color.y.to_bits(), Ordering::Relaxed);
        self.b[idx].store(color.z.to_bits(), Ordering::Relaxed);
    }

    pub fn read(&self, x: u32, y: u32) -> Color {
        let idx = self.index(x, y);
        Color::new(
            f32::from_bits(self.r[idx].load(Ordering::Relaxed)),
            f32::from_bits(self.g[idx].load(Ordering::Relaxed)),
            f32::from_bits(self.b[idx].load(Ordering::Relaxed)),
        )
    }

    /// Gamma-encodes the accumulator into a caller-provided RGBA8 buffer,
    /// top row first (§4.6, §6.1). NaN accumulations are clamped to 0 rather
    /// than propagated (§4.4 "Failure").
    pub fn readback_rgba8(&self, out: &mut [u8]) {
        debug_assert_eq!(out.len(), self.width as usize * self.height as usize * 4);
        for y in 0..self.height {
            for x in 0..self.width {
                let mut c = self.read(x, y);
                if c.x.is_nan() {
                    c.x = 0.0;
                }
                if c.y.is_nan() {
                    c.y = 0.0;
                }
                if c.z.is_nan() {
                    c.z = 0.0;
                }
                let rgba = c.linear_to_gamma().to_rgba8();
                let idx = ((y * self.width + x) * 4) as usize;
                out[idx..idx + 4].copy_from_slice(&rgba);
            }
        }
    }
}

fn try_filled(len: usize) -> Result<Vec<AtomicU32>, RenderError> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|e| RenderError::OutOfMemory(e.to_string()))?;
    v.extend((0..len).map(|_| AtomicU32::new(0)));
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_round_trips() {
        let buf = PixelBuffer::new(4, 4);
        buf.write(1, 2, Color::new(0.25, 0.5, 0.75));
        let c = buf.read(1, 2);
        assert_eq!(c, Color::new(0.25, 0.5, 0.75));
    }

    #[test]
    fn readback_clamps_nan_to_zero() {
        let buf = PixelBuffer::new(1, 1);
        buf.write(0, 0, Color::new(f32::NAN, 0.5, 0.5));
        let mut out = vec![0u8; 4];
        buf.readback_rgba8(&mut out);
        assert_eq!(out[0], 0);
    }

    #[test]
    fn readback_is_idempotent() {
        let buf = PixelBuffer::new(2, 2);
        buf.write(0, 0, Color::new(0.5, 0.5, 0.5));
        let mut a = vec![0u8; 16];
        let mut b = vec![0u8; 16];
        buf.readback_rgba8(&mut a);
        buf.readback_rgba8(&mut b);
        assert_eq!(a, b);
    }
}
