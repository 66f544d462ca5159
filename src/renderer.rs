//! Terminal display encoders over the final RGBA8 readback buffer, a
//! display concern outside the core render loop, the same boundary the
//! original terminal tracer drew between its `PathTracer` and
//! `display_framebuffer` (§6.4 "Output").

use crossterm::style::{self, Stylize};
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputMode {
    /// Unicode braille patterns (2x4 dots per cell) with ANSI true-color.
    Braille,
    /// ANSI 24-bit true-color using full-block characters.
    TrueColor,
    /// Half-block rendering with separate fg/bg colors: 2 vertical pixels per cell.
    HalfBlock,
    /// ASCII grayscale density ramp.
    Ascii,
}

/// A read-only RGBA8 view over [`crate::session::Session::readback`]'s
/// output buffer, row-major, top row first.
pub struct Rgba8Image<'a> {
    pub width: u32,
    pub height: u32,
    pub pixels: &'a [u8],
}

impl<'a> Rgba8Image<'a> {
    pub fn new(width: u32, height: u32, pixels: &'a [u8]) -> Self {
        assert_eq!(pixels.len(), (width * height * 4) as usize);
        Self {
            width,
            height,
            pixels,
        }
    }

    #[inline]
    fn get(&self, x: u32, y: u32) -> (u8, u8, u8) {
        let idx = ((y * self.width + x) * 4) as usize;
        (self.pixels[idx], self.pixels[idx + 1], self.pixels[idx + 2])
    }
}

pub fn display(image: &Rgba8Image, mode: OutputMode) {
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());

    match mode {
        OutputMode::TrueColor => display_truecolor(&mut out, image),
        OutputMode::HalfBlock => display_halfblock(&mut out, image),
        OutputMode::Ascii => display_ascii(&mut out, image),
        OutputMode::Braille => display_braille(&mut out, image),
    }
    let _ = out.flush();
}

fn display_truecolor(out: &mut impl Write, image: &Rgba8Image) {
    for y in 0..image.height {
        for x in 0..image.width {
            let (r, g, b) = image.get(x, y);
            let _ = write!(out, "{}", "█".with(style::Color::Rgb { r, g, b }));
        }
        let _ = writeln!(out);
    }
}

fn display_halfblock(out: &mut impl Write, image: &Rgba8Image) {
    let rows = image.height / 2;
    for row in 0..rows {
        for x in 0..image.width {
            let (tr, tg, tb) = image.get(x, row * 2);
            let (br, bg, bb) = image.get(x, row * 2 + 1);
            let _ = write!(
                out,
                "{}",
                "▀"
                    .with(style::Color::Rgb {
                        r: tr,
                        g: tg,
                        b: tb
                    })
                    .on(style::Color::Rgb {
                        r: br,
                        g: bg,
                        b: bb
                    })
            );
        }
        let _ = writeln!(out);
    }
}

fn luminance(r: u8, g: u8, b: u8) -> f32 {
    0.2126 * (r as f32 / 255.0) + 0.7152 * (g as f32 / 255.0) + 0.0722 * (b as f32 / 255.0)
}

fn display_ascii(out: &mut impl Write, image: &Rgba8Image) {
    const RAMP: &[u8] = b" .:-=+*#%@";
    for y in 0..image.height {
        for x in 0..image.width {
            let (r, g, b) = image.get(x, y);
            let lum = luminance(r, g, b);
            let idx = ((lum.clamp(0.0, 0.999)) * RAMP.len() as f32) as usize;
            let _ = write!(out, "{}", RAMP[idx] as char);
        }
        let _ = writeln!(out);
    }
}

/// Braille pattern rendering: each Unicode braille char (U+2800..U+28FF) encodes
/// a 2x4 dot matrix, achieving 2x horizontal and 4x vertical subpixel resolution.
fn display_braille(out: &mut impl Write, image: &Rgba8Image) {
    let cell_w = 2u32;
    let cell_h = 4u32;
    let cols = image.width / cell_w;
    let rows = image.height / cell_h;

    const OFFSETS: [(u32, u32, u8); 8] = [
        (0, 0, 0),
        (0, 1, 1),
        (0, 2, 2),
        (1, 0, 3),
        (1, 1, 4),
        (1, 2, 5),
        (0, 3, 6),
        (1, 3, 7),
    ];

    for row in 0..rows {
        for col in 0..cols {
            let bx = col * cell_w;
            let by = row * cell_h;

            let mut pattern: u8 = 0;
            let mut avg = (0u32, 0u32, 0u32);
            let mut lit_count = 0u32;

            for &(dx, dy, bit) in &OFFSETS {
                let px = bx + dx;
                let py = by + dy;
                if px < image.width && py < image.height {
                    let (r, g, b) = image.get(px, py);
                    if luminance(r, g, b) > 0.15 {
                        pattern |= 1 << bit;
                        avg = (avg.0 + r as u32, avg.1 + g as u32, avg.2 + b as u32);
                        lit_count += 1;
                    }
                }
            }

            let (r, g, b) = if lit_count > 0 {
                (
                    (avg.0 / lit_count) as u8,
                    (avg.1 / lit_count) as u8,
                    (avg.2 / lit_count) as u8,
                )
            } else {
                (0, 0, 0)
            };

            let braille_char = char::from_u32(0x2800 + pattern as u32).unwrap_or(' ');
            let _ = write!(
                out,
                "{}",
                braille_char.to_string().with(style::Color::Rgb { r, g, b })
            );
        }
        let _ = writeln!(out);
    }
}
