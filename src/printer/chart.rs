// src/printer/chart.rs

//! Implements [`ChartRenderer`], drawing a line chart of samples with text
//! glyphs.
//!
//! The samples are drawn as a polyline onto a bitmap. Each glyph covers a
//! small cell of the bitmap (1x1 up to 2x4 pixels, depending on the
//! [`ChartMode`]) and is chosen by which pixels of its cell are set.

use crate::common::Count;
use crate::data::datetime::TimeInterval;

use std::fmt;
use std::str::FromStr;

/// The glyph set for drawing a chart.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ChartMode {
    /// ASCII, 1x2 pixels per glyph
    #[default]
    Classic,
    /// full block, 1x1 pixels per glyph
    Block,
    /// quadrant blocks, 2x2 pixels per glyph
    Quad,
    /// braille, 2x4 pixels per glyph
    Braille,
}

pub const CHART_MODE_NAMES: [&str; 4] = ["classic", "block", "quad", "braille"];

const CLASSIC_GLYPHS: [char; 4] = [' ', '\'', '.', '|'];
const BLOCK_GLYPHS: [char; 2] = [' ', '█'];
const QUAD_GLYPHS: [char; 16] = [
    ' ', '▘', '▝', '▀', '▖', '▌', '▞', '▛', '▗', '▚', '▐', '▜', '▄', '▙', '▟', '█',
];
/// first of the 256 braille patterns; dot `n` is bit `n`
const BRAILLE_BASE: u32 = 0x2800;

/// Bit number of each pixel of a glyph cell, by row then column.
const CLASSIC_BITS: &[&[u8]] = &[&[0], &[1]];
const BLOCK_BITS: &[&[u8]] = &[&[0]];
const QUAD_BITS: &[&[u8]] = &[&[0, 1], &[2, 3]];
const BRAILLE_BITS: &[&[u8]] = &[&[0, 3], &[1, 4], &[2, 5], &[6, 7]];

impl ChartMode {
    pub const fn bits(&self) -> &'static [&'static [u8]] {
        match self {
            ChartMode::Classic => CLASSIC_BITS,
            ChartMode::Block => BLOCK_BITS,
            ChartMode::Quad => QUAD_BITS,
            ChartMode::Braille => BRAILLE_BITS,
        }
    }

    /// Pixels per glyph, horizontally.
    pub fn horizontal_multiplier(&self) -> usize {
        self.bits()[0].len()
    }

    /// Pixels per glyph, vertically.
    pub fn vertical_multiplier(&self) -> usize {
        self.bits().len()
    }

    /// Glyph for the set pixel `bits` of a cell.
    pub fn glyph(&self, bits: u8) -> char {
        let index = bits as usize;
        match self {
            ChartMode::Classic => CLASSIC_GLYPHS[index % CLASSIC_GLYPHS.len()],
            ChartMode::Block => BLOCK_GLYPHS[index % BLOCK_GLYPHS.len()],
            ChartMode::Quad => QUAD_GLYPHS[index % QUAD_GLYPHS.len()],
            ChartMode::Braille => char::from_u32(BRAILLE_BASE + bits as u32).unwrap_or(' '),
        }
    }

    /// Left border, bottom-left corner, bottom border.
    pub const fn border(&self) -> [char; 3] {
        match self {
            ChartMode::Classic => ['|', '+', '-'],
            _ => ['┃', '┗', '━'],
        }
    }
}

impl FromStr for ChartMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "classic" => Ok(ChartMode::Classic),
            "block" => Ok(ChartMode::Block),
            "quad" => Ok(ChartMode::Quad),
            "braille" | "brailles" => Ok(ChartMode::Braille),
            _ => Err(format!("unknown chart mode {:?}, expected one of {}", s, CHART_MODE_NAMES.join(", "))),
        }
    }
}

impl fmt::Display for ChartMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            ChartMode::Classic => CHART_MODE_NAMES[0],
            ChartMode::Block => CHART_MODE_NAMES[1],
            ChartMode::Quad => CHART_MODE_NAMES[2],
            ChartMode::Braille => CHART_MODE_NAMES[3],
        })
    }
}

/// Width of the Y-axis labels column, including the trailing space.
const Y_LABEL_WIDTH: usize = 5;

/// Layout of a chart. `width` and `height` are in glyphs and include the
/// border and labels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChartSettings {
    pub mode: ChartMode,
    pub width: usize,
    pub height: usize,
    pub border: bool,
    pub x_axis_labels: bool,
    pub y_axis_labels: bool,
    pub interval: TimeInterval,
}

impl ChartSettings {
    /// Width of the plot area in glyphs.
    pub fn effective_width(&self) -> usize {
        let mut width = self.width;
        if self.border {
            width = width.saturating_sub(1);
        }
        if self.y_axis_labels {
            width = width.saturating_sub(Y_LABEL_WIDTH);
        }

        std::cmp::max(width, 1)
    }

    /// Height of the plot area in glyphs.
    pub fn effective_height(&self) -> usize {
        let mut height = self.height;
        if self.border {
            height = height.saturating_sub(1);
        }
        if self.x_axis_labels {
            height = height.saturating_sub(1);
        }

        std::cmp::max(height, 1)
    }

    /// Number of samples one chart shows.
    pub fn sampler_size(&self) -> usize {
        self.effective_width() * self.mode.horizontal_multiplier()
    }
}

/// `1234` to `1k`, `5600000` to `5M`.
pub fn human_readable_int(value: Count) -> String {
    const SUFFIXES: [&str; 7] = ["", "k", "M", "G", "T", "P", "E"];
    let mut value = value;
    let mut magnitude: usize = 0;
    while value > 1000 && magnitude < SUFFIXES.len() - 1 {
        value /= 1000;
        magnitude += 1;
    }

    format!("{}{}", value, SUFFIXES[magnitude])
}

/// Renders one data line with [`ChartSettings`].
#[derive(Debug)]
pub struct ChartRenderer<'a> {
    settings: &'a ChartSettings,
    data: &'a [Count],
}

impl<'a> ChartRenderer<'a> {
    pub fn new(settings: &'a ChartSettings, data: &'a [Count]) -> ChartRenderer<'a> {
        ChartRenderer { settings, data }
    }

    #[inline(always)]
    fn sample(&self, x: usize) -> Count {
        self.data.get(x).copied().unwrap_or(0)
    }

    /// Pixel bitmap `[y][x]`, `y` 0 at the top.
    fn bitmap(&self, width: usize, height: usize) -> Vec<Vec<bool>> {
        let mut bitmap = vec![vec![false; width]; height];
        let max: u128 = std::cmp::max(self.data.iter().copied().max().unwrap_or(0), 1) as u128;
        let h: u128 = height as u128;
        // pixel row of value `v`
        let row = |v: u128| -> u128 { h - (v * h / max).min(h) };
        for x in 0..width {
            let here: u128 = self.sample(x) as u128;
            // left half-segment, from the midpoint with the previous sample
            if x > 0 {
                let prev: u128 = self.sample(x - 1) as u128;
                let (mut y1, mut y2) = (row((prev + here) / 2), row(here));
                if y2 < y1 {
                    std::mem::swap(&mut y1, &mut y2);
                }
                for (y, bitrow) in bitmap.iter_mut().enumerate() {
                    let y = y as u128;
                    if (y > y1 && y < y2) || y == y1 {
                        bitrow[x] = true;
                    }
                }
            }
            // right half-segment, to the midpoint with the next sample
            if x + 1 < width {
                let next: u128 = self.sample(x + 1) as u128;
                let (mut y1, mut y2) = (row(here), row((here + next) / 2));
                if y2 < y1 {
                    std::mem::swap(&mut y1, &mut y2);
                }
                for (y, bitrow) in bitmap.iter_mut().enumerate() {
                    let y = y as u128;
                    if (y >= y1 && y < y2) || y == y1 {
                        bitrow[x] = true;
                    }
                }
            }
        }

        bitmap
    }

    /// The chart as lines of text, without trailing newline.
    pub fn render(&self) -> String {
        let settings = self.settings;
        let mode = settings.mode;
        let area_width: usize = settings.effective_width();
        let area_height: usize = settings.effective_height();
        let w_mult: usize = mode.horizontal_multiplier();
        let h_mult: usize = mode.vertical_multiplier();
        let mul_width: usize = area_width * w_mult;
        let mul_height: usize = area_height * h_mult;
        let bitmap = self.bitmap(mul_width, mul_height);
        let max: Count = std::cmp::max(self.data.iter().copied().max().unwrap_or(0), 1);
        let border = mode.border();
        let blank_label: String = " ".repeat(Y_LABEL_WIDTH);

        let mut lines: Vec<String> = Vec::with_capacity(area_height + 2);
        for y in (0..mul_height).step_by(h_mult) {
            let mut line = String::with_capacity(settings.width * 3);
            if settings.y_axis_labels {
                if (area_height - y / h_mult - 1) % 5 == 0 {
                    let value: Count =
                        max - ((y + h_mult) as u128 * max as u128 / mul_height as u128) as Count;
                    line.push_str(&format!("{:>4} ", human_readable_int(value)));
                } else {
                    line.push_str(&blank_label);
                }
            }
            if settings.border {
                line.push(border[0]);
            }
            for x in (0..mul_width).step_by(w_mult) {
                let mut bits: u8 = 0;
                for (by, brow) in mode.bits().iter().enumerate() {
                    for (bx, bit) in brow.iter().enumerate() {
                        if bitmap[y + by][x + bx] {
                            bits |= 1 << bit;
                        }
                    }
                }
                line.push(mode.glyph(bits));
            }
            lines.push(line);
        }

        if settings.border {
            let mut line = String::new();
            if settings.y_axis_labels {
                line.push_str(&blank_label);
            }
            line.push(border[1]);
            for _ in 0..area_width {
                line.push(border[2]);
            }
            lines.push(line);
        }

        if settings.x_axis_labels {
            let mut line = String::new();
            if settings.y_axis_labels {
                line.push_str(&blank_label);
                line.push(' ');
            }
            let format: &str = match area_width < 40 {
                true => "%H:%M:%S",
                false => "%Y-%m-%d %H:%M:%S",
            };
            let start: String = settings.interval.start().format(format).to_string();
            let end: String = settings.interval.end().format(format).to_string();
            line.push_str(&start);
            let pad: usize = area_width.saturating_sub(start.len() + end.len());
            line.push_str(&" ".repeat(pad));
            line.push_str(&end);
            lines.push(line);
        }

        lines.join("\n")
    }
}
