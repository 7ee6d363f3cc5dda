// src/printer/sinks.rs

//! The four [`LineSink`]s: [`LinePrinter`], [`UniqueCounter`], [`Inspector`],
//! and [`LineChart`].

use crate::common::Count;
use crate::data::logline::LogLine;
use crate::printer::chart::{ChartRenderer, ChartSettings};
use crate::printer::counter::{LogLineCounter, UniqueLineCount};
use crate::printer::sampler::TimelineSampler;
use crate::printer::LineSink;

use std::io::{Result, Write};
use std::time::Duration;

use ::crossterm::cursor::MoveUp;
use ::crossterm::queue;
use ::crossterm::terminal::{Clear, ClearType};
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};
#[doc(hidden)]
pub use ::termcolor::{Color, ColorChoice, ColorSpec, WriteColor};
use ::unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Writer for plain sinks.
pub type SinkWriter = Box<dyn Write + Send>;

/// Writer for sinks that may color output.
pub type SinkWriterColor = Box<dyn WriteColor + Send>;

/// Period of live re-rendering.
pub const UPDATE_INTERVAL: Duration = Duration::from_secs(1);

/// Move the cursor up `lines` and clear everything below it.
pub(crate) fn rewind<W: Write>(writer: &mut W, lines: usize) -> Result<()> {
    if lines > 0 {
        queue!(writer, MoveUp(std::cmp::min(lines, u16::MAX as usize) as u16))?;
    }
    queue!(writer, Clear(ClearType::FromCursorDown))?;

    Ok(())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LinePrinter
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Colors cycled through by column.
pub const COLORS_COLUMN: [Color; 6] = [
    Color::Red,
    Color::Green,
    Color::Yellow,
    Color::Blue,
    Color::Magenta,
    Color::Cyan,
];

/// Color for 1-based column `index`.
pub const fn column_color(index: usize) -> Color {
    COLORS_COLUMN[index % COLORS_COLUMN.len()]
}

/// Writes each line's columns joined by one space. Columns are colored if
/// the writer supports color.
pub struct LinePrinter {
    writer: SinkWriterColor,
}

impl LinePrinter {
    pub fn new(writer: SinkWriterColor) -> LinePrinter {
        LinePrinter { writer }
    }
}

impl LineSink for LinePrinter {
    fn name(&self) -> &'static str {
        "show"
    }

    fn consume(&mut self, logline: LogLine) -> Result<bool> {
        let color: bool = self.writer.supports_color();
        for (i, column) in logline.columns().iter().enumerate() {
            if i != 0 {
                self.writer.write_all(b" ")?;
            }
            if color {
                self.writer.set_color(ColorSpec::new().set_fg(Some(column_color(i + 1))))?;
                self.writer.write_all(column.as_bytes())?;
                self.writer.reset()?;
            } else {
                self.writer.write_all(column.as_bytes())?;
            }
        }
        self.writer.write_all(b"\n")?;

        Ok(true)
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// UniqueCounter
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

const BAR_ELEMENTS: [char; 9] = [' ', '▏', '▎', '▍', '▌', '▋', '▊', '▉', '█'];

/// Width of the bar in [`UniqueCounter`] rows.
pub const BAR_WIDTH: usize = 16;

/// Bar of `width` cells filled to `fraction` (0.0 to 1.0) in eighths.
pub fn percentage_bar(width: usize, fraction: f64) -> String {
    let n: usize = BAR_ELEMENTS.len();
    let state: usize = (fraction.clamp(0.0, 1.0) * (width * n) as f64) as usize;
    let mut bar = String::with_capacity(width * 3);
    for c in 0..width {
        let ch: char = if (c + 1) * n < state {
            BAR_ELEMENTS[n - 1]
        } else if c * n >= state {
            BAR_ELEMENTS[0]
        } else {
            BAR_ELEMENTS[state - c * n - 1]
        };
        bar.push(ch);
    }

    bar
}

/// Cut `line` to at most `width` terminal columns, ending it with `…` if
/// cut.
pub fn truncate_to_width(line: &str, width: usize) -> String {
    if line.width() <= width {
        return line.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut truncated = String::with_capacity(width * 2);
    let mut used: usize = 0;
    for c in line.chars() {
        let w: usize = c.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        truncated.push(c);
        used += w;
    }
    truncated.push('…');

    truncated
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct UniqueSettings {
    /// print only the most frequent `top` lines, truncated to
    /// `terminal_width`; `0` prints all
    pub top: usize,
    pub terminal_width: usize,
    /// re-render the table while lines arrive
    pub live: bool,
}

/// Counts unique column contents and prints them by descending count as
/// `count▕bar columns`.
pub struct UniqueCounter {
    writer: SinkWriter,
    settings: UniqueSettings,
    counter: LogLineCounter,
    /// rows on screen from the last live render
    printed: usize,
}

impl UniqueCounter {
    pub fn new(writer: SinkWriter, settings: UniqueSettings) -> UniqueCounter {
        UniqueCounter {
            writer,
            settings,
            counter: LogLineCounter::new(),
            printed: 0,
        }
    }

    pub const fn counter(&self) -> &LogLineCounter {
        &self.counter
    }

    fn format_row(&self, line: &UniqueLineCount, max: Count) -> String {
        let prefix: String = format!(
            "{:>9}▕{} ",
            line.count,
            percentage_bar(BAR_WIDTH, line.count as f64 / max as f64)
        );
        let columns: String = line.columns.join(" ");
        if self.settings.top == 0 {
            return format!("{}{}", prefix, columns);
        }
        let limit: usize = self
            .settings
            .terminal_width
            .saturating_sub(prefix.width() + 1);

        format!("{}{}", prefix, truncate_to_width(&columns, limit))
    }

    /// Write the table, returning the count of rows written.
    fn print_table(&mut self) -> Result<usize> {
        let max: Count = std::cmp::max(self.counter.max(), 1);
        let rows: Vec<String> = self
            .counter
            .unique_lines()
            .into_iter()
            .take(match self.settings.top {
                0 => usize::MAX,
                top => top,
            })
            .map(|line| self.format_row(line, max))
            .collect();
        for row in rows.iter() {
            self.writer.write_all(row.as_bytes())?;
            self.writer.write_all(b"\n")?;
        }

        Ok(rows.len())
    }
}

impl LineSink for UniqueCounter {
    fn name(&self) -> &'static str {
        "uniq"
    }

    fn consume(&mut self, logline: LogLine) -> Result<bool> {
        self.counter.add(logline);

        Ok(true)
    }

    fn update_interval(&self) -> Option<Duration> {
        match self.settings.live && self.settings.top > 0 {
            true => Some(UPDATE_INTERVAL),
            false => None,
        }
    }

    fn update(&mut self) -> Result<()> {
        if self.printed > 0 {
            rewind(&mut self.writer, self.printed)?;
        }
        self.printed = self.print_table()?;
        self.writer.flush()
    }

    fn finish(&mut self) -> Result<()> {
        if self.printed > 0 {
            rewind(&mut self.writer, self.printed)?;
            self.printed = 0;
        }
        self.print_table()?;
        self.writer.flush()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Inspector
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Default count of lines an [`Inspector`] prints.
pub const INSPECT_COUNT_DEF: usize = 5;

/// Separator between inspected lines.
pub const INSPECT_RULE: &str = "----------------";

/// Prints the raw line and numbered columns of the first `count` lines, then
/// stops consuming.
pub struct Inspector {
    writer: SinkWriter,
    count: usize,
    printed: usize,
}

impl Inspector {
    pub fn new(writer: SinkWriter, count: usize) -> Inspector {
        Inspector {
            writer,
            count,
            printed: 0,
        }
    }
}

impl LineSink for Inspector {
    fn name(&self) -> &'static str {
        "inspect"
    }

    fn wants_more(&self) -> bool {
        self.printed < self.count
    }

    fn consume(&mut self, logline: LogLine) -> Result<bool> {
        if !self.wants_more() {
            return Ok(false);
        }
        if self.printed > 0 {
            writeln!(self.writer, "{}", INSPECT_RULE)?;
        }
        writeln!(self.writer, "Line: {}", logline.line())?;
        for (i, column) in logline.columns().iter().enumerate() {
            writeln!(self.writer, "{:>4}: {}", i + 1, column)?;
        }
        self.printed += 1;

        Ok(self.wants_more())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LineChart
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Counts lines into a [`TimelineSampler`] and renders it as a chart.
pub struct LineChart {
    writer: SinkWriter,
    settings: ChartSettings,
    sampler: TimelineSampler,
    live: bool,
    /// rows on screen from the last live render
    printed: usize,
}

impl LineChart {
    pub fn new(writer: SinkWriter, settings: ChartSettings, live: bool) -> LineChart {
        let sampler = TimelineSampler::new(settings.interval, settings.sampler_size());
        LineChart {
            writer,
            settings,
            sampler,
            live,
            printed: 0,
        }
    }

    pub const fn sampler(&self) -> &TimelineSampler {
        &self.sampler
    }

    /// Write the chart, returning the count of rows written.
    fn print_chart(&mut self) -> Result<usize> {
        let rendered: String = ChartRenderer::new(&self.settings, self.sampler.samples()).render();
        self.writer.write_all(rendered.as_bytes())?;
        self.writer.write_all(b"\n")?;

        Ok(rendered.lines().count())
    }
}

impl LineSink for LineChart {
    fn name(&self) -> &'static str {
        "plot"
    }

    fn consume(&mut self, logline: LogLine) -> Result<bool> {
        if let Some(dt) = logline.dt() {
            self.sampler.inc(dt, 1);
        }

        Ok(true)
    }

    fn update_interval(&self) -> Option<Duration> {
        match self.live {
            true => Some(UPDATE_INTERVAL),
            false => None,
        }
    }

    fn update(&mut self) -> Result<()> {
        if self.printed > 0 {
            rewind(&mut self.writer, self.printed)?;
        }
        self.printed = self.print_chart()?;
        self.writer.flush()
    }

    fn finish(&mut self) -> Result<()> {
        if self.printed > 0 {
            rewind(&mut self.writer, self.printed)?;
            self.printed = 0;
        }
        self.print_chart()?;
        self.writer.flush()
    }
}
