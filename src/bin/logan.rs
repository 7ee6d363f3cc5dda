// src/bin/logan.rs

//! Driver program _logan_ drives the [_loganlib_].
//!
//! Processes user-passed command-line arguments, resolves the log category
//! to a chain of files, builds a [`Pipeline`] ending in the sink for the
//! subcommand, and runs it.
//!
//! * `list` prints the known `source/category` names.
//! * `show` prints matching lines.
//! * `uniq` prints unique lines by frequency.
//! * `inspect` prints the columns of the first few lines.
//! * `plot` charts the count of lines over time.
//!
//! Any error before the pipeline runs is fatal: it is printed and the
//! process exits with status 1.
//!
//! [_loganlib_]: loganlib
//! [`Pipeline`]: loganlib::pipeline::Pipeline

#![allow(non_camel_case_types)]

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use ::anyhow::{Context, Result};
use ::clap::{Args, Parser, Subcommand, ValueEnum};
use ::const_format::concatcp;
use ::crossterm::terminal;
use ::loganlib::config::Configuration;
use ::loganlib::data::datetime::{
    parse_tz_offset,
    DateRecognizer,
    DateTimeL,
    FixedOffset,
    Local,
    TimeInterval,
};
use ::loganlib::data::fields::{parse_field_intervals, FieldIntervals};
use ::loganlib::data::timespec::parse_time_interval;
use ::loganlib::debug::printers::e_err;
use ::loganlib::pipeline::{PipelineBuilder, PipelineSummary};
use ::loganlib::printer::chart::{ChartMode, ChartSettings};
use ::loganlib::printer::sinks::{
    Inspector,
    LineChart,
    LinePrinter,
    UniqueCounter,
    UniqueSettings,
    INSPECT_COUNT_DEF,
};
use ::loganlib::printer::OutputPipeline;
use ::loganlib::source::{list_categories, log_sources, resolve_category, LogChain, LogSources};
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};
use ::termcolor::{BufferedStandardStream, ColorChoice};

/// general error exit value
const EXIT_ERR: i32 = 1;

/// Terminal size when it cannot be found, columns and rows.
const TERMINAL_SIZE_DEF: (usize, usize) = (80, 25);

const CLI_HELP_AFTER: &str = concatcp!(
    "Log categories are named source/category, e.g. generic/syslog, or by a bare\n",
    "category if only one source has it. Category \"-\" reads standard input.\n",
    "\n",
    "Time windows (-t) are relative to now unless a reference time is given:\n",
    "  -1h            the last hour\n",
    "  -1h+5m8s       5 minutes 8 seconds starting an hour ago\n",
    "  12:30+5m       12:30 to 12:35 (of yesterday if 12:30 is yet to come)\n",
    "  12:30-48h+15m  12:30 two days ago to 12:45\n",
    "Units are d, h, m, s, ms.\n",
    "\n",
    "Filters compare columns ($1, $2, …) with strings or other columns:\n",
    "  '$3 == \"ERROR\"'   '$1 != $2'   '$5 ~= \"^/api/\"'\n",
    "and combine with and/AND/&& and or/OR/||; AND binds tighter than OR.\n",
    "\n",
    "Fields (-f) select and renumber columns, e.g. 1-3,5 or 4-.",
);

/// CLI enum that maps to [`termcolor::ColorChoice`].
///
/// [`termcolor::ColorChoice`]: https://docs.rs/termcolor/1.4.1/termcolor/enum.ColorChoice.html
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum CLI_Color_Choice {
    always,
    auto,
    never,
}

/// CLI enum that maps to [`ChartMode`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum CLI_Chart_Mode {
    classic,
    block,
    quad,
    braille,
}

impl CLI_Chart_Mode {
    const fn chart_mode(self) -> ChartMode {
        match self {
            CLI_Chart_Mode::classic => ChartMode::Classic,
            CLI_Chart_Mode::block => ChartMode::Block,
            CLI_Chart_Mode::quad => ChartMode::Quad,
            CLI_Chart_Mode::braille => ChartMode::Braille,
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    about = env!("CARGO_PKG_DESCRIPTION"),
    author = env!("CARGO_PKG_AUTHORS"),
    name = "logan",
    version = concatcp!(
        "Version: ",
        env!("CARGO_PKG_VERSION_MAJOR"), ".",
        env!("CARGO_PKG_VERSION_MINOR"), ".",
        env!("CARGO_PKG_VERSION_PATCH"), "\n",
        "MSRV: ", env!("CARGO_PKG_RUST_VERSION"), "\n",
        "License: ", env!("CARGO_PKG_LICENSE"), "\n",
    ),
    after_help = CLI_HELP_AFTER,
    verbatim_doc_comment,
)]
struct CLI_Args {
    #[clap(subcommand)]
    command: CLI_Command,
}

#[derive(Subcommand, Debug)]
enum CLI_Command {
    /// Print the available log categories.
    List {
        /// Print only categories containing this text.
        filter: Option<String>,

        /// Configuration file, read after /etc/logan.toml and ~/.logan.toml.
        #[clap(long)]
        config: Option<PathBuf>,
    },
    /// Print matching lines.
    Show {
        #[clap(flatten)]
        query: CLI_Query,

        /// Choose to print columns using colors.
        #[clap(long = "color", value_enum, default_value_t = CLI_Color_Choice::auto)]
        color_choice: CLI_Color_Choice,
    },
    /// Print unique lines ordered by how often they occur.
    Uniq {
        #[clap(flatten)]
        query: CLI_Query,

        /// Print only the TOP most frequent lines, cut to the terminal width.
        /// Updated live on a terminal.
        #[clap(long, default_value_t = 0, verbatim_doc_comment)]
        top: usize,
    },
    /// Print the columns of the first few lines.
    Inspect {
        #[clap(flatten)]
        query: CLI_Query,

        /// Count of lines to inspect.
        #[clap(short = 'n', long, default_value_t = INSPECT_COUNT_DEF)]
        count: usize,
    },
    /// Chart the count of lines over time.
    Plot {
        #[clap(flatten)]
        query: CLI_Query,

        /// Chart character set.
        #[clap(short = 'm', long, value_enum, default_value_t = CLI_Chart_Mode::classic)]
        mode: CLI_Chart_Mode,

        /// Draw the chart only at the end instead of updating it live.
        #[clap(long)]
        no_update: bool,
    },
}

/// Arguments shared by the subcommands that run a query.
#[derive(Args, Debug)]
struct CLI_Query {
    /// Log category, as source/category or category.
    category: String,

    /// Column filter expressions; a line must match all of them.
    filters: Vec<String>,

    /// Time window.
    #[clap(short = 't', long, default_value = "-1h", allow_hyphen_values = true)]
    time: String,

    /// Columns to keep, e.g. "1-3,5".
    #[clap(short = 'f', long, default_value = "")]
    fields: String,

    /// Timezone offset of datetimes without one, e.g. "+01", "-0800",
    /// "+05:30", or "PST". To pass a value with leading "-" use "="
    /// notation, e.g. "-z=-0800". Defaults to the local offset.
    #[clap(
        short = 'z',
        long,
        value_parser = cli_process_tz_offset,
        verbatim_doc_comment,
    )]
    tz_offset: Option<FixedOffset>,

    /// Configuration file, read after /etc/logan.toml and ~/.logan.toml.
    #[clap(long)]
    config: Option<PathBuf>,

    /// Print a summary of the counts of bytes and lines to stderr at the
    /// end.
    #[clap(long)]
    summary: bool,
}

/// `clap` argument parser for `--tz-offset`.
fn cli_process_tz_offset(tzo: &str) -> std::result::Result<FixedOffset, String> {
    match parse_tz_offset(tzo) {
        Some(offset) => Ok(offset),
        None => Err(format!("Unable to parse a timezone offset for --tz-offset {:?}", tzo)),
    }
}

/// Terminal columns and rows, or [`TERMINAL_SIZE_DEF`].
fn terminal_size() -> (usize, usize) {
    match terminal::size() {
        Ok((cols, rows)) if cols > 0 && rows > 0 => (cols as usize, rows as usize),
        _ => TERMINAL_SIZE_DEF,
    }
}

/// Everything a query needs before choosing its sink.
struct Query {
    interval: TimeInterval,
    builder: PipelineBuilder,
    chain: Box<dyn LogChain>,
    summary: bool,
}

fn prepare_query(query: &CLI_Query) -> Result<Query> {
    defn!("{:?}", query);
    let now_local = Local::now();
    let tz_offset: FixedOffset = query.tz_offset.unwrap_or(*now_local.offset());
    let now: DateTimeL = now_local.with_timezone(&tz_offset);
    let recognizer = DateRecognizer::new(tz_offset, now);
    let interval: TimeInterval =
        parse_time_interval(&query.time, &now).with_context(|| format!("time window {:?}", query.time))?;
    defo!("interval {}", interval);
    let fields: FieldIntervals =
        parse_field_intervals(&query.fields).with_context(|| format!("fields {:?}", query.fields))?;
    let config = Configuration::load(query.config.as_deref()).context("loading configuration")?;
    let sources: LogSources = log_sources(&config);
    let chain: Box<dyn LogChain> = resolve_category(&sources, &query.category)?;
    let builder = PipelineBuilder::new(interval, recognizer)
        .filters(&query.filters)
        .fields(fields);
    defx!();

    Ok(Query {
        interval,
        builder,
        chain,
        summary: query.summary,
    })
}

fn run_query(query: Query, sink: Box<dyn OutputPipeline>) -> Result<()> {
    let pipeline = query
        .builder
        .build_from_chain(query.chain.as_ref(), sink)?;
    let summary: PipelineSummary = pipeline.run()?;
    if query.summary {
        eprintln!("{}", summary);
    }

    Ok(())
}

fn run(args: CLI_Args) -> Result<()> {
    let stdout_terminal: bool = io::stdout().is_terminal();
    match args.command {
        CLI_Command::List { filter, config } => {
            let config = Configuration::load(config.as_deref()).context("loading configuration")?;
            let sources: LogSources = log_sources(&config);
            let mut stdout = io::stdout().lock();
            for name in list_categories(&sources, filter.as_deref()) {
                writeln!(stdout, "{}", name)?;
            }
            stdout.flush()?;

            Ok(())
        }
        CLI_Command::Show { query, color_choice } => {
            let query = prepare_query(&query)?;
            let color_choice: ColorChoice = match color_choice {
                CLI_Color_Choice::always => ColorChoice::Always,
                CLI_Color_Choice::auto if stdout_terminal => ColorChoice::Auto,
                CLI_Color_Choice::auto => ColorChoice::Never,
                CLI_Color_Choice::never => ColorChoice::Never,
            };
            defo!("color_choice {:?}", color_choice);
            let sink = LinePrinter::new(Box::new(BufferedStandardStream::stdout(color_choice)));

            run_query(query, Box::new(sink))
        }
        CLI_Command::Uniq { query, top } => {
            let query = prepare_query(&query)?;
            let (cols, _rows) = terminal_size();
            let settings = UniqueSettings {
                top,
                terminal_width: cols,
                live: stdout_terminal,
            };
            let sink = UniqueCounter::new(Box::new(io::BufWriter::new(io::stdout())), settings);

            run_query(query, Box::new(sink))
        }
        CLI_Command::Inspect { query, count } => {
            let query = prepare_query(&query)?;
            let sink = Inspector::new(Box::new(io::BufWriter::new(io::stdout())), count);

            run_query(query, Box::new(sink))
        }
        CLI_Command::Plot { query, mode, no_update } => {
            let query = prepare_query(&query)?;
            let (cols, rows) = terminal_size();
            let settings = ChartSettings {
                mode: mode.chart_mode(),
                width: cols.saturating_sub(1),
                height: rows.saturating_sub(1),
                border: true,
                x_axis_labels: true,
                y_axis_labels: true,
                interval: query.interval,
            };
            let live: bool = stdout_terminal && !no_update;
            let sink = LineChart::new(Box::new(io::BufWriter::new(io::stdout())), settings, live);

            run_query(query, Box::new(sink))
        }
    }
}

/// Output closed by a reader that finished early, e.g. `logan show x | head`.
fn is_broken_pipe(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| match cause.downcast_ref::<io::Error>() {
        Some(ioerr) => ioerr.kind() == io::ErrorKind::BrokenPipe,
        None => false,
    })
}

pub fn main() {
    let args = CLI_Args::parse();
    defo!("{:?}", args);
    if let Err(err) = run(args) {
        if is_broken_pipe(&err) {
            defo!("broken pipe");
            return;
        }
        e_err!("{:#}", err);
        std::process::exit(EXIT_ERR);
    }
}
