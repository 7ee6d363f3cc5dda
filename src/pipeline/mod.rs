// src/pipeline/mod.rs

//! The `pipeline` module wires the stages of a query and runs them.
//!
//! A [`PipelineBuilder`] collects the query (time window, filter
//! expressions, field ranges) and, given an input byte stream and an
//! [`OutputPipeline`], builds a [`Pipeline`]. All filter expressions are
//! parsed while building, so a malformed expression fails before any thread
//! starts.
//!
//! A started pipeline is a chain of threads connected by bounded channels:
//!
//! ```text
//! intake ─▶ dates ─▶ columns ─▶ filter 0 (time) ─▶ filter 1 … ─▶ projection ─▶ sink
//! ```
//!
//! The intake thread reads through a [`TimeSeekReader`] and splits lines.
//! When it reaches the end of the stream it closes its channel, and closure
//! propagates stage by stage until the sink finishes and signals
//! completion. A sink that stops early closes its input, and closure
//! propagates upstream the same way.
//!
//! [`TimeSeekReader`]: crate::readers::seekreader::TimeSeekReader

use crate::common::Count;
use crate::data::datetime::{DateRecognizer, DateTagger, TimeInterval};
use crate::data::fields::{FieldInterval, FieldIntervals};
#[allow(unused_imports)]
use crate::debug::printers::{de_err, de_wrn, e_err, e_wrn};
use crate::filter::columnfilter::{ColumnFilter, FilterParseError};
use crate::filter::{Filter, TimeFilter};
use crate::printer::{CompletionSignal, OutputPipeline};
use crate::readers::seekreader::{BlockSz, TimeSeekReader, BLOCKSZ_DEF};
use crate::source::{LogChain, SourceError};

use std::fmt;
use std::io::{self, Read};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use ::crossbeam_channel::bounded;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};
use ::thiserror::Error;

pub mod stages;

use stages::{
    column_transform, date_transform, filter_transform, projection_transform, spawn_intake, spawn_stage,
    ChanRecvLogLine, ChanSendLogLine, IntakeSummary,
};

/// Default capacity of each stage channel.
pub const CHANNEL_CAPACITY: usize = 1024;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// PipelineState
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Life cycle of a [`Pipeline`]. States only advance, in declaration order.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
#[repr(u8)]
pub enum PipelineState {
    /// stages are wired but not started
    Built = 0,
    /// every stage is running
    Running = 1,
    /// the input stream is exhausted; stages are finishing
    Draining = 2,
    /// the sink signalled completion and every stage has ended
    Done = 3,
}

impl PipelineState {
    const fn from_u8(value: u8) -> PipelineState {
        match value {
            0 => PipelineState::Built,
            1 => PipelineState::Running,
            2 => PipelineState::Draining,
            _ => PipelineState::Done,
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            PipelineState::Built => "Built",
            PipelineState::Running => "Running",
            PipelineState::Draining => "Draining",
            PipelineState::Done => "Done",
        })
    }
}

/// A [`PipelineState`] shared by the threads of one pipeline.
#[derive(Debug)]
pub struct StateCell(AtomicU8);

impl StateCell {
    pub fn new(state: PipelineState) -> StateCell {
        StateCell(AtomicU8::new(state as u8))
    }

    pub fn get(&self) -> PipelineState {
        PipelineState::from_u8(self.0.load(Ordering::SeqCst))
    }

    pub fn set(&self, state: PipelineState) {
        self.0.store(state as u8, Ordering::SeqCst);
    }

    /// Change the state to `to` only if it is `from`. Returns `true` if
    /// changed.
    pub fn advance(&self, from: PipelineState, to: PipelineState) -> bool {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// errors and summary
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("bad filter {filter:?}: {source}")]
    Filter {
        filter: String,
        #[source]
        source: FilterParseError,
    },
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("starting pipeline: {0}")]
    Io(#[from] io::Error),
    #[error("output: {0}")]
    Sink(#[source] io::Error),
    #[error("pipeline stage {0:?} panicked")]
    StagePanic(String),
    #[error("pipeline is {found}, expected {expected}")]
    State {
        expected: PipelineState,
        found: PipelineState,
    },
}

/// Counts from a finished [`Pipeline`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PipelineSummary {
    /// bytes read from the input stream
    pub bytes_read: Count,
    /// bytes discarded while seeking to the time window
    pub bytes_skipped: Count,
    pub lines_read: Count,
    /// each filter and the count of lines it passed, in stage order
    pub lines_filtered: Vec<(String, Count)>,
    /// lines the sink consumed
    pub lines_delivered: Count,
    /// read error that ended the input stream
    pub stream_error: Option<String>,
}

impl fmt::Display for PipelineSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "bytes read      : {}", self.bytes_read)?;
        writeln!(f, "bytes skipped   : {}", self.bytes_skipped)?;
        writeln!(f, "lines read      : {}", self.lines_read)?;
        for (filter, count) in self.lines_filtered.iter() {
            writeln!(f, "lines passed    : {} ({})", count, filter)?;
        }
        write!(f, "lines delivered : {}", self.lines_delivered)?;
        if let Some(err) = &self.stream_error {
            write!(f, "\nstream error    : {}", err)?;
        }

        Ok(())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// PipelineBuilder
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Collects the settings of a query and builds a [`Pipeline`].
#[derive(Clone, Debug)]
pub struct PipelineBuilder {
    interval: TimeInterval,
    recognizer: DateRecognizer,
    filters: Vec<String>,
    fields: FieldIntervals,
    channel_capacity: usize,
    blocksz: BlockSz,
}

impl PipelineBuilder {
    pub fn new(interval: TimeInterval, recognizer: DateRecognizer) -> PipelineBuilder {
        PipelineBuilder {
            interval,
            recognizer,
            filters: Vec::new(),
            fields: vec![FieldInterval::all()],
            channel_capacity: CHANNEL_CAPACITY,
            blocksz: BLOCKSZ_DEF,
        }
    }

    /// Add a column filter expression. Filters run in the order added, after
    /// the time filter.
    pub fn filter(mut self, expression: &str) -> PipelineBuilder {
        self.filters.push(expression.to_string());
        self
    }

    pub fn filters<S: AsRef<str>>(mut self, expressions: &[S]) -> PipelineBuilder {
        self.filters
            .extend(expressions.iter().map(|e| e.as_ref().to_string()));
        self
    }

    /// Columns to keep, see [`project`].
    ///
    /// [`project`]: crate::data::fields::project
    pub fn fields(mut self, fields: FieldIntervals) -> PipelineBuilder {
        self.fields = fields;
        self
    }

    pub fn channel_capacity(mut self, capacity: usize) -> PipelineBuilder {
        self.channel_capacity = std::cmp::max(capacity, 1);
        self
    }

    /// Block size of the [`TimeSeekReader`].
    pub fn blocksz(mut self, blocksz: BlockSz) -> PipelineBuilder {
        self.blocksz = blocksz;
        self
    }

    pub const fn interval(&self) -> &TimeInterval {
        &self.interval
    }

    /// Wire a pipeline from `input` to `output`. Nothing runs until
    /// [`Pipeline::start`].
    pub fn build(
        self,
        input: Box<dyn Read + Send>,
        output: Box<dyn OutputPipeline>,
    ) -> Result<Pipeline, PipelineError> {
        defn!("{} filters", self.filters.len());
        let mut filters: Vec<Arc<dyn Filter>> = Vec::with_capacity(self.filters.len() + 1);
        filters.push(Arc::new(TimeFilter::new(self.interval)));
        for expression in self.filters.iter() {
            match ColumnFilter::new(expression) {
                Ok(filter) => filters.push(Arc::new(filter)),
                Err(source) => {
                    defx!("bad filter {:?}", expression);
                    return Err(PipelineError::Filter {
                        filter: expression.clone(),
                        source,
                    });
                }
            }
        }
        defx!();

        Ok(Pipeline {
            state: Arc::new(StateCell::new(PipelineState::Built)),
            wiring: Some(Wiring {
                input,
                output,
                interval: self.interval,
                recognizer: self.recognizer,
                filters,
                fields: self.fields,
                channel_capacity: self.channel_capacity,
                blocksz: self.blocksz,
            }),
            running: None,
        })
    }

    /// Like [`build`] with the input taken from `chain` for the interval.
    ///
    /// [`build`]: PipelineBuilder::build
    pub fn build_from_chain(
        self,
        chain: &dyn LogChain,
        output: Box<dyn OutputPipeline>,
    ) -> Result<Pipeline, PipelineError> {
        let input = chain.between(&self.interval).map_err(SourceError::Io)?;

        self.build(input, output)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Pipeline
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Everything needed to start the stages.
struct Wiring {
    input: Box<dyn Read + Send>,
    output: Box<dyn OutputPipeline>,
    interval: TimeInterval,
    recognizer: DateRecognizer,
    filters: Vec<Arc<dyn Filter>>,
    fields: FieldIntervals,
    channel_capacity: usize,
    blocksz: BlockSz,
}

/// Handles of started stages.
struct Running {
    intake: JoinHandle<IntakeSummary>,
    /// stage name, its filter's description for filter stages, and handle
    stages: Vec<(String, Option<String>, JoinHandle<Count>)>,
    completion: CompletionSignal,
}

/// A query wired from an input stream to an output sink.
pub struct Pipeline {
    state: Arc<StateCell>,
    wiring: Option<Wiring>,
    running: Option<Running>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("state", &self.state.get())
            .finish()
    }
}

impl Pipeline {
    pub fn state(&self) -> PipelineState {
        self.state.get()
    }

    fn expect_state(&self, expected: PipelineState) -> Result<(), PipelineError> {
        let found = self.state.get();
        if found != expected {
            return Err(PipelineError::State { expected, found });
        }

        Ok(())
    }

    /// Start every stage. The pipeline becomes `Running`.
    ///
    /// If a stage fails to start the pipeline becomes `Done`; stages already
    /// started see their channels close and end.
    pub fn start(&mut self) -> Result<(), PipelineError> {
        defn!();
        self.expect_state(PipelineState::Built)?;
        let wiring: Wiring = match self.wiring.take() {
            Some(wiring) => wiring,
            None => {
                return Err(PipelineError::State {
                    expected: PipelineState::Built,
                    found: self.state.get(),
                })
            }
        };
        match Pipeline::spawn(wiring, &self.state) {
            Ok(running) => {
                self.running = Some(running);
                defx!("{}", self.state.get());

                Ok(())
            }
            Err(err) => {
                self.state.set(PipelineState::Done);
                defx!("{}", err);

                Err(PipelineError::Io(err))
            }
        }
    }

    fn spawn(wiring: Wiring, state: &Arc<StateCell>) -> io::Result<Running> {
        let cap: usize = wiring.channel_capacity;
        let mut stages: Vec<(String, Option<String>, JoinHandle<Count>)> = Vec::new();

        // stages start from the sink back to intake so that a failed spawn
        // leaves no thread blocked on a channel with no other end
        let (send_last, recv_last): (ChanSendLogLine, ChanRecvLogLine) = bounded(cap);
        let completion: CompletionSignal = wiring.output.start(recv_last)?;

        let (send_proj, recv_proj): (ChanSendLogLine, ChanRecvLogLine) = bounded(cap);
        let handle = spawn_stage("projection", recv_proj, send_last, projection_transform(wiring.fields))?;
        stages.push(("projection".to_string(), None, handle));

        let mut send_next: ChanSendLogLine = send_proj;
        for (index, filter) in wiring.filters.iter().enumerate().rev() {
            let (send, recv): (ChanSendLogLine, ChanRecvLogLine) = bounded(cap);
            let name: String = format!("filter {}", index);
            let handle = spawn_stage(&name, recv, send_next, filter_transform(filter.clone()))?;
            stages.push((name, Some(filter.to_string()), handle));
            send_next = send;
        }

        let (send_cols, recv_cols): (ChanSendLogLine, ChanRecvLogLine) = bounded(cap);
        let handle = spawn_stage("columns", recv_cols, send_next, column_transform())?;
        stages.push(("columns".to_string(), None, handle));

        let (send_dates, recv_dates): (ChanSendLogLine, ChanRecvLogLine) = bounded(cap);
        let tagger = DateTagger::new(wiring.recognizer);
        let handle = spawn_stage("dates", recv_dates, send_cols, date_transform(tagger))?;
        stages.push(("dates".to_string(), None, handle));

        stages.reverse();

        state.set(PipelineState::Running);
        let reader = TimeSeekReader::new_blocksz(wiring.input, wiring.interval, wiring.recognizer, wiring.blocksz);
        let intake = spawn_intake(reader, send_dates, completion.stopped(), state.clone())?;

        Ok(Running {
            intake,
            stages,
            completion,
        })
    }

    /// Block until the sink signals completion and every stage has ended.
    /// The pipeline becomes `Done`.
    pub fn wait(&mut self) -> Result<PipelineSummary, PipelineError> {
        defn!();
        let running: Running = match self.running.take() {
            Some(running) => running,
            None => {
                return Err(PipelineError::State {
                    expected: PipelineState::Running,
                    found: self.state.get(),
                })
            }
        };
        let sink_result = running.completion.wait();
        let mut summary = PipelineSummary::default();
        let mut panicked: Option<String> = None;
        for (name, filter, handle) in running.stages.into_iter() {
            match handle.join() {
                Ok(count) => {
                    if let Some(filter) = filter {
                        summary.lines_filtered.push((filter, count));
                    }
                }
                Err(_) => {
                    de_err!("stage {:?} panicked", name);
                    panicked.get_or_insert(name);
                }
            }
        }
        match running.intake.join() {
            Ok(intake) => {
                summary.bytes_read = intake.bytes_read;
                summary.bytes_skipped = intake.bytes_skipped;
                summary.lines_read = intake.lines_read;
                summary.stream_error = intake.stream_error;
            }
            Err(_) => {
                panicked.get_or_insert("intake".to_string());
            }
        }
        self.state.set(PipelineState::Done);
        if let Some(name) = panicked {
            defx!("stage {:?} panicked", name);
            return Err(PipelineError::StagePanic(name));
        }
        summary.lines_delivered = sink_result.map_err(PipelineError::Sink)?;
        defx!("{:?}", summary);

        Ok(summary)
    }

    /// [`start`] then [`wait`].
    ///
    /// [`start`]: Pipeline::start
    /// [`wait`]: Pipeline::wait
    pub fn run(mut self) -> Result<PipelineSummary, PipelineError> {
        self.start()?;
        self.wait()
    }
}
