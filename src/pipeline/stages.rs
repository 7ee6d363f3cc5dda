// src/pipeline/stages.rs

//! The stage runner and the transforms of each pipeline stage.
//!
//! A stage is a named thread that receives items from a bounded channel,
//! transforms each, and sends the results to the next bounded channel.
//! It ends when its input channel is closed and drained, or when its output
//! channel is closed by a downstream stage that stopped early. Either way
//! ending drops both channel ends, so closure propagates through the chain
//! in both directions. Intake also watches the sink directly and stops
//! reading as soon as the sink is done.

use crate::common::{Bytes, Count, CRu8, NLu8};
use crate::data::datetime::DateTagger;
use crate::data::fields::{project, FieldIntervals};
use crate::data::logline::LogLine;
use crate::filter::Filter;
use crate::pipeline::{PipelineState, StateCell};
use crate::readers::columnparser::parse_columns;
use crate::readers::seekreader::TimeSeekReader;
#[allow(unused_imports)]
use crate::debug::printers::{de_err, de_wrn, e_err, e_wrn};

use std::io::{BufRead, BufReader, ErrorKind, Read, Result};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use ::bstr::ByteSlice;
use ::crossbeam_channel::{Receiver, Sender, TryRecvError};
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// `Sender` of a stage queue.
pub type ChanSendLogLine = Sender<LogLine>;
/// `Receiver` of a stage queue.
pub type ChanRecvLogLine = Receiver<LogLine>;

/// Spawn a thread named `name` that applies `transform` to each item from
/// `input` and forwards the `Some` results to `output`.
///
/// The thread returns the count of items forwarded.
pub fn spawn_stage<I, O, F>(
    name: &str,
    input: Receiver<I>,
    output: Sender<O>,
    mut transform: F,
) -> Result<JoinHandle<Count>>
where
    I: Send + 'static,
    O: Send + 'static,
    F: FnMut(I) -> Option<O> + Send + 'static,
{
    let name_: String = name.to_string();
    thread::Builder::new()
        .name(name_.clone())
        .spawn(move || {
            defn!("stage {:?}", name_);
            let mut forwarded: Count = 0;
            for item in input.iter() {
                if let Some(out) = transform(item) {
                    if output.send(out).is_err() {
                        defo!("stage {:?} output closed", name_);
                        break;
                    }
                    forwarded += 1;
                }
            }
            defx!("stage {:?} forwarded {}", name_, forwarded);

            forwarded
        })
}

/// What the intake stage learned about the byte stream.
#[derive(Debug, Default)]
pub struct IntakeSummary {
    pub bytes_read: Count,
    pub bytes_skipped: Count,
    pub lines_read: Count,
    pub stream_error: Option<String>,
}

/// Remove one trailing `"\n"` or `"\r\n"`.
pub(crate) fn trim_newline(line: &mut Bytes) {
    if line.last() == Some(&NLu8) {
        line.pop();
        if line.last() == Some(&CRu8) {
            line.pop();
        }
    }
}

/// Spawn the intake stage: read `reader` through a [`TimeSeekReader`],
/// split it into lines, and send a [`LogLine`] per line to `output`.
///
/// When the stream ends, or fails, the state advances to `Draining`. A read
/// error is reported once and ends intake normally.
///
/// Intake also ends once `sink_stopped` is disconnected. The sink may stop
/// while every line is dropped by a filter, so no send ever fails.
pub fn spawn_intake<R>(
    reader: TimeSeekReader<R>,
    output: ChanSendLogLine,
    sink_stopped: Receiver<()>,
    state: Arc<StateCell>,
) -> Result<JoinHandle<IntakeSummary>>
where
    R: Read + Send + 'static,
{
    thread::Builder::new()
        .name("intake".to_string())
        .spawn(move || {
            defn!();
            let mut summary = IntakeSummary::default();
            let mut bufreader = BufReader::new(reader);
            let mut buffer = Bytes::with_capacity(1024);
            loop {
                if let Err(TryRecvError::Disconnected) = sink_stopped.try_recv() {
                    defo!("output sink stopped");
                    break;
                }
                buffer.clear();
                match bufreader.read_until(NLu8, &mut buffer) {
                    Ok(0) => break,
                    Ok(_) => {}
                    Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                    Err(err) => {
                        e_err!("reading log stream: {}", err);
                        summary.stream_error = Some(err.to_string());
                        break;
                    }
                }
                trim_newline(&mut buffer);
                let line: String = buffer.to_str_lossy().into_owned();
                summary.lines_read += 1;
                if output.send(LogLine::new(line)).is_err() {
                    defo!("intake output closed");
                    break;
                }
            }
            drop(output);
            state.advance(PipelineState::Running, PipelineState::Draining);
            let seekreader = bufreader.into_inner();
            summary.bytes_read = seekreader.bytes_read();
            summary.bytes_skipped = seekreader.bytes_skipped();
            defx!("{:?}", summary);

            summary
        })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// stage transforms
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Tag each line with its datetime, carried forward from earlier lines.
pub fn date_transform(mut tagger: DateTagger) -> impl FnMut(LogLine) -> Option<LogLine> + Send {
    move |mut logline: LogLine| {
        let dt = tagger.tag(logline.line());
        logline.set_dt(dt);
        Some(logline)
    }
}

/// Split each line into columns.
pub fn column_transform() -> impl FnMut(LogLine) -> Option<LogLine> + Send {
    |mut logline: LogLine| {
        let columns = parse_columns(logline.line());
        logline.set_columns(columns);
        Some(logline)
    }
}

/// Forward only the lines `filter` matches.
pub fn filter_transform(filter: Arc<dyn Filter>) -> impl FnMut(LogLine) -> Option<LogLine> + Send {
    move |logline: LogLine| match filter.match_line(&logline) {
        true => Some(logline),
        false => None,
    }
}

/// Select and renumber columns.
pub fn projection_transform(fields: FieldIntervals) -> impl FnMut(LogLine) -> Option<LogLine> + Send {
    move |mut logline: LogLine| {
        let columns = logline.take_columns();
        logline.set_columns(project(columns, &fields));
        Some(logline)
    }
}
