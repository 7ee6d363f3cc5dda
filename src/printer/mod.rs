// src/printer/mod.rs

//! Output sinks: the last stage of a pipeline.
//!
//! A sink implements [`LineSink`]. Any `LineSink` is an [`OutputPipeline`]:
//! started with the receiving end of the last pipeline queue, it runs on its
//! own thread and reports through a [`CompletionSignal`] when done.
//!
//! A sink with live output (see [`LineSink::update_interval`]) is asked to
//! re-render periodically on the same thread that consumes lines, so its
//! state never needs a lock.
//!
//! * [`LinePrinter`] prints each line's columns.
//! * [`UniqueCounter`] prints unique lines by frequency.
//! * [`Inspector`] prints the columns of the first few lines.
//! * [`LineChart`] plots the count of lines over time.
//!
//! [`LinePrinter`]: crate::printer::sinks::LinePrinter
//! [`UniqueCounter`]: crate::printer::sinks::UniqueCounter
//! [`Inspector`]: crate::printer::sinks::Inspector
//! [`LineChart`]: crate::printer::sinks::LineChart

use crate::common::Count;
use crate::data::logline::LogLine;
#[allow(unused_imports)]
use crate::debug::printers::{de_err, de_wrn, e_err, e_wrn};

use std::io::{Error, ErrorKind, Result};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use ::crossbeam_channel::{never, select, tick, Receiver};
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

pub mod chart;
pub mod counter;
pub mod sampler;
pub mod sinks;

/// Result of a sink run: the count of lines it consumed.
pub type SinkResult = Result<Count>;

/// Receives the one [`SinkResult`] of a started sink.
#[derive(Debug)]
pub struct CompletionSignal {
    receiver: Receiver<SinkResult>,
    /// never sent on; disconnects when the sink thread returns
    stopped: Receiver<()>,
    handle: JoinHandle<()>,
}

impl CompletionSignal {
    /// The channel that yields the result once, then disconnects.
    pub fn receiver(&self) -> &Receiver<SinkResult> {
        &self.receiver
    }

    /// A channel that is disconnected once the sink has stopped consuming,
    /// before its result is available.
    pub fn stopped(&self) -> Receiver<()> {
        self.stopped.clone()
    }

    /// Block until the sink is done.
    pub fn wait(self) -> SinkResult {
        let result: SinkResult = match self.receiver.recv() {
            Ok(result) => result,
            Err(_) => Err(Error::new(ErrorKind::Other, "output sink ended without a result")),
        };
        if self.handle.join().is_err() {
            de_err!("output sink thread panicked");
        }

        result
    }
}

/// The terminal stage of a pipeline.
pub trait OutputPipeline: Send {
    /// Start consuming `input` on a new thread.
    fn start(self: Box<Self>, input: Receiver<LogLine>) -> Result<CompletionSignal>;
}

/// Presentation of a stream of [`LogLine`]s.
pub trait LineSink: Send + 'static {
    /// Thread name.
    fn name(&self) -> &'static str;

    /// `false` once the sink needs no more lines. Checked before each
    /// receive so a sink that wants nothing never takes a line.
    fn wants_more(&self) -> bool {
        true
    }

    /// Take one line. Return `false` to stop consuming.
    fn consume(&mut self, logline: LogLine) -> Result<bool>;

    /// All lines were consumed; write final output.
    fn finish(&mut self) -> Result<()>;

    /// Period of [`update`] calls while lines are consumed, `None` for no
    /// live output.
    ///
    /// [`update`]: LineSink::update
    fn update_interval(&self) -> Option<Duration> {
        None
    }

    /// Re-render live output.
    fn update(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<S: LineSink> OutputPipeline for S {
    fn start(self: Box<Self>, input: Receiver<LogLine>) -> Result<CompletionSignal> {
        spawn_sink(*self, input)
    }
}

/// Consume `input` until it is closed and drained or `sink` stops it.
pub fn run_sink<S: LineSink>(sink: &mut S, input: Receiver<LogLine>) -> SinkResult {
    defn!("{}", sink.name());
    let mut consumed: Count = 0;
    let ticker: Receiver<Instant> = match sink.update_interval() {
        Some(interval) => tick(interval),
        None => never(),
    };
    while sink.wants_more() {
        select! {
            recv(input) -> msg => match msg {
                Ok(logline) => {
                    consumed += 1;
                    if !sink.consume(logline)? {
                        defo!("{} stopped consuming", sink.name());
                        break;
                    }
                }
                Err(_) => break,
            },
            recv(ticker) -> _ => sink.update()?,
        }
    }
    // upstream stages see the closed queue and stop
    drop(input);
    sink.finish()?;
    defx!("{} consumed {}", sink.name(), consumed);

    Ok(consumed)
}

/// Run `sink` on a new thread.
pub fn spawn_sink<S: LineSink>(mut sink: S, input: Receiver<LogLine>) -> Result<CompletionSignal> {
    let (sender, receiver) = ::crossbeam_channel::bounded::<SinkResult>(1);
    let (stop_sender, stopped) = ::crossbeam_channel::bounded::<()>(1);
    let handle = thread::Builder::new()
        .name(sink.name().to_string())
        .spawn(move || {
            let result = run_sink(&mut sink, input);
            drop(stop_sender);
            // the receiver may have been dropped
            let _ = sender.send(result);
        })?;

    Ok(CompletionSignal {
        receiver,
        stopped,
        handle,
    })
}
