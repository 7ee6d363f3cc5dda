// src/tests/pipeline_tests.rs

//! tests for the `pipeline` module

#![allow(non_snake_case)]

use crate::common::Count;
use crate::data::fields::parse_field_intervals;
use crate::data::logline::{Columns, LogLine};
use crate::pipeline::stages::trim_newline;
use crate::pipeline::{
    PipelineBuilder,
    PipelineError,
    PipelineState,
    PipelineSummary,
    StateCell,
};
use crate::printer::sinks::{Inspector, LinePrinter};
use crate::printer::{LineSink, OutputPipeline};
use crate::tests::common::{interval_hms, recognizer_utc, SharedBuffer};

use std::io::{Cursor, Error, ErrorKind, Read, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ::crossbeam_channel::{bounded, Receiver};
use ::test_case::test_case;

const INPUT_ABC: &str = "\
2016-12-05 09:00:00 A
2016-12-05 09:30:00 B
2016-12-05 10:30:00 C
";

/// Keeps the columns of every line it consumes.
struct Collector {
    lines: Arc<Mutex<Vec<Columns>>>,
    /// if set, wait for a message before consuming the first line
    gate: Option<Receiver<()>>,
}

impl Collector {
    fn new() -> (Collector, Arc<Mutex<Vec<Columns>>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));

        (Collector { lines: lines.clone(), gate: None }, lines)
    }
}

impl LineSink for Collector {
    fn name(&self) -> &'static str {
        "collector"
    }

    fn consume(&mut self, logline: LogLine) -> Result<bool> {
        if let Some(gate) = self.gate.take() {
            let _ = gate.recv();
        }
        self.lines.lock().unwrap().push(logline.into_columns());

        Ok(true)
    }

    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

fn builder_9_to_10() -> PipelineBuilder {
    PipelineBuilder::new(interval_hms((9, 0, 0), (10, 0, 0)), recognizer_utc())
}

fn run_abc(builder: PipelineBuilder) -> (Vec<Columns>, PipelineSummary) {
    let (collector, lines) = Collector::new();
    let pipeline = builder
        .build(Box::new(Cursor::new(INPUT_ABC)), Box::new(collector))
        .unwrap();
    let summary = pipeline.run().unwrap();
    let lines = lines.lock().unwrap().clone();

    (lines, summary)
}

#[test]
fn test_pipeline_window_and_filter() {
    let (lines, summary) = run_abc(builder_9_to_10().filter(r#"$3 == "B""#));
    assert_eq!(lines, vec![vec!["2016-12-05", "09:30:00", "B"]]);
    assert_eq!(summary.lines_read, 2, "the reader stops at the first line after the window");
    assert_eq!(summary.lines_delivered, 1);
    assert_eq!(summary.lines_filtered.len(), 2);
    assert!(summary.lines_filtered[0].0.starts_with("time "));
    assert_eq!(summary.lines_filtered[0].1, 2);
    assert_eq!(summary.lines_filtered[1], (r#"($3 == "B")"#.to_string(), 1));
    assert_eq!(summary.bytes_read, INPUT_ABC.len() as Count);
    assert_eq!(summary.stream_error, None);
}

#[test]
fn test_pipeline_time_window_only() {
    let (lines, _summary) = run_abc(builder_9_to_10());
    let last: Vec<&str> = lines.iter().map(|c| c[2].as_str()).collect();
    assert_eq!(last, vec!["A", "B"]);
}

#[test]
fn test_pipeline_filters_in_order() {
    let builder = builder_9_to_10().filters(&[r#"$3 != "A""#, r#"$3 ~= "^[AB]$""#]);
    let (lines, summary) = run_abc(builder);
    assert_eq!(lines.len(), 1);
    let counts: Vec<Count> = summary.lines_filtered.iter().map(|(_, n)| *n).collect();
    assert_eq!(counts, vec![2, 1, 1]);
}

#[test_case("3", &["B"])]
#[test_case("3,1", &["B", "2016-12-05"])]
#[test_case("2-", &["09:30:00", "B"])]
#[test_case("7", &[]; "beyond the last column")]
fn test_pipeline_fields(fields: &str, expect: &[&str]) {
    let builder = builder_9_to_10()
        .filter(r#"$3 == "B""#)
        .fields(parse_field_intervals(fields).unwrap());
    let (lines, _summary) = run_abc(builder);
    assert_eq!(lines, vec![expect.iter().map(|s| s.to_string()).collect::<Columns>()]);
}

#[test]
fn test_pipeline_continuation_lines_carry_date() {
    let input = "\
2016-12-05 08:59:59 before
    trace of before
2016-12-05 09:10:00 error
    trace line 1
    trace line 2
";
    let (collector, lines) = Collector::new();
    let pipeline = builder_9_to_10()
        .build(Box::new(Cursor::new(input)), Box::new(collector))
        .unwrap();
    pipeline.run().unwrap();
    let firsts: Vec<String> = lines.lock().unwrap().iter().map(|c| c.join(" ")).collect();
    assert_eq!(
        firsts,
        vec![
            "2016-12-05 09:10:00 error",
            "trace line 1",
            "trace line 2",
        ]
    );
}

#[test]
fn test_pipeline_bad_filter() {
    let (collector, _lines) = Collector::new();
    let result = builder_9_to_10()
        .filter(r#"$1 == "ok""#)
        .filter("$1 ==")
        .build(Box::new(Cursor::new(INPUT_ABC)), Box::new(collector));
    match result {
        Err(PipelineError::Filter { filter, source }) => {
            assert_eq!(filter, "$1 ==");
            assert_eq!(source.position, 5);
        }
        other => panic!("unexpected {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_pipeline_states() {
    let (collector, _lines) = Collector::new();
    let mut pipeline = builder_9_to_10()
        .build(Box::new(Cursor::new(INPUT_ABC)), Box::new(collector))
        .unwrap();
    assert_eq!(pipeline.state(), PipelineState::Built);
    assert!(matches!(pipeline.wait(), Err(PipelineError::State { .. })));
    pipeline.start().unwrap();
    assert!(pipeline.state() >= PipelineState::Running);
    assert!(matches!(
        pipeline.start(),
        Err(PipelineError::State { expected: PipelineState::Built, .. })
    ));
    pipeline.wait().unwrap();
    assert_eq!(pipeline.state(), PipelineState::Done);
    assert!(matches!(pipeline.wait(), Err(PipelineError::State { .. })));
}

#[test]
fn test_StateCell_advance() {
    let cell = StateCell::new(PipelineState::Built);
    assert!(!cell.advance(PipelineState::Running, PipelineState::Draining));
    assert_eq!(cell.get(), PipelineState::Built);
    assert!(cell.advance(PipelineState::Built, PipelineState::Running));
    assert_eq!(cell.get(), PipelineState::Running);
    cell.set(PipelineState::Done);
    assert_eq!(cell.get(), PipelineState::Done);
    assert_eq!(PipelineState::Draining.to_string(), "Draining");
}

/// Counts the bytes read through it.
struct CountingReader<R> {
    inner: R,
    count: Arc<AtomicUsize>,
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let len = self.inner.read(buf)?;
        self.count.fetch_add(len, Ordering::SeqCst);
        Ok(len)
    }
}

#[test]
fn test_pipeline_backpressure() {
    const LINES: usize = 20_000;
    let mut input = String::new();
    for n in 0..LINES {
        input.push_str(&format!("2016-12-05 09:{:02}:00 line {}\n", n % 60, n));
    }
    let input_len: usize = input.len();
    let count = Arc::new(AtomicUsize::new(0));
    let reader = CountingReader {
        inner: Cursor::new(input),
        count: count.clone(),
    };
    let (gate_send, gate_recv) = bounded::<()>(1);
    let (mut collector, lines) = Collector::new();
    collector.gate = Some(gate_recv);
    let mut pipeline = builder_9_to_10()
        .channel_capacity(1)
        .blocksz(4096)
        .build(Box::new(reader), Box::new(collector))
        .unwrap();
    pipeline.start().unwrap();

    std::thread::sleep(Duration::from_millis(300));
    let read_while_blocked: usize = count.load(Ordering::SeqCst);
    assert!(
        read_while_blocked < 64 * 1024,
        "read {} of {} bytes while the sink was blocked",
        read_while_blocked,
        input_len
    );
    assert_eq!(pipeline.state(), PipelineState::Running);

    gate_send.send(()).unwrap();
    let summary = pipeline.wait().unwrap();
    assert_eq!(summary.lines_delivered, LINES as Count);
    assert_eq!(lines.lock().unwrap().len(), LINES);
    assert_eq!(count.load(Ordering::SeqCst), input_len);
}

#[test]
fn test_pipeline_sink_stops_early() {
    let mut input = String::new();
    for n in 0..10_000 {
        input.push_str(&format!("2016-12-05 09:30:00 line {}\n", n));
    }
    let buffer = SharedBuffer::new();
    let inspector: Box<dyn OutputPipeline> = Box::new(Inspector::new(Box::new(buffer.clone()), 2));
    let summary = builder_9_to_10()
        .channel_capacity(1)
        .build(Box::new(Cursor::new(input)), inspector)
        .unwrap()
        .run()
        .unwrap();
    assert_eq!(summary.lines_delivered, 2);
    assert_eq!(buffer.contents().matches("Line: ").count(), 2);
}

/// Serves the same dated line forever.
struct EndlessReader {
    line: &'static [u8],
    at: usize,
}

impl Read for EndlessReader {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        for byte in buf.iter_mut() {
            *byte = self.line[self.at];
            self.at = (self.at + 1) % self.line.len();
        }
        Ok(buf.len())
    }
}

/// The sink wants nothing and the filter drops every line, so no stage ever
/// fails to send; intake must still stop.
#[test]
fn test_pipeline_sink_done_stops_intake() {
    let reader = EndlessReader {
        line: b"2016-12-05 09:30:00 line\n",
        at: 0,
    };
    let buffer = SharedBuffer::new();
    let inspector: Box<dyn OutputPipeline> = Box::new(Inspector::new(Box::new(buffer.clone()), 0));
    let summary = builder_9_to_10()
        .filter(r#"$3 == "never""#)
        .channel_capacity(1)
        .blocksz(4096)
        .build(Box::new(reader), inspector)
        .unwrap()
        .run()
        .unwrap();
    assert_eq!(summary.lines_delivered, 0);
    assert_eq!(buffer.contents(), "");
}

#[test]
fn test_pipeline_LinePrinter() {
    let buffer = SharedBuffer::new();
    let printer: Box<dyn OutputPipeline> = Box::new(LinePrinter::new(Box::new(buffer.clone())));
    builder_9_to_10()
        .fields(parse_field_intervals("3").unwrap())
        .build(Box::new(Cursor::new(INPUT_ABC)), printer)
        .unwrap()
        .run()
        .unwrap();
    assert_eq!(buffer.contents(), "A\nB\n");
}

/// Serves `data` then fails.
struct FailingReader {
    data: Cursor<Vec<u8>>,
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        match self.data.read(buf)? {
            0 => Err(Error::new(ErrorKind::Other, "connection reset")),
            len => Ok(len),
        }
    }
}

#[test]
fn test_pipeline_stream_error() {
    let reader = FailingReader {
        data: Cursor::new(b"2016-12-05 09:10:00 a\n2016-12-05 09:20:00 b\n".to_vec()),
    };
    let (collector, lines) = Collector::new();
    let summary = builder_9_to_10()
        .build(Box::new(reader), Box::new(collector))
        .unwrap()
        .run()
        .unwrap();
    assert_eq!(lines.lock().unwrap().len(), 2);
    assert!(summary.stream_error.unwrap().contains("connection reset"));
}

#[test]
fn test_PipelineSummary_display() {
    let summary = PipelineSummary {
        bytes_read: 10,
        bytes_skipped: 2,
        lines_read: 3,
        lines_filtered: vec![("f".to_string(), 1)],
        lines_delivered: 1,
        stream_error: None,
    };
    let text = summary.to_string();
    assert!(text.contains("bytes read      : 10"));
    assert!(text.contains("lines passed    : 1 (f)"));
    assert!(text.ends_with("lines delivered : 1"));
}

#[test_case(b"abc\n", b"abc")]
#[test_case(b"abc\r\n", b"abc")]
#[test_case(b"abc", b"abc")]
#[test_case(b"abc\r", b"abc\r")]
#[test_case(b"\n\n", b"\n")]
fn test_trim_newline(line: &[u8], expect: &[u8]) {
    let mut line = line.to_vec();
    trim_newline(&mut line);
    assert_eq!(line, expect);
}
