// bench_columnparser.rs
//
// benchmark the per-line work of a pipeline: datetime recognition and
// column tokenizing
//

extern crate loganlib;

use loganlib::data::datetime::{
    DateRecognizer,
    DateTimeL,
    FixedOffset,
    TimeZone,
};
use loganlib::readers::columnparser::parse_columns;

extern crate criterion;
use criterion::{
    black_box,
    criterion_group,
    criterion_main,
    Criterion
};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

const LINE_PLAIN: &str = r#"2016-12-05 06:57:36 www-14 GET /index.html 200 "Mozilla/5.0 (X11; Linux x86_64)" [0.013s]"#;
const LINE_SYSLOG: &str = "Dec  5 06:57:36 host sshd[1234]: Accepted publickey for root from 10.0.0.1 port 51234";
const LINE_JSON: &str = r#"{"time": "2016-12-05T06:57:36Z", "level": "info", "msg": "request done", "status": 200}"#;
const LINE_UNDATED: &str = "    at com.example.Service.handle(Service.java:42)";

fn recognizer() -> DateRecognizer {
    let tz_offset: FixedOffset = FixedOffset::east_opt(0).unwrap();
    let now: DateTimeL = tz_offset.with_ymd_and_hms(2017, 1, 10, 12, 0, 0).unwrap();

    DateRecognizer::new(tz_offset, now)
}

#[inline(never)]
fn columns_plain() {
    black_box(parse_columns(black_box(LINE_PLAIN)));
}

#[inline(never)]
fn columns_json() {
    black_box(parse_columns(black_box(LINE_JSON)));
}

// criterion runners

fn criterion_benchmark(c: &mut Criterion) {
    let mut bg = c.benchmark_group("columnparser");
    bg.bench_function("columns_plain", |b| b.iter(columns_plain));
    bg.bench_function("columns_json", |b| b.iter(columns_json));
    bg.finish();

    let recognizer = recognizer();
    let mut bg = c.benchmark_group("DateRecognizer");
    for (name, line) in [
        ("parse_date_plain", LINE_PLAIN),
        ("parse_date_syslog", LINE_SYSLOG),
        ("parse_date_undated", LINE_UNDATED),
    ] {
        bg.bench_function(name, |b| b.iter(|| recognizer.parse_date(black_box(line))));
    }
    bg.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
