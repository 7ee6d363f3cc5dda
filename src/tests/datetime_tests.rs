// src/tests/datetime_tests.rs

//! tests for `datetime.rs` functions

#![allow(non_snake_case)]

use crate::data::datetime::{
    dt_after_or_before,
    dt_pass_filters,
    normalize_fractional_offset,
    normalize_named_tz,
    normalize_spaces,
    parse_tz_offset,
    DateRecognizer,
    DateTagger,
    DateTimeL,
    DateTimeLOpt,
    Duration,
    FixedOffset,
    Result_Filter_DateTime1,
    Result_Filter_DateTime2,
    TimeInterval,
    DATETIME_PARSE_DATAS,
    DATETIME_PARSE_DATAS_LEN,
};
use crate::tests::common::{dt_utc, recognizer_utc, recognizer_utc_now, FO_0, FO_M8, FO_P1, NOW_2016, NOW_2017};

use std::borrow::Cow;

use ::more_asserts::assert_lt;
use ::test_case::test_case;

#[test]
fn test_DATETIME_PARSE_DATAS_len() {
    assert_eq!(DATETIME_PARSE_DATAS.len(), DATETIME_PARSE_DATAS_LEN);
}

#[test_case(0)]
#[test_case(1)]
#[test_case(2)]
#[test_case(3)]
#[test_case(4)]
#[test_case(5)]
#[test_case(6)]
#[test_case(7)]
#[test_case(8)]
#[test_case(9)]
#[test_case(10)]
#[test_case(11)]
#[test_case(12)]
#[test_case(13)]
#[test_case(14)]
#[test_case(15)]
#[test_case(16)]
fn test_DATETIME_PARSE_DATAS_test_cases(index: usize) {
    let recognizer = recognizer_utc_now(*NOW_2017);
    let dtpd = &DATETIME_PARSE_DATAS[index];
    assert!(!dtpd._test_cases.is_empty(), "entry {} (line {}) has no test cases", index, dtpd._line_num);
    for line in dtpd._test_cases.iter() {
        let dt: DateTimeLOpt = recognizer.parse_date(line);
        assert!(dt.is_some(), "entry {} (line {}) failed to parse {:?}", index, dtpd._line_num, line);
    }
}

#[test_case("2016-12-05 06:57:36.000 message", dt_utc(2016, 12, 5, 6, 57, 36); "space fractional")]
#[test_case("2016-12-05 06:57:36,000 message", dt_utc(2016, 12, 5, 6, 57, 36); "space fractional comma")]
#[test_case("2016-12-05T06:57:36 message", dt_utc(2016, 12, 5, 6, 57, 36); "iso")]
#[test_case("2016-12-05T07:57:36+01:00 message", dt_utc(2016, 12, 5, 6, 57, 36); "iso offset colon")]
#[test_case("2016-12-05T07:57:36.123456 +0100 message", dt_utc(2016, 12, 5, 6, 57, 36) + Duration::microseconds(123_456); "iso fractional space offset")]
#[test_case("2016-12-05T05:27:36.5 -01:30 message", dt_utc(2016, 12, 5, 6, 57, 36) + Duration::milliseconds(500); "iso fractional space offset colon")]
#[test_case("2016-12-05T06:57:36Z message", dt_utc(2016, 12, 5, 6, 57, 36); "iso zulu")]
#[test_case("2016-12-05 05:57:36 -0100 message", dt_utc(2016, 12, 5, 6, 57, 36); "space offset")]
#[test_case("Dec  5 06:57:36 2016 message", dt_utc(2016, 12, 5, 6, 57, 36); "ctime with year")]
#[test_case("Mon Dec  5 06:57:36 2016 message", dt_utc(2016, 12, 5, 6, 57, 36); "weekday ctime with year")]
#[test_case("Mon, 05 Dec 2016 06:57:36 +0000 message", dt_utc(2016, 12, 5, 6, 57, 36); "rfc 2822")]
#[test_case("Mon, 5 Dec 2016 08:57:36 EET message", dt_utc(2016, 12, 5, 6, 57, 36); "rfc 2822 named tz")]
fn test_parse_date(line: &str, expect: DateTimeL) {
    let recognizer = recognizer_utc();
    assert_eq!(recognizer.parse_date(line), Some(expect), "line {:?}", line);
}

#[test]
fn test_parse_date_fractional_offset() {
    let recognizer = recognizer_utc();
    let dt = recognizer
        .parse_date("2016-12-05T06:57:36.123456+01:00 msg")
        .unwrap();
    let expect = dt_utc(2016, 12, 5, 5, 57, 36) + Duration::microseconds(123456);
    assert_eq!(dt, expect);
    assert_eq!(dt.offset(), &*FO_P1);
}

#[test_case(""; "empty")]
#[test_case("no date here"; "words")]
#[test_case("Zookeeper started"; "leading Z")]
#[test_case("   2016-12-05 06:57:36 indented"; "not at start")]
#[test_case("2016-13-05 06:57:36 bad month"; "bad month")]
#[test_case("Mon, 5 Dec 2016 06:57:36 XYZ msg"; "unknown tz name")]
fn test_parse_date_none(line: &str) {
    let recognizer = recognizer_utc();
    assert_eq!(recognizer.parse_date(line), None, "line {:?}", line);
}

#[test]
fn test_parse_date_tz_offset_applied() {
    let recognizer = DateRecognizer::new(*FO_P1, *NOW_2016);
    let dt = recognizer.parse_date("2016-12-05 06:57:36 msg").unwrap();
    assert_eq!(dt, dt_utc(2016, 12, 5, 5, 57, 36));
    assert_eq!(dt.offset(), &*FO_P1);
}

#[test]
fn test_parse_date_offset_in_line_wins() {
    let recognizer = DateRecognizer::new(*FO_M8, *NOW_2016);
    let dt = recognizer.parse_date("2016-12-05T06:57:36+00:00 msg").unwrap();
    assert_eq!(dt, dt_utc(2016, 12, 5, 6, 57, 36));
}

#[test]
fn test_parse_date_yearless_previous_year() {
    // December is after "now" in January so it is last year's
    let recognizer = recognizer_utc_now(*NOW_2017);
    assert_eq!(
        recognizer.parse_date("Dec  5 06:57:36 host sshd[1]: msg"),
        Some(dt_utc(2016, 12, 5, 6, 57, 36)),
    );
}

#[test]
fn test_parse_date_yearless_this_year() {
    let recognizer = recognizer_utc_now(*NOW_2017);
    assert_eq!(
        recognizer.parse_date("Jan  9 23:00:00 host cron: msg"),
        Some(dt_utc(2017, 1, 9, 23, 0, 0)),
    );
}

#[test]
fn test_parse_date_yearless_leap_day() {
    let now = dt_utc(2017, 3, 1, 0, 0, 0);
    let recognizer = recognizer_utc_now(now);
    assert_eq!(
        recognizer.parse_date("Feb 29 12:00:00 host msg"),
        Some(dt_utc(2016, 2, 29, 12, 0, 0)),
    );
}

#[test]
fn test_parse_date_bytes() {
    let recognizer = recognizer_utc();
    assert_eq!(
        recognizer.parse_date_bytes(b"2016-12-05 06:57:36 msg \xFF\xFE"),
        Some(dt_utc(2016, 12, 5, 6, 57, 36)),
    );
    assert_eq!(recognizer.parse_date_bytes(b"\xFF\xFE 2016-12-05 06:57:36"), None);
}

#[test]
fn test_DateTagger_carry_forward() {
    let mut tagger = DateTagger::new(recognizer_utc());
    let dt = dt_utc(2016, 12, 5, 6, 57, 36);
    assert_eq!(tagger.tag("...continuation"), None);
    assert_eq!(tagger.tag("2016-12-05 06:57:36.000 message"), Some(dt));
    assert_eq!(tagger.tag("...continuation"), Some(dt));
}

#[test]
fn test_DateTagger_newer_date_replaces() {
    let mut tagger = DateTagger::new(recognizer_utc());
    tagger.tag("2016-12-05 06:57:36 first");
    assert_eq!(tagger.tag("2016-12-05 06:58:00 second"), Some(dt_utc(2016, 12, 5, 6, 58, 0)));
    assert_eq!(tagger.tag("  at frame"), Some(dt_utc(2016, 12, 5, 6, 58, 0)));
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// normalizers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test_case("Dec  5 06:57:36", "Dec 5 06:57:36")]
#[test_case("Dec 5 06:57:36", "Dec 5 06:57:36")]
fn test_normalize_spaces(input: &str, expect: &str) {
    assert_eq!(normalize_spaces(input), Cow::Borrowed(expect));
}

#[test_case("2016-12-05T06:57:36,123Z", "2016-12-05T06:57:36.123+0000")]
#[test_case("2016-12-05T06:57:36.123+01:00", "2016-12-05T06:57:36.123+0100")]
#[test_case("2016-12-05 06:57:36.000 -01:00", "2016-12-05 06:57:36.000-0100")]
#[test_case("2016-12-05 06:57:36,000+0100", "2016-12-05 06:57:36.000+0100")]
fn test_normalize_fractional_offset(input: &str, expect: &str) {
    assert_eq!(normalize_fractional_offset(input), Cow::Borrowed(expect));
}

#[test_case("05 Dec 06:57:36 UTC", "05 Dec 06:57:36 +0000")]
#[test_case("5 Dec 2016 06:57:36 PST", "5 Dec 2016 06:57:36 -0800")]
#[test_case("05 Dec 06:57:36 +0200", "05 Dec 06:57:36 +0200")]
fn test_normalize_named_tz(input: &str, expect: &str) {
    assert_eq!(normalize_named_tz(input), Cow::Borrowed(expect));
}

#[test_case("+01", Some(3600))]
#[test_case("+0100", Some(3600))]
#[test_case("-08:00", Some(-8 * 3600))]
#[test_case("+05:30", Some(5 * 3600 + 1800))]
#[test_case("UTC", Some(0))]
#[test_case("PST", Some(-8 * 3600))]
#[test_case("nowhere", None)]
#[test_case("", None)]
fn test_parse_tz_offset(input: &str, expect: Option<i32>) {
    let expect: Option<FixedOffset> = expect.map(|secs| FixedOffset::east_opt(secs).unwrap());
    assert_eq!(parse_tz_offset(input), expect);
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TimeInterval and comparisons
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn interval_0900_1000() -> TimeInterval {
    TimeInterval::new(dt_utc(2016, 12, 5, 9, 0, 0), dt_utc(2016, 12, 5, 10, 0, 0))
}

#[test]
fn test_TimeInterval_contains_boundaries() {
    let interval = interval_0900_1000();
    let us = Duration::microseconds(1);
    assert!(interval.contains(interval.start()));
    assert!(interval.contains(interval.end()));
    assert!(!interval.contains(&(*interval.start() - us)));
    assert!(!interval.contains(&(*interval.end() + us)));
    assert!(interval.contains(&dt_utc(2016, 12, 5, 9, 30, 0)));
}

#[test]
fn test_TimeInterval_other_offset() {
    let interval = interval_0900_1000();
    let dt = dt_utc(2016, 12, 5, 9, 30, 0).with_timezone(&*FO_M8);
    assert!(interval.contains(&dt));
}

#[test]
fn test_TimeInterval_display() {
    let interval = interval_0900_1000();
    assert_eq!(
        interval.to_string(),
        "[2016-12-05 09:00:00 +00:00, 2016-12-05 10:00:00 +00:00]"
    );
}

#[test]
fn test_dt_pass_filters() {
    let interval = interval_0900_1000();
    assert_eq!(dt_pass_filters(&dt_utc(2016, 12, 5, 8, 59, 59), &interval), Result_Filter_DateTime2::BeforeRange);
    assert_eq!(dt_pass_filters(&dt_utc(2016, 12, 5, 9, 0, 0), &interval), Result_Filter_DateTime2::InRange);
    assert_eq!(dt_pass_filters(&dt_utc(2016, 12, 5, 10, 0, 0), &interval), Result_Filter_DateTime2::InRange);
    assert_eq!(dt_pass_filters(&dt_utc(2016, 12, 5, 10, 0, 1), &interval), Result_Filter_DateTime2::AfterRange);
}

#[test]
fn test_dt_after_or_before() {
    let a = dt_utc(2016, 12, 5, 9, 0, 0);
    let b = dt_utc(2016, 12, 5, 9, 0, 1);
    assert_lt!(a, b);
    assert_eq!(dt_after_or_before(&a, &b), Result_Filter_DateTime1::OccursBefore);
    assert_eq!(dt_after_or_before(&b, &a), Result_Filter_DateTime1::OccursAtOrAfter);
    assert_eq!(dt_after_or_before(&a, &a), Result_Filter_DateTime1::OccursAtOrAfter);
    assert_eq!(*FO_0, *a.offset());
}
