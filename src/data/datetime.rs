// src/data/datetime.rs

//! Functions to find a datetime at the start of a log line and transform it
//! to a chrono [`DateTime`], plus the [`TimeInterval`] used to bound a query.
//!
//! Recognizing a datetime requires:
//! 1. matching the beginning of the line against each regular expression in
//!    [`DATETIME_PARSE_DATAS`], in order; the first match wins
//! 2. normalizing the matched substring (comma fractions, repeated spaces,
//!    named timezones) so chrono can read it
//! 3. interpreting it with the entry's chrono [`strftime`] pattern, in the
//!    line's own offset if it has one, else in the configured offset
//!
//! Datetimes without a year receive the year of "now"; a result after "now"
//! is moved back a year (a file that straddles New Year).
//!
//! [`DateRecognizer`] holds the configured offset and "now", both passed in
//! explicitly. [`DateTagger`] wraps a `DateRecognizer` and carries the last
//! recognized datetime forward to lines without one.
//!
//! [`DateTime`]: https://docs.rs/chrono/0.4.40/chrono/struct.DateTime.html
//! [`strftime`]: https://docs.rs/chrono/0.4.40/chrono/format/strftime/index.html

#![allow(non_camel_case_types)]
#![allow(non_upper_case_globals)]

use crate::debug::printers::str_to_String_noraw;

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

#[doc(hidden)]
pub use ::chrono::{
    DateTime,
    Datelike, // adds method `.year()` onto `DateTime`
    Duration,
    FixedOffset,
    Local,
    NaiveDateTime,
    NaiveTime,
    Offset,
    TimeZone,
    Timelike,
    Utc,
};
use ::const_format::concatcp;
use ::lazy_static::lazy_static;
use ::regex::Regex;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// DateTime Regex Matching and strftime formatting
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A _Year_ in a date
pub type Year = i32;

/// Crate `chrono` [`strftime`] formatting pattern, passed to
/// chrono [`DateTime::parse_from_str`] or [`NaiveDateTime::parse_from_str`].
///
/// [`strftime`]: https://docs.rs/chrono/0.4.40/chrono/format/strftime/index.html
/// [`DateTime::parse_from_str`]: https://docs.rs/chrono/0.4.40/chrono/struct.DateTime.html#method.parse_from_str
/// [`NaiveDateTime::parse_from_str`]: https://docs.rs/chrono/0.4.40/chrono/struct.NaiveDateTime.html#method.parse_from_str
pub type DateTimePattern_str = str;

/// Regular expression pattern, passed to [`regex::Regex`]. Must be anchored
/// at `^` and have exactly one capture group around the substring that is
/// handed to chrono.
///
/// [`regex::Regex`]: https://docs.rs/regex/1.11.1/regex/struct.Regex.html
pub type DateTimeRegex_str = str;

/// The chrono [`DateTime`] type used in _loganlib_.
///
/// [`DateTime`]: https://docs.rs/chrono/0.4.40/chrono/struct.DateTime.html
pub type DateTimeL = DateTime<FixedOffset>;
pub type DateTimeLOpt = Option<DateTimeL>;

/// Transforms the matched datetime substring into a form the entry's
/// `DateTimePattern_str` accepts.
pub type Normalizer = fn(&str) -> Cow<'_, str>;

/// How many leading bytes of a line are examined for a datetime.
/// Every pattern in [`DATETIME_PARSE_DATAS`] is anchored at the start of the
/// line and is shorter than this.
pub const DATETIME_PREFIX_MAX: usize = 64;

/// Instructions for recognizing one datetime format.
pub struct DateTimeParseInstr<'a> {
    /// regex pattern for matching the start of a line
    pub regex_pattern: &'a DateTimeRegex_str,
    /// chrono strftime pattern for the normalized capture
    pub dt_pattern: &'a DateTimePattern_str,
    /// does `dt_pattern` include a year?
    pub has_year: bool,
    /// does `dt_pattern` include a numeric offset (`%z`)?
    pub has_tz: bool,
    /// applied to the capture before chrono parsing
    pub normalizer: Normalizer,
    /// example lines that must be recognized by this entry, for testing
    pub _test_cases: &'a [&'a str],
    /// source code line number of the declaration, for test failure messages
    pub _line_num: u32,
}

impl fmt::Debug for DateTimeParseInstr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("DateTimeParseInstr")
            .field("regex_pattern", &self.regex_pattern)
            .field("dt_pattern", &self.dt_pattern)
            .field("has_year", &self.has_year)
            .field("has_tz", &self.has_tz)
            .field("_line_num", &self._line_num)
            .finish()
    }
}

// capture group patterns, used to compose the `regex_pattern` values

pub const CGP_YEAR: &str = r"[12]\d{3}";
pub const CGP_MONTHm: &str = r"\d{2}";
pub const CGP_MONTHb: &str = r"(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)";
pub const CGP_DAYd: &str = r"\d{2}";
/// day with optional space padding, e.g. `" 5"`, `"5"`, or `"15"`
pub const CGP_DAYe: &str = r"(?: ?\d|\d{2})";
pub const CGP_DAYa: &str = r"(?:Mon|Tue|Wed|Thu|Fri|Sat|Sun)";
pub const CGP_HMS: &str = r"\d{2}:\d{2}:\d{2}";
/// fractional seconds with point or comma
pub const CGP_FRACTIONAL: &str = r"[.,]\d{1,9}";
/// numeric offset `Z`, `+hhmm`, or `+hh:mm`
pub const CGP_TZz: &str = r"(?:Z|[+-]\d{2}:?\d{2})";
/// numeric offset `+hhmm` or named timezone `UTC`
pub const CGP_TZzZ: &str = r"(?:[+-]\d{4}|[A-Z]{1,5})";
/// date `YYYY-mm-dd`
pub const CGP_YMD: &str = concatcp!(CGP_YEAR, "-", CGP_MONTHm, "-", CGP_DAYd);

/// number of entries in [`DATETIME_PARSE_DATAS`]
pub const DATETIME_PARSE_DATAS_LEN: usize = 17;

/// Built-in datetime formats, in matching order. More specific formats come
/// before less specific ones that would match a prefix of them.
pub const DATETIME_PARSE_DATAS: [DateTimeParseInstr; DATETIME_PARSE_DATAS_LEN] = [
    // 2019-01-31T12:00:00.123456 +0100
    DateTimeParseInstr {
        regex_pattern: concatcp!("^(", CGP_YMD, "T", CGP_HMS, CGP_FRACTIONAL, " [+-]\\d{2}:?\\d{2})"),
        dt_pattern: "%Y-%m-%dT%H:%M:%S%.f%z",
        has_year: true,
        has_tz: true,
        normalizer: normalize_fractional_offset,
        _test_cases: &["2019-01-31T12:00:00.123456 +0100 msg", "2019-01-31T12:00:00,123 -01:30 msg"],
        _line_num: line!(),
    },
    // 2016-12-05T06:57:36.123456+01:00
    DateTimeParseInstr {
        regex_pattern: concatcp!("^(", CGP_YMD, "T", CGP_HMS, CGP_FRACTIONAL, CGP_TZz, ")"),
        dt_pattern: "%Y-%m-%dT%H:%M:%S%.f%z",
        has_year: true,
        has_tz: true,
        normalizer: normalize_fractional_offset,
        _test_cases: &["2016-12-05T06:57:36.123456+01:00 msg", "2016-12-05T06:57:36,123Z msg"],
        _line_num: line!(),
    },
    // 2016-12-05T06:57:36+0100
    DateTimeParseInstr {
        regex_pattern: concatcp!("^(", CGP_YMD, "T", CGP_HMS, CGP_TZz, ")"),
        dt_pattern: "%Y-%m-%dT%H:%M:%S%z",
        has_year: true,
        has_tz: true,
        normalizer: normalize_fractional_offset,
        _test_cases: &["2016-12-05T06:57:36+0100 msg", "2016-12-05T06:57:36Z"],
        _line_num: line!(),
    },
    // 2016-12-05T06:57:36.123
    DateTimeParseInstr {
        regex_pattern: concatcp!("^(", CGP_YMD, "T", CGP_HMS, CGP_FRACTIONAL, ")"),
        dt_pattern: "%Y-%m-%dT%H:%M:%S%.f",
        has_year: true,
        has_tz: false,
        normalizer: normalize_fractional_offset,
        _test_cases: &["2016-12-05T06:57:36.123 msg"],
        _line_num: line!(),
    },
    // 2016-12-05T06:57:36
    DateTimeParseInstr {
        regex_pattern: concatcp!("^(", CGP_YMD, "T", CGP_HMS, ")"),
        dt_pattern: "%Y-%m-%dT%H:%M:%S",
        has_year: true,
        has_tz: false,
        normalizer: noop,
        _test_cases: &["2016-12-05T06:57:36 msg"],
        _line_num: line!(),
    },
    // 2016-12-05 06:57:36,000+0100
    DateTimeParseInstr {
        regex_pattern: concatcp!("^(", CGP_YMD, " ", CGP_HMS, CGP_FRACTIONAL, " ?[+-]\\d{2}:?\\d{2})"),
        dt_pattern: "%Y-%m-%d %H:%M:%S%.f%z",
        has_year: true,
        has_tz: true,
        normalizer: normalize_fractional_offset,
        _test_cases: &["2016-12-05 06:57:36,000+0100 msg", "2016-12-05 06:57:36.000 -01:00 msg"],
        _line_num: line!(),
    },
    // 2016-12-05 06:57:36.000
    DateTimeParseInstr {
        regex_pattern: concatcp!("^(", CGP_YMD, " ", CGP_HMS, CGP_FRACTIONAL, ")"),
        dt_pattern: "%Y-%m-%d %H:%M:%S%.f",
        has_year: true,
        has_tz: false,
        normalizer: normalize_fractional_offset,
        _test_cases: &["2016-12-05 06:57:36.000 msg", "2016-12-05 06:57:36,000 msg"],
        _line_num: line!(),
    },
    // 2016-12-05 06:57:36 +0100
    DateTimeParseInstr {
        regex_pattern: concatcp!("^(", CGP_YMD, " ", CGP_HMS, " ?[+-]\\d{2}:?\\d{2})"),
        dt_pattern: "%Y-%m-%d %H:%M:%S%z",
        has_year: true,
        has_tz: true,
        normalizer: normalize_fractional_offset,
        _test_cases: &["2016-12-05 06:57:36 +0100 msg"],
        _line_num: line!(),
    },
    // 2016-12-05 06:57:36
    DateTimeParseInstr {
        regex_pattern: concatcp!("^(", CGP_YMD, " ", CGP_HMS, ")"),
        dt_pattern: "%Y-%m-%d %H:%M:%S",
        has_year: true,
        has_tz: false,
        normalizer: noop,
        _test_cases: &["2016-12-05 06:57:36 msg"],
        _line_num: line!(),
    },
    // Dec  5 06:57:36 2016
    DateTimeParseInstr {
        regex_pattern: concatcp!("^(", CGP_MONTHb, " ", CGP_DAYe, " ", CGP_HMS, " ", CGP_YEAR, ")"),
        dt_pattern: "%b %d %H:%M:%S %Y",
        has_year: true,
        has_tz: false,
        normalizer: normalize_spaces,
        _test_cases: &["Dec  5 06:57:36 2016 msg", "Dec 5 06:57:36 2016 msg"],
        _line_num: line!(),
    },
    // Mon Dec  5 06:57:36 2016
    DateTimeParseInstr {
        regex_pattern: concatcp!("^", CGP_DAYa, " (", CGP_MONTHb, " ", CGP_DAYe, " ", CGP_HMS, " ", CGP_YEAR, ")"),
        dt_pattern: "%b %d %H:%M:%S %Y",
        has_year: true,
        has_tz: false,
        normalizer: normalize_spaces,
        _test_cases: &["Mon Dec  5 06:57:36 2016 msg"],
        _line_num: line!(),
    },
    // Mon, 05 Dec 2016 06:57:36 +0000
    DateTimeParseInstr {
        regex_pattern: concatcp!("^", CGP_DAYa, ",? (\\d{1,2} ", CGP_MONTHb, " ", CGP_YEAR, " ", CGP_HMS, " ", CGP_TZzZ, ")"),
        dt_pattern: "%d %b %Y %H:%M:%S %z",
        has_year: true,
        has_tz: true,
        normalizer: normalize_named_tz,
        _test_cases: &["Mon, 05 Dec 2016 06:57:36 +0000 msg", "Mon, 5 Dec 2016 06:57:36 GMT msg"],
        _line_num: line!(),
    },
    // Mon, 05 Dec 06:57:36.000 +0000
    DateTimeParseInstr {
        regex_pattern: concatcp!("^", CGP_DAYa, ",? (", CGP_DAYd, " ", CGP_MONTHb, " ", CGP_HMS, "\\.\\d{3} ", CGP_TZzZ, ")"),
        dt_pattern: "%d %b %H:%M:%S%.f %z",
        has_year: false,
        has_tz: true,
        normalizer: normalize_named_tz,
        _test_cases: &["Mon, 05 Dec 06:57:36.000 +0000 msg", "Mon, 05 Dec 06:57:36.000 UTC msg"],
        _line_num: line!(),
    },
    // Mon, 05 Dec 06:57:36 UTC
    DateTimeParseInstr {
        regex_pattern: concatcp!("^", CGP_DAYa, ",? (", CGP_DAYd, " ", CGP_MONTHb, " ", CGP_HMS, " ", CGP_TZzZ, ")"),
        dt_pattern: "%d %b %H:%M:%S %z",
        has_year: false,
        has_tz: true,
        normalizer: normalize_named_tz,
        _test_cases: &["Mon, 05 Dec 06:57:36 UTC msg", "Mon 05 Dec 06:57:36 +0000 msg"],
        _line_num: line!(),
    },
    // Mon Dec  5 06:57:36.000
    DateTimeParseInstr {
        regex_pattern: concatcp!("^", CGP_DAYa, " (", CGP_MONTHb, " ", CGP_DAYe, " ", CGP_HMS, "\\.\\d{3})"),
        dt_pattern: "%b %d %H:%M:%S%.f",
        has_year: false,
        has_tz: false,
        normalizer: normalize_spaces,
        _test_cases: &["Mon Dec  5 06:57:36.000 msg"],
        _line_num: line!(),
    },
    // Mon Dec  5 06:57:36
    DateTimeParseInstr {
        regex_pattern: concatcp!("^", CGP_DAYa, " (", CGP_MONTHb, " ", CGP_DAYe, " ", CGP_HMS, ")"),
        dt_pattern: "%b %d %H:%M:%S",
        has_year: false,
        has_tz: false,
        normalizer: normalize_spaces,
        _test_cases: &["Mon Dec  5 06:57:36 msg"],
        _line_num: line!(),
    },
    // Dec  5 06:57:36 (syslog)
    DateTimeParseInstr {
        regex_pattern: concatcp!("^(", CGP_MONTHb, " ", CGP_DAYe, " ", CGP_HMS, ")"),
        dt_pattern: "%b %d %H:%M:%S",
        has_year: false,
        has_tz: false,
        normalizer: normalize_spaces,
        _test_cases: &["Dec  5 06:57:36 host sshd[1]: msg", "Dec 5 06:57:36 msg"],
        _line_num: line!(),
    },
];

lazy_static! {
    /// Run-time created copy of [`DATETIME_PARSE_DATAS`] with compiled
    /// [`Regex`].
    ///
    /// [`Regex`]: https://docs.rs/regex/1.11.1/regex/struct.Regex.html
    pub(crate) static ref DATETIME_PARSE_DATAS_REGEX_VEC: Vec<Regex> =
        DATETIME_PARSE_DATAS.iter().map(
            |x| Regex::new(x.regex_pattern).unwrap()
        ).collect();

    static ref REGEX_MULTISPACE: Regex = Regex::new(r"\s+").unwrap();

    /// Named timezones accepted in place of a numeric offset.
    pub static ref MAP_TZZ_TO_TZz: HashMap<&'static str, &'static str> = {
        HashMap::from([
            ("UT", "+0000"),
            ("UTC", "+0000"),
            ("GMT", "+0000"),
            ("Z", "+0000"),
            ("WET", "+0000"),
            ("BST", "+0100"),
            ("CET", "+0100"),
            ("WEST", "+0100"),
            ("CEST", "+0200"),
            ("EET", "+0200"),
            ("EEST", "+0300"),
            ("MSK", "+0300"),
            ("JST", "+0900"),
            ("KST", "+0900"),
            ("AEST", "+1000"),
            ("AEDT", "+1100"),
            ("NZST", "+1200"),
            ("AST", "-0400"),
            ("EDT", "-0400"),
            ("EST", "-0500"),
            ("CDT", "-0500"),
            ("CST", "-0600"),
            ("MDT", "-0600"),
            ("MST", "-0700"),
            ("PDT", "-0700"),
            ("PST", "-0800"),
            ("AKST", "-0900"),
            ("HST", "-1000"),
        ])
    };
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// normalizers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Pass through unchanged.
pub fn noop(value: &str) -> Cow<'_, str> {
    Cow::Borrowed(value)
}

/// Collapse runs of whitespace to one space, e.g. `"Dec  5"` to `"Dec 5"`.
pub fn normalize_spaces(value: &str) -> Cow<'_, str> {
    REGEX_MULTISPACE.replace_all(value, " ")
}

/// Fractional comma to point, trailing `Z` to `+0000`, `+hh:mm` to `+hhmm`,
/// and drop a space before the offset.
pub fn normalize_fractional_offset(value: &str) -> Cow<'_, str> {
    let mut s: String = value.replace(',', ".");
    if let Some(stripped) = s.strip_suffix('Z') {
        s = format!("{}+0000", stripped);
    }
    // offset is the last 5 or 6 chars: `+hhmm` or `+hh:mm`
    let len = s.len();
    if len >= 6 && s.is_char_boundary(len - 6) {
        let tail = &s[len - 6..];
        let bytes = tail.as_bytes();
        if (bytes[0] == b'+' || bytes[0] == b'-') && bytes[3] == b':' {
            s = format!("{}{}{}", &s[..len - 6], &tail[..3], &tail[4..]);
        }
    }
    let len = s.len();
    if len >= 6 && s.as_bytes()[len - 6] == b' ' && s.is_char_boundary(len - 5) {
        let b5 = s.as_bytes()[len - 5];
        if b5 == b'+' || b5 == b'-' {
            s.remove(len - 6);
        }
    }

    Cow::Owned(s)
}

/// Replace a trailing named timezone with its numeric offset and drop any
/// comma. Unknown names are left as is (and chrono will reject them).
pub fn normalize_named_tz(value: &str) -> Cow<'_, str> {
    let value = value.replace(',', "");
    match value.rsplit_once(' ') {
        Some((head, tz)) => match MAP_TZZ_TO_TZz.get(tz) {
            Some(tz_num) => Cow::Owned(format!("{} {}", head, tz_num)),
            None => Cow::Owned(value),
        },
        None => Cow::Owned(value),
    }
}

/// Parse a timezone offset given by the user, e.g. `"+02"`, `"-0800"`,
/// `"+05:30"`, or a name in [`MAP_TZZ_TO_TZz`] such as `"PST"`.
pub fn parse_tz_offset(value: &str) -> Option<FixedOffset> {
    let numeric: &str = match MAP_TZZ_TO_TZz.get(value) {
        Some(numeric) => numeric,
        None => value,
    };
    // chrono reads a bare offset only with a datetime around it
    let data: String = format!("2000-01-02 03:04:05 {}", numeric);
    for pattern in ["%Y-%m-%d %H:%M:%S %:z", "%Y-%m-%d %H:%M:%S %z", "%Y-%m-%d %H:%M:%S %#z"] {
        if let Ok(dt) = DateTime::parse_from_str(&data, pattern) {
            return Some(*dt.offset());
        }
    }

    None
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// DateRecognizer
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Stateless datetime recognition for log lines.
///
/// `tz_offset` is applied to datetimes that carry no offset of their own.
/// `now` resolves year-less datetimes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DateRecognizer {
    tz_offset: FixedOffset,
    now: DateTimeL,
}

impl DateRecognizer {
    pub fn new(tz_offset: FixedOffset, now: DateTimeL) -> DateRecognizer {
        DateRecognizer { tz_offset, now }
    }

    pub const fn tz_offset(&self) -> &FixedOffset {
        &self.tz_offset
    }

    pub const fn now(&self) -> &DateTimeL {
        &self.now
    }

    /// Return the datetime at the beginning of `line`, if any.
    pub fn parse_date(&self, line: &str) -> DateTimeLOpt {
        for (index, dtpd) in DATETIME_PARSE_DATAS.iter().enumerate() {
            let captures = match DATETIME_PARSE_DATAS_REGEX_VEC[index].captures(line) {
                Some(captures) => captures,
                None => continue,
            };
            let matched: &str = match captures.get(1) {
                Some(m) => m.as_str(),
                None => continue,
            };
            let normalized: Cow<str> = (dtpd.normalizer)(matched);
            defo!("index {} matched {:?} normalized {:?}", index, matched, normalized);
            let dt: DateTimeLOpt = match dtpd.has_year {
                true => self.parse_with_pattern(&normalized, dtpd.dt_pattern, dtpd.has_tz),
                false => self.parse_yearless(&normalized, dtpd.dt_pattern, dtpd.has_tz),
            };
            if dt.is_some() {
                defñ!("return {:?} for {:?}", dt, str_to_String_noraw(line));
                return dt;
            }
        }

        None
    }

    /// Like [`parse_date`] for raw bytes. Only the first
    /// [`DATETIME_PREFIX_MAX`] bytes are examined.
    ///
    /// [`parse_date`]: DateRecognizer::parse_date
    pub fn parse_date_bytes(&self, line: &[u8]) -> DateTimeLOpt {
        let end: usize = std::cmp::min(line.len(), DATETIME_PREFIX_MAX);
        let prefix: Cow<str> = String::from_utf8_lossy(&line[..end]);

        self.parse_date(&prefix)
    }

    fn parse_with_pattern(
        &self,
        value: &str,
        pattern: &DateTimePattern_str,
        has_tz: bool,
    ) -> DateTimeLOpt {
        if has_tz {
            return DateTime::parse_from_str(value, pattern).ok();
        }
        let naive: NaiveDateTime = NaiveDateTime::parse_from_str(value, pattern).ok()?;

        self.tz_offset.from_local_datetime(&naive).single()
    }

    /// Try the year of `now`, then preceding years, returning the first
    /// datetime that is not after `now`. Trying several years handles
    /// `Feb 29`.
    fn parse_yearless(
        &self,
        value: &str,
        pattern: &DateTimePattern_str,
        has_tz: bool,
    ) -> DateTimeLOpt {
        let year_now: Year = self.now.with_timezone(&self.tz_offset).year();
        let pattern_y: String = format!("%Y {}", pattern);
        for year in (year_now - 4..=year_now).rev() {
            let value_y: String = format!("{} {}", year, value);
            if let Some(dt) = self.parse_with_pattern(&value_y, &pattern_y, has_tz) {
                if dt <= self.now {
                    return Some(dt);
                }
            }
        }

        None
    }
}

/// Stateful wrapper of a [`DateRecognizer`] that carries forward the most
/// recently recognized datetime to lines without one (e.g. continuation
/// lines of a stack trace). Lines before the first recognized datetime get
/// `None`.
#[derive(Clone, Debug)]
pub struct DateTagger {
    recognizer: DateRecognizer,
    last: DateTimeLOpt,
}

impl DateTagger {
    pub fn new(recognizer: DateRecognizer) -> DateTagger {
        DateTagger { recognizer, last: None }
    }

    /// Return the datetime for `line`, recognized or carried forward.
    pub fn tag(&mut self, line: &str) -> DateTimeLOpt {
        if let Some(dt) = self.recognizer.parse_date(line) {
            self.last = Some(dt);
        }

        self.last
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TimeInterval and DateTime comparisons
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A window of time `[start, end]`. Immutable once constructed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TimeInterval {
    start: DateTimeL,
    end: DateTimeL,
}

impl TimeInterval {
    pub fn new(start: DateTimeL, end: DateTimeL) -> TimeInterval {
        TimeInterval { start, end }
    }

    pub const fn start(&self) -> &DateTimeL {
        &self.start
    }

    pub const fn end(&self) -> &DateTimeL {
        &self.end
    }

    /// Inclusive of both `start` and `end`.
    pub fn contains(&self, dt: &DateTimeL) -> bool {
        dt_pass_filters(dt, self).is_pass()
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// Describe the result of comparing one [`DateTimeL`] to one DateTime Filter.
#[derive(Debug, Eq, PartialEq)]
pub enum Result_Filter_DateTime1 {
    OccursAtOrAfter,
    OccursBefore,
}

impl Result_Filter_DateTime1 {
    /// Returns `true` if the result is `OccursAtOrAfter`.
    #[inline(always)]
    pub const fn is_after(&self) -> bool {
        matches!(*self, Result_Filter_DateTime1::OccursAtOrAfter)
    }

    /// Returns `true` if the result is `OccursBefore`.
    #[inline(always)]
    pub const fn is_before(&self) -> bool {
        matches!(*self, Result_Filter_DateTime1::OccursBefore)
    }
}

/// Describe the result of comparing one [`DateTimeL`] to a [`TimeInterval`].
#[derive(Debug, Eq, PartialEq)]
pub enum Result_Filter_DateTime2 {
    /// like Pass
    InRange,
    /// like Fail
    BeforeRange,
    /// like Fail
    AfterRange,
}

impl Result_Filter_DateTime2 {
    #[inline(always)]
    pub const fn is_pass(&self) -> bool {
        matches!(*self, Result_Filter_DateTime2::InRange)
    }

    #[inline(always)]
    pub const fn is_fail(&self) -> bool {
        matches!(*self, Result_Filter_DateTime2::AfterRange | Result_Filter_DateTime2::BeforeRange)
    }
}

/// Compare passed [`DateTimeL`] `dt` to the passed filter `dt_filter`.
///
/// If `dt` is at or after `dt_filter` then return [`OccursAtOrAfter`]<br/>
/// If `dt` is before `dt_filter` then return [`OccursBefore`]
///
/// [`OccursAtOrAfter`]: crate::data::datetime::Result_Filter_DateTime1
/// [`OccursBefore`]: crate::data::datetime::Result_Filter_DateTime1
pub fn dt_after_or_before(
    dt: &DateTimeL,
    dt_filter: &DateTimeL,
) -> Result_Filter_DateTime1 {
    if dt < dt_filter {
        return Result_Filter_DateTime1::OccursBefore;
    }

    Result_Filter_DateTime1::OccursAtOrAfter
}

/// Is `dt` before ([`BeforeRange`]), after ([`AfterRange`]), or within
/// ([`InRange`]) the `interval`?
///
/// Comparisons are "inclusive" i.e. `dt` == `interval.start()` will return
/// `InRange`, as will `dt` == `interval.end()`.
///
/// [`AfterRange`]: crate::data::datetime::Result_Filter_DateTime2::AfterRange
/// [`BeforeRange`]: crate::data::datetime::Result_Filter_DateTime2::BeforeRange
/// [`InRange`]: crate::data::datetime::Result_Filter_DateTime2::InRange
pub fn dt_pass_filters(
    dt: &DateTimeL,
    interval: &TimeInterval,
) -> Result_Filter_DateTime2 {
    if dt < interval.start() {
        return Result_Filter_DateTime2::BeforeRange;
    }
    if interval.end() < dt {
        return Result_Filter_DateTime2::AfterRange;
    }

    Result_Filter_DateTime2::InRange
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// other miscellaneous DateTime function helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Create a [`DateTimeL`] from the passed arguments. Returns `None` for
/// an impossible datetime.
pub fn ymdhms(
    fixedoffset: &FixedOffset,
    year: Year,
    month: u32,
    day: u32,
    hour: u32,
    min: u32,
    sec: u32,
) -> DateTimeLOpt {
    fixedoffset
        .with_ymd_and_hms(year, month, day, hour, min, sec)
        .single()
}

