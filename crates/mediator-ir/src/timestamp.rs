//! `xs:dateTime` values
//!
//! A timestamp keeps the form it was written in: values with an offset (or
//! `Z`) stay zoned, values without one stay local, and the fractional seconds
//! keep every digit. Rendering a parsed value yields the same lexical fields,
//! with a zero offset written as `Z`.
//!
//! The lexical check follows XML Schema rather than RFC 3339: the year has at
//! least four digits (`0000` is 1 BCE), `24:00:00` is the first instant of the
//! next day, leap seconds are rejected and the offset must be `Z` or
//! `±hh:mm` within `±14:00`. Chrono validates the calendar date and provides
//! the instant used for comparisons.

use crate::{Error, Result};
use chrono::{DateTime, Days, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use std::fmt;
use std::str::FromStr;

const NANO_DIGITS: usize = 9;
const MAX_OFFSET_MINUTES: u32 = 14 * 60;

/// A point in time as carried by `xs:dateTime` elements
#[derive(Debug, Clone)]
pub struct Timestamp {
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
    /// Fraction digits as written, without the dot
    fraction: String,
    instant: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Instant {
    Zoned(DateTime<FixedOffset>),
    Local(NaiveDateTime),
}

impl Timestamp {
    /// Parse an `xs:dateTime` lexical value. Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timestamp`] when the value is not a valid date-time.
    pub fn parse(value: &str) -> Result<Self> {
        parse_lexical(value.trim()).map_err(|reason| Error::timestamp(value, reason))
    }

    /// Whether the value carries an offset
    #[must_use]
    pub fn is_zoned(&self) -> bool {
        matches!(self.instant, Instant::Zoned(_))
    }

    /// The offset, if the value carries one
    #[must_use]
    pub fn offset(&self) -> Option<FixedOffset> {
        match self.instant {
            Instant::Zoned(dt) => Some(*dt.offset()),
            Instant::Local(_) => None,
        }
    }

    /// Wall-clock date and time, truncated to nanoseconds
    #[must_use]
    pub fn naive_local(&self) -> NaiveDateTime {
        match self.instant {
            Instant::Zoned(dt) => dt.naive_local(),
            Instant::Local(dt) => dt,
        }
    }

    /// Fraction digits past nanosecond precision, trailing zeros removed
    fn sub_nanos(&self) -> &str {
        self.fraction
            .get(NANO_DIGITS..)
            .map_or("", |digits| digits.trim_end_matches('0'))
    }
}

/// Two timestamps are equal when they denote the same instant in the same
/// kind (zoned or local), whatever offset or hour-24 spelling they use.
impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        self.instant == other.instant && self.sub_nanos() == other.sub_nanos()
    }
}

impl Eq for Timestamp {}

impl FromStr for Timestamp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.year < 0 {
            f.write_str("-")?;
        }
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
            self.year.unsigned_abs(),
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second
        )?;
        if !self.fraction.is_empty() {
            write!(f, ".{}", self.fraction)?;
        }

        match self.offset().map(|offset| offset.local_minus_utc()) {
            None => Ok(()),
            Some(0) => f.write_str("Z"),
            Some(seconds) => {
                let sign = if seconds < 0 { '-' } else { '+' };
                let minutes = seconds.unsigned_abs() / 60;
                write!(f, "{sign}{:02}:{:02}", minutes / 60, minutes % 60)
            }
        }
    }
}

/// Cursor over an ASCII lexical value
struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, byte: u8, context: &str) -> std::result::Result<(), String> {
        if self.eat(byte) {
            Ok(())
        } else {
            Err(format!("expected '{}' {context}", char::from(byte)))
        }
    }

    fn digits(&mut self) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        self.input.get(start..self.pos).unwrap_or_default()
    }

    fn two_digits(&mut self, field: &str) -> std::result::Result<u32, String> {
        let digits = self.digits();
        if digits.len() != 2 {
            return Err(format!("{field} must have exactly two digits"));
        }
        digits
            .parse()
            .map_err(|_| format!("{field} '{digits}' is not a number"))
    }

    fn is_done(&self) -> bool {
        self.pos == self.input.len()
    }
}

fn parse_lexical(text: &str) -> std::result::Result<Timestamp, String> {
    let mut scanner = Scanner::new(text);

    let negative = scanner.eat(b'-');
    let year_digits = scanner.digits();
    if year_digits.len() < 4 {
        return Err("year must have at least four digits".to_string());
    }
    if year_digits.len() > 4 && year_digits.starts_with('0') {
        return Err("a year of more than four digits must not start with 0".to_string());
    }
    let magnitude: i32 = year_digits
        .parse()
        .map_err(|_| format!("year {year_digits} is out of range"))?;
    if negative && magnitude == 0 {
        return Err("year -0000 is not allowed".to_string());
    }
    let year = if negative { -magnitude } else { magnitude };

    scanner.expect(b'-', "after the year")?;
    let month = scanner.two_digits("month")?;
    scanner.expect(b'-', "after the month")?;
    let day = scanner.two_digits("day")?;
    scanner.expect(b'T', "between date and time")?;
    let hour = scanner.two_digits("hour")?;
    scanner.expect(b':', "after the hour")?;
    let minute = scanner.two_digits("minute")?;
    scanner.expect(b':', "after the minute")?;
    let second = scanner.two_digits("second")?;

    let fraction = if scanner.eat(b'.') {
        let digits = scanner.digits();
        if digits.is_empty() {
            return Err("fractional seconds need at least one digit".to_string());
        }
        digits.to_string()
    } else {
        String::new()
    };

    let offset = parse_offset(&mut scanner)?;
    if !scanner.is_done() {
        return Err(format!(
            "unexpected '{}' after the time",
            text.get(scanner.pos..).unwrap_or_default()
        ));
    }

    if minute > 59 {
        return Err(format!("minute {minute:02} is out of range"));
    }
    if second > 59 {
        return Err(format!("second {second:02} is out of range"));
    }
    let end_of_day = hour == 24;
    if hour > 24 || (end_of_day && (minute, second) != (0, 0)) || (end_of_day && !is_zero(&fraction)) {
        return Err("hour must be 00-23, or 24 only as 24:00:00".to_string());
    }

    let date = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| format!("{year:04}-{month:02}-{day:02} is not a supported calendar date"))?;
    let time = NaiveTime::from_hms_nano_opt(hour % 24, minute, second, fraction_nanos(&fraction))
        .ok_or_else(|| "time of day is out of range".to_string())?;
    let mut local = date.and_time(time);
    if end_of_day {
        local = local
            .checked_add_days(Days::new(1))
            .ok_or_else(|| "date is outside the supported range".to_string())?;
    }

    let instant = match offset {
        Some(offset) => Instant::Zoned(
            offset
                .from_local_datetime(&local)
                .single()
                .ok_or_else(|| "date is outside the supported range".to_string())?,
        ),
        None => Instant::Local(local),
    };

    Ok(Timestamp {
        year,
        month,
        day,
        hour,
        minute,
        second,
        fraction,
        instant,
    })
}

fn parse_offset(scanner: &mut Scanner<'_>) -> std::result::Result<Option<FixedOffset>, String> {
    let negative = match scanner.peek() {
        None => return Ok(None),
        Some(b'Z') => {
            scanner.pos += 1;
            return Ok(FixedOffset::east_opt(0));
        }
        Some(b'+') => false,
        Some(b'-') => true,
        Some(_) => return Err("offset must be 'Z' or +hh:mm / -hh:mm".to_string()),
    };
    scanner.pos += 1;

    let hours = scanner.two_digits("offset hour")?;
    scanner.expect(b':', "in the offset")?;
    let minutes = scanner.two_digits("offset minute")?;
    let total = hours * 60 + minutes;
    if minutes > 59 || total > MAX_OFFSET_MINUTES {
        return Err(format!("offset {hours:02}:{minutes:02} is out of range"));
    }

    let seconds = i32::try_from(total * 60).map_err(|_| "offset is out of range".to_string())?;
    let offset = if negative {
        FixedOffset::west_opt(seconds)
    } else {
        FixedOffset::east_opt(seconds)
    };
    offset
        .map(Some)
        .ok_or_else(|| "offset is out of range".to_string())
}

fn is_zero(digits: &str) -> bool {
    digits.bytes().all(|b| b == b'0')
}

/// Leading fraction digits as nanoseconds, right-padded with zeros
fn fraction_nanos(fraction: &str) -> u32 {
    fraction
        .bytes()
        .chain(std::iter::repeat(b'0'))
        .take(NANO_DIGITS)
        .fold(0, |acc, b| acc * 10 + u32::from(b - b'0'))
}
