use bstr::{BStr, BString, ByteSlice, ByteVec};
use chrono::Local;

use crate::error::UtilError;
use crate::Result;

/// A Unix timestamp paired with a timezone offset, as stored in author
/// and committer lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GitDate {
    /// Seconds since Unix epoch.
    pub timestamp: i64,
    /// Timezone offset in minutes from UTC (e.g., -300 for EST).
    pub tz_offset: i32,
}

/// Git's timezone offset is stored as a decimal integer (e.g. -0500 for
/// EST = -500 integer), not a minute count. Convert to true minutes.
fn tz_offset_to_minutes(tz: i32) -> i32 {
    let sign = if tz < 0 { -1 } else { 1 };
    let abs = tz.unsigned_abs() as i32;
    let hours = abs / 100;
    let mins = abs % 100;
    sign * (hours * 60 + mins)
}

/// Convert minutes offset back to git's decimal representation.
fn minutes_to_tz_offset(minutes: i32) -> i32 {
    let sign = if minutes < 0 { -1 } else { 1 };
    let abs = minutes.unsigned_abs() as i32;
    let hours = abs / 60;
    let mins = abs % 60;
    sign * (hours * 100 + mins)
}

impl GitDate {
    /// Build a date from a Unix timestamp and a minutes-from-UTC offset.
    pub fn new(timestamp: i64, tz_offset_minutes: i32) -> Self {
        Self {
            timestamp,
            tz_offset: tz_offset_minutes,
        }
    }

    /// The current time in the local timezone.
    pub fn now() -> Self {
        let now = Local::now();
        let offset_minutes = now.offset().local_minus_utc() / 60;
        Self {
            timestamp: now.timestamp(),
            tz_offset: offset_minutes,
        }
    }

    /// Parse the raw `"timestamp ±offset"` format used in commit headers.
    pub fn parse_raw(input: &str) -> Result<Self> {
        let input = input.trim();
        let mut parts = input.splitn(2, ' ');

        let timestamp: i64 = parts
            .next()
            .unwrap_or("")
            .parse()
            .map_err(|_| UtilError::DateParse(format!("invalid timestamp in '{input}'")))?;

        let tz_offset = match parts.next() {
            Some(tz_str) => {
                let tz_int: i32 = tz_str
                    .trim()
                    .parse()
                    .map_err(|_| UtilError::DateParse(format!("invalid timezone: '{tz_str}'")))?;
                tz_offset_to_minutes(tz_int)
            }
            None => 0,
        };

        Ok(Self {
            timestamp,
            tz_offset,
        })
    }

    /// Render in the raw `"timestamp ±offset"` format.
    pub fn format_raw(&self) -> String {
        let tz = minutes_to_tz_offset(self.tz_offset);
        format!("{} {:+05}", self.timestamp, tz)
    }
}

/// Author/committer identity with timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: BString,
    pub email: BString,
    pub date: GitDate,
}

impl Signature {
    /// Parse from `"Name <email> timestamp tz"`.
    pub fn parse(input: &BStr) -> Result<Self> {
        let input = input.as_bytes();

        let gt_pos = input
            .iter()
            .rposition(|&b| b == b'>')
            .ok_or_else(|| UtilError::DateParse("missing '>' in signature".into()))?;

        let lt_pos = input[..gt_pos]
            .iter()
            .rposition(|&b| b == b'<')
            .ok_or_else(|| UtilError::DateParse("missing '<' in signature".into()))?;

        let name = input[..lt_pos].trim();
        let email = &input[lt_pos + 1..gt_pos];

        let date_str = input[gt_pos + 1..].trim();
        let date_str = std::str::from_utf8(date_str)
            .map_err(|_| UtilError::DateParse("non-UTF-8 date in signature".into()))?;
        let date = GitDate::parse_raw(date_str)?;

        Ok(Self {
            name: BString::from(name),
            email: BString::from(email),
            date,
        })
    }

    /// Format as `"Name <email> timestamp tz"`.
    pub fn to_bytes(&self) -> BString {
        let mut out = BString::new(Vec::new());
        out.push_str(&self.name);
        out.push_str(b" <");
        out.push_str(&self.email);
        out.push_str(b"> ");
        out.push_str(self.date.format_raw().as_bytes());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_raw_utc() {
        let d = GitDate::parse_raw("1234567890 +0000").unwrap();
        assert_eq!(d.timestamp, 1234567890);
        assert_eq!(d.tz_offset, 0);
    }

    #[test]
    fn parse_raw_negative_tz() {
        let d = GitDate::parse_raw("1234567890 -0500").unwrap();
        assert_eq!(d.tz_offset, -300);
    }

    #[test]
    fn parse_raw_half_hour_tz() {
        let d = GitDate::parse_raw("1234567890 +0530").unwrap();
        assert_eq!(d.tz_offset, 330);
    }

    #[test]
    fn format_raw_utc() {
        let d = GitDate::new(1234567890, 0);
        assert_eq!(d.format_raw(), "1234567890 +0000");
    }

    #[test]
    fn format_raw_negative_tz() {
        let d = GitDate::new(1234567890, -300);
        assert_eq!(d.format_raw(), "1234567890 -0500");
    }

    #[test]
    fn tz_conversion_roundtrip() {
        assert_eq!(tz_offset_to_minutes(530), 330);
        assert_eq!(minutes_to_tz_offset(330), 530);
        assert_eq!(tz_offset_to_minutes(-500), -300);
        assert_eq!(minutes_to_tz_offset(-300), -500);
        assert_eq!(tz_offset_to_minutes(0), 0);
        assert_eq!(minutes_to_tz_offset(0), 0);
    }

    #[test]
    fn signature_parse() {
        let input = BStr::new(b"John Doe <john@example.com> 1234567890 +0000");
        let sig = Signature::parse(input).unwrap();
        assert_eq!(sig.name, BString::from("John Doe"));
        assert_eq!(sig.email, BString::from("john@example.com"));
        assert_eq!(sig.date.timestamp, 1234567890);
        assert_eq!(sig.date.tz_offset, 0);
    }

    #[test]
    fn signature_roundtrip() {
        let sig = Signature {
            name: BString::from("Jane Doe"),
            email: BString::from("jane@example.com"),
            date: GitDate::new(1234567890, -300),
        };
        let bytes = sig.to_bytes();
        assert_eq!(
            bytes,
            BString::from("Jane Doe <jane@example.com> 1234567890 -0500")
        );

        let parsed = Signature::parse(bytes.as_ref()).unwrap();
        assert_eq!(parsed, sig);
    }

    #[test]
    fn signature_name_with_spaces_is_trimmed() {
        let input = BStr::new(b"  Spacey Name  <a@b.com> 1000000000 +0000");
        let sig = Signature::parse(input).unwrap();
        assert_eq!(sig.name, BString::from("Spacey Name"));
    }
}
