use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The season carried by a semester code's term digit. Digits 1-3 map to a
/// season; 0 and 4 are storable but have no season entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Spring,
    Summer,
    Fall,
}

impl Season {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Spring => "Spring",
            Self::Summer => "Summer",
            Self::Fall => "Fall",
        }
    }

    const fn start_month(self) -> u32 {
        match self {
            Self::Spring => 1,
            Self::Summer => 6,
            Self::Fall => 8,
        }
    }
}

/// A 5-character semester code: a 4-digit year followed by a term digit in
/// `0..=4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Semester {
    year: u16,
    term: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Not a valid semester.")]
pub struct SemesterParseError;

impl Semester {
    pub fn new(year: u16, term: u8) -> Result<Self, SemesterParseError> {
        if year > 9999 || term > 4 {
            return Err(SemesterParseError);
        }
        Ok(Self { year, term })
    }

    pub const fn year(&self) -> u16 {
        self.year
    }

    pub const fn term(&self) -> u8 {
        self.term
    }

    /// The season named by the term digit, when one exists.
    pub const fn season(&self) -> Option<Season> {
        match self.term {
            1 => Some(Season::Spring),
            2 => Some(Season::Summer),
            3 => Some(Season::Fall),
            _ => None,
        }
    }

    /// Human-readable rendering, e.g. `"Fall 2010"` for `20103`. Codes whose
    /// term digit has no season (0 and 4) have no nice name.
    pub fn nice_name(&self) -> Option<String> {
        self.season()
            .map(|season| format!("{} {}", season.label(), self.year))
    }

    /// The instant the semester begins, used as the lower bound of the
    /// "current events" window. Termless codes fall back to the start of the
    /// calendar year.
    pub fn start_time(&self) -> DateTime<Utc> {
        let month = self.season().map(Season::start_month).unwrap_or(1);
        Utc.with_ymd_and_hms(i32::from(self.year), month, 1, 0, 0, 0)
            .single()
            .unwrap_or_else(|| DateTime::<Utc>::MIN_UTC)
    }

    pub fn code(&self) -> String {
        format!("{:04}{}", self.year, self.term)
    }
}

impl FromStr for Semester {
    type Err = SemesterParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let bytes = value.as_bytes();
        if bytes.len() != 5 || !bytes.iter().all(u8::is_ascii_digit) {
            return Err(SemesterParseError);
        }

        let year = value[..4].parse::<u16>().map_err(|_| SemesterParseError)?;
        let term = bytes[4] - b'0';
        Self::new(year, term)
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code())
    }
}

impl Serialize for Semester {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.code())
    }
}

impl<'de> Deserialize<'de> for Semester {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
