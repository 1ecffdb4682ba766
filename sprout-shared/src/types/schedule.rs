use chrono::Timelike;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// How often a watering reminder recurs.
///
/// Persisted as the exact literals `"Day"`, `"Week"`, `"Month"` in the
/// `plant_reminders.each` and `customize_watering_reminders.type` columns;
/// parsing is case-sensitive to match what the scheduler stores and queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cadence {
    Day,
    Week,
    Month,
}

impl Cadence {
    pub const ALL: [Cadence; 3] = [Cadence::Day, Cadence::Week, Cadence::Month];

    pub fn as_str(&self) -> &'static str {
        match self {
            Cadence::Day => "Day",
            Cadence::Week => "Week",
            Cadence::Month => "Month",
        }
    }
}

impl std::fmt::Display for Cadence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown cadence {input:?}, expected \"Day\", \"Week\" or \"Month\"")]
pub struct ParseCadenceError {
    pub input: String,
}

impl std::str::FromStr for Cadence {
    type Err = ParseCadenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Day" => Ok(Cadence::Day),
            "Week" => Ok(Cadence::Week),
            "Month" => Ok(Cadence::Month),
            _ => Err(ParseCadenceError { input: s.to_string() }),
        }
    }
}

impl Serialize for Cadence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Cadence {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

/// A wall-clock time of day in 24-hour `"HH:MM"` form.
///
/// All reminder matching compares `WallTime` values formatted in the
/// process-wide fixed timezone; parsing is strict so a malformed stored
/// value shows up as a typed error instead of silently never matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WallTime {
    hour: u8,
    minute: u8,
}

impl WallTime {
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self { hour, minute })
    }

    /// The "HH:MM" of a timestamp, seconds discarded.
    pub fn of<Tz: chrono::TimeZone>(at: &chrono::DateTime<Tz>) -> Self {
        Self {
            hour: at.hour() as u8,
            minute: at.minute() as u8,
        }
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }
}

impl std::fmt::Display for WallTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid watering time {input:?}, expected 24-hour \"HH:MM\"")]
pub struct ParseWallTimeError {
    pub input: String,
}

impl std::str::FromStr for WallTime {
    type Err = ParseWallTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseWallTimeError { input: s.to_string() };

        let (h, m) = s.split_once(':').ok_or_else(err)?;
        if h.len() != 2 || m.len() != 2 {
            return Err(err());
        }
        let hour: u8 = h.parse().map_err(|_| err())?;
        let minute: u8 = m.parse().map_err(|_| err())?;
        WallTime::new(hour, minute).ok_or_else(err)
    }
}

impl Serialize for WallTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for WallTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

/// Parses a stored `watering_time` column such as `"06:00, 18:00"`.
///
/// Entries are split on `", "`; each entry parses independently so a
/// malformed one can be logged and skipped without losing the rest.
/// An empty or blank column yields no entries.
pub fn parse_time_list(raw: &str) -> Vec<Result<WallTime, ParseWallTimeError>> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    raw.split(", ").map(|entry| entry.parse()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cadence_literals_are_case_sensitive() {
        assert_eq!("Day".parse::<Cadence>().unwrap(), Cadence::Day);
        assert_eq!("Week".parse::<Cadence>().unwrap(), Cadence::Week);
        assert_eq!("Month".parse::<Cadence>().unwrap(), Cadence::Month);
        assert!("day".parse::<Cadence>().is_err());
        assert!("WEEK".parse::<Cadence>().is_err());
        assert!("Yearly".parse::<Cadence>().is_err());
    }

    #[test]
    fn cadence_round_trips() {
        for cadence in Cadence::ALL {
            assert_eq!(cadence.as_str().parse::<Cadence>().unwrap(), cadence);
        }
    }

    #[test]
    fn wall_time_parses_strict_hh_mm() {
        assert_eq!("06:00".parse::<WallTime>().unwrap(), WallTime::new(6, 0).unwrap());
        assert_eq!("23:59".parse::<WallTime>().unwrap(), WallTime::new(23, 59).unwrap());
        assert_eq!("00:00".parse::<WallTime>().unwrap().to_string(), "00:00");
    }

    #[test]
    fn wall_time_rejects_malformed_input() {
        for bad in ["6:00", "06:0", "24:00", "06:60", "0600", "06-00", "", "ab:cd", "06:00 "] {
            assert!(bad.parse::<WallTime>().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn time_list_splits_on_comma_space() {
        let parsed = parse_time_list("06:00, 18:00");
        let times: Vec<WallTime> = parsed.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(times, vec![WallTime::new(6, 0).unwrap(), WallTime::new(18, 0).unwrap()]);
    }

    #[test]
    fn time_list_surfaces_malformed_entries_individually() {
        let parsed = parse_time_list("06:00, late, 18:00");
        assert!(parsed[0].is_ok());
        assert_eq!(parsed[1], Err(ParseWallTimeError { input: "late".to_string() }));
        assert!(parsed[2].is_ok());
    }

    #[test]
    fn blank_time_list_is_empty() {
        assert!(parse_time_list("").is_empty());
        assert!(parse_time_list("   ").is_empty());
    }

    #[test]
    fn wall_time_of_truncates_seconds() {
        use chrono::{FixedOffset, TimeZone};
        let jakarta = FixedOffset::east_opt(7 * 3600).unwrap();
        let at = jakarta.with_ymd_and_hms(2024, 6, 1, 6, 0, 42).unwrap();
        assert_eq!(WallTime::of(&at).to_string(), "06:00");
    }
}
