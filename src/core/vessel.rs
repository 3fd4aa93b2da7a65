use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single vessel arrival or departure record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VesselEvent {
    /// Vessel name as it appears in the harbor register
    pub name: String,

    /// Rig / propulsion category
    pub kind: VesselType,

    /// Whether the vessel was entering or leaving the harbor
    pub direction: Direction,

    /// Calendar date of the movement
    pub date: NaiveDate,

    /// Registered tonnage
    pub tonnage: f64,
}

impl VesselEvent {
    pub fn new(name: &str, kind: VesselType, direction: Direction, date: NaiveDate, tonnage: f64) -> Self {
        Self {
            name: name.to_string(),
            kind,
            direction,
            date,
            tonnage,
        }
    }

    /// Date as a whole-day ordinal, the unit the time scale works in
    pub fn day_number(&self) -> i64 {
        day_number(self.date)
    }
}

/// Days since the Common Era epoch for a calendar date
pub fn day_number(date: NaiveDate) -> i64 {
    use chrono::Datelike;
    date.num_days_from_ce() as i64
}

/// Vessel rig / propulsion categories found in the register.
///
/// The seven named categories carry dedicated plot colors; anything else
/// is preserved verbatim in `Other` and rendered in a neutral color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VesselType {
    Bark,
    Brig,
    Schooner,
    Steamer,
    Ship,
    Sloop,
    Barkentine,
    Other(String),
}

impl VesselType {
    /// Parse a register string; unknown categories become `Other`
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "bark" => VesselType::Bark,
            "brig" => VesselType::Brig,
            "schooner" => VesselType::Schooner,
            "steamer" => VesselType::Steamer,
            "ship" => VesselType::Ship,
            "sloop" => VesselType::Sloop,
            "barkentine" => VesselType::Barkentine,
            other => VesselType::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            VesselType::Bark => "bark",
            VesselType::Brig => "brig",
            VesselType::Schooner => "schooner",
            VesselType::Steamer => "steamer",
            VesselType::Ship => "ship",
            VesselType::Sloop => "sloop",
            VesselType::Barkentine => "barkentine",
            VesselType::Other(name) => name,
        }
    }

    /// Steamers get a distinct tone timbre during playback
    pub fn is_steamer(&self) -> bool {
        matches!(self, VesselType::Steamer)
    }
}

/// Movement direction, controls the stereo pan of the vessel's cue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Inbound,
    Outbound,
}

impl Direction {
    /// Parse a register string; anything but inbound/outbound is rejected
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "inbound" => Some(Direction::Inbound),
            "outbound" => Some(Direction::Outbound),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Direction::Inbound => "Inbound",
            Direction::Outbound => "Outbound",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vessel_type_parse() {
        assert_eq!(VesselType::parse("Schooner"), VesselType::Schooner);
        assert_eq!(VesselType::parse(" steamer "), VesselType::Steamer);
        assert_eq!(
            VesselType::parse("Clipper"),
            VesselType::Other("clipper".to_string())
        );
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!(Direction::parse("Inbound"), Some(Direction::Inbound));
        assert_eq!(Direction::parse("OUTBOUND"), Some(Direction::Outbound));
        assert_eq!(Direction::parse("sideways"), None);
    }

    #[test]
    fn test_day_number_ordering() {
        let a = NaiveDate::from_ymd_opt(1890, 3, 1).unwrap();
        let b = NaiveDate::from_ymd_opt(1890, 3, 2).unwrap();
        assert_eq!(day_number(b) - day_number(a), 1);
    }
}
