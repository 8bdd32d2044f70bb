//! Playback state, position and the published snapshot

use std::fmt;

use bluray_api::{parse_time_to_secs, RawPositionInfo};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical playback state of the player
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    /// Powered off, unreachable, or failing to answer
    #[default]
    Off,
    /// Powered on in a state with no more specific mapping
    On,
    Idle,
    Playing,
    Paused,
}

impl PlaybackState {
    /// Map a raw transport status token
    ///
    /// Total: tokens without an exact match (including transitional ones
    /// like `TRANSITIONING` or `STOPPED`) map to [`PlaybackState::On`].
    pub fn from_status(status: &str) -> Self {
        match status {
            "PLAYING" => PlaybackState::Playing,
            "PAUSED_PLAYBACK" => PlaybackState::Paused,
            "OFF" => PlaybackState::Off,
            "IDLE" => PlaybackState::Idle,
            _ => PlaybackState::On,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlaybackState::Off => "off",
            PlaybackState::On => "on",
            PlaybackState::Idle => "idle",
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
        }
    }

    pub fn is_off(&self) -> bool {
        matches!(self, PlaybackState::Off)
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, PlaybackState::Playing)
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Duration and position of the current title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionInfo {
    pub duration_secs: u64,
    pub position_secs: u64,
    /// When the reading was taken
    pub observed_at: DateTime<Utc>,
}

impl PositionInfo {
    pub fn new(duration_secs: u64, position_secs: u64, observed_at: DateTime<Utc>) -> Self {
        Self {
            duration_secs,
            position_secs,
            observed_at,
        }
    }

    /// Convert a raw reading, `None` if either field does not parse
    pub fn from_raw(raw: &RawPositionInfo, observed_at: DateTime<Utc>) -> Option<Self> {
        Some(Self {
            duration_secs: parse_time_to_secs(&raw.duration)?,
            position_secs: parse_time_to_secs(&raw.position)?,
            observed_at,
        })
    }

    /// Position as a fraction of the duration (0.0 to 1.0)
    pub fn progress(&self) -> f64 {
        if self.duration_secs == 0 {
            0.0
        } else {
            (self.position_secs as f64 / self.duration_secs as f64).min(1.0)
        }
    }

    /// Position extrapolated to `now`, assuming playback kept running
    pub fn position_at(&self, now: DateTime<Utc>) -> u64 {
        let elapsed = (now - self.observed_at).num_seconds().max(0) as u64;
        let position = self.position_secs.saturating_add(elapsed);
        if self.duration_secs > 0 {
            position.min(self.duration_secs)
        } else {
            position
        }
    }
}

/// What consumers see after each successful refresh
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub state: PlaybackState,
    /// Always `None` while `state` is [`PlaybackState::Off`]
    pub position_info: Option<PositionInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rstest::rstest;

    #[rstest]
    #[case("PLAYING", PlaybackState::Playing)]
    #[case("PAUSED_PLAYBACK", PlaybackState::Paused)]
    #[case("OFF", PlaybackState::Off)]
    #[case("IDLE", PlaybackState::Idle)]
    #[case("STOPPED", PlaybackState::On)]
    #[case("TRANSITIONING", PlaybackState::On)]
    #[case("playing", PlaybackState::On)]
    #[case("", PlaybackState::On)]
    fn test_status_mapping(#[case] status: &str, #[case] expected: PlaybackState) {
        assert_eq!(PlaybackState::from_status(status), expected);
    }

    #[test]
    fn test_display() {
        assert_eq!(PlaybackState::Paused.to_string(), "paused");
        assert_eq!(PlaybackState::default(), PlaybackState::Off);
    }

    #[test]
    fn test_position_from_raw() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 20, 0, 0).unwrap();
        let raw = RawPositionInfo::new("1:52:07", "0:10:00");
        let info = PositionInfo::from_raw(&raw, now).unwrap();
        assert_eq!(info.duration_secs, 6727);
        assert_eq!(info.position_secs, 600);
        assert_eq!(info.observed_at, now);

        let bad = RawPositionInfo::new("NOT_IMPLEMENTED", "0:10:00");
        assert!(PositionInfo::from_raw(&bad, now).is_none());
    }

    #[test]
    fn test_position_extrapolation() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 20, 0, 0).unwrap();
        let info = PositionInfo::new(100, 90, now);
        assert_eq!(info.position_at(now + Duration::seconds(5)), 95);
        assert_eq!(info.position_at(now + Duration::seconds(50)), 100);
        assert_eq!(info.position_at(now - Duration::seconds(5)), 90);
        assert!((info.progress() - 0.9).abs() < f64::EPSILON);
    }
}
