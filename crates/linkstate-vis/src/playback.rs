//! Playback speed and status of the animation timeline.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::phase::Phase;

/// Playback speed multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlaybackSpeed {
    /// 0.25x speed
    Quarter,
    /// 0.5x speed
    Half,
    /// Normal speed (1x)
    #[default]
    Normal,
    /// 2x speed
    Double,
    /// 4x speed
    Quadruple,
    /// 10x speed
    TenX,
    /// Maximum speed (no waiting at all)
    Maximum,
}

impl PlaybackSpeed {
    /// All speeds, slowest first.
    pub const ALL: [PlaybackSpeed; 7] = [
        PlaybackSpeed::Quarter,
        PlaybackSpeed::Half,
        PlaybackSpeed::Normal,
        PlaybackSpeed::Double,
        PlaybackSpeed::Quadruple,
        PlaybackSpeed::TenX,
        PlaybackSpeed::Maximum,
    ];

    /// Get the speed multiplier.
    pub fn multiplier(&self) -> f64 {
        match self {
            PlaybackSpeed::Quarter => 0.25,
            PlaybackSpeed::Half => 0.5,
            PlaybackSpeed::Normal => 1.0,
            PlaybackSpeed::Double => 2.0,
            PlaybackSpeed::Quadruple => 4.0,
            PlaybackSpeed::TenX => 10.0,
            PlaybackSpeed::Maximum => f64::INFINITY,
        }
    }

    /// Wall-clock time that a span of animation time takes at this speed.
    pub fn scale(&self, virtual_time: Duration) -> Duration {
        match self {
            PlaybackSpeed::Maximum => Duration::ZERO,
            speed => virtual_time.div_f64(speed.multiplier()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlaybackSpeed::Quarter => "quarter",
            PlaybackSpeed::Half => "half",
            PlaybackSpeed::Normal => "normal",
            PlaybackSpeed::Double => "double",
            PlaybackSpeed::Quadruple => "quadruple",
            PlaybackSpeed::TenX => "ten-x",
            PlaybackSpeed::Maximum => "maximum",
        }
    }
}

impl fmt::Display for PlaybackSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlaybackSpeed {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PlaybackSpeed::ALL
            .into_iter()
            .find(|speed| speed.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown playback speed: {s}"))
    }
}

/// Playback status for sending to the frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackStatus {
    pub phase: Phase,
    pub speed: PlaybackSpeed,
    /// Current animation time in milliseconds.
    pub now_ms: u64,
    /// Timeline entries still pending.
    pub pending: usize,
    /// Markers currently flying.
    pub in_flight: usize,
    pub settled: bool,
}
