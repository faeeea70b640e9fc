//! Fatigue fusion
//!
//! Combines four independently bounded sub-scores into a single fatigue index:
//! - EAR: up to 25, rising as the eye closes below 0.3
//! - PERCLOS: up to 25, one point per closed percent
//! - Blink rate: up to 15, deviation from 17.5 blinks/min
//! - Posture: fixed penalty per posture class
//!
//! The sum is clamped to `[0, 70]`.

use serde::{Deserialize, Serialize};

use crate::types::{FatigueLevel, PostureStatus};

/// Upper bound of the fatigue index
pub const FATIGUE_INDEX_CAP: f64 = 70.0;

/// EAR at or above which the eye contributes nothing
pub const EAR_RELAXED: f64 = 0.3;
pub const EAR_SCORE_MAX: f64 = 25.0;
pub const PERCLOS_SCORE_MAX: f64 = 25.0;

/// Blink rate with no penalty (blinks/min)
pub const OPTIMAL_BLINK_RATE: f64 = 17.5;
pub const BLINK_RATE_SCORE_MAX: f64 = 15.0;

/// Index below which fatigue is `Low`
pub const MODERATE_FATIGUE_INDEX: f64 = 20.0;
/// Index below which fatigue is `Moderate`
pub const HIGH_FATIGUE_INDEX: f64 = 40.0;

/// Per-signal contributions to the fatigue index
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FatigueBreakdown {
    pub ear_score: f64,
    pub perclos_score: f64,
    pub blink_rate_score: f64,
    pub posture_score: f64,
    /// Clamped sum
    pub total: f64,
}

pub fn ear_score(ear: f64) -> f64 {
    ((EAR_RELAXED - ear) / EAR_RELAXED * EAR_SCORE_MAX).clamp(0.0, EAR_SCORE_MAX)
}

pub fn perclos_score(perclos: f64) -> f64 {
    cap(perclos, PERCLOS_SCORE_MAX)
}

pub fn blink_rate_score(blink_rate: f64) -> f64 {
    cap((blink_rate - OPTIMAL_BLINK_RATE).abs() / 3.0, BLINK_RATE_SCORE_MAX)
}

// f64::min discards NaN; this keeps it
#[inline]
fn cap(value: f64, max: f64) -> f64 {
    if value > max {
        max
    } else {
        value
    }
}

pub fn posture_score(posture: PostureStatus) -> f64 {
    match posture {
        PostureStatus::Good => 0.0,
        PostureStatus::Tilted => 3.0,
        PostureStatus::Forward => 5.0,
        PostureStatus::TooClose | PostureStatus::TooFar => 7.0,
    }
}

/// Compute each sub-score and the clamped total
pub fn fatigue_breakdown(
    ear: f64,
    perclos: f64,
    blink_rate: f64,
    posture: PostureStatus,
) -> FatigueBreakdown {
    let ear_score = ear_score(ear);
    let perclos_score = perclos_score(perclos);
    let blink_rate_score = blink_rate_score(blink_rate);
    let posture_score = posture_score(posture);

    let total = (ear_score + perclos_score + blink_rate_score + posture_score)
        .clamp(0.0, FATIGUE_INDEX_CAP);

    FatigueBreakdown {
        ear_score,
        perclos_score,
        blink_rate_score,
        posture_score,
        total,
    }
}

/// Fused fatigue index in `[0, 70]`. NaN inputs propagate.
pub fn fatigue_index(ear: f64, perclos: f64, blink_rate: f64, posture: PostureStatus) -> f64 {
    fatigue_breakdown(ear, perclos, blink_rate, posture).total
}

/// Band an index into a coarse level
pub fn fatigue_level(index: f64) -> FatigueLevel {
    if index < MODERATE_FATIGUE_INDEX {
        FatigueLevel::Low
    } else if index < HIGH_FATIGUE_INDEX {
        FatigueLevel::Moderate
    } else {
        FatigueLevel::High
    }
}
