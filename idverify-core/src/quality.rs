//! Capture quality signals and the gate that consumes them.
//!
//! A [`QualitySignal`] is a heuristic estimate of how usable the current
//! camera frame is. It is recomputed on a fixed interval while a camera
//! session is active and has no identity beyond "most recent sample". The
//! gate is deliberately conservative about what it blocks: the remote
//! verification service remains the source of truth for image quality, the
//! gate only filters out obviously bad submissions.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Lighting estimate for the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lighting {
    Good,
    Poor,
    Unknown,
}

/// Blur estimate for the current frame. Advisory only; never blocks capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Blur {
    Low,
    High,
    Unknown,
}

/// Most recent quality sample for an active camera session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualitySignal {
    pub lighting: Lighting,
    #[serde(rename = "faceDetected")]
    pub face_detected: bool,
    pub blur: Blur,
}

impl QualitySignal {
    /// Initial state before the first sample arrives.
    pub fn unknown() -> Self {
        Self {
            lighting: Lighting::Unknown,
            face_detected: false,
            blur: Blur::Unknown,
        }
    }

    /// The capture gate: a frame may be finalized iff a face is present and
    /// lighting is not poor. Blur is surfaced to the user but never blocks.
    pub fn capture_admissible(&self) -> bool {
        self.face_detected && self.lighting != Lighting::Poor
    }
}

/// Periodic producer of quality samples.
///
/// Implementations must be thread-safe; the sampler task calls `analyze`
/// from a background task once per second. The interface is deliberately
/// free of frame details so a real inference step can replace the simulated
/// generator without touching the session machinery.
pub trait QualityAnalyzer: Send + Sync {
    fn analyze(&self) -> QualitySignal;
}

/// Deterministic simulated analyzer.
///
/// Reproduces the signal distribution of the original heuristic (lighting
/// good ~70%, face detected ~80%, low blur ~60%) from a seeded xorshift
/// stream, so tests and demos behave the same across runs.
/// WARNING: not a real quality estimate; replace with actual inference in
/// production.
pub struct SimulatedAnalyzer {
    state: AtomicU64,
}

impl SimulatedAnalyzer {
    pub fn new(seed: u64) -> Self {
        // xorshift must not start at zero
        let state = if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed };
        Self {
            state: AtomicU64::new(state),
        }
    }

    fn next(&self) -> u64 {
        let mut x = self.state.load(Ordering::Relaxed);
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state.store(x, Ordering::Relaxed);
        x
    }

    fn chance(&self, p: f64) -> bool {
        (self.next() as f64 / u64::MAX as f64) < p
    }
}

impl Default for SimulatedAnalyzer {
    fn default() -> Self {
        Self::new(0xDEAD_BEEF_CAFE_BABE)
    }
}

impl QualityAnalyzer for SimulatedAnalyzer {
    fn analyze(&self) -> QualitySignal {
        QualitySignal {
            lighting: if self.chance(0.7) {
                Lighting::Good
            } else {
                Lighting::Poor
            },
            face_detected: self.chance(0.8),
            blur: if self.chance(0.6) { Blur::Low } else { Blur::High },
        }
    }
}
