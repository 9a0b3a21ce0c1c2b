// ─── Progress Tracking ───
// Turns raw engine counters into the values the launcher displays.
//
// Within one session the fraction shown for a stage never goes down, and
// the remaining-time estimate never drops faster than wall-clock time.

use std::time::Instant;

use serde::Serialize;

/// Bytes per "Mb" as the launcher has always displayed it.
const SPEED_DIVISOR: f64 = 1_067_008.0;

/// Weight of the newest sample in the smoothed rate.
const RATE_SMOOTHING: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStage {
    Download,
    Verify,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    pub stage: ProgressStage,
    pub current: u64,
    pub total: u64,
    /// `0.0..=1.0`, non-decreasing per stage.
    pub fraction: f64,
    /// `fraction` as shown next to the bar, e.g. `55%`.
    pub percent: String,
    /// Smoothed units per second, once two samples are known.
    pub rate: Option<f64>,
    pub eta_seconds: Option<f64>,
}

#[derive(Debug, Default)]
struct StageState {
    current: u64,
    total: u64,
    fraction: f64,
    last_sample: Option<(u64, Instant)>,
    rate: Option<f64>,
}

#[derive(Debug, Default)]
pub struct ProgressTracker {
    download: StageState,
    verify: StageState,
    eta: Option<(f64, Instant)>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn stage_mut(&mut self, stage: ProgressStage) -> &mut StageState {
        match stage {
            ProgressStage::Download => &mut self.download,
            ProgressStage::Verify => &mut self.verify,
        }
    }

    /// Record a `current/total` counter for `stage`.
    pub fn record(
        &mut self,
        stage: ProgressStage,
        current: u64,
        total: u64,
        now: Instant,
    ) -> ProgressSnapshot {
        let state = self.stage_mut(stage);

        if total > 0 {
            let current = current.min(total);
            let raw = current as f64 / total as f64;
            state.fraction = state.fraction.max(raw);

            if let Some((prev, at)) = state.last_sample {
                let elapsed = now.saturating_duration_since(at).as_secs_f64();
                if current > prev && elapsed > 0.0 {
                    let sample = (current - prev) as f64 / elapsed;
                    state.rate = Some(match state.rate {
                        Some(rate) => rate + RATE_SMOOTHING * (sample - rate),
                        None => sample,
                    });
                }
            }
            if state.last_sample.map_or(true, |(prev, _)| current >= prev) {
                state.last_sample = Some((current, now));
            }
            state.current = state.current.max(current);
            state.total = total;
        }

        let fraction = state.fraction;
        let rate = state.rate;
        let (shown_current, shown_total) = (state.current, state.total);
        let remaining = shown_total.saturating_sub(shown_current) as f64;

        let eta = match rate {
            _ if shown_total > 0 && remaining == 0.0 => Some(self.clamp_eta(0.0, now)),
            Some(rate) if rate > 0.0 => Some(self.clamp_eta(remaining / rate, now)),
            _ => self.eta.map(|(eta, _)| eta),
        };

        ProgressSnapshot {
            stage,
            current: shown_current,
            total: shown_total,
            fraction,
            percent: format_percent(fraction),
            rate,
            eta_seconds: eta,
        }
    }

    /// Fold in the engine's own estimate.
    pub fn record_estimate(&mut self, seconds: f64, now: Instant) -> f64 {
        self.clamp_eta(seconds.max(0.0), now)
    }

    /// An estimate may fall by at most the time elapsed since the last one,
    /// unless the work is done.
    fn clamp_eta(&mut self, candidate: f64, now: Instant) -> f64 {
        let eta = match self.eta {
            Some((prev, at)) if candidate > 0.0 => {
                let elapsed = now.saturating_duration_since(at).as_secs_f64();
                candidate.max(prev - elapsed).max(0.0)
            }
            _ => candidate,
        };
        self.eta = Some((eta, now));
        eta
    }

    /// Forget everything; used when progress indicators are cleared.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

pub fn format_percent(fraction: f64) -> String {
    format!("{:.0}%", (fraction.clamp(0.0, 1.0) * 100.0))
}

pub fn format_speed(bytes_per_second: f64) -> String {
    format!("{:.2} Mb/s", bytes_per_second / SPEED_DIVISOR)
}

pub fn format_eta(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{hours}h {minutes}m {secs}s")
}
