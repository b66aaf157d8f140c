//! Trend scoring: engagement decayed with a 7-day half-life.

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use meetsync_core::error::AppError;
use meetsync_core::result::AppResult;
use meetsync_database::SlotStore;

/// Half-life of the decay curve, in days.
const HALF_LIFE_DAYS: f64 = 7.0;

/// Decay an engagement rate by elapsed days: `rate * 0.5^(days/7)`,
/// rounded. Negative elapsed days (clock skew, future meeting dates)
/// are treated as zero.
pub fn decayed_score(engagement_rate: i32, days_elapsed: i64) -> i32 {
    let days = days_elapsed.max(0) as f64;
    (f64::from(engagement_rate) * 0.5_f64.powf(days / HALF_LIFE_DAYS)).round() as i32
}

/// Recomputes and persists per-slot trend scores.
pub struct TrendScorer {
    slots: Arc<dyn SlotStore>,
}

impl TrendScorer {
    /// Create a scorer over the slot store.
    pub fn new(slots: Arc<dyn SlotStore>) -> Self {
        Self { slots }
    }

    /// Recompute the trend score for one slot from its stored
    /// engagement rate and meeting date, writing only on change.
    pub async fn recompute(&self, slot_id: Uuid) -> AppResult<()> {
        let slot = self
            .slots
            .find_by_id(slot_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Slot {slot_id} not found")))?;

        let days_elapsed = (Utc::now().date_naive() - slot.meeting_date).num_days();
        let score = decayed_score(slot.engagement_rate, days_elapsed);

        if score != slot.trend_score {
            debug!(slot_id = %slot_id, score, "Updating trend score");
            self.slots.update_trend_score(slot_id, score).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_half_life_halves_the_rate() {
        assert_eq!(decayed_score(80, 7), 40);
    }

    #[test]
    fn zero_days_keeps_the_rate() {
        assert_eq!(decayed_score(80, 0), 80);
    }

    #[test]
    fn negative_days_clamp_to_zero() {
        assert_eq!(decayed_score(80, -3), 80);
    }

    #[test]
    fn two_half_lives_quarter_the_rate() {
        assert_eq!(decayed_score(100, 14), 25);
    }

    #[test]
    fn partial_decay_rounds() {
        // 100 * 0.5^(1/7) ≈ 90.57
        assert_eq!(decayed_score(100, 1), 91);
    }

    #[test]
    fn zero_rate_stays_zero() {
        assert_eq!(decayed_score(0, 30), 0);
    }
}
