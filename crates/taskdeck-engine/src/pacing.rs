//! Randomized pauses between attempts, actions and accounts

use crate::guard::RunSlot;
use rand::Rng;
use std::time::Duration;
use taskdeck_types::PauseRange;

/// Draw a pause uniformly from `[min, max]` seconds
pub fn draw(range: PauseRange) -> Duration {
    if range.max <= range.min {
        return range.min_duration();
    }
    rand::thread_rng().gen_range(range.min_duration()..=range.max_duration())
}

/// Sleep for a drawn pause, waking early if the run is cancelled
pub async fn pause(range: PauseRange, slot: &RunSlot) {
    if range.is_zero() || slot.is_cancelled() {
        return;
    }

    let delay = draw(range);
    tokio::select! {
        _ = tokio::time::sleep(delay) => {}
        _ = slot.cancelled() => {
            tracing::debug!(delay_ms = delay.as_millis() as u64, "Pause cut short by cancellation");
        }
    }
}
