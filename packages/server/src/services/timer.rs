use std::time::Duration;

use crate::{services::game_service, state::AppState};

/// Arms the countdown for the phase identified by `serial`. If the phase has
/// already moved on when it fires, nothing happens.
pub fn schedule_phase_timer(state: AppState, room_id: String, serial: u64, secs: u64) {
    tracing::debug!(
        "Phase timer armed for room {} (serial {}, {}s)",
        room_id,
        serial,
        secs
    );
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(secs)).await;
        match game_service::advance_if_current(state, &room_id, serial).await {
            Ok(Some(phase)) => tracing::info!("Timer moved room {} to {}", room_id, phase),
            Ok(None) => tracing::debug!("Stale timer for room {} ignored", room_id),
            Err(e) => tracing::warn!("Timer for room {} failed: {}", room_id, e),
        }
    });
}
