//! Background tasks for the application.
//!
//! Call `spawn_all` once during startup to launch them.

use std::time::Duration;

use crate::services::OtpStore;

/// Spawn all background tasks.
///
/// The sweep only bounds memory; verification already treats expired
/// challenges as absent, so a missed or late sweep changes nothing observable.
pub fn spawn_all(otp_store: OtpStore, sweep_interval: Duration) {
    // 定期清理过期验证码
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let removed = otp_store.sweep_expired(chrono::Utc::now()).await;
            if removed > 0 {
                log::info!("Expired OTP challenges removed: {removed}");
            }
        }
    });
}
