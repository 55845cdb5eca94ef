//! Background pairing loop for the Matchmaker (C5). `cc_match::run_match`
//! only ever makes one pairing per call, so the loop drains the queue on
//! every tick rather than assuming a single call clears it.

use std::time::Duration;

use crate::state::AppState;

const TICK_PERIOD: Duration = Duration::from_secs(2);

pub async fn run(app: AppState) {
    let mut interval = tokio::time::interval(TICK_PERIOD);
    loop {
        interval.tick().await;
        tick(&app);
    }
}

pub fn tick(app: &AppState) {
    loop {
        match cc_match::run_match(&app.store, chrono::Utc::now()) {
            Ok(Some(_)) => continue,
            Ok(None) => break,
            Err(err) => {
                tracing::error!(error = %err, "matchmaker tick failed");
                break;
            }
        }
    }
}
