use crate::attempt::run_attempt;
use crate::cancel::CancelSignal;
use crate::classify::classify;
use crate::crn::Crn;
use crate::session::PageSession;
use rand::Rng;
use serde::Serialize;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

pub use crate::config::CampConfig;

/// Outcome of one reservation attempt, as read back from the page.
///
/// `succeeded` and `unavailable` can both be set at capture time; only
/// `succeeded && !unavailable` counts as final success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttemptResult {
    pub succeeded: bool,
    pub unavailable: bool,
    /// Distinct status messages from the page, in first-seen order.
    pub diagnostics: Vec<String>,
}

impl AttemptResult {
    pub fn is_final_success(&self) -> bool {
        self.succeeded && !self.unavailable
    }

    /// Synthetic result returned when the operator stops the campaign.
    pub fn stopped_by_user() -> Self {
        Self {
            succeeded: false,
            unavailable: true,
            diagnostics: vec!["Stopped by user".to_string()],
        }
    }

    fn failed(message: String) -> Self {
        Self {
            succeeded: false,
            unavailable: false,
            diagnostics: vec![message],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CampState {
    Running,
    Succeeded,
    Cancelled,
}

/// What a single scheduler step decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Final success; the campaign is over.
    Succeeded(AttemptResult),
    /// Not registered yet (or the attempt itself failed); retry after the
    /// usual delay and refresh.
    Retry(AttemptResult),
}

/// Running state of one camping campaign. Owned by the scheduler loop and
/// advanced one attempt at a time, so tests can drive it step by step.
#[derive(Debug)]
pub struct Campaign {
    pub attempt: u64,
    pub state: CampState,
    pub last: Option<AttemptResult>,
}

impl Default for Campaign {
    fn default() -> Self {
        Self::new()
    }
}

impl Campaign {
    pub fn new() -> Self {
        Self {
            attempt: 1,
            state: CampState::Running,
            last: None,
        }
    }

    /// Run one attempt and classify it. An attempt-level failure (for
    /// example a control timing out) is operationally indistinguishable
    /// from "not registered yet", so it becomes a retryable result carrying
    /// the error text as its diagnostic instead of propagating.
    pub async fn step<S: PageSession + ?Sized>(
        &mut self,
        session: &mut S,
        crns: &[Crn],
        config: &CampConfig,
    ) -> StepOutcome {
        let result = match run_attempt(session, crns, config).await {
            Ok(()) => match classify(session, &config.closed_phrases).await {
                Ok(result) => result,
                Err(e) => {
                    warn!("Classification failed: {e}");
                    AttemptResult::failed(format!("Classification failed: {e}"))
                }
            },
            Err(e) => {
                warn!("Attempt failed: {e}");
                AttemptResult::failed(e.to_string())
            }
        };

        self.last = Some(result.clone());
        if result.is_final_success() {
            self.state = CampState::Succeeded;
            StepOutcome::Succeeded(result)
        } else {
            StepOutcome::Retry(result)
        }
    }

    fn cancelled(&mut self) -> AttemptResult {
        self.state = CampState::Cancelled;
        let result = AttemptResult::stopped_by_user();
        self.last = Some(result.clone());
        info!("Stopped by user.");
        result
    }

    fn report(&self, result: &AttemptResult) {
        info!(
            "[Attempt {}] registered={} closed={}",
            self.attempt, result.succeeded, result.unavailable
        );
        for message in result.diagnostics.iter().take(4) {
            let first_line: String = message
                .lines()
                .next()
                .unwrap_or("")
                .chars()
                .take(200)
                .collect();
            info!(" - {first_line}");
        }
    }
}

/// Camp for a seat: attempt, classify, and keep retrying on a randomized
/// delay until registration succeeds or the operator cancels. There is no
/// attempt cap; camping may legitimately run for hours.
///
/// Cancellation is only observed at the suspend points between attempts; an
/// attempt already in flight runs to completion first.
pub async fn camp<S: PageSession + ?Sized>(
    session: &mut S,
    crns: &[Crn],
    config: &CampConfig,
    cancel: &mut CancelSignal,
) -> AttemptResult {
    let mut campaign = Campaign::new();
    info!("Camping for seat. Press Ctrl+C to stop.");

    loop {
        match campaign.step(session, crns, config).await {
            StepOutcome::Succeeded(result) => {
                info!(
                    "SUCCESS -- registration detected after {} attempt(s)!",
                    campaign.attempt
                );
                return result;
            }
            StepOutcome::Retry(result) => campaign.report(&result),
        }

        let delay_s = {
            let mut rng = rand::thread_rng();
            rng.gen_range(config.min_delay_s..=config.max_delay_s)
        };
        info!("Retrying in {delay_s}s...");
        tokio::select! {
            _ = sleep(Duration::from_secs(delay_s)) => {}
            _ = cancel.cancelled() => return campaign.cancelled(),
        }

        // Refresh to keep the session state sane between attempts. A failed
        // refresh is tolerable; the next attempt re-navigates anyway.
        if let Err(e) = session.refresh().await {
            warn!("Refresh failed: {e}");
        }
        tokio::select! {
            _ = sleep(config.refresh_settle()) => {}
            _ = cancel.cancelled() => return campaign.cancelled(),
        }

        campaign.attempt += 1;
    }
}
