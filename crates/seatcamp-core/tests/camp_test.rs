use async_trait::async_trait;
use seatcamp_core::attempt;
use seatcamp_core::camp::{AttemptResult, CampState, Campaign, StepOutcome, camp};
use seatcamp_core::cancel::cancel_channel;
use seatcamp_core::config::CampConfig;
use seatcamp_core::crn::parse_crns;
use seatcamp_core::session::{PageSession, SessionError};
use std::time::Duration;

/// One scripted page state per attempt; `refresh` advances to the next.
struct Page {
    alerts: Vec<&'static str>,
    body: &'static str,
}

impl Page {
    fn closed() -> Self {
        Self {
            alerts: vec!["Closed Section"],
            body: "",
        }
    }

    fn registered() -> Self {
        Self {
            alerts: vec![],
            body: "You are registered!",
        }
    }
}

struct ScriptedSession {
    pages: Vec<Page>,
    current: usize,
    submits: usize,
    typed: Vec<String>,
    refreshes: usize,
    submit_times_out: bool,
}

impl ScriptedSession {
    fn new(pages: Vec<Page>) -> Self {
        Self {
            pages,
            current: 0,
            submits: 0,
            typed: Vec::new(),
            refreshes: 0,
            submit_times_out: false,
        }
    }

    fn page(&self) -> &Page {
        &self.pages[self.current]
    }
}

#[async_trait]
impl PageSession for ScriptedSession {
    async fn current_url(&mut self) -> Result<String, SessionError> {
        Ok("https://example.test/ssb/classRegistration/classRegistration".into())
    }

    async fn navigate(&mut self, _url: &str) -> Result<(), SessionError> {
        Ok(())
    }

    async fn click_labeled(
        &mut self,
        label: &str,
        _timeout: Duration,
    ) -> Result<(), SessionError> {
        if label == attempt::SUBMIT {
            if self.submit_times_out {
                return Err(SessionError::Timeout {
                    operation: label.to_string(),
                });
            }
            self.submits += 1;
        }
        Ok(())
    }

    async fn fill_input_after_label(
        &mut self,
        _label: &str,
        value: &str,
        _timeout: Duration,
    ) -> Result<(), SessionError> {
        self.typed.push(value.to_string());
        Ok(())
    }

    async fn alert_texts(&mut self) -> Result<Vec<String>, SessionError> {
        Ok(self.page().alerts.iter().map(|s| s.to_string()).collect())
    }

    async fn visible_text(&mut self) -> Result<String, SessionError> {
        Ok(self.page().body.to_string())
    }

    async fn refresh(&mut self) -> Result<(), SessionError> {
        self.refreshes += 1;
        if self.current + 1 < self.pages.len() {
            self.current += 1;
        }
        Ok(())
    }
}

fn fast_config() -> CampConfig {
    CampConfig {
        min_delay_s: 0,
        max_delay_s: 0,
        tab_timeout_ms: 0,
        control_timeout_ms: 0,
        entry_settle_ms: 0,
        submit_settle_ms: 0,
        refresh_settle_ms: 0,
        ..CampConfig::default()
    }
}

#[tokio::test]
async fn camps_until_the_first_final_success() {
    let mut session =
        ScriptedSession::new(vec![Page::closed(), Page::closed(), Page::registered()]);
    let batch = parse_crns("29626");
    let (_handle, mut cancel) = cancel_channel();

    let result = camp(&mut session, &batch.codes, &fast_config(), &mut cancel).await;

    assert!(result.is_final_success());
    assert_eq!(session.submits, 3, "exactly one attempt per scripted page");
    assert_eq!(session.refreshes, 2, "refresh between attempts only");
}

#[tokio::test]
async fn cancellation_during_suspend_stops_before_the_next_attempt() {
    let mut session = ScriptedSession::new(vec![Page::closed()]);
    let batch = parse_crns("29626");
    let config = CampConfig {
        // Long delay so the suspend point is where cancellation lands.
        min_delay_s: 600,
        max_delay_s: 600,
        ..fast_config()
    };

    let (handle, mut cancel) = cancel_channel();
    handle.cancel();

    let result = camp(&mut session, &batch.codes, &config, &mut cancel).await;

    assert_eq!(result, AttemptResult::stopped_by_user());
    assert!(!result.succeeded);
    assert!(result.unavailable);
    assert_eq!(result.diagnostics, vec!["Stopped by user"]);
    assert_eq!(session.submits, 1, "no attempt after the cancelled suspend");
}

#[tokio::test]
async fn step_advances_the_state_machine() {
    let mut session = ScriptedSession::new(vec![Page::closed(), Page::registered()]);
    let batch = parse_crns("29626");
    let config = fast_config();
    let mut campaign = Campaign::new();
    assert_eq!(campaign.attempt, 1);
    assert_eq!(campaign.state, CampState::Running);

    match campaign.step(&mut session, &batch.codes, &config).await {
        StepOutcome::Retry(result) => {
            assert!(result.unavailable);
            assert!(!result.succeeded);
        }
        other => panic!("expected retry, got {other:?}"),
    }
    assert_eq!(campaign.state, CampState::Running);

    session.refresh().await.unwrap();
    campaign.attempt += 1;

    match campaign.step(&mut session, &batch.codes, &config).await {
        StepOutcome::Succeeded(result) => assert!(result.is_final_success()),
        other => panic!("expected success, got {other:?}"),
    }
    assert_eq!(campaign.state, CampState::Succeeded);
    assert_eq!(campaign.attempt, 2);
    assert!(campaign.last.unwrap().succeeded);
}

#[tokio::test]
async fn attempt_failure_becomes_a_retryable_result() {
    let mut session = ScriptedSession::new(vec![Page::registered()]);
    session.submit_times_out = true;
    let batch = parse_crns("29626");
    let mut campaign = Campaign::new();

    match campaign
        .step(&mut session, &batch.codes, &fast_config())
        .await
    {
        StepOutcome::Retry(result) => {
            assert!(!result.succeeded);
            assert!(!result.unavailable);
            assert_eq!(result.diagnostics.len(), 1);
            assert!(result.diagnostics[0].contains("submitting registration"));
        }
        other => panic!("expected retry, got {other:?}"),
    }
    assert_eq!(campaign.state, CampState::Running);
}

#[tokio::test]
async fn duplicate_codes_are_submitted_once_per_list_entry() {
    // Operator input "12345, 12345 abcde": two valid entries, one notice.
    let batch = parse_crns("12345, 12345 abcde");
    assert_eq!(batch.codes.len(), 2);
    assert_eq!(batch.skipped.len(), 1);
    assert_eq!(batch.skipped[0].token, "abcde");

    let mut session = ScriptedSession::new(vec![Page::registered()]);
    let (_handle, mut cancel) = cancel_channel();
    let result = camp(&mut session, &batch.codes, &fast_config(), &mut cancel).await;

    assert!(result.is_final_success());
    assert_eq!(session.typed, vec!["12345", "12345"]);
    assert_eq!(session.submits, 1);
}
