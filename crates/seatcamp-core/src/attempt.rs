use crate::config::CampConfig;
use crate::crn::Crn;
use crate::session::{PageSession, SessionError};
use tokio::time::sleep;
use tracing::debug;

// Visible labels on the Banner registration surface.
pub const ENTER_CRNS_TAB: &str = "Enter CRNs";
pub const CRN_LABEL: &str = "CRN";
pub const ADD_TO_SUMMARY: &str = "Add to Summary";
pub const SUBMIT: &str = "Submit";

#[derive(thiserror::Error, Debug)]
pub enum AttemptError {
    #[error("No course codes to submit")]
    EmptyBatch,

    #[error("{stage}: {source}")]
    Stage {
        stage: &'static str,
        #[source]
        source: SessionError,
    },
}

fn stage(stage: &'static str) -> impl FnOnce(SessionError) -> AttemptError {
    move |source| AttemptError::Stage { stage, source }
}

/// Drive one complete reservation attempt: position the session, enter every
/// code, submit the pending set once, and leave the page settled so the
/// caller can classify it. Retrying is the scheduler's job, not ours.
pub async fn run_attempt<S: PageSession + ?Sized>(
    session: &mut S,
    crns: &[Crn],
    config: &CampConfig,
) -> Result<(), AttemptError> {
    if crns.is_empty() {
        return Err(AttemptError::EmptyBatch);
    }

    // Positioning is idempotent: already being on the page is a no-op.
    let here = session
        .current_url()
        .await
        .map_err(stage("reading current location"))?;
    if !here.contains(&config.url_hint) {
        session
            .navigate(&config.register_url)
            .await
            .map_err(stage("navigating to registration page"))?;
    }

    // The tab is conditionally absent depending on UI state, so not finding
    // it within the short timeout means code entry is already active.
    match session
        .click_labeled(ENTER_CRNS_TAB, config.tab_timeout())
        .await
    {
        Ok(()) => {}
        Err(SessionError::Timeout { .. }) => {
            debug!("'{ENTER_CRNS_TAB}' tab not clickable; assuming code entry is active");
        }
        Err(e) => return Err(AttemptError::Stage {
            stage: "activating code entry",
            source: e,
        }),
    }

    // One code at a time; the UI needs a beat to absorb each addition.
    for crn in crns {
        session
            .fill_input_after_label(CRN_LABEL, crn.as_str(), config.control_timeout())
            .await
            .map_err(stage("entering course code"))?;
        session
            .click_labeled(ADD_TO_SUMMARY, config.control_timeout())
            .await
            .map_err(stage("adding code to summary"))?;
        sleep(config.entry_settle()).await;
    }

    // Banner processes the whole pending set in one submission.
    session
        .click_labeled(SUBMIT, config.control_timeout())
        .await
        .map_err(stage("submitting registration"))?;

    // Result messages render asynchronously.
    sleep(config.submit_settle()).await;

    Ok(())
}
