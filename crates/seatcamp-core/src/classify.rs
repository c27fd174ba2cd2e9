use crate::camp::AttemptResult;
use crate::session::{PageSession, SessionError};

/// Text whose presence anywhere on the page signals a completed
/// registration. Broad on purpose: the external page has no stable
/// success-indicator element.
const SUCCESS_MARKER: &str = "registered";

/// Read the settled page and classify the attempt. Pure read: identical page
/// state always classifies identically.
pub async fn classify<S: PageSession + ?Sized>(
    session: &mut S,
    closed_phrases: &[String],
) -> Result<AttemptResult, SessionError> {
    // Status text shows up in several overlapping regions; keep each
    // distinct message once, in first-seen order.
    let mut diagnostics: Vec<String> = Vec::new();
    for text in session.alert_texts().await? {
        let text = text.trim();
        if !text.is_empty() && !diagnostics.iter().any(|d| d == text) {
            diagnostics.push(text.to_string());
        }
    }

    let joined = diagnostics.join("\n").to_lowercase();
    let unavailable = closed_phrases
        .iter()
        .any(|phrase| joined.contains(&phrase.to_lowercase()));

    // A stale element mid-scan means the page moved under us; treat the
    // marker as not found rather than failing the whole classification.
    let succeeded = match session.visible_text().await {
        Ok(page) => page.to_lowercase().contains(SUCCESS_MARKER),
        Err(SessionError::Stale { .. }) => false,
        Err(e) => return Err(e),
    };

    Ok(AttemptResult {
        succeeded,
        unavailable,
        diagnostics,
    })
}
