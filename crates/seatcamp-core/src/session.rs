use async_trait::async_trait;
use std::time::Duration;

#[derive(thiserror::Error, Debug, Clone)]
pub enum SessionError {
    #[error("Timed out waiting for {operation}")]
    Timeout { operation: String },

    #[error("Stale element during {operation}")]
    Stale { operation: String },

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("WebDriver error: {0}")]
    Driver(String),

    #[error("Not connected")]
    NotConnected,
}

/// The PageSession trait is the capability surface the registration core
/// drives. Real drivers wrap a browser; tests substitute scripted pages.
///
/// All element lookups are label-relative because the external page has no
/// stable ids or schema. Methods that wait take an explicit timeout; hitting
/// it is reported as `SessionError::Timeout` naming the operation.
#[async_trait]
pub trait PageSession: Send + Sync {
    /// Current location of the session, as an absolute URL string.
    async fn current_url(&mut self) -> Result<String, SessionError>;

    /// Navigate to a specific URL.
    async fn navigate(&mut self, url: &str) -> Result<(), SessionError>;

    /// Click the button or input bearing exactly this visible label, once it
    /// becomes clickable within the timeout.
    async fn click_labeled(&mut self, label: &str, timeout: Duration)
    -> Result<(), SessionError>;

    /// Clear and fill the first input following the given label text.
    async fn fill_input_after_label(
        &mut self,
        label: &str,
        value: &str,
        timeout: Duration,
    ) -> Result<(), SessionError>;

    /// Visible text of every element plausibly carrying status or error
    /// messages (alert/notification/message regions), unfiltered.
    async fn alert_texts(&mut self) -> Result<Vec<String>, SessionError>;

    /// Visible text of the whole page.
    async fn visible_text(&mut self) -> Result<String, SessionError>;

    /// Reload the current page.
    async fn refresh(&mut self) -> Result<(), SessionError>;
}
