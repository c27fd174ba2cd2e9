use async_trait::async_trait;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder, Locator};
use seatcamp_core::session::{PageSession, SessionError};
use std::time::Duration;
use tracing::{debug, info};

/// XPath heuristics for regions that plausibly carry status or error text.
/// Banner has no stable schema for these, so we cast a wide net and let the
/// classifier deduplicate.
const ALERT_XPATHS: &[&str] = &[
    "//*[@role='alert']",
    "//*[contains(@class,'alert')]",
    "//*[contains(@class,'notification')]",
    "//*[contains(@class,'messages')]",
];

/// A `PageSession` backed by a remote WebDriver (chromedriver, geckodriver).
///
/// The operator drives login and MFA in the browser window this session
/// controls; the core only takes over once the session is positioned.
pub struct WebDriverSession {
    client: Client,
}

impl WebDriverSession {
    /// Connect to a running WebDriver server, merging any caller-provided
    /// capabilities over the W3C defaults.
    pub async fn connect(
        webdriver_url: &str,
        capabilities: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> Result<Self, SessionError> {
        let mut caps = serde_json::Map::new();
        if let Some(user_caps) = capabilities {
            for (k, v) in user_caps {
                caps.insert(k, v);
            }
        }

        info!("Connecting to WebDriver at {webdriver_url}...");
        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(webdriver_url)
            .await
            .map_err(|e| {
                SessionError::Driver(format!(
                    "Failed to connect to WebDriver at {webdriver_url}: {e}"
                ))
            })?;

        Ok(Self { client })
    }

    pub async fn close(self) -> Result<(), SessionError> {
        self.client
            .close()
            .await
            .map_err(|e| SessionError::Driver(format!("Failed to close session: {e}")))
    }

    /// Controls on the registration page are rendered inconsistently: tabs
    /// are anchors, actions are `<button>` or `<input>`. Match every form by
    /// visible label.
    fn labeled_control_xpath(label: &str) -> String {
        format!(
            "//a[normalize-space()='{label}']\
             | //button[normalize-space()='{label}']\
             | //input[@type='button' and @value='{label}']\
             | //input[@type='submit' and @value='{label}']"
        )
    }

    async fn wait_for(
        &self,
        xpath: &str,
        operation: &str,
        timeout: Duration,
    ) -> Result<fantoccini::elements::Element, SessionError> {
        self.client
            .wait()
            .at_most(timeout)
            .for_element(Locator::XPath(xpath))
            .await
            .map_err(|e| map_cmd_error(e, operation))
    }
}

fn is_stale(e: &CmdError) -> bool {
    e.to_string().to_lowercase().contains("stale")
}

fn map_cmd_error(e: CmdError, operation: &str) -> SessionError {
    match e {
        CmdError::WaitTimeout => SessionError::Timeout {
            operation: operation.to_string(),
        },
        e if is_stale(&e) => SessionError::Stale {
            operation: operation.to_string(),
        },
        e => SessionError::Driver(format!("{operation}: {e}")),
    }
}

#[async_trait]
impl PageSession for WebDriverSession {
    async fn current_url(&mut self) -> Result<String, SessionError> {
        self.client
            .current_url()
            .await
            .map(|u| u.to_string())
            .map_err(|e| map_cmd_error(e, "reading current URL"))
    }

    async fn navigate(&mut self, url: &str) -> Result<(), SessionError> {
        debug!("Navigating to {url}");
        self.client
            .goto(url)
            .await
            .map_err(|e| SessionError::Navigation(e.to_string()))
    }

    async fn click_labeled(
        &mut self,
        label: &str,
        timeout: Duration,
    ) -> Result<(), SessionError> {
        let xpath = Self::labeled_control_xpath(label);
        let operation = format!("'{label}' control");
        let element = self.wait_for(&xpath, &operation, timeout).await?;
        element
            .click()
            .await
            .map_err(|e| map_cmd_error(e, &operation))?;
        Ok(())
    }

    async fn fill_input_after_label(
        &mut self,
        label: &str,
        value: &str,
        timeout: Duration,
    ) -> Result<(), SessionError> {
        let xpath = format!("//label[normalize-space()='{label}']/following::input[1]");
        let operation = format!("'{label}' input");
        let element = self.wait_for(&xpath, &operation, timeout).await?;
        element
            .clear()
            .await
            .map_err(|e| map_cmd_error(e, &operation))?;
        element
            .send_keys(value)
            .await
            .map_err(|e| map_cmd_error(e, &operation))?;
        Ok(())
    }

    async fn alert_texts(&mut self) -> Result<Vec<String>, SessionError> {
        let mut texts = Vec::new();
        for xpath in ALERT_XPATHS {
            let elements = self
                .client
                .find_all(Locator::XPath(xpath))
                .await
                .map_err(|e| map_cmd_error(e, "scanning message regions"))?;
            for element in elements {
                match element.text().await {
                    Ok(text) => texts.push(text),
                    // Message panels come and go as Banner re-renders.
                    Err(e) if is_stale(&e) => continue,
                    Err(e) => return Err(map_cmd_error(e, "reading message region")),
                }
            }
        }
        Ok(texts)
    }

    async fn visible_text(&mut self) -> Result<String, SessionError> {
        let body = match self.client.find(Locator::Css("body")).await {
            Ok(body) => body,
            Err(e) if is_stale(&e) => return Ok(String::new()),
            Err(e) => return Err(map_cmd_error(e, "locating page body")),
        };
        match body.text().await {
            Ok(text) => Ok(text),
            Err(e) if is_stale(&e) => Ok(String::new()),
            Err(e) => Err(map_cmd_error(e, "reading page text")),
        }
    }

    async fn refresh(&mut self) -> Result<(), SessionError> {
        self.client
            .refresh()
            .await
            .map_err(|e| SessionError::Navigation(format!("refresh failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labeled_controls_match_buttons_and_both_input_forms() {
        let xpath = WebDriverSession::labeled_control_xpath("Add to Summary");
        assert!(xpath.contains("//button[normalize-space()='Add to Summary']"));
        assert!(xpath.contains("@type='button'"));
        assert!(xpath.contains("@type='submit'"));
    }

    #[test]
    fn labeled_controls_match_anchor_tabs() {
        // The "Enter CRNs" tab is an anchor, not a button.
        let xpath = WebDriverSession::labeled_control_xpath("Enter CRNs");
        assert!(xpath.contains("//a[normalize-space()='Enter CRNs']"));
    }

    #[test]
    fn wait_timeouts_map_to_session_timeouts() {
        let err = map_cmd_error(CmdError::WaitTimeout, "'Submit' control");
        assert!(
            matches!(err, SessionError::Timeout { operation } if operation.contains("Submit"))
        );
    }
}
