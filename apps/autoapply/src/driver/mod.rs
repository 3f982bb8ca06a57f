//! Page driver capability: the seam between the application logic and a live browser.
//!
//! Everything above this module talks to the page through [`PageDriver`]; the only
//! production implementation is [`webdriver::WebDriverClient`].

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub mod wait;
pub mod webdriver;

#[cfg(test)]
pub mod fake;

/// W3C WebDriver web element identifier key.
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52f-4a3b2cbd8f33";

/// WebDriver key codes used by the form logic.
pub mod keys {
    pub const TAB: &str = "\u{E004}";
    pub const ENTER: &str = "\u{E007}";
    pub const ESCAPE: &str = "\u{E00C}";
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("No such element: {0}")]
    NoSuchElement(String),

    #[error("Stale element reference")]
    StaleElement,

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("WebDriver error (status {status}, {error}): {message}")]
    Protocol {
        status: u16,
        error: String,
        message: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Session error: {0}")]
    Session(String),
}

impl DriverError {
    /// Transient UI conditions that callers retry through polling.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DriverError::NoSuchElement(_) | DriverError::StaleElement | DriverError::Timeout(_)
        )
    }
}

/// Handle to a live DOM element. Serialises in the W3C wire shape so it can be
/// passed straight into `execute` arguments and read back out of script results.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementRef {
    #[serde(rename = "element-6066-11e4-a52f-4a3b2cbd8f33")]
    pub id: String,
}

impl ElementRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn to_arg(&self) -> Value {
        let mut map = serde_json::Map::new();
        map.insert(ELEMENT_KEY.to_string(), Value::String(self.id.clone()));
        Value::Object(map)
    }
}

/// Element location strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    Css(String),
    XPath(String),
    Tag(String),
    Id(String),
    Class(String),
}

impl Locator {
    pub fn css(selector: &str) -> Self {
        Locator::Css(selector.to_string())
    }

    pub fn xpath(path: &str) -> Self {
        Locator::XPath(path.to_string())
    }

    pub fn tag(name: &str) -> Self {
        Locator::Tag(name.to_string())
    }

    pub fn id(id: &str) -> Self {
        Locator::Id(id.to_string())
    }

    pub fn class(name: &str) -> Self {
        Locator::Class(name.to_string())
    }

    /// Maps onto the W3C `using`/`value` pair. Id and class are rewritten to CSS.
    pub fn to_w3c(&self) -> (&'static str, String) {
        match self {
            Locator::Css(s) => ("css selector", s.clone()),
            Locator::XPath(s) => ("xpath", s.clone()),
            Locator::Tag(s) => ("tag name", s.clone()),
            Locator::Id(s) => ("css selector", format!("[id=\"{s}\"]")),
            Locator::Class(s) => ("css selector", format!(".{s}")),
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (using, value) = self.to_w3c();
        write!(f, "{using}={value}")
    }
}

#[async_trait]
pub trait PageDriver: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<(), DriverError>;
    async fn current_url(&self) -> Result<String, DriverError>;
    async fn find(
        &self,
        scope: Option<&ElementRef>,
        locator: &Locator,
    ) -> Result<ElementRef, DriverError>;
    async fn find_all(
        &self,
        scope: Option<&ElementRef>,
        locator: &Locator,
    ) -> Result<Vec<ElementRef>, DriverError>;
    async fn click(&self, element: &ElementRef) -> Result<(), DriverError>;
    async fn clear(&self, element: &ElementRef) -> Result<(), DriverError>;
    async fn send_keys(&self, element: &ElementRef, text: &str) -> Result<(), DriverError>;
    async fn text(&self, element: &ElementRef) -> Result<String, DriverError>;
    async fn attribute(
        &self,
        element: &ElementRef,
        name: &str,
    ) -> Result<Option<String>, DriverError>;
    async fn is_displayed(&self, element: &ElementRef) -> Result<bool, DriverError>;
    async fn is_enabled(&self, element: &ElementRef) -> Result<bool, DriverError>;
    async fn is_selected(&self, element: &ElementRef) -> Result<bool, DriverError>;
    async fn execute(&self, script: &str, args: Vec<Value>) -> Result<Value, DriverError>;
    async fn quit(&self) -> Result<(), DriverError>;
}

/// Returns `None` instead of an error when the element does not exist.
pub async fn try_find(
    driver: &dyn PageDriver,
    scope: Option<&ElementRef>,
    locator: &Locator,
) -> Result<Option<ElementRef>, DriverError> {
    match driver.find(scope, locator).await {
        Ok(el) => Ok(Some(el)),
        Err(DriverError::NoSuchElement(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Closes any open popup, scrolls the element to the centre and clicks it through JS,
/// which avoids "element click intercepted" from sticky headers and overlays.
pub async fn safe_click(driver: &dyn PageDriver, element: &ElementRef) -> Result<(), DriverError> {
    if let Some(body) = try_find(driver, None, &Locator::tag("body")).await? {
        driver.send_keys(&body, keys::ESCAPE).await.ok();
    }
    tokio::time::sleep(Duration::from_millis(200)).await;

    driver
        .execute(
            "arguments[0].scrollIntoView({block: 'center', inline: 'center'});",
            vec![element.to_arg()],
        )
        .await?;
    tokio::time::sleep(Duration::from_millis(200)).await;

    driver
        .execute("arguments[0].click();", vec![element.to_arg()])
        .await?;
    tokio::time::sleep(Duration::from_millis(500)).await;
    Ok(())
}

/// Fires bubbling DOM events so the host page notices programmatic changes.
pub async fn dispatch_events(
    driver: &dyn PageDriver,
    element: &ElementRef,
    events: &[&str],
) -> Result<(), DriverError> {
    for event in events {
        driver
            .execute(
                "arguments[0].dispatchEvent(new Event(arguments[1], {bubbles: true}));",
                vec![element.to_arg(), Value::String((*event).to_string())],
            )
            .await?;
    }
    Ok(())
}

pub async fn scroll_into_view(
    driver: &dyn PageDriver,
    element: &ElementRef,
) -> Result<(), DriverError> {
    driver
        .execute(
            "arguments[0].scrollIntoView({block: 'center'});",
            vec![element.to_arg()],
        )
        .await?;
    Ok(())
}
