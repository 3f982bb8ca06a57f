//! W3C WebDriver client, the production [`PageDriver`].
//!
//! Speaks the WebDriver HTTP protocol to a local chromedriver (or any remote end).
//! One session per process; commands are issued strictly one at a time.

use std::path::Path;

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::driver::{DriverError, ElementRef, Locator, PageDriver};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Deserialize)]
struct WireResponse {
    value: Value,
}

#[derive(Debug, Deserialize)]
struct WireError {
    error: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct NewSession {
    #[serde(rename = "sessionId")]
    session_id: String,
}

pub struct WebDriverClient {
    client: Client,
    base_url: String,
    session_id: String,
}

impl WebDriverClient {
    /// Opens a new Chrome session against the WebDriver endpoint at `base_url`.
    pub async fn connect(
        base_url: &str,
        headless: bool,
        profile_dir: Option<&Path>,
    ) -> Result<Self, DriverError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(90))
            .build()
            .map_err(DriverError::Http)?;
        let base_url = base_url.trim_end_matches('/').to_string();

        let body = json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": {
                        "args": chrome_args(headless, profile_dir),
                        "excludeSwitches": ["enable-automation"],
                        "useAutomationExtension": false
                    }
                }
            }
        });

        let response = client
            .post(format!("{base_url}/session"))
            .json(&body)
            .send()
            .await?;
        let value = decode(response).await?;
        let session: NewSession = serde_json::from_value(value)?;
        info!("WebDriver session {} started", session.session_id);

        Ok(Self {
            client,
            base_url,
            session_id: session.session_id,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/session/{}{}", self.base_url, self.session_id, path)
    }

    async fn command(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, DriverError> {
        let mut request = self.client.request(method.clone(), self.url(path));
        if let Some(body) = body {
            request = request.json(&body);
        }
        debug!("WebDriver {} {}", method, path);
        let response = request.send().await?;
        decode(response).await
    }

    fn element_path(&self, scope: Option<&ElementRef>, suffix: &str) -> String {
        match scope {
            Some(el) => format!("/element/{}{}", el.id, suffix),
            None => suffix.to_string(),
        }
    }
}

fn chrome_args(headless: bool, profile_dir: Option<&Path>) -> Vec<String> {
    let mut args: Vec<String> = [
        "--no-sandbox",
        "--ignore-certificate-errors",
        "--disable-extensions",
        "--disable-gpu",
        "--disable-dev-shm-usage",
        "--start-maximized",
        "--disable-blink-features=AutomationControlled",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    args.push(format!("--user-agent={USER_AGENT}"));
    if headless {
        args.push("--headless".to_string());
    }
    if let Some(dir) = profile_dir {
        args.push(format!("--user-data-dir={}", dir.display()));
    }
    args
}

async fn decode(response: reqwest::Response) -> Result<Value, DriverError> {
    let status = response.status();
    let body = response.text().await?;
    let wire: WireResponse = serde_json::from_str(&body)?;
    if status.is_success() {
        return Ok(wire.value);
    }
    let err: WireError = serde_json::from_value(wire.value).unwrap_or(WireError {
        error: "unknown error".to_string(),
        message: body,
    });
    Err(map_wire_error(status.as_u16(), err))
}

fn map_wire_error(status: u16, err: WireError) -> DriverError {
    match err.error.as_str() {
        "no such element" => DriverError::NoSuchElement(err.message),
        "stale element reference" => DriverError::StaleElement,
        "timeout" | "script timeout" => DriverError::Timeout(err.message),
        "invalid session id" => DriverError::Session(err.message),
        _ => DriverError::Protocol {
            status,
            error: err.error,
            message: err.message,
        },
    }
}

fn as_bool(value: Value) -> Result<bool, DriverError> {
    value
        .as_bool()
        .ok_or_else(|| DriverError::Session(format!("expected boolean, got {value}")))
}

#[async_trait]
impl PageDriver for WebDriverClient {
    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        self.command(Method::POST, "/url", Some(json!({ "url": url })))
            .await?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        let value = self.command(Method::GET, "/url", None).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn find(
        &self,
        scope: Option<&ElementRef>,
        locator: &Locator,
    ) -> Result<ElementRef, DriverError> {
        let (using, value) = locator.to_w3c();
        let path = self.element_path(scope, "/element");
        let found = self
            .command(
                Method::POST,
                &path,
                Some(json!({ "using": using, "value": value })),
            )
            .await?;
        Ok(serde_json::from_value(found)?)
    }

    async fn find_all(
        &self,
        scope: Option<&ElementRef>,
        locator: &Locator,
    ) -> Result<Vec<ElementRef>, DriverError> {
        let (using, value) = locator.to_w3c();
        let path = self.element_path(scope, "/elements");
        let found = self
            .command(
                Method::POST,
                &path,
                Some(json!({ "using": using, "value": value })),
            )
            .await?;
        Ok(serde_json::from_value(found)?)
    }

    async fn click(&self, element: &ElementRef) -> Result<(), DriverError> {
        let path = format!("/element/{}/click", element.id);
        self.command(Method::POST, &path, Some(json!({}))).await?;
        Ok(())
    }

    async fn clear(&self, element: &ElementRef) -> Result<(), DriverError> {
        let path = format!("/element/{}/clear", element.id);
        self.command(Method::POST, &path, Some(json!({}))).await?;
        Ok(())
    }

    async fn send_keys(&self, element: &ElementRef, text: &str) -> Result<(), DriverError> {
        let path = format!("/element/{}/value", element.id);
        self.command(Method::POST, &path, Some(json!({ "text": text })))
            .await?;
        Ok(())
    }

    async fn text(&self, element: &ElementRef) -> Result<String, DriverError> {
        let path = format!("/element/{}/text", element.id);
        let value = self.command(Method::GET, &path, None).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn attribute(
        &self,
        element: &ElementRef,
        name: &str,
    ) -> Result<Option<String>, DriverError> {
        let path = format!("/element/{}/attribute/{}", element.id, name);
        let value = self.command(Method::GET, &path, None).await?;
        Ok(value.as_str().map(str::to_string))
    }

    async fn is_displayed(&self, element: &ElementRef) -> Result<bool, DriverError> {
        let path = format!("/element/{}/displayed", element.id);
        as_bool(self.command(Method::GET, &path, None).await?)
    }

    async fn is_enabled(&self, element: &ElementRef) -> Result<bool, DriverError> {
        let path = format!("/element/{}/enabled", element.id);
        as_bool(self.command(Method::GET, &path, None).await?)
    }

    async fn is_selected(&self, element: &ElementRef) -> Result<bool, DriverError> {
        let path = format!("/element/{}/selected", element.id);
        as_bool(self.command(Method::GET, &path, None).await?)
    }

    async fn execute(&self, script: &str, args: Vec<Value>) -> Result<Value, DriverError> {
        self.command(
            Method::POST,
            "/execute/sync",
            Some(json!({ "script": script, "args": args })),
        )
        .await
    }

    async fn quit(&self) -> Result<(), DriverError> {
        self.command(Method::DELETE, "", None).await?;
        info!("WebDriver session {} closed", self.session_id);
        Ok(())
    }
}
