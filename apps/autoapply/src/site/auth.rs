//! Login, including the wait for a human to clear a security checkpoint.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::driver::wait::{await_driver, DEFAULT_POLL_INTERVAL};
use crate::driver::{try_find, DriverError, Locator, PageDriver};
use crate::errors::AppError;
use crate::site::selectors;

/// Hard wall-clock limit for manual checkpoint resolution.
pub const CHECKPOINT_DEADLINE: Duration = Duration::from_secs(5 * 60);
const CHECKPOINT_POLL: Duration = Duration::from_secs(5);
const SESSION_PROBE_TIMEOUT: Duration = Duration::from_secs(5);
const LOGIN_FORM_TIMEOUT: Duration = Duration::from_secs(10);

pub async fn login(driver: &dyn PageDriver, email: &str, password: &str) -> Result<(), AppError> {
    info!("Starting authentication");
    driver.navigate(selectors::HOME_URL).await?;

    if is_logged_in(driver).await? {
        info!("Existing session found, skipping login");
        return Ok(());
    }

    info!("No session, logging in as {}", email);
    driver.navigate(selectors::LOGIN_URL).await?;
    let username = await_driver(
        move || async move {
            try_find(driver, None, &Locator::id(selectors::USERNAME_ID)).await
        },
        LOGIN_FORM_TIMEOUT,
        DEFAULT_POLL_INTERVAL,
    )
    .await?;
    driver.clear(&username).await?;
    driver.send_keys(&username, email).await?;

    let password_field = driver
        .find(None, &Locator::id(selectors::PASSWORD_ID))
        .await?;
    driver.clear(&password_field).await?;
    driver.send_keys(&password_field, password).await?;

    let submit = driver
        .find(None, &Locator::xpath(selectors::LOGIN_SUBMIT_XPATH))
        .await?;
    driver.click(&submit).await?;
    debug!("Login form submitted");

    wait_for_checkpoint(driver, CHECKPOINT_DEADLINE, CHECKPOINT_POLL).await
}

/// Feed pages render the "start a post" trigger only for signed-in users.
async fn is_logged_in(driver: &dyn PageDriver) -> Result<bool, AppError> {
    driver.navigate(selectors::FEED_URL).await?;
    let marker = await_driver(
        move || async move {
            for trigger in driver
                .find_all(None, &Locator::class(selectors::FEED_MARKER_CLASS))
                .await?
            {
                if driver.text(&trigger).await?.to_lowercase().contains("start a post") {
                    return Ok(Some(()));
                }
            }
            Ok(None)
        },
        SESSION_PROBE_TIMEOUT,
        DEFAULT_POLL_INTERVAL,
    )
    .await;
    match marker {
        Ok(()) => Ok(true),
        Err(DriverError::Timeout(_)) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Polls the current URL until it reaches the feed. A checkpoint page needs a
/// human in the open browser; past `deadline` the run cannot continue.
pub async fn wait_for_checkpoint(
    driver: &dyn PageDriver,
    deadline: Duration,
    poll: Duration,
) -> Result<(), AppError> {
    let warned = AtomicBool::new(false);
    let warned = &warned;
    let cleared = await_driver(
        move || async move {
            let url = driver.current_url().await?;
            if url.contains(selectors::FEED_PATH) {
                return Ok(Some(()));
            }
            if url.contains(selectors::CHECKPOINT_PATH) && !warned.swap(true, Ordering::Relaxed) {
                warn!("Security checkpoint at {}; solve it in the open browser window", url);
            }
            Ok(None)
        },
        deadline,
        poll,
    )
    .await;

    match cleared {
        Ok(()) => {
            info!("Logged in");
            Ok(())
        }
        Err(DriverError::Timeout(_)) => Err(AppError::SecurityCheckpoint(format!(
            "login not completed within {} minutes",
            deadline.as_secs() / 60
        ))),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::fake::FakeDriver;

    #[tokio::test(start_paused = true)]
    async fn test_checkpoint_cleared_by_human() {
        let driver = FakeDriver::new();
        driver.script_urls(&[
            "https://www.linkedin.com/checkpoint/challenge/abc",
            "https://www.linkedin.com/checkpoint/challenge/abc",
            "https://www.linkedin.com/feed/",
        ]);
        wait_for_checkpoint(&driver, CHECKPOINT_DEADLINE, CHECKPOINT_POLL)
            .await
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_unresolved_checkpoint_is_fatal() {
        let driver = FakeDriver::new();
        driver.set_url("https://www.linkedin.com/checkpoint/challenge/abc");
        let err = wait_for_checkpoint(&driver, CHECKPOINT_DEADLINE, CHECKPOINT_POLL)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::SecurityCheckpoint(_)));
        assert!(err.is_fatal());
    }

    #[tokio::test(start_paused = true)]
    async fn test_existing_session_skips_login_form() {
        let driver = FakeDriver::new();
        let trigger = driver.add(".share-box-feed-entry__trigger", "post");
        driver.set_text(&trigger.id, "Start a post");

        login(&driver, "ada@example.com", "secret").await.unwrap();
        let actions = driver.actions();
        assert_eq!(
            actions,
            vec![
                format!("navigate:{}", selectors::HOME_URL),
                format!("navigate:{}", selectors::FEED_URL),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_fills_credentials_and_waits_for_feed() {
        let driver = FakeDriver::new();
        driver.add("username", "user");
        driver.add("password", "pass");
        driver.add("//button[@type='submit']", "go");
        driver.script_urls(&["https://www.linkedin.com/feed/"]);

        login(&driver, "ada@example.com", "secret").await.unwrap();
        let actions = driver.actions();
        assert!(actions.contains(&"keys:user:ada@example.com".to_string()));
        assert!(actions.contains(&"keys:pass:secret".to_string()));
        assert_eq!(actions.last().map(String::as_str), Some("click:go"));
    }
}
