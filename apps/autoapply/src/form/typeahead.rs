//! Autocomplete fill protocol: type, wait for a suggestion list, click the first
//! visible suggestion. The suggestion going stale right after the click is the
//! normal success signal.

use std::time::Duration;

use tracing::debug;

use crate::driver::wait::{await_driver, DEFAULT_POLL_INTERVAL};
use crate::driver::{DriverError, ElementRef, Locator, PageDriver};

/// Suggestion list shapes, tried in order on every poll.
const SUGGESTION_SELECTORS: &[&str] = &[
    ".search-typeahead-v2__hit",
    ".basic-typeahead__selectable",
    "[role='listbox'] [role='option']",
];

pub const SUGGESTION_TIMEOUT: Duration = Duration::from_secs(3);

async fn first_visible_suggestion(
    driver: &dyn PageDriver,
) -> Result<Option<ElementRef>, DriverError> {
    for selector in SUGGESTION_SELECTORS {
        for hit in driver.find_all(None, &Locator::css(selector)).await? {
            if driver.is_displayed(&hit).await? {
                return Ok(Some(hit));
            }
        }
    }
    Ok(None)
}

/// Returns `false` when no suggestion list rendered; the typed text is left in place.
pub async fn fill_typeahead(
    driver: &dyn PageDriver,
    control: &ElementRef,
    text: &str,
    timeout: Duration,
) -> Result<bool, DriverError> {
    driver.clear(control).await?;
    driver.send_keys(control, text).await?;

    let suggestion = match await_driver(
        || first_visible_suggestion(driver),
        timeout,
        DEFAULT_POLL_INTERVAL,
    )
    .await
    {
        Ok(hit) => hit,
        Err(DriverError::Timeout(_)) => {
            debug!("No typeahead suggestions for '{}'", text);
            return Ok(false);
        }
        Err(e) => return Err(e),
    };

    match driver.click(&suggestion).await {
        Ok(()) | Err(DriverError::StaleElement) => {}
        Err(e) => return Err(e),
    }
    match driver.is_displayed(&suggestion).await {
        Ok(_) | Err(DriverError::StaleElement) | Err(DriverError::NoSuchElement(_)) => {}
        Err(e) => return Err(e),
    }
    debug!("Picked typeahead suggestion for '{}'", text);
    Ok(true)
}
