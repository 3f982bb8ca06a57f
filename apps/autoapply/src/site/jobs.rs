//! Result-list tiles and the job detail pane.

use std::time::Duration;

use tracing::{debug, warn};

use crate::driver::wait::{await_driver, DEFAULT_POLL_INTERVAL};
use crate::driver::{scroll_into_view, try_find, DriverError, ElementRef, Locator, PageDriver};
use crate::models::{ApplyMethod, Job};
use crate::site::selectors;

pub const TILE_TIMEOUT: Duration = Duration::from_secs(10);
const DESCRIPTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Jobs on the current result page. Empty when the page has no results.
pub async fn read_tiles(driver: &dyn PageDriver) -> Result<Vec<Job>, DriverError> {
    for headline in driver
        .find_all(None, &Locator::class(selectors::NO_RESULTS_CLASS))
        .await?
    {
        if driver.text(&headline).await?.to_lowercase().contains("no results found") {
            debug!("Result page reports no results");
            return Ok(Vec::new());
        }
    }

    let tiles = match await_driver(
        move || async move {
            let tiles = driver.find_all(None, &Locator::css(selectors::JOB_TILE)).await?;
            Ok((!tiles.is_empty()).then_some(tiles))
        },
        TILE_TIMEOUT,
        DEFAULT_POLL_INTERVAL,
    )
    .await
    {
        Ok(tiles) => tiles,
        Err(DriverError::Timeout(_)) => {
            warn!("No job tiles rendered within {:?}", TILE_TIMEOUT);
            return Ok(Vec::new());
        }
        Err(e) => return Err(e),
    };

    let mut jobs = Vec::with_capacity(tiles.len());
    for tile in &tiles {
        scroll_into_view(driver, tile).await?;
        match read_tile(driver, tile).await? {
            Some(job) => jobs.push(job),
            None => debug!("Skipping tile {} without a link", tile.id),
        }
    }
    debug!("Read {} job(s) from {} tile(s)", jobs.len(), tiles.len());
    Ok(jobs)
}

async fn scoped_text(
    driver: &dyn PageDriver,
    tile: &ElementRef,
    selector: &str,
) -> Result<String, DriverError> {
    match try_find(driver, Some(tile), &Locator::css(selector)).await? {
        Some(el) => Ok(driver.text(&el).await?.trim().to_string()),
        None => Ok(String::new()),
    }
}

async fn read_tile(driver: &dyn PageDriver, tile: &ElementRef) -> Result<Option<Job>, DriverError> {
    let Some(anchor) = try_find(driver, Some(tile), &Locator::css(selectors::TILE_LINK)).await?
    else {
        return Ok(None);
    };
    let title = driver.text(&anchor).await?.trim().to_string();
    let link = driver
        .attribute(&anchor, "href")
        .await?
        .map(|href| strip_query(&href).to_string())
        .unwrap_or_default();
    if link.is_empty() {
        return Ok(None);
    }

    let company = scoped_text(driver, tile, selectors::TILE_COMPANY).await?;
    let location = scoped_text(driver, tile, selectors::TILE_LOCATION).await?;

    let mut apply_label = String::new();
    for item in driver
        .find_all(Some(tile), &Locator::css(selectors::TILE_FOOTER_ITEMS))
        .await?
    {
        let text = driver.text(&item).await?.trim().to_string();
        if !text.is_empty() && !is_footer_noise(&text) {
            apply_label = text;
            break;
        }
    }

    Ok(Some(Job::new(
        title,
        company,
        location,
        link,
        ApplyMethod::from_label(&apply_label),
    )))
}

fn strip_query(href: &str) -> &str {
    href.split('?').next().unwrap_or(href)
}

fn is_footer_noise(text: &str) -> bool {
    let lower = text.to_lowercase();
    selectors::TILE_FOOTER_NOISE.iter().any(|kw| lower.contains(kw))
}

/// Full description text of the open job, or empty when no layout matches.
pub async fn read_description(driver: &dyn PageDriver) -> Result<String, DriverError> {
    let ready = await_driver(
        move || async move { try_find(driver, None, &Locator::css(selectors::DESCRIPTION_READY)).await },
        DESCRIPTION_TIMEOUT,
        DEFAULT_POLL_INTERVAL,
    )
    .await;
    if let Err(e) = ready {
        warn!("Description container did not render: {}", e);
    }

    if let Some(more) = try_find(driver, None, &Locator::css(selectors::SHOW_MORE)).await? {
        match driver.click(&more).await {
            Ok(()) => tokio::time::sleep(Duration::from_millis(500)).await,
            Err(e) => debug!("Could not expand description: {}", e),
        }
    }

    for selector in selectors::DESCRIPTION_FALLBACKS {
        if let Some(el) = try_find(driver, None, &Locator::css(selector)).await? {
            let text = driver.text(&el).await?.trim().to_string();
            if !text.is_empty() {
                return Ok(text);
            }
        }
    }
    warn!("Could not locate the job description");
    Ok(String::new())
}
