//! The job site as seen through a [`PageDriver`]: login, result pages and the
//! quick-apply modal.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use serde_json::{json, Value};
use tracing::debug;

use crate::campaign::JobBoard;
use crate::driver::wait::{await_driver, DEFAULT_POLL_INTERVAL};
use crate::driver::{
    dispatch_events, keys, safe_click, scroll_into_view, try_find, DriverError, ElementRef,
    Locator, PageDriver,
};
use crate::errors::AppError;
use crate::form::classifier::LABEL_SEARCH_DEPTH;
use crate::form::typeahead::{fill_typeahead, SUGGESTION_TIMEOUT};
use crate::form::view::FieldView;
use crate::form::{FieldAction, FormSurface};
use crate::models::Job;
use crate::wizard::actions::{self, primary_action_strategies, post_submit_dismiss_strategies};
use crate::wizard::{ActionControl, Transition, WizardSurface};

pub mod auth;
pub mod jobs;
pub mod scripts;
pub mod selectors;

const SCROLL_INCREMENT: i64 = 600;
const RENDER_PAUSE: Duration = Duration::from_millis(400);
const SETTLE_PAUSE: Duration = Duration::from_millis(600);
const ACTION_PAUSE: Duration = Duration::from_millis(300);
const APPLY_BUTTON_TIMEOUT: Duration = Duration::from_secs(5);
const MODAL_TIMEOUT: Duration = Duration::from_secs(10);
const DIALOG_TIMEOUT: Duration = Duration::from_secs(3);
const DISCARD_CONFIRM_TIMEOUT: Duration = Duration::from_secs(5);

/// Random 0.2-1.0 s pause after navigations.
async fn pace() {
    let millis = rand::thread_rng().gen_range(200..=1000);
    tokio::time::sleep(Duration::from_millis(millis)).await;
}

async fn progress_value(driver: &dyn PageDriver) -> Result<Option<String>, DriverError> {
    let Some(bar) = try_find(driver, None, &Locator::css(selectors::PROGRESS)).await? else {
        return Ok(None);
    };
    if let Some(value) = driver.attribute(&bar, "value").await? {
        return Ok(Some(value));
    }
    driver.attribute(&bar, "aria-valuenow").await
}

/// One browser session. Implements every page-facing seam the campaign needs.
pub struct LiveSession {
    driver: Arc<dyn PageDriver>,
    progress_before_click: Option<String>,
}

impl LiveSession {
    pub fn new(driver: Arc<dyn PageDriver>) -> Self {
        Self {
            driver,
            progress_before_click: None,
        }
    }

    fn driver(&self) -> &dyn PageDriver {
        self.driver.as_ref()
    }

    /// The step's `<form>`, or the modal body on review pages that have none.
    async fn step_root(&self) -> Result<Option<ElementRef>, DriverError> {
        let driver = self.driver();
        if let Some(form) = try_find(driver, None, &Locator::tag(selectors::FORM_TAG)).await? {
            return Ok(Some(form));
        }
        try_find(driver, None, &Locator::css(actions::MODAL_CONTENT_SELECTOR)).await
    }

    async fn action_label(&self, button: &ElementRef) -> Result<String, DriverError> {
        let text = self.driver().text(button).await?.trim().to_string();
        if !text.is_empty() {
            return Ok(text);
        }
        Ok(self
            .driver()
            .attribute(button, "aria-label")
            .await?
            .unwrap_or_default())
    }

    async fn type_text(&self, control: &ElementRef, text: &str, terminator: &str) -> Result<(), DriverError> {
        let driver = self.driver();
        driver.clear(control).await?;
        driver.send_keys(control, text).await?;
        driver.send_keys(control, terminator).await?;
        Ok(())
    }

    async fn upload(&self, input: &ElementRef, path: &Path) -> Result<(), DriverError> {
        let driver = self.driver();
        let absolute = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        driver.execute(scripts::UNHIDE, vec![input.to_arg()]).await?;
        driver
            .send_keys(input, &absolute.display().to_string())
            .await?;
        dispatch_events(driver, input, &["change", "blur"]).await?;
        if let Some(body) = try_find(driver, None, &Locator::tag("body")).await? {
            driver.send_keys(&body, keys::ESCAPE).await.ok();
        }
        Ok(())
    }
}

#[async_trait]
impl FormSurface for LiveSession {
    async fn scan(&mut self) -> Result<Vec<FieldView>, AppError> {
        let root = self.step_root().await?;
        let value = self
            .driver()
            .execute(
                scripts::SCAN_FIELDS,
                vec![
                    root.as_ref().map(ElementRef::to_arg).unwrap_or(Value::Null),
                    json!(LABEL_SEARCH_DEPTH),
                    json!(selectors::FIELD_CONTAINER),
                    json!(selectors::UPLOAD_BLOCK),
                ],
            )
            .await?;
        if value.is_null() {
            return Ok(Vec::new());
        }
        let views: Vec<FieldView> = serde_json::from_value(value).map_err(DriverError::from)?;
        debug!("Scanned {} field container(s)", views.len());
        Ok(views)
    }

    async fn apply(&mut self, action: &FieldAction) -> Result<(), AppError> {
        debug!("Applying {}", action.describe());
        let driver = self.driver();
        match action {
            FieldAction::Type { control, text } => self.type_text(control, text, keys::TAB).await?,
            FieldAction::TypeDate { control, text } => {
                self.type_text(control, text, keys::ENTER).await?
            }
            FieldAction::Typeahead { control, text } => {
                if !fill_typeahead(driver, control, text, SUGGESTION_TIMEOUT).await? {
                    debug!("Typeahead kept free text '{}'", text);
                }
            }
            FieldAction::Select { control, option } => {
                let picked = driver
                    .execute(
                        scripts::SELECT_OPTION,
                        vec![
                            control.to_arg(),
                            json!(option),
                            json!(crate::answers::placeholder::PLACEHOLDER_TOKENS),
                        ],
                    )
                    .await?;
                match picked.as_str() {
                    Some(text) if text != option => {
                        debug!("Selected '{}' for requested '{}'", text, option)
                    }
                    Some(_) => {}
                    None => return Err(AppError::OptionUnavailable(option.clone())),
                }
                dispatch_events(driver, control, &["change", "blur"]).await?;
            }
            FieldAction::Click { target } => safe_click(driver, target).await?,
            FieldAction::Upload { input, path } => self.upload(input, path).await?,
        }
        tokio::time::sleep(ACTION_PAUSE).await;
        Ok(())
    }

    async fn field_error(&mut self, container: &ElementRef) -> Result<Option<String>, AppError> {
        let value = self
            .driver()
            .execute(
                scripts::FIELD_ERROR,
                vec![container.to_arg(), json!(selectors::INLINE_ERROR)],
            )
            .await?;
        Ok(value.as_str().map(str::to_string))
    }

    async fn scroll_forward(&mut self) -> Result<(), AppError> {
        if let Some(root) = self.step_root().await? {
            self.driver()
                .execute(scripts::SCROLL_BY, vec![root.to_arg(), json!(SCROLL_INCREMENT)])
                .await?;
        }
        tokio::time::sleep(RENDER_PAUSE).await;
        Ok(())
    }

    async fn settle(&mut self) -> Result<(), AppError> {
        let driver = self.driver();
        if let Some(content) =
            try_find(driver, None, &Locator::css(actions::MODAL_CONTENT_SELECTOR)).await?
        {
            driver
                .execute(scripts::SCROLL_TO_END, vec![content.to_arg()])
                .await?;
        }
        tokio::time::sleep(SETTLE_PAUSE).await;
        driver.execute(scripts::BLUR_ACTIVE, Vec::new()).await?;
        tokio::time::sleep(ACTION_PAUSE).await;
        Ok(())
    }

    async fn active_errors(&mut self) -> Result<Vec<String>, AppError> {
        let value = self
            .driver()
            .execute(scripts::ACTIVE_ERRORS, vec![json!(selectors::INLINE_ERROR)])
            .await?;
        if value.is_null() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_value(value).map_err(DriverError::from)?)
    }
}

#[async_trait]
impl WizardSurface for LiveSession {
    async fn open_application(&mut self, link: &str) -> Result<String, AppError> {
        let driver = self.driver();
        driver.navigate(link).await?;
        pace().await;

        let button = await_driver(
            move || async move {
                for button in driver
                    .find_all(None, &Locator::xpath(selectors::QUICK_APPLY_BUTTON_XPATH))
                    .await?
                {
                    if driver.is_displayed(&button).await? && driver.is_enabled(&button).await? {
                        return Ok(Some(button));
                    }
                }
                Ok(None)
            },
            APPLY_BUTTON_TIMEOUT,
            DEFAULT_POLL_INTERVAL,
        )
        .await
        .map_err(|e| match e {
            DriverError::Timeout(_) => {
                DriverError::NoSuchElement("clickable quick-apply button".to_string())
            }
            other => other,
        })?;

        let description = jobs::read_description(driver).await?;
        safe_click(driver, &button).await?;
        await_driver(
            move || async move {
                try_find(driver, None, &Locator::css(actions::MODAL_SELECTOR)).await
            },
            MODAL_TIMEOUT,
            DEFAULT_POLL_INTERVAL,
        )
        .await?;
        Ok(description)
    }

    async fn step_header(&mut self) -> Result<String, AppError> {
        let driver = self.driver();
        let Some(modal) = try_find(driver, None, &Locator::css(actions::MODAL_SELECTOR)).await?
        else {
            return Ok(String::new());
        };
        match try_find(driver, Some(&modal), &Locator::tag(actions::STEP_HEADER_SELECTOR)).await? {
            Some(header) => Ok(driver.text(&header).await?.trim().to_string()),
            None => Ok(String::new()),
        }
    }

    async fn locate_primary_action(
        &mut self,
        timeout: Duration,
    ) -> Result<Option<ActionControl>, AppError> {
        let driver = self.driver();
        let footer = match await_driver(
            move || async move {
                try_find(driver, None, &Locator::css(actions::FOOTER_SELECTOR)).await
            },
            timeout,
            DEFAULT_POLL_INTERVAL,
        )
        .await
        {
            Ok(footer) => footer,
            Err(DriverError::Timeout(_)) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        for locator in primary_action_strategies() {
            let Some(button) = try_find(driver, Some(&footer), &locator).await? else {
                continue;
            };
            scroll_into_view(driver, &button).await?;

            let candidate = &button;
            let clickable = await_driver(
                move || async move {
                    let ready = driver.is_displayed(candidate).await?
                        && driver.is_enabled(candidate).await?;
                    Ok(ready.then_some(()))
                },
                timeout,
                DEFAULT_POLL_INTERVAL,
            )
            .await;
            let usable = match clickable {
                Ok(()) => true,
                // Disabled-looking but visible: the script click still goes through.
                Err(DriverError::Timeout(_)) => driver.is_displayed(&button).await.unwrap_or(false),
                Err(e) if e.is_transient() => false,
                Err(e) => return Err(e.into()),
            };
            if usable {
                let label = self.action_label(&button).await?;
                debug!("Primary action '{}' via {}", label, locator);
                return Ok(Some(ActionControl {
                    element: button,
                    label,
                }));
            }
        }
        Ok(None)
    }

    async fn unfollow_company(&mut self) -> Result<bool, AppError> {
        let driver = self.driver();
        let Some(label) =
            try_find(driver, None, &Locator::css(actions::FOLLOW_LABEL_SELECTOR)).await?
        else {
            return Ok(false);
        };
        scroll_into_view(driver, &label).await?;
        let Some(checkbox) = try_find(driver, None, &Locator::id(actions::FOLLOW_CHECKBOX_ID)).await?
        else {
            return Ok(false);
        };
        if !driver.is_selected(&checkbox).await? {
            return Ok(false);
        }
        safe_click(driver, &label).await?;
        Ok(true)
    }

    async fn click_action(&mut self, action: &ActionControl) -> Result<(), AppError> {
        self.progress_before_click = progress_value(self.driver()).await?;
        safe_click(self.driver(), &action.element).await?;
        Ok(())
    }

    async fn wait_transition(
        &mut self,
        clicked: &ActionControl,
        timeout: Duration,
    ) -> Result<Option<Transition>, AppError> {
        let driver = self.driver();
        let before = self.progress_before_click.as_deref();
        let control = &clicked.element;
        let outcome = await_driver(
            move || async move {
                match driver.is_displayed(control).await {
                    Ok(false) | Err(DriverError::StaleElement) | Err(DriverError::NoSuchElement(_)) => {
                        return Ok(Some(Transition::ControlGone));
                    }
                    Ok(true) => {}
                    Err(e) => return Err(e),
                }
                let markers = driver
                    .find_all(None, &Locator::css(actions::NEXT_STEP_MARKER))
                    .await?;
                if markers.iter().any(|m| m != control) {
                    return Ok(Some(Transition::NextStep));
                }
                if let Some(before) = before {
                    if progress_value(driver).await?.as_deref() != Some(before) {
                        return Ok(Some(Transition::NextStep));
                    }
                }
                Ok(None)
            },
            timeout,
            DEFAULT_POLL_INTERVAL,
        )
        .await;
        match outcome {
            Ok(transition) => Ok(Some(transition)),
            Err(DriverError::Timeout(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn modal_present(&mut self) -> Result<bool, AppError> {
        Ok(try_find(self.driver(), None, &Locator::css(actions::MODAL_SELECTOR))
            .await?
            .is_some())
    }

    async fn dismiss_post_submit_dialog(&mut self) -> Result<bool, AppError> {
        let driver = self.driver();
        let found = await_driver(
            move || async move {
                for locator in post_submit_dismiss_strategies() {
                    if let Some(button) = try_find(driver, None, &locator).await? {
                        if driver.is_displayed(&button).await? {
                            return Ok(Some(button));
                        }
                    }
                }
                Ok(None)
            },
            DIALOG_TIMEOUT,
            DEFAULT_POLL_INTERVAL,
        )
        .await;
        match found {
            Ok(button) => {
                safe_click(driver, &button).await?;
                Ok(true)
            }
            Err(DriverError::Timeout(_)) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn discard(&mut self) -> Result<(), AppError> {
        let driver = self.driver();
        let dismiss = driver
            .find(None, &Locator::css(actions::DISCARD_SELECTOR))
            .await?;
        safe_click(driver, &dismiss).await?;
        let confirm = await_driver(
            move || async move {
                let buttons = driver
                    .find_all(None, &Locator::css(actions::DISCARD_CONFIRM_SELECTOR))
                    .await?;
                Ok(buttons.into_iter().next())
            },
            DISCARD_CONFIRM_TIMEOUT,
            DEFAULT_POLL_INTERVAL,
        )
        .await?;
        safe_click(driver, &confirm).await?;
        debug!("Discarded application");
        Ok(())
    }
}

#[async_trait]
impl JobBoard for LiveSession {
    async fn open_results(&mut self, url: &str) -> Result<(), AppError> {
        self.driver().navigate(url).await?;
        pace().await;
        Ok(())
    }

    async fn jobs_on_page(&mut self) -> Result<Vec<Job>, AppError> {
        Ok(jobs::read_tiles(self.driver()).await?)
    }
}
