//! Locator vocabulary for the wizard's footer controls and the dialogs around it.

use crate::driver::Locator;

pub const MODAL_SELECTOR: &str = "div.jobs-easy-apply-modal";
pub const MODAL_CONTENT_SELECTOR: &str = "div.jobs-easy-apply-modal__content";
pub const FOOTER_SELECTOR: &str = "div.jobs-easy-apply-modal footer";
pub const STEP_HEADER_SELECTOR: &str = "h3";

pub const FOLLOW_CHECKBOX_ID: &str = "follow-company-checkbox";
pub const FOLLOW_LABEL_SELECTOR: &str = "footer label[for='follow-company-checkbox']";

pub const DISCARD_SELECTOR: &str = ".artdeco-modal__dismiss";
pub const DISCARD_CONFIRM_SELECTOR: &str = ".artdeco-modal__confirm-dialog-btn";

/// Any of these rendering after a click means another step follows.
pub const NEXT_STEP_MARKER: &str = "button[data-live-test-easy-apply-submit-button],\
button[data-live-test-easy-apply-review-button],\
button[data-live-test-easy-apply-next-button]";

/// Step headers that announce long forms and get the extended locate wait.
pub const EXTENDED_WAIT_HEADER: &str = "additional questions";

const SUBMIT_MARKERS: &[&str] = &["submit", "soumettre", "envoyer", "enviar", "absenden"];

/// Primary-action strategies, most specific first. Always evaluated inside the footer.
pub fn primary_action_strategies() -> Vec<Locator> {
    vec![
        Locator::css("button[data-live-test-easy-apply-next-button]"),
        Locator::css("button[data-live-test-easy-apply-review-button]"),
        Locator::css("button[data-live-test-easy-apply-submit-button]"),
        Locator::css("button[data-easy-apply-next-button]"),
        Locator::css("button[aria-label*='Continue to next step']"),
        Locator::css("button[aria-label*='Review your application']"),
        Locator::css("button[aria-label*='Submit application']"),
        Locator::css("button.artdeco-button--primary"),
    ]
}

/// Ways to close the confirmation dialog that can follow a submission.
pub fn post_submit_dismiss_strategies() -> Vec<Locator> {
    vec![
        Locator::css("div[role='dialog'] button[aria-label='Dismiss']"),
        Locator::xpath("//div[@role='dialog']//button[.//span[normalize-space()='Done']]"),
        Locator::xpath("//div[@role='dialog']//button[.//span[normalize-space()='Not now']]"),
    ]
}

pub fn is_submit_label(label: &str) -> bool {
    let label = label.to_lowercase();
    SUBMIT_MARKERS.iter().any(|m| label.contains(m))
}

pub fn wants_extended_wait(header: &str) -> bool {
    header.to_lowercase().contains(EXTENDED_WAIT_HEADER)
}
