//! Page locations and CSS hooks of the job site.

pub const HOME_URL: &str = "https://www.linkedin.com";
pub const FEED_URL: &str = "https://www.linkedin.com/feed";
pub const LOGIN_URL: &str = "https://www.linkedin.com/login";
pub const SEARCH_URL: &str = "https://www.linkedin.com/jobs/search/";

pub const FEED_PATH: &str = "/feed";
pub const CHECKPOINT_PATH: &str = "/checkpoint/";

// Login
pub const USERNAME_ID: &str = "username";
pub const PASSWORD_ID: &str = "password";
pub const LOGIN_SUBMIT_XPATH: &str = "//button[@type='submit']";
pub const FEED_MARKER_CLASS: &str = "share-box-feed-entry__trigger";

// Result list
pub const NO_RESULTS_CLASS: &str = "artdeco-empty-state__headline";
pub const JOB_TILE: &str = "li[data-occludable-job-id]";
pub const TILE_LINK: &str = "a.job-card-container__link";
pub const TILE_COMPANY: &str = ".artdeco-entity-lockup__subtitle span";
pub const TILE_LOCATION: &str = "ul.job-card-container__metadata-wrapper li span";
pub const TILE_FOOTER_ITEMS: &str = "ul.job-card-list__footer-wrapper li";
/// Footer entries that are not the apply method.
pub const TILE_FOOTER_NOISE: &[&str] = &["ago", "viewed", "promoted"];

// Job detail pane
pub const DESCRIPTION_READY: &str =
    "div.jobs-description, #job-details, article.jobs-description__container";
pub const SHOW_MORE: &str =
    "button.inline-show-more-text__button, button.jobs-description__footer-button";
/// Description containers, newest layout first.
pub const DESCRIPTION_FALLBACKS: &[&str] = &[
    "#job-details",
    "article.jobs-description__container .jobs-box__html-content",
    "div.jobs-description-content__text--stretch",
    "div.jobs-search__job-details--container, div.jobs-description",
];
pub const QUICK_APPLY_BUTTON_XPATH: &str =
    "//button[contains(@class, 'jobs-apply-button') and contains(., 'Easy Apply')]";

// Form step
pub const FORM_TAG: &str = "form";
pub const FIELD_CONTAINER: &str = "[data-test-form-element]";
pub const UPLOAD_BLOCK: &str = "div[class*='jobs-document-upload']";
pub const INLINE_ERROR: &str = ".artdeco-inline-feedback--error";
pub const PROGRESS: &str = "progress, [role='progressbar']";
