//! Result-page URLs for one (position, location) search pair.

use url::form_urlencoded::byte_serialize;

use crate::config::SearchConfig;
use crate::site::selectors::SEARCH_URL;

pub const PAGE_SIZE: u32 = 25;

/// Filter query shared by every search of the run: `?f_CF=...&f_LF=f_AL[&f_TPR=...]`.
pub fn base_query(config: &SearchConfig) -> String {
    let mut parts = Vec::new();
    if config.remote {
        parts.push("f_CF=f_WRA".to_string());
    }
    let levels = config.experience_level.enabled_codes();
    if !levels.is_empty() {
        parts.push(format!("f_E={}", levels.join(",")));
    }
    parts.push(format!("distance={}", config.distance));
    let job_types = config.job_types.enabled_codes();
    if !job_types.is_empty() {
        parts.push(format!("f_JT={}", job_types.join(",")));
    }
    // Quick-apply listings only.
    parts.push("f_LF=f_AL".to_string());
    format!("?{}{}", parts.join("&"), config.date.filter())
}

fn encode(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}

pub fn page_url(base_query: &str, position: &str, location: &str, page: u32) -> String {
    format!(
        "{SEARCH_URL}{base_query}&keywords={}&location={}&start={}",
        encode(position),
        encode(location),
        page * PAGE_SIZE
    )
}
