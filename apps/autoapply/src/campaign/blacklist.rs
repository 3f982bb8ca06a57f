/// A title matches when any of its whitespace-separated words equals a blacklisted
/// word; a company matches on trimmed, case-insensitive equality.
pub fn is_blacklisted(
    title: &str,
    company: &str,
    title_blacklist: &[String],
    company_blacklist: &[String],
) -> bool {
    let title_lower = title.to_lowercase();
    let title_hit = title_lower.split_whitespace().any(|word| {
        title_blacklist
            .iter()
            .any(|banned| banned.trim().eq_ignore_ascii_case(word))
    });
    let company = company.trim().to_lowercase();
    let company_hit = company_blacklist
        .iter()
        .any(|banned| banned.trim().to_lowercase() == company);
    title_hit || company_hit
}
