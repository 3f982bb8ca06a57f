//! Dropdown shortcuts for questions that map directly onto a profile field.

use crate::answers::placeholder::is_placeholder_option;
use crate::models::Profile;

const PHONE_CODE_KEYWORDS: &[&str] = &[
    "country code",
    "phone code",
    "dialing code",
    "indicatif",
    "código de país",
    "código do país",
    "prefijo",
    "ländervorwahl",
    "landesvorwahl",
];
const EMAIL_KEYWORDS: &[&str] = &["email", "e-mail", "courriel", "correo"];
const CITY_KEYWORDS: &[&str] = &["city", "ville", "ciudad", "stadt", "cidade"];
const COUNTRY_KEYWORDS: &[&str] = &["country", "pays", "país", "paese"];

enum ProfileField {
    PhoneCode,
    Email,
    City,
    Country,
}

fn detect(question: &str) -> Option<ProfileField> {
    let q = question.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| contains_word(&q, w));
    // Phone code questions mention "country", so they are checked first.
    if has(PHONE_CODE_KEYWORDS) {
        Some(ProfileField::PhoneCode)
    } else if has(EMAIL_KEYWORDS) {
        Some(ProfileField::Email)
    } else if has(CITY_KEYWORDS) {
        Some(ProfileField::City)
    } else if has(COUNTRY_KEYWORDS) {
        Some(ProfileField::Country)
    } else {
        None
    }
}

/// True when `word` occurs in `haystack` without an alphanumeric neighbour.
pub(crate) fn contains_word(haystack: &str, word: &str) -> bool {
    haystack.match_indices(word).any(|(idx, _)| {
        let before = haystack[..idx].chars().next_back();
        let after = haystack[idx + word.len()..].chars().next();
        !before.map_or(false, char::is_alphanumeric) && !after.map_or(false, char::is_alphanumeric)
    })
}

/// `+49` must not match `+491`.
fn contains_dial_code(option: &str, code: &str) -> bool {
    let needle = format!("+{}", code.trim_start_matches('+'));
    option.match_indices(&needle).any(|(idx, _)| {
        option[idx + needle.len()..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_ascii_digit())
    })
}

/// Picks the option holding the profile value the question asks for.
pub fn context_heuristic(question: &str, options: &[String], profile: &Profile) -> Option<String> {
    let field = detect(question)?;
    let candidates = options.iter().filter(|o| !is_placeholder_option(o));
    let contains = |value: &str| {
        let value = value.trim().to_lowercase();
        move |o: &&String| !value.is_empty() && o.to_lowercase().contains(&value)
    };

    let found = match field {
        ProfileField::PhoneCode => {
            let code = profile.phone_country_code.trim();
            if code.is_empty() {
                return None;
            }
            candidates
                .clone()
                .find(|o| contains_dial_code(o, code))
                .or_else(|| candidates.clone().find(contains(&profile.country)))
        }
        ProfileField::Email => candidates.clone().find(contains(&profile.email)),
        ProfileField::City => candidates.clone().find(contains(&profile.city)),
        ProfileField::Country => candidates.clone().find(contains(&profile.country)),
    };
    found.cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::sample_profile;

    fn opts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_phone_country_code_matches_exact_dial_code() {
        let options = opts(&[
            "Select an option",
            "Guernsey (+441)",
            "Germany (+49)",
            "Ghana (+233)",
        ]);
        let profile = sample_profile();
        assert_eq!(
            context_heuristic("Phone country code", &options, &profile).as_deref(),
            Some("Germany (+49)")
        );
        assert!(!contains_dial_code("Guernsey (+441)", "44"));
    }

    #[test]
    fn test_email_and_city_in_other_languages() {
        let profile = sample_profile();
        let emails = opts(&["Sélectionnez une option", "ada@example.com"]);
        assert_eq!(
            context_heuristic("Adresse courriel", &emails, &profile).as_deref(),
            Some("ada@example.com")
        );
        let cities = opts(&["Munich", "Berlin, Berlin, Germany"]);
        assert_eq!(
            context_heuristic("¿En qué ciudad vives?", &cities, &profile).as_deref(),
            Some("Berlin, Berlin, Germany")
        );
    }

    #[test]
    fn test_keywords_match_whole_words_only() {
        let profile = sample_profile();
        let options = opts(&["Prefer not to say", "Berlin"]);
        assert_eq!(
            context_heuristic("What is your ethnicity?", &options, &profile),
            None
        );
        assert_eq!(
            context_heuristic("City of residence", &options, &profile).as_deref(),
            Some("Berlin")
        );
    }

    #[test]
    fn test_unrelated_question_is_left_alone() {
        let profile = sample_profile();
        let options = opts(&["Yes", "No"]);
        assert_eq!(
            context_heuristic("Are you willing to relocate?", &options, &profile),
            None
        );
    }
}
