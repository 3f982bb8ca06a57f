// Prompt templates for form answers. Rendered with `llm_client::prompts::render`.

pub const TEXT_QUESTION_TEMPLATE: &str = "\
{profile}

{job}

The application form asks:
\"{question}\"

Write the answer the applicant would type into this field. {short}";

pub const NUMERIC_QUESTION_TEMPLATE: &str = "\
{profile}

The application form asks for a number:
\"{question}\"

Reply with a single whole number and nothing else. If the resume does not say, \
reply with {default}.";

pub const OPTIONS_QUESTION_TEMPLATE: &str = "\
{profile}

{job}

The application form asks:
\"{question}\"

Choose exactly one of these options and reply with the option text verbatim:
{options}";

pub const NUMERIC_RANGE_TEMPLATE: &str = "\
A numeric field in a job application rejected the value \"{answer}\" for the question:
\"{question}\"

The form showed this validation message:
\"{error}\"

Reply with the accepted range as two whole numbers separated by a comma, \
minimum first, for example: 0,99";

/// Renders options one per line, prefixed with a dash.
pub fn option_list(options: &[String]) -> String {
    options
        .iter()
        .map(|o| format!("- {o}"))
        .collect::<Vec<_>>()
        .join("\n")
}
