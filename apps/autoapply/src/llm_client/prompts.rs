// Shared prompt fragments. Feature modules keep their own templates in a
// prompts.rs next to the code that renders them.

/// System prompt for every completion: answer as the applicant, plain text only.
pub const ANSWER_SYSTEM: &str = "You are filling in a job application on behalf of the \
    applicant described in the prompt. Answer in the first person, as the applicant. \
    Respond with the answer only: no preamble, no quotes, no markdown, no explanations.";

/// Appended to prompts whose answer lands in a short form field.
pub const SHORT_ANSWER_INSTRUCTION: &str = "\
    Keep the answer short and factual. Never answer with an instruction such as \
    'Select an option' and never leave the answer empty.";

/// Substitutes `{name}` placeholders in `template`.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    vars.iter().fold(template.to_string(), |acc, (name, value)| {
        acc.replace(&format!("{{{name}}}"), value)
    })
}
