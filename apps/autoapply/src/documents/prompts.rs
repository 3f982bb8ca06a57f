pub const COVER_LETTER_TEMPLATE: &str = "\
{profile}

{job}

Write a cover letter for this position on behalf of the applicant. Use only facts \
present in the applicant's profile and resume; do not invent employers, degrees or \
numbers. Three short paragraphs, no address block, no placeholders in brackets. \
Sign with the applicant's name.";
