use regex::Regex;

const BULLET: char = '•';
const GREETING_SUFFIX: &str = "Dear valued customer";
const FOOTER_PREFIX: &str = "Please do NOT reply to this message";

/// Split a notification body into candidate lines.
///
/// Bodies arrive either as plain text or as HTML-ish text with `<br>`
/// separators; both are handled the same way.
pub fn sanitize_lines(body: &str) -> Vec<String> {
    body.split('\n')
        .flat_map(|chunk| chunk.split("<br>"))
        .map(|line| line.replace(BULLET, "").trim().to_string())
        .filter(|line| {
            !line.is_empty()
                && !line.ends_with(GREETING_SUFFIX)
                && !line.starts_with(FOOTER_PREFIX)
        })
        .collect()
}

/// Boilerplate that leaks into bodies, e.g. inline CSS rules.
pub fn is_ignorable(line: &str, ignorable: &[Regex]) -> bool {
    ignorable.iter().any(|re| re.is_match(line))
}
