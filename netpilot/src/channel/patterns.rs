//! Prompt pattern helpers.

use memchr::memchr;
use regex::bytes::Regex;

/// Combine several prompt patterns into one alternation.
pub fn combine_patterns<'a>(patterns: impl IntoIterator<Item = &'a Regex>) -> Result<Regex, regex::Error> {
    let combined: Vec<String> = patterns
        .into_iter()
        .map(|p| format!("(?:{})", p.as_str()))
        .collect();
    Regex::new(&combined.join("|"))
}

/// Split raw output into the body and the trailing prompt matched by `prompt`.
///
/// If no prompt is found the whole input is body.
pub fn split_prompt<'a>(raw: &'a str, prompt: &Regex) -> (&'a str, &'a str) {
    match prompt.find_iter(raw.as_bytes()).last() {
        Some(m) => (&raw[..m.start()], raw[m.start()..].trim()),
        None => (raw, ""),
    }
}

/// Remove the device's echo of `command` from the start of `body`.
///
/// Multi-line commands are echoed line by line; each echoed line is dropped
/// while it ends with the corresponding command line.
pub fn strip_echo<'a>(body: &'a str, command: &str) -> &'a str {
    let mut rest = body.trim_start_matches(['\r', '\n']);
    for expected in command.lines() {
        let expected = expected.trim();
        let line_end = memchr(b'\n', rest.as_bytes()).unwrap_or(rest.len());
        let line = rest[..line_end].trim_end_matches('\r').trim_end();
        if expected.is_empty() || !line.ends_with(expected) {
            break;
        }
        rest = rest.get(line_end + 1..).unwrap_or("");
    }
    rest
}

/// Convert CRLF (and stray CR) line endings to LF.
pub fn unify_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "")
}
