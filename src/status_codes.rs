//! HTTP status code metadata loaded from a bundled JSON file.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::Deserialize;
use thiserror::Error;

/// Metadata for an HTTP status code.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
pub struct StatusInfo {
    /// Symbolic name, eg `NotFound`.
    pub name: String,
    /// Reason phrase, eg `Not Found`.
    pub reason: String,
    /// Other names scenarios commonly use for the same code.
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl StatusInfo {
    /// Returns true when `text` names this status, ignoring case and separators.
    pub fn is_named(&self, text: &str) -> bool {
        let wanted = fold_name(text);
        if wanted.is_empty() {
            return false;
        }
        std::iter::once(&self.name)
            .chain(std::iter::once(&self.reason))
            .chain(self.aliases.iter())
            .any(|candidate| fold_name(candidate) == wanted)
    }
}

/// Errors returned when loading status code metadata.
#[derive(Debug, Error)]
pub enum StatusCodesError {
    /// The JSON payload could not be parsed.
    #[error("Failed to parse status code JSON: {0}")]
    Parse(#[from] serde_json::Error),
    /// A status code key was not a valid u16.
    #[error("Invalid status code key in JSON: {0}")]
    InvalidCode(String),
    /// The metadata has not been initialized.
    #[error("Status code metadata has not been initialized")]
    NotInitialized,
}

static STATUS_CODES: OnceLock<BTreeMap<u16, StatusInfo>> = OnceLock::new();

/// Parse the bundled status code metadata. Safe to call more than once.
pub fn init() -> Result<(), StatusCodesError> {
    if STATUS_CODES.get().is_some() {
        return Ok(());
    }
    let raw = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/status_codes.json"));
    let parsed: BTreeMap<String, StatusInfo> = serde_json::from_str(raw)?;

    let mut converted = BTreeMap::new();
    for (code, info) in parsed {
        let code_num: u16 = code.parse().map_err(|_| StatusCodesError::InvalidCode(code))?;
        converted.insert(code_num, info);
    }

    let _ = STATUS_CODES.set(converted);
    Ok(())
}

/// Returns metadata for the given status code.
pub fn status_info(code: u16) -> Option<&'static StatusInfo> {
    STATUS_CODES.get()?.get(&code)
}

/// Returns the full list of status code metadata.
pub fn status_codes() -> Result<&'static BTreeMap<u16, StatusInfo>, StatusCodesError> {
    STATUS_CODES.get().ok_or(StatusCodesError::NotInitialized)
}

/// Checks a scenario's expected status against the code a response carried.
///
/// `expected` may be a number (`404`), a number followed by anything
/// (`404 Not Found`), a symbolic name (`NotFound`) or a reason phrase
/// (`not found`). Names are only matched against codes in the table.
pub fn status_matches(expected: &str, actual: u16) -> Result<bool, StatusCodesError> {
    let expected = expected.trim();
    if let Some(code) = leading_code(expected) {
        return Ok(code == actual);
    }
    let table = status_codes()?;
    Ok(table
        .get(&actual)
        .is_some_and(|info| info.is_named(expected)))
}

/// Renders a status for failure messages, eg `404 NotFound`.
pub fn describe(code: u16) -> String {
    match status_info(code) {
        Some(info) => format!("{code} {}", info.name),
        None => code.to_string(),
    }
}

fn leading_code(text: &str) -> Option<u16> {
    let digits = text
        .find(|c: char| !c.is_ascii_digit())
        .map_or(text, |end| &text[..end]);
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

fn fold_name(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn bundled_table_loads() {
        init().expect("load status table");
        init().expect("second init is a no-op");
        let table = status_codes().expect("table");
        assert_eq!(table.get(&200).map(|info| info.name.as_str()), Some("OK"));
        assert_eq!(
            status_info(404).map(|info| info.reason.as_str()),
            Some("Not Found")
        );
        assert!(status_info(299).is_none());
    }

    #[rstest]
    #[case("OK", 200)]
    #[case("ok", 200)]
    #[case("200", 200)]
    #[case(" 200 ", 200)]
    #[case("NotFound", 404)]
    #[case("Not Found", 404)]
    #[case("not-found", 404)]
    #[case("404 Not Found", 404)]
    #[case("Redirect", 302)]
    #[case("Found", 302)]
    #[case("I'm a teapot", 418)]
    #[case("InternalServerError", 500)]
    fn matching_statuses(#[case] expected: &str, #[case] actual: u16) {
        init().expect("load status table");
        assert!(status_matches(expected, actual).expect("lookup"));
    }

    #[rstest]
    #[case("OK", 404)]
    #[case("NotFound", 200)]
    #[case("201", 200)]
    #[case("", 200)]
    #[case("Teapot", 418)]
    #[case("Whatever", 299)]
    fn mismatching_statuses(#[case] expected: &str, #[case] actual: u16) {
        init().expect("load status table");
        assert!(!status_matches(expected, actual).expect("lookup"));
    }

    #[test]
    fn describe_uses_symbolic_name() {
        init().expect("load status table");
        assert_eq!(describe(404), "404 NotFound");
        assert_eq!(describe(299), "299");
    }

    #[test]
    fn oversized_codes_never_match() {
        init().expect("load status table");
        assert!(!status_matches("99999", 200).expect("lookup"));
    }
}
