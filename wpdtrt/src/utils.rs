//! Common utilities and helper functions.
//!
//! String processing shared by the config loader and the widget helpers.

use std::sync::LazyLock;

use regex::Regex;

static ENV_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{env:([^{}]*)\}").expect("valid placeholder regex"));

static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<!--.*?-->|<\?.*?\?>|</?[A-Za-z!][^>]*>").expect("valid tag regex")
});

/// Replaces environment variable placeholders in a string.
///
/// Placeholders use the format `${env:VAR_NAME}`. An unset variable is
/// replaced with an empty string. Any other `${...}` text is left as is.
///
/// # Example
///
/// ```rust
/// use wpdtrt::utils::replace_env_placeholders;
///
/// unsafe { std::env::set_var("WPDTRT_DOC_DIR", "/srv/www"); }
/// let result = replace_env_placeholders("${env:WPDTRT_DOC_DIR}/wp-content");
/// assert_eq!(result, "/srv/www/wp-content");
/// ```
pub fn replace_env_placeholders(input: &str) -> String {
    ENV_PLACEHOLDER
        .replace_all(input, |caps: &regex::Captures| {
            let name = &caps[1];
            match std::env::var(name) {
                Ok(value) => {
                    debug!("using {name}={value}");
                    value
                }
                Err(_) => String::new(),
            }
        })
        .into_owned()
}

/// Removes HTML and PHP tags from user input, keeping the text between them.
pub fn strip_tags(input: &str) -> String {
    HTML_TAG.replace_all(input, "").into_owned()
}
