//! Message catalog in the banana-i18n JSON format used by the web frontend.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::Value;

pub const MSG_APP_REGISTER_SUCCESS: &str = "developersettings-appregistersuccesstext";
pub const MSG_APP_UPDATE_SUCCESS: &str = "developersettings-appupdatesuccess";
pub const MSG_APP_UPDATE_ERROR: &str = "developersettings-appupdateerror";
pub const MSG_APP_DELETED: &str = "appdeleted";
pub const MSG_API_ERROR: &str = "apierror";
pub const MSG_API_ERRORS: &str = "apierrors";

const ENGLISH: &[(&str, &str)] = &[
    (
        MSG_APP_REGISTER_SUCCESS,
        "Your application \"$1\" has been registered.",
    ),
    (MSG_APP_UPDATE_SUCCESS, "Application $1 has been updated."),
    (MSG_APP_UPDATE_ERROR, "Application $1 could not be updated."),
    (MSG_APP_DELETED, "Application $1 has been deleted."),
    (MSG_API_ERROR, "API error: $1"),
    (MSG_API_ERRORS, "API error in field \"$1\": $2"),
];

#[derive(Debug, Clone)]
pub struct Messages {
    locale: String,
    catalog: HashMap<String, String>,
}

impl Default for Messages {
    fn default() -> Self {
        Self::english()
    }
}

impl Messages {
    pub fn english() -> Self {
        Self {
            locale: "en".to_string(),
            catalog: ENGLISH
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Parse a catalog and layer it over English. Keys starting with `@`
    /// (such as `@metadata`) and non-string values are skipped.
    pub fn from_json_str(locale: &str, json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json).context("message catalog is not valid JSON")?;
        let Value::Object(entries) = value else {
            bail!("message catalog must be a JSON object");
        };

        let mut messages = Self::english();
        messages.locale = locale.to_string();
        for (key, text) in entries {
            if key.starts_with('@') {
                continue;
            }
            if let Value::String(text) = text {
                messages.catalog.insert(key, text);
            }
        }
        Ok(messages)
    }

    /// Load `<locale>.json`; the file stem names the locale.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read message catalog {}", path.display()))?;
        let locale = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("en");
        Self::from_json_str(locale, &json)
            .with_context(|| format!("failed to load message catalog {}", path.display()))
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Render `key`, replacing `$1`, `$2`, ... with `args` in one pass, so
    /// argument text is never expanded again. Placeholders without a
    /// matching argument stay as written. Unknown keys render as `⧼key⧽`.
    pub fn t(&self, key: &str, args: &[&str]) -> String {
        let Some(template) = self.catalog.get(key) else {
            return format!("⧼{key}⧽");
        };

        let mut rendered = String::with_capacity(template.len());
        let mut rest = template.as_str();
        while let Some(pos) = rest.find('$') {
            rendered.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];
            let digits = after
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(after.len());
            let arg = after[..digits]
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|index| args.get(index));
            match arg {
                Some(arg) => rendered.push_str(arg),
                None => rendered.push_str(&rest[pos..pos + 1 + digits]),
            }
            rest = &after[digits..];
        }
        rendered.push_str(rest);
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn renders_positional_arguments() {
        let messages = Messages::english();
        assert_eq!(
            messages.t(MSG_API_ERRORS, &["name", "This field may not be blank."]),
            "API error in field \"name\": This field may not be blank."
        );
        assert_eq!(messages.t(MSG_APP_DELETED, &["abc"]), "Application abc has been deleted.");
    }

    #[test]
    fn argument_text_is_not_expanded_again() {
        let messages = Messages::english();
        assert_eq!(
            messages.t(MSG_API_ERRORS, &["name", "must not contain $1"]),
            "API error in field \"name\": must not contain $1"
        );
        assert_eq!(messages.t(MSG_API_ERROR, &["costs $2 or $"]), "API error: costs $2 or $");
    }

    #[test]
    fn unmatched_placeholders_stay_literal() {
        let messages =
            Messages::from_json_str("en", r#"{"custom": "$1 of $2, $10 and $0 cost $"}"#).unwrap();
        assert_eq!(messages.t("custom", &["one"]), "one of $2, $10 and $0 cost $");
    }

    #[test]
    fn missing_key_is_visible() {
        assert_eq!(Messages::english().t("nope", &[]), "⧼nope⧽");
    }

    #[test]
    fn locale_file_overrides_english() {
        let mut file = tempfile::Builder::new()
            .prefix("fr")
            .suffix(".json")
            .tempfile()
            .unwrap();
        write!(
            file,
            r#"{{"@metadata": {{"authors": ["x"]}}, "appdeleted": "Application $1 supprimée."}}"#
        )
        .unwrap();

        let messages = Messages::load(file.path()).unwrap();
        assert!(messages.locale().starts_with("fr"));
        assert_eq!(messages.t(MSG_APP_DELETED, &["abc"]), "Application abc supprimée.");
        assert_eq!(messages.t(MSG_API_ERROR, &["x"]), "API error: x");
    }

    #[test]
    fn rejects_non_object_catalogs() {
        assert!(Messages::from_json_str("en", "[]").is_err());
        assert!(Messages::from_json_str("en", "{").is_err());
    }
}
