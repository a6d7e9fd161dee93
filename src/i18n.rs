use crate::error::JarcatError;
use fluent_templates::fluent_bundle::FluentValue;
use fluent_templates::{static_loader, Loader};
use std::collections::HashMap;
use unic_langid::LanguageIdentifier;

static_loader! {
    static LOCALES = {
        locales: "locales",
        fallback_language: "en-US",
    };
}

pub fn localize_error(err: &JarcatError) -> String {
    let langid = resolve_language();
    match err {
        JarcatError::Http(detail) => message_with_detail(&langid, "error-http", &detail.to_string()),
        JarcatError::Store(detail) => message_with_detail(&langid, "error-store", detail),
        JarcatError::Collector(detail) => message_with_detail(&langid, "error-collector", detail),
        JarcatError::InvalidUrl(detail) => message_with_detail(&langid, "error-invalid-url", detail),
        JarcatError::Io(detail) => message_with_detail(&langid, "error-io", &detail.to_string()),
        JarcatError::Json(detail) => message_with_detail(&langid, "error-json", &detail.to_string()),
        JarcatError::Config(detail) => message_with_detail(&langid, "error-config", detail),
        JarcatError::PermissionDenied(detail) => {
            message_with_detail(&langid, "error-permission-denied", detail)
        }
        JarcatError::FileNotFound(detail) => {
            message_with_detail(&langid, "error-file-not-found", detail)
        }
        JarcatError::Unsupported(detail) => message_with_detail(&langid, "error-unsupported", detail),
    }
}

fn message_with_detail(langid: &LanguageIdentifier, key: &str, detail: &str) -> String {
    let mut args = HashMap::new();
    args.insert("detail", FluentValue::from(detail));
    LOCALES.lookup_with_args(langid, key, &args)
}

fn resolve_language() -> LanguageIdentifier {
    for key in ["LC_ALL", "LC_MESSAGES", "LANG"] {
        if let Ok(value) = std::env::var(key) {
            if let Some(lang) = normalize_lang(value) {
                if let Ok(langid) = lang.parse::<LanguageIdentifier>() {
                    return langid;
                }
            }
        }
    }
    "en-US".parse().expect("valid fallback language")
}

fn normalize_lang(value: String) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let value = value.split('.').next().unwrap_or(value);
    let value = value.replace('_', "-");
    Some(value)
}
