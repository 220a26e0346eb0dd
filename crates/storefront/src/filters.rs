//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Returns the build-time content hash of a static asset, empty for unknown
/// assets.
///
/// Usage in templates: `/static/css/main.css?v={{ "main.css"|asset_hash }}`
#[askama::filter_fn]
pub fn asset_hash(value: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(hash_for(&value.to_string()))
}

fn hash_for(asset: &str) -> &'static str {
    match asset {
        "main.css" => env!("CSS_HASH"),
        "upload.js" => env!("UPLOAD_JS_HASH"),
        "checkout.js" => env!("CHECKOUT_JS_HASH"),
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_asset_has_no_hash() {
        assert_eq!(hash_for("missing.css"), "");
        assert_eq!(hash_for("main.css"), env!("CSS_HASH"));
    }
}
