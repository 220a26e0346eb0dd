//! Build script for storefront crate.
//!
//! Content-hashes the static assets referenced by the base template so pages
//! can link them with a `?v=<hash>` cache-busting query.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

/// (path under `static/`, env var carrying its hash)
const ASSETS: &[(&str, &str)] = &[
    ("css/main.css", "CSS_HASH"),
    ("js/upload.js", "UPLOAD_JS_HASH"),
    ("js/checkout.js", "CHECKOUT_JS_HASH"),
];

fn main() {
    let manifest_dir =
        env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set by Cargo");
    let static_dir = Path::new(&manifest_dir).join("static");

    for (relative, env_name) in ASSETS {
        hash_asset(&static_dir.join(relative), env_name);
    }
}

/// Set `env_name` to the first 8 hex chars of the file's SHA-256.
///
/// A missing file yields an empty hash and a warning.
fn hash_asset(path: &Path, env_name: &str) {
    println!("cargo:rerun-if-changed={}", path.display());

    let content = match fs::read(path) {
        Ok(content) => content,
        Err(e) => {
            println!("cargo:warning=Could not read {}: {e}", path.display());
            println!("cargo:rustc-env={env_name}=");
            return;
        }
    };

    let hash = format!("{:x}", Sha256::digest(&content));
    let short_hash = hash.get(..8).unwrap_or(&hash);
    println!("cargo:rustc-env={env_name}={short_hash}");
}
