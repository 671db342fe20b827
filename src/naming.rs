//! Source keys and output slugs.
//!
//! A source image is identified by its path relative to the assets root,
//! normalized to forward slashes. That key is what the manifest is indexed by
//! and what the UI asks the resolver for:
//!
//! - `pro1/pro1s1.PNG` (on any host) → key `"pro1/pro1s1.PNG"`
//!
//! Output files are named from a slug: the key without its extension, with
//! every `/` replaced by `_`. Folding the directories into the slug keeps
//! same-named files in different directories apart:
//!
//! - `a/x.png` → `a_x`
//! - `b/x.png` → `b_x`

use std::path::{Component, Path};

/// Separator substituted for `/` when building a slug.
pub const SLUG_SEPARATOR: char = '_';

/// Normalize a path relative to the assets root into a manifest key.
///
/// Only normal components are kept, joined with `/`. Returns `None` when the
/// path has no normal components or is not valid UTF-8.
pub fn normalize_key(relative: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            Component::CurDir => {}
            _ => return None,
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Derive the output slug from a normalized key.
///
/// ```
/// # use folio_images::naming::slug_for_key;
/// assert_eq!(slug_for_key("pro1/pro1s1.PNG"), "pro1_pro1s1");
/// assert_eq!(slug_for_key("hero.jpg"), "hero");
/// ```
pub fn slug_for_key(key: &str) -> String {
    let (dir, file) = match key.rfind('/') {
        Some(pos) => (&key[..pos], &key[pos + 1..]),
        None => ("", key),
    };
    let stem = match file.rfind('.') {
        Some(0) | None => file,
        Some(pos) => &file[..pos],
    };
    let mut slug = String::with_capacity(key.len());
    for part in dir.split('/').filter(|p| !p.is_empty()) {
        slug.push_str(part);
        slug.push(SLUG_SEPARATOR);
    }
    slug.push_str(stem);
    slug.chars()
        .map(|c| if c == '\\' { SLUG_SEPARATOR } else { c })
        .collect()
}

/// Lowercased extension of a key's file name, if any.
pub fn key_extension(key: &str) -> Option<String> {
    Path::new(key)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}
