//! Project image references.
//!
//! A project's image field holds either a local source key (resolved through
//! the manifest) or an absolute remote URL (used as-is). The distinction is
//! made once, when project data is loaded, instead of on every render.

use crate::resolve::{AssetIndex, ResolvedImage, Resolver};
use serde::{Deserialize, Serialize};

/// A parsed image field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ImageRef {
    /// Source key relative to the assets root, e.g. `pro1/pro1s1.PNG`.
    Local { key: String },
    /// Absolute `http`/`https` URL.
    Remote { url: String },
}

/// What a rendering pass should emit for one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderSource {
    /// Responsive `<picture>` with the resolved variants.
    Picture(ResolvedImage),
    /// Plain `<img src>`.
    Url(String),
    /// Nothing to show; the caller draws its placeholder.
    Placeholder,
}

impl ImageRef {
    /// Parse a raw image field. Empty or blank fields mean "no image".
    ///
    /// ```
    /// # use folio_images::image_ref::ImageRef;
    /// assert_eq!(
    ///     ImageRef::parse("HTTPS://cdn.example.com/a.png"),
    ///     Some(ImageRef::Remote { url: "HTTPS://cdn.example.com/a.png".into() })
    /// );
    /// assert_eq!(
    ///     ImageRef::parse("pro1/pro1s1.PNG"),
    ///     Some(ImageRef::Local { key: "pro1/pro1s1.PNG".into() })
    /// );
    /// assert_eq!(ImageRef::parse("  "), None);
    /// ```
    pub fn parse(raw: &str) -> Option<Self> {
        let value = raw.trim();
        if value.is_empty() {
            return None;
        }
        if is_remote(value) {
            Some(ImageRef::Remote {
                url: value.to_string(),
            })
        } else {
            Some(ImageRef::Local {
                key: value.trim_start_matches("./").to_string(),
            })
        }
    }

    /// Parse a list of fields (e.g. a gallery), dropping empty ones.
    pub fn parse_all<'a>(raw: impl IntoIterator<Item = &'a str>) -> Vec<Self> {
        raw.into_iter().filter_map(Self::parse).collect()
    }

    /// Decide what to render. A local key missing from the manifest becomes a
    /// placeholder; it never fails.
    pub fn render_source<I: AssetIndex>(&self, resolver: &Resolver<I>) -> RenderSource {
        match self {
            ImageRef::Remote { url } => RenderSource::Url(url.clone()),
            ImageRef::Local { key } => match resolver.lookup(key) {
                Some(image) => RenderSource::Picture(image),
                None => RenderSource::Placeholder,
            },
        }
    }
}

fn is_remote(value: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        value
            .get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{Manifest, ManifestEntry, PreferredPair, Variant};
    use crate::resolve::NoAssetIndex;
    use crate::types::OutputFormat;

    fn resolver() -> Resolver<NoAssetIndex> {
        let mut manifest = Manifest::new();
        manifest.insert(ManifestEntry {
            source: "hero.jpg".into(),
            variants: vec![Variant {
                width: 320,
                format: OutputFormat::Webp,
                path: "optimized/hero_320.webp".into(),
            }],
            preferred: PreferredPair {
                webp: "optimized/hero_800.webp".into(),
                jpg: "optimized/hero_800.jpg".into(),
            },
        });
        Resolver::new(manifest, NoAssetIndex, "/src/assets")
    }

    #[test]
    fn remote_schemes_case_insensitive() {
        assert!(matches!(ImageRef::parse("http://x.dev/a.png"), Some(ImageRef::Remote { .. })));
        assert!(matches!(ImageRef::parse("Https://x.dev/a.png"), Some(ImageRef::Remote { .. })));
    }

    #[test]
    fn other_schemes_and_relative_paths_are_local() {
        assert!(matches!(ImageRef::parse("ftp://x/a.png"), Some(ImageRef::Local { .. })));
        assert!(matches!(ImageRef::parse("httpfoo.png"), Some(ImageRef::Local { .. })));
        assert_eq!(
            ImageRef::parse("./gallery/a.png"),
            Some(ImageRef::Local { key: "gallery/a.png".into() })
        );
    }

    #[test]
    fn empty_field_is_no_image() {
        assert_eq!(ImageRef::parse(""), None);
        assert!(ImageRef::parse_all(["", "a.png", " "]).len() == 1);
    }

    #[test]
    fn render_remote_as_plain_url() {
        let r = ImageRef::parse("https://cdn.example.com/a.png").unwrap();
        assert_eq!(
            r.render_source(&resolver()),
            RenderSource::Url("https://cdn.example.com/a.png".into())
        );
    }

    #[test]
    fn render_local_hit_as_picture() {
        let r = ImageRef::parse("hero.jpg").unwrap();
        match r.render_source(&resolver()) {
            RenderSource::Picture(image) => {
                assert_eq!(image.jpg, "/src/assets/optimized/hero_800.jpg");
                assert_eq!(image.srcset_webp, "/src/assets/optimized/hero_320.webp 320w");
            }
            other => panic!("expected picture, got {other:?}"),
        }
    }

    #[test]
    fn render_local_miss_as_placeholder() {
        let r = ImageRef::parse("nonexistent.png").unwrap();
        assert_eq!(r.render_source(&resolver()), RenderSource::Placeholder);
    }

    #[test]
    fn serializes_with_kind_tag() {
        let json = serde_json::to_string(&ImageRef::Local { key: "a.png".into() }).unwrap();
        assert_eq!(json, r#"{"kind":"local","key":"a.png"}"#);
    }
}
