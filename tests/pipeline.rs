//! End-to-end runs through the public API with the real imaging backend.

use folio_images::config::PipelineConfig;
use folio_images::image_ref::{ImageRef, RenderSource};
use folio_images::manifest::Manifest;
use folio_images::process::{self, ProcessEvent};
use folio_images::publish::{self, PublishTarget};
use folio_images::resolve::{AssetMap, NoAssetIndex, Resolver};
use folio_images::types::OutputFormat;
use image::{ImageFormat, RgbImage, RgbaImage};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_png(path: &Path, width: u32, height: u32) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 90])
    })
    .save_with_format(path, ImageFormat::Png)
    .unwrap();
}

fn write_transparent_png(path: &Path, width: u32, height: u32) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    RgbaImage::from_fn(width, height, |x, _| image::Rgba([255, 0, (x % 256) as u8, 100]))
        .save_with_format(path, ImageFormat::Png)
        .unwrap();
}

fn write_jpeg(path: &Path, width: u32, height: u32) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    RgbImage::from_fn(width, height, |x, y| image::Rgb([120, (x % 256) as u8, (y % 256) as u8]))
        .save_with_format(path, ImageFormat::Jpeg)
        .unwrap();
}

fn config_for(root: &Path) -> PipelineConfig {
    PipelineConfig {
        assets_root: root.to_string_lossy().into_owned(),
        ..PipelineConfig::default()
    }
}

// =============================================================================
// Pipeline
// =============================================================================

#[test]
fn nested_uppercase_png_produces_full_variant_set() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("assets");
    write_png(&root.join("pro1/pro1s1.PNG"), 1600, 1200);

    let result = process::process(&config_for(&root), None).unwrap();
    assert!(result.failures.is_empty());

    let manifest = Manifest::load(&root.join("image-manifest.json")).unwrap();
    let entry = manifest.get("pro1/pro1s1.PNG").unwrap();

    assert_eq!(entry.variants.len(), 8);
    let widths: Vec<u32> = entry.variants_of(OutputFormat::Webp).map(|v| v.width).collect();
    assert_eq!(widths, vec![320, 480, 768, 1024]);
    assert_eq!(entry.preferred.webp, "optimized/pro1_pro1s1_800.webp");
    assert_eq!(entry.preferred.jpg, "optimized/pro1_pro1s1_800.jpg");

    for path in entry.declared_paths() {
        let file = root.join(path);
        assert!(fs::metadata(&file).unwrap().len() > 0, "{path} is empty");
    }
    let (w, h) = image::image_dimensions(root.join("optimized/pro1_pro1s1_1024.jpg")).unwrap();
    assert_eq!((w, h), (1024, 768));

    let resolver = Resolver::new(manifest, NoAssetIndex, "/src/assets");
    let image = resolver.lookup("pro1/pro1s1.PNG").unwrap();
    assert_eq!(image.srcset_webp.split(", ").count(), 4);
    assert!(image.srcset_webp.starts_with("/src/assets/optimized/pro1_pro1s1_320.webp 320w"));
}

#[test]
fn small_source_is_upscaled_to_every_width() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("assets");
    write_jpeg(&root.join("icon.jpg"), 100, 50);

    process::process(&config_for(&root), None).unwrap();

    let (w, h) = image::image_dimensions(root.join("optimized/icon_1024.jpg")).unwrap();
    assert_eq!((w, h), (1024, 512));
}

#[test]
fn transparent_png_encodes_both_formats() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("assets");
    write_transparent_png(&root.join("logo.png"), 400, 200);

    let result = process::process(&config_for(&root), None).unwrap();

    assert!(result.failures.is_empty());
    assert!(root.join("optimized/logo_800.webp").is_file());
    assert!(root.join("optimized/logo_800.jpg").is_file());
}

#[test]
fn missing_root_fails_before_writing() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("does-not-exist");

    let err = process::process(&config_for(&root), None).unwrap_err();

    assert!(err.is_missing_root());
    assert!(!root.exists());
}

#[test]
fn corrupt_source_is_skipped_and_rest_processed() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("assets");
    write_jpeg(&root.join("good.jpg"), 640, 480);
    fs::write(root.join("bad.png"), b"\x89PNG but not really").unwrap();

    let (tx, rx) = std::sync::mpsc::channel();
    let result = process::process(&config_for(&root), Some(tx)).unwrap();
    let events: Vec<ProcessEvent> = rx.iter().collect();

    assert!(result.manifest.contains("good.jpg"));
    assert!(!result.manifest.contains("bad.png"));
    assert!(
        events
            .iter()
            .any(|e| matches!(e, ProcessEvent::SourceFailed { key, .. } if key == "bad.png"))
    );
    let leftovers = fs::read_dir(root.join("optimized"))
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().starts_with("bad_"))
        .count();
    assert_eq!(leftovers, 0);
}

#[test]
fn tall_source_fails_alone() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("assets");
    write_jpeg(&root.join("good.jpg"), 200, 150);
    // A full-page screenshot: 1024 wide would be 17408 tall
    write_png(&root.join("screenshot.png"), 100, 1700);

    let result = process::process(&config_for(&root), None).unwrap();

    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].key, "screenshot.png");
    assert!(result.manifest.contains("good.jpg"));
    assert!(!result.manifest.contains("screenshot.png"));
    let leftovers = fs::read_dir(root.join("optimized"))
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().starts_with("screenshot_"))
        .count();
    assert_eq!(leftovers, 0);
    assert!(root.join("image-manifest.json").is_file());
}

#[test]
fn rerun_over_unchanged_tree_is_identical() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("assets");
    write_jpeg(&root.join("profile_pic.jpg"), 300, 300);
    write_png(&root.join("a/x.png"), 200, 100);
    write_png(&root.join("b/x.png"), 200, 100);
    let config = config_for(&root);

    process::process(&config, None).unwrap();
    let first = fs::read(config.manifest_path()).unwrap();
    let second_result = process::process(&config, None).unwrap();
    let second = fs::read(config.manifest_path()).unwrap();

    assert_eq!(first, second);
    // Previous outputs are never picked up as sources
    assert_eq!(second_result.discovered, 3);
}

// =============================================================================
// Resolution
// =============================================================================

#[test]
fn lookup_of_unknown_key_renders_placeholder() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("assets");
    write_jpeg(&root.join("hero.jpg"), 320, 200);
    let result = process::process(&config_for(&root), None).unwrap();

    let resolver = Resolver::new(result.manifest, AssetMap::new(), "/src/assets");

    assert!(resolver.lookup("nonexistent.png").is_none());
    let field = ImageRef::parse("nonexistent.png").unwrap();
    assert_eq!(field.render_source(&resolver), RenderSource::Placeholder);
}

#[test]
fn published_asset_map_feeds_resolver() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("assets");
    let dist = tmp.path().join("dist");
    write_jpeg(&root.join("hero.jpg"), 640, 400);
    let result = process::process(&config_for(&root), None).unwrap();

    let report = publish::publish(
        &root,
        &result.manifest,
        PublishTarget {
            dist_dir: &dist,
            public_base: "/assets",
            asset_map: "asset-map.json",
        },
    )
    .unwrap();
    assert_eq!(report.copied, 10);
    assert_eq!(report.reused, 0);
    assert!(report.missing.is_empty());

    let map = AssetMap::load(&dist.join("asset-map.json")).unwrap();
    let resolver = Resolver::new(result.manifest, map, "/src/assets");
    let image = resolver.lookup("hero.jpg").unwrap();

    assert!(image.unresolved.is_empty());
    assert!(image.webp.starts_with("/assets/hero_800-"));
    assert!(image.webp.ends_with(".webp"));
    let hashed = image.jpg.trim_start_matches("/assets/");
    assert!(dist.join(hashed).is_file());
}
