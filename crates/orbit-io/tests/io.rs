use anyhow::Result;
use image::{Rgba, RgbaImage};
use orbit_io::{ImageLoader, ImageSource, decode_image, load_config, load_manifest, parse_manifest};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

fn temp_path(file_name: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    let stamp = match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(duration) => duration.as_nanos(),
        Err(_) => 0,
    };
    path.push(format!("orbit_{stamp}_{file_name}"));
    path
}

fn write_png(path: &Path, width: u32, height: u32) -> Result<()> {
    let image = RgbaImage::from_pixel(width, height, Rgba([200, 40, 40, 255]));
    image.save(path)?;
    Ok(())
}

#[test]
fn manifest_accepts_item_entries() -> Result<()> {
    let items = parse_manifest(
        r#"[{ "image": "https://picsum.photos/seed/1/800/600", "text": "Bridge" }]"#,
        Path::new("/srv"),
    )?;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].image, "https://picsum.photos/seed/1/800/600");
    assert_eq!(items[0].text, "Bridge");
    Ok(())
}

#[test]
fn manifest_accepts_photo_entries() -> Result<()> {
    let items = parse_manifest(
        r#"[
            { "id": 1, "alt": "Harbour at dusk", "src": "photos/a.jpg", "photographer": "K. Ito" },
            { "id": 2, "alt": "", "src": "photos/b.jpg", "photographer": "R. Vale" }
        ]"#,
        Path::new("/srv/public"),
    )?;
    assert_eq!(items[0].text, "Harbour at dusk");
    assert_eq!(items[1].text, "R. Vale");
    assert_eq!(
        PathBuf::from(&items[0].image),
        Path::new("/srv/public").join("photos/a.jpg")
    );
    Ok(())
}

#[test]
fn manifest_rejects_non_lists() {
    assert!(parse_manifest(r#"{ "image": "a.jpg" }"#, Path::new(".")).is_err());
}

#[test]
fn site_absolute_paths_resolve_next_to_manifest() -> Result<()> {
    let root = temp_path("site");
    fs::create_dir_all(root.join("images"))?;
    write_png(&root.join("images/a.png"), 2, 2)?;
    let manifest = root.join("gallery_photos.json");
    fs::write(
        &manifest,
        r#"[{ "id": 7, "alt": "Tiny", "src": "/images/a.png" }]"#,
    )?;

    let items = load_manifest(&manifest)?;
    assert_eq!(PathBuf::from(&items[0].image), root.join("images/a.png"));

    let _ = fs::remove_dir_all(&root);
    Ok(())
}

#[test]
fn missing_manifest_is_an_error() {
    let err = load_manifest(temp_path("absent.json")).err();
    let message = err.map(|e| format!("{e:#}")).unwrap_or_default();
    assert!(message.contains("failed to read manifest"));
}

#[test]
fn config_file_overrides_defaults() -> Result<()> {
    let path = temp_path("config.json");
    fs::write(&path, r##"{ "bend": 1.5, "text_color": "#eeeeee" }"##)?;
    let config = load_config(&path)?;
    assert_eq!(config.bend, 1.5);
    assert_eq!(config.text_color, "#eeeeee");
    assert_eq!(config.scroll_speed, 2.0);
    let _ = fs::remove_file(&path);
    Ok(())
}

#[test]
fn decodes_png_bytes() -> Result<()> {
    let path = temp_path("decode.png");
    write_png(&path, 4, 3)?;
    let image = decode_image(&fs::read(&path)?)?;
    assert_eq!(image.dimensions(), (4, 3));
    assert!(decode_image(b"not an image").is_err());
    let _ = fs::remove_file(&path);
    Ok(())
}

#[test]
fn loader_delivers_each_source_once() -> Result<()> {
    let good = temp_path("good.png");
    write_png(&good, 8, 6)?;
    let good = ImageSource::Path(good).to_string();
    let bad = temp_path("missing.png").display().to_string();

    let mut loader = ImageLoader::new();
    assert!(loader.request(&good));
    assert!(!loader.request(&good));
    assert!(loader.request(&bad));

    let deadline = Instant::now() + Duration::from_secs(10);
    let mut results = Vec::new();
    while results.len() < 2 && Instant::now() < deadline {
        results.extend(loader.poll());
        thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(results.len(), 2);

    for loaded in results {
        if loaded.source == good {
            let image = loaded.image?;
            assert_eq!(image.dimensions(), (8, 6));
        } else {
            assert_eq!(loaded.source, bad);
            assert!(loaded.image.is_err());
        }
    }
    let _ = fs::remove_file(&good);
    Ok(())
}

#[test]
fn small_pool_drains_a_large_queue() -> Result<()> {
    let mut loader = ImageLoader::with_workers(2);
    let mut sources = Vec::new();
    for index in 0..12 {
        let path = temp_path(&format!("pool-{index}.png"));
        write_png(&path, 2 + index, 2)?;
        let source = path.display().to_string();
        assert!(loader.request(&source));
        sources.push((source, path));
    }

    let deadline = Instant::now() + Duration::from_secs(20);
    let mut results = Vec::new();
    while results.len() < sources.len() && Instant::now() < deadline {
        results.extend(loader.poll());
        thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(results.len(), sources.len());
    assert!(results.iter().all(|loaded| loaded.image.is_ok()));

    for (_, path) in sources {
        let _ = fs::remove_file(path);
    }
    Ok(())
}
