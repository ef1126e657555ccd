//! End-to-end runs through the public API with real encoded images.

use batch_resize::config;
use batch_resize::convert::ConversionOptions;
use batch_resize::imaging::{BackendError, Quality};
use batch_resize::ingest::{self, SourceFile};
use batch_resize::process::{DEFAULT_PAGE_WIDTH, RunError, RunEvent, Session};
use batch_resize::types::{OutputFormat, TargetSize};
use image::{ImageFormat, Rgb, RgbImage};
use std::io::{Cursor, Read};
use std::sync::mpsc;
use tempfile::TempDir;

fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 7 % 256) as u8, (y * 5 % 256) as u8, 90])
    });
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

fn png(name: &str, width: u32, height: u32) -> SourceFile {
    SourceFile::new(name, encode(width, height, ImageFormat::Png))
}

fn jpeg(name: &str, width: u32, height: u32) -> SourceFile {
    SourceFile::new(name, encode(width, height, ImageFormat::Jpeg))
}

fn dims(bytes: &[u8]) -> (u32, u32) {
    let img = image::load_from_memory(bytes).unwrap();
    (img.width(), img.height())
}

fn opts(size: TargetSize, format: OutputFormat) -> ConversionOptions {
    ConversionOptions {
        size,
        format,
        ..Default::default()
    }
}

#[test]
fn three_pngs_become_ordered_archive_then_no_new_images() {
    let mut session = Session::new(DEFAULT_PAGE_WIDTH);
    let report = session.ingest(vec![
        png("c.png", 30, 20),
        png("a.png", 40, 30),
        png("b.png", 50, 40),
    ]);
    assert_eq!(report.accepted.len(), 3);

    let run = opts(TargetSize::ORIGINAL, OutputFormat::PNG);
    let artifact = session.run(&run, None, None).unwrap().take().unwrap();
    assert_eq!(artifact.filename, "resized_images.zip");

    let mut archive = zip::ZipArchive::new(Cursor::new(artifact.bytes)).unwrap();
    assert_eq!(archive.len(), 3);
    let expected = [
        ("resized_c.png", (30, 20)),
        ("resized_a.png", (40, 30)),
        ("resized_b.png", (50, 40)),
    ];
    for (i, (name, size)) in expected.iter().enumerate() {
        let mut entry = archive.by_index(i).unwrap();
        assert_eq!(entry.name(), *name);
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes).unwrap();
        assert_eq!(dims(&bytes), *size);
    }

    let err = session.run(&run, None, None).unwrap_err();
    assert!(matches!(err, RunError::NoNewImages));
    assert_eq!(session.batch().processed_count(), 3);
}

#[test]
fn one_image_to_pdf_is_single_page_document() {
    let mut session = Session::new(DEFAULT_PAGE_WIDTH);
    session.ingest(vec![jpeg("photo.jpeg", 120, 90)]);

    let handle = session
        .run(
            &opts(TargetSize::pixels(800, 600), OutputFormat::Document),
            None,
            None,
        )
        .unwrap();
    assert_eq!(handle.filename(), "resized_photo.pdf");

    let artifact = handle.take().unwrap();
    let doc = lopdf::Document::load_mem(&artifact.bytes).unwrap();
    let pages = doc.get_pages();
    assert_eq!(pages.len(), 1);

    let page = doc.get_dictionary(pages[&1]).unwrap();
    let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
    let width = media_box[2].as_float().unwrap();
    let height = media_box[3].as_float().unwrap();
    assert!((width - 595.28).abs() < 0.01, "width {width}");
    assert!((height - 446.46).abs() < 0.01, "height {height}");
}

#[test]
fn several_images_to_pdf_get_one_page_each() {
    let mut session = Session::new(DEFAULT_PAGE_WIDTH);
    session.ingest(vec![
        png("a.png", 60, 40),
        jpeg("b.jpg", 40, 60),
        png("c.png", 50, 50),
    ]);
    let handle = session
        .run(&opts(TargetSize::ORIGINAL, OutputFormat::Document), None, None)
        .unwrap();
    assert_eq!(handle.filename(), "resized_images.pdf");

    let doc = lopdf::Document::load_mem(&handle.take().unwrap().bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 3);
}

#[test]
fn explicit_size_is_exact_even_when_aspect_changes() {
    let mut session = Session::new(DEFAULT_PAGE_WIDTH);
    session.ingest(vec![png("wide.png", 300, 200)]);
    let run = ConversionOptions {
        size: TargetSize::pixels(50, 120),
        format: OutputFormat::JPEG,
        quality: Quality::new(80),
        ..Default::default()
    };
    let artifact = session.run(&run, None, None).unwrap().take().unwrap();

    assert_eq!(artifact.filename, "resized_wide.jpeg");
    assert_eq!(
        image::guess_format(&artifact.bytes).unwrap(),
        ImageFormat::Jpeg
    );
    assert_eq!(dims(&artifact.bytes), (50, 120));
}

#[test]
fn original_axis_keeps_native_value() {
    let mut session = Session::new(DEFAULT_PAGE_WIDTH);
    session.ingest(vec![png("photo.png", 64, 48)]);
    let size: TargetSize = "32xoriginal".parse().unwrap();
    let artifact = session
        .run(&opts(size, OutputFormat::WEBP), None, None)
        .unwrap()
        .take()
        .unwrap();

    assert_eq!(artifact.filename, "resized_photo.webp");
    assert_eq!(dims(&artifact.bytes), (32, 48));
}

#[test]
fn oversized_target_fails_the_run_without_aborting() {
    let mut session = Session::new(DEFAULT_PAGE_WIDTH);
    session.ingest(vec![png("tiny.png", 4, 4)]);
    let size: TargetSize = "4294967295x4294967295".parse().unwrap();

    let err = session
        .run(&opts(size, OutputFormat::PNG), None, None)
        .unwrap_err();
    assert!(matches!(
        err,
        RunError::Conversion {
            source: BackendError::Encode(_),
            ..
        }
    ));
    assert_eq!(session.batch().processed_count(), 0);
}

#[test]
fn progress_events_arrive_in_order() {
    let mut session = Session::new(DEFAULT_PAGE_WIDTH);
    session.ingest(vec![png("a.png", 10, 10), png("b.png", 10, 10)]);

    let (tx, rx) = mpsc::channel();
    session
        .run(&opts(TargetSize::ORIGINAL, OutputFormat::PNG), Some(&tx), None)
        .unwrap();
    drop(tx);
    let events: Vec<RunEvent> = rx.into_iter().collect();

    assert!(matches!(events.first(), Some(RunEvent::Started { total: 2, .. })));
    assert!(matches!(
        events.last(),
        Some(RunEvent::Completed {
            images: 2,
            percent: 100,
            ..
        })
    ));
    let converted = events
        .iter()
        .filter(|e| matches!(e, RunEvent::ImageConverted { .. }))
        .count();
    assert_eq!(converted, 2);
}

#[test]
fn files_on_disk_are_read_converted_and_delivered() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("in");
    std::fs::create_dir_all(&input).unwrap();
    std::fs::write(input.join("photo.jpeg"), encode(40, 30, ImageFormat::Jpeg)).unwrap();
    std::fs::write(input.join("notes.txt"), b"not an image").unwrap();

    let mut session = Session::new(DEFAULT_PAGE_WIDTH);
    let report = session.ingest(ingest::read_paths(&[input]).unwrap());
    assert_eq!(report.accepted, vec!["photo.jpeg"]);
    assert_eq!(report.skipped, vec!["notes.txt"]);

    let out_dir = tmp.path().join("out");
    let handle = session
        .run(&opts(TargetSize::pixels(20, 15), OutputFormat::PNG), None, None)
        .unwrap();
    let path = handle.deliver(&out_dir).unwrap();

    assert_eq!(path, out_dir.join("resized_photo.png"));
    assert_eq!(dims(&std::fs::read(&path).unwrap()), (20, 15));
    assert!(handle.deliver(&out_dir).is_err());
}

#[test]
fn config_file_drives_conversion_options() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("batch-resize.toml");
    std::fs::write(
        &path,
        r#"
[output]
size = "16x16"
format = "image/png"
"#,
    )
    .unwrap();
    let cfg = config::load_config(&path).unwrap();

    let mut session = Session::new(cfg.document.page_width);
    session.ingest(vec![jpeg("x.jpg", 64, 32)]);
    let artifact = session
        .run(&cfg.conversion_options(), None, None)
        .unwrap()
        .take()
        .unwrap();
    assert_eq!(artifact.filename, "resized_x.png");
    assert_eq!(dims(&artifact.bytes), (16, 16));
}
