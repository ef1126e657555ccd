//! Bundling: turn a run's encoded results into exactly one artifact.
//!
//! | Results | Format | Artifact |
//! |---|---|---|
//! | 1 | raster | the encoded image itself, `resized_<name>.<ext>` |
//! | 1 | document | one-page PDF, `resized_<name>.pdf` |
//! | n > 1 | raster | zip archive, `resized_images.zip` |
//! | n > 1 | document | n-page PDF, `resized_images.pdf` |
//!
//! Archive entries and document pages keep input order. Archive entry names
//! that collide get a numeric suffix so no image is lost.
//!
//! Document pages share a fixed width in points. Each page's height follows
//! its own image's aspect ratio and the image fills the page.

use crate::convert::EncodedResult;
use crate::imaging::page_size;
use crate::naming::{self, UniqueNames};
use crate::types::OutputFormat;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use std::io::{Cursor, Write};
use thiserror::Error;
use tracing::{debug, warn};
use zip::write::SimpleFileOptions;

#[derive(Error, Debug)]
pub enum BundleError {
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Document error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Nothing to bundle")]
    Empty,
}

/// The single file a run produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputArtifact {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Combine `results` into one artifact according to `format`.
///
/// A single result bypasses the archive entirely; a single document page
/// still becomes a (one-page) PDF.
pub fn bundle(
    results: Vec<EncodedResult>,
    format: OutputFormat,
    page_width: f32,
) -> Result<OutputArtifact, BundleError> {
    match (format, results.len()) {
        (_, 0) => Err(BundleError::Empty),
        (OutputFormat::Raster(_), 1) => {
            let result = results.into_iter().next().ok_or(BundleError::Empty)?;
            Ok(OutputArtifact {
                filename: result.filename,
                bytes: result.bytes,
            })
        }
        (OutputFormat::Document, 1) => Ok(OutputArtifact {
            filename: results[0].filename.clone(),
            bytes: build_document(&results, page_width)?,
        }),
        (OutputFormat::Raster(_), _) => Ok(OutputArtifact {
            filename: naming::ARCHIVE_NAME.to_string(),
            bytes: build_archive(&results)?,
        }),
        (OutputFormat::Document, _) => Ok(OutputArtifact {
            filename: naming::DOCUMENT_NAME.to_string(),
            bytes: build_document(&results, page_width)?,
        }),
    }
}

/// Build a zip archive with one stored entry per result.
pub fn build_archive(results: &[EncodedResult]) -> Result<Vec<u8>, BundleError> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    // Entries are already-compressed images; deflating them again gains nothing.
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    let mut names = UniqueNames::new();

    for result in results {
        let name = names.claim(&result.filename);
        if name != result.filename {
            warn!(original = %result.filename, renamed = %name, "Duplicate archive entry renamed");
        }
        zip.start_file(name, options)?;
        zip.write_all(&result.bytes)?;
    }

    let cursor = zip.finish()?;
    debug!(entries = results.len(), "Built archive");
    Ok(cursor.into_inner())
}

/// Build a PDF with one page per result; result bytes must be JPEG.
pub fn build_document(pages: &[EncodedResult], page_width: f32) -> Result<Vec<u8>, BundleError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page in pages {
        let page_id = add_image_page(&mut doc, pages_id, page, page_width)?;
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf)?;
    debug!(pages = count, "Built document");
    Ok(buf)
}

fn add_image_page(
    doc: &mut Document,
    pages_id: ObjectId,
    page: &EncodedResult,
    page_width: f32,
) -> Result<ObjectId, BundleError> {
    let (width, height) = page_size(page_width, page.dimensions);

    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => page.dimensions.width as i64,
            "Height" => page.dimensions.height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8_i64,
            "Filter" => "DCTDecode",
        },
        page.bytes.clone(),
    ));

    // Scale the unit image square to cover the whole page.
    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    width.into(),
                    Object::Integer(0),
                    Object::Integer(0),
                    height.into(),
                    Object::Integer(0),
                    Object::Integer(0),
                ],
            ),
            Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

    Ok(doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![Object::Integer(0), Object::Integer(0), width.into(), height.into()],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! {
                "Im0" => image_id,
            },
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::Dimensions;
    use std::io::Read;

    fn result(filename: &str, width: u32, height: u32) -> EncodedResult {
        EncodedResult {
            filename: filename.to_string(),
            bytes: format!("{filename}-bytes").into_bytes(),
            dimensions: Dimensions { width, height },
        }
    }

    fn archive_entries(bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        (0..archive.len())
            .map(|i| {
                let mut file = archive.by_index(i).unwrap();
                let mut contents = Vec::new();
                file.read_to_end(&mut contents).unwrap();
                (file.name().to_string(), contents)
            })
            .collect()
    }

    fn media_box_height(doc: &Document, page_id: ObjectId) -> f32 {
        let page = doc.get_dictionary(page_id).unwrap();
        let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
        media_box[3].as_float().unwrap()
    }

    #[test]
    fn single_raster_result_is_passed_through() {
        let artifact = bundle(
            vec![result("resized_a.png", 10, 10)],
            OutputFormat::PNG,
            595.0,
        )
        .unwrap();
        assert_eq!(artifact.filename, "resized_a.png");
        assert_eq!(artifact.bytes, b"resized_a.png-bytes");
    }

    #[test]
    fn multiple_raster_results_become_archive_in_order() {
        let artifact = bundle(
            vec![
                result("resized_b.png", 10, 10),
                result("resized_a.png", 10, 10),
                result("resized_c.png", 10, 10),
            ],
            OutputFormat::PNG,
            595.0,
        )
        .unwrap();

        assert_eq!(artifact.filename, "resized_images.zip");
        let entries = archive_entries(&artifact.bytes);
        let names: Vec<&str> = entries.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["resized_b.png", "resized_a.png", "resized_c.png"]);
        assert_eq!(entries[1].1, b"resized_a.png-bytes");
    }

    #[test]
    fn colliding_archive_names_are_suffixed() {
        let bytes = build_archive(&[
            result("resized_photo.png", 1, 1),
            result("resized_photo.png", 1, 1),
        ])
        .unwrap();
        let names: Vec<String> = archive_entries(&bytes).into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["resized_photo.png", "resized_photo_2.png"]);
    }

    #[test]
    fn multiple_document_results_become_one_page_each() {
        let artifact = bundle(
            vec![result("resized_a.pdf", 800, 600), result("resized_b.pdf", 100, 300)],
            OutputFormat::Document,
            600.0,
        )
        .unwrap();

        assert_eq!(artifact.filename, "resized_images.pdf");
        let doc = Document::load_mem(&artifact.bytes).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 2);

        let heights: Vec<f32> = pages.values().map(|id| media_box_height(&doc, *id)).collect();
        assert!((heights[0] - 450.0).abs() < 0.01, "got {heights:?}");
        assert!((heights[1] - 1800.0).abs() < 0.01, "got {heights:?}");
    }

    #[test]
    fn single_document_result_is_one_page_pdf_named_after_image() {
        let artifact = bundle(
            vec![result("resized_photo.pdf", 800, 600)],
            OutputFormat::Document,
            595.28,
        )
        .unwrap();

        assert_eq!(artifact.filename, "resized_photo.pdf");
        assert!(artifact.bytes.starts_with(b"%PDF-1.5"));
        let doc = Document::load_mem(&artifact.bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn empty_results_are_rejected() {
        let err = bundle(Vec::new(), OutputFormat::PNG, 595.0).unwrap_err();
        assert!(matches!(err, BundleError::Empty));
    }
}
