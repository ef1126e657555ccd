//! Output filename conventions.
//!
//! Every converted image is named `resized_<stem>.<ext>`, where `<stem>` is
//! the source name with its last extension removed and `<ext>` is the
//! canonical extension of the target format. Bundles use fixed names.
//!
//! - `photo.jpeg` → png → `resized_photo.png`
//! - `archive.tar.gz` → webp → `resized_archive.tar.webp` (only the last extension goes)
//! - `notes` → pdf → `resized_notes.pdf`

use std::collections::HashSet;

/// Prefix applied to every generated name.
pub const OUTPUT_PREFIX: &str = "resized_";

/// Filename of a multi-image archive bundle.
pub const ARCHIVE_NAME: &str = "resized_images.zip";

/// Filename of a multi-page document bundle.
pub const DOCUMENT_NAME: &str = "resized_images.pdf";

/// Strip the last `.ext` from a name.
///
/// An extension is a dot followed by at least one character that is neither
/// a dot nor a slash, anchored at the end. A name with no such suffix comes
/// back unchanged.
pub fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(dot) => {
            let ext = &name[dot + 1..];
            if ext.is_empty() || ext.contains('/') {
                name
            } else {
                &name[..dot]
            }
        }
        None => name,
    }
}

/// Build the output filename for one converted image.
pub fn output_name(source_name: &str, extension: &str) -> String {
    format!("{}{}.{}", OUTPUT_PREFIX, strip_extension(source_name), extension)
}

/// Hands out names that are unique within one bundle.
///
/// The first use of a name is returned as-is; later uses get `_2`, `_3`, …
/// inserted before the extension.
#[derive(Debug, Default)]
pub struct UniqueNames {
    taken: HashSet<String>,
}

impl UniqueNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `name`, returning it or a suffixed variant if already taken.
    pub fn claim(&mut self, name: &str) -> String {
        if self.taken.insert(name.to_string()) {
            return name.to_string();
        }
        let stem = strip_extension(name);
        let ext = &name[stem.len()..];
        let mut n = 2;
        loop {
            let candidate = format!("{}_{}{}", stem, n, ext);
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}
