//! Pure calculation functions for image and page dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

use super::backend::Dimensions;
use crate::types::TargetSize;

/// Resolve a target size against an image's native dimensions.
///
/// Each axis resolves on its own: `original` takes the native value, an
/// explicit pixel count is used as-is. The result is exact, so a target
/// whose ratio differs from the source stretches the image.
///
/// # Examples
/// ```
/// # use batch_resize::imaging::{Dimensions, resolve_dimensions};
/// # use batch_resize::types::TargetSize;
/// let native = Dimensions { width: 4000, height: 3000 };
/// assert_eq!(resolve_dimensions(native, TargetSize::ORIGINAL), native);
///
/// let exact = resolve_dimensions(native, TargetSize::pixels(800, 800));
/// assert_eq!((exact.width, exact.height), (800, 800));
/// ```
pub fn resolve_dimensions(native: Dimensions, target: TargetSize) -> Dimensions {
    Dimensions {
        width: target.width.resolve(native.width),
        height: target.height.resolve(native.height),
    }
}

/// Largest page side PDF viewers reliably accept, in points (200 inches).
pub const MAX_PAGE_SIDE: f32 = 14_400.0;

/// Size of a document page holding one image, in points.
///
/// Pages share a fixed width; each page's height follows its own image's
/// aspect ratio, so pages in one document are generally not uniform. A page
/// that would be taller than [`MAX_PAGE_SIDE`] is capped at that height and
/// narrowed to keep the image's aspect ratio.
pub fn page_size(page_width: f32, image: Dimensions) -> (f32, f32) {
    if image.width == 0 {
        return (page_width, page_width);
    }
    let height = page_width * image.height as f32 / image.width as f32;
    if height > MAX_PAGE_SIDE {
        let width = MAX_PAGE_SIDE * image.width as f32 / image.height as f32;
        return (width, MAX_PAGE_SIDE);
    }
    (page_width, height)
}

/// Progress through a run as a whole percentage, 0–100.
///
/// `index` is the zero-based position of the item about to start.
pub fn progress_percent(index: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((index as f64 / total as f64) * 100.0).round().min(100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Dimension;

    const NATIVE: Dimensions = Dimensions {
        width: 1200,
        height: 900,
    };

    #[test]
    fn original_keeps_native_dimensions() {
        assert_eq!(resolve_dimensions(NATIVE, TargetSize::ORIGINAL), NATIVE);
    }

    #[test]
    fn explicit_size_ignores_aspect_ratio() {
        let dims = resolve_dimensions(NATIVE, TargetSize::pixels(100, 400));
        assert_eq!(
            dims,
            Dimensions {
                width: 100,
                height: 400
            }
        );
    }

    #[test]
    fn mixed_axes_resolve_independently() {
        let target = TargetSize {
            width: Dimension::Pixels(300),
            height: Dimension::Original,
        };
        let dims = resolve_dimensions(NATIVE, target);
        assert_eq!(
            dims,
            Dimensions {
                width: 300,
                height: 900
            }
        );
    }

    #[test]
    fn page_height_follows_image_ratio() {
        let (w, h) = page_size(600.0, Dimensions { width: 800, height: 600 });
        assert_eq!(w, 600.0);
        assert!((h - 450.0).abs() < 0.01);

        let (_, tall) = page_size(600.0, Dimensions { width: 100, height: 300 });
        assert!((tall - 1800.0).abs() < 0.01);
    }

    #[test]
    fn page_size_caps_very_tall_pages() {
        let (width, height) = page_size(595.0, Dimensions { width: 1, height: 100 });
        assert_eq!(height, MAX_PAGE_SIDE);
        assert!((width - 144.0).abs() < 0.01, "got {width}");
        assert!((height / width - 100.0).abs() < 0.01);
    }

    #[test]
    fn page_size_of_degenerate_image_is_square() {
        assert_eq!(page_size(500.0, Dimensions { width: 0, height: 10 }), (500.0, 500.0));
    }

    #[test]
    fn progress_rounds_to_whole_percent() {
        assert_eq!(progress_percent(0, 3), 0);
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(2, 3), 67);
        assert_eq!(progress_percent(3, 3), 100);
        assert_eq!(progress_percent(0, 0), 100);
    }
}
