//! The in-memory batch: every ingested image plus a high-water mark.
//!
//! `processed_count` tracks how much of the batch has been converted by a
//! successful run. It never decreases and never exceeds `images.len()`; the
//! slice after it is what the next run converts.

/// An ingested image: display name, sniffed MIME type, and raw file bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Ordered collection of ingested images with a processed high-water mark.
#[derive(Debug, Default)]
pub struct BatchState {
    images: Vec<SourceImage>,
    processed_count: usize,
}

impl BatchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, image: SourceImage) {
        self.images.push(image);
    }

    pub fn images(&self) -> &[SourceImage] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn processed_count(&self) -> usize {
        self.processed_count
    }

    /// Images added since the last successful run.
    pub fn new_images(&self) -> &[SourceImage] {
        &self.images[self.processed_count..]
    }

    /// Mark everything currently in the batch as processed.
    pub fn commit(&mut self) {
        self.processed_count = self.images.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(name: &str) -> SourceImage {
        SourceImage {
            name: name.to_string(),
            mime: "image/png".to_string(),
            bytes: vec![1, 2, 3],
        }
    }

    #[test]
    fn new_batch_is_empty() {
        let batch = BatchState::new();
        assert!(batch.is_empty());
        assert_eq!(batch.processed_count(), 0);
        assert!(batch.new_images().is_empty());
    }

    #[test]
    fn new_images_is_suffix_after_commit() {
        let mut batch = BatchState::new();
        batch.push(image("a.png"));
        batch.push(image("b.png"));
        assert_eq!(batch.new_images().len(), 2);

        batch.commit();
        assert_eq!(batch.processed_count(), 2);
        assert!(batch.new_images().is_empty());

        batch.push(image("c.png"));
        let names: Vec<&str> = batch.new_images().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["c.png"]);
    }

    #[test]
    fn commit_is_idempotent() {
        let mut batch = BatchState::new();
        batch.push(image("a.png"));
        batch.commit();
        batch.commit();
        assert_eq!(batch.processed_count(), 1);
        assert_eq!(batch.len(), 1);
    }
}
