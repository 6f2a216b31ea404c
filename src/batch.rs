use chrono::{DateTime, Duration, Utc};
use image::RgbImage;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub enum ItemStatus {
    Queued,
    Processing,
    Completed,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct BatchItem {
    pub id: Uuid,
    pub file_path: PathBuf,
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    pub status: ItemStatus,
    pub added_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub result: Option<RgbImage>,
}

impl BatchItem {
    pub fn new(file_path: PathBuf, width: u32, height: u32) -> Self {
        let file_name = file_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        Self {
            id: Uuid::new_v4(),
            file_path,
            file_name,
            width,
            height,
            status: ItemStatus::Queued,
            added_at: Utc::now(),
            started_at: None,
            completed_at: None,
            result: None,
        }
    }

    pub fn start_processing(&mut self) {
        self.status = ItemStatus::Processing;
        self.result = None;
        self.started_at = Some(Utc::now());
        self.completed_at = None;
    }

    pub fn complete(&mut self, result: RgbImage) {
        self.status = ItemStatus::Completed;
        self.result = Some(result);
        self.completed_at = Some(Utc::now());
    }

    pub fn fail(&mut self, error: String) {
        self.status = ItemStatus::Failed(error);
        self.result = None;
        self.completed_at = Some(Utc::now());
    }

    /// Time from `start_processing` to the item's outcome.
    pub fn processing_time(&self) -> Option<Duration> {
        Some(self.completed_at? - self.started_at?)
    }
}

/// Uploaded images for the current session, in upload order.
#[derive(Debug, Default)]
pub struct Batch {
    items: Vec<BatchItem>,
}

impl Batch {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Returns `None` when the same path is already in the batch.
    pub fn add_file(&mut self, file_path: PathBuf, width: u32, height: u32) -> Option<Uuid> {
        if self.items.iter().any(|item| item.file_path == file_path) {
            return None;
        }
        let item = BatchItem::new(file_path, width, height);
        let id = item.id;
        self.items.push(item);
        Some(id)
    }

    pub fn items(&self) -> &[BatchItem] {
        &self.items
    }

    pub fn get_item_mut(&mut self, id: Uuid) -> Option<&mut BatchItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    pub fn remove_item(&mut self, id: Uuid) -> Option<BatchItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(index))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Completed items, in upload order, paired with their results.
    pub fn completed(&self) -> impl Iterator<Item = (&BatchItem, &RgbImage)> {
        self.items
            .iter()
            .filter_map(|item| item.result.as_ref().map(|result| (item, result)))
    }

    pub fn reset_all(&mut self) {
        for item in &mut self.items {
            item.status = ItemStatus::Queued;
            item.result = None;
            item.started_at = None;
            item.completed_at = None;
        }
    }

    pub fn stats(&self) -> BatchStats {
        let mut stats = BatchStats {
            total: self.items.len(),
            ..BatchStats::default()
        };
        for item in &self.items {
            match item.status {
                ItemStatus::Queued => stats.queued += 1,
                ItemStatus::Processing => stats.processing += 1,
                ItemStatus::Completed => stats.completed += 1,
                ItemStatus::Failed(_) => stats.failed += 1,
            }
        }
        stats
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchStats {
    pub total: usize,
    pub queued: usize,
    pub processing: usize,
    pub completed: usize,
    pub failed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_are_rejected() {
        let mut batch = Batch::new();
        assert!(batch.add_file(PathBuf::from("/tmp/a.jpg"), 10, 10).is_some());
        assert!(batch.add_file(PathBuf::from("/tmp/a.jpg"), 10, 10).is_none());
        assert!(batch.add_file(PathBuf::from("/tmp/b.jpg"), 10, 10).is_some());
        assert_eq!(batch.items().len(), 2);
        assert_eq!(batch.items()[0].file_name, "a.jpg");
    }

    #[test]
    fn test_failures_do_not_block_other_items() {
        let mut batch = Batch::new();
        let a = batch.add_file(PathBuf::from("a.png"), 4, 4).unwrap();
        let b = batch.add_file(PathBuf::from("b.png"), 4, 4).unwrap();
        let c = batch.add_file(PathBuf::from("c.png"), 4, 4).unwrap();

        batch.get_item_mut(a).unwrap().complete(RgbImage::new(2, 2));
        batch.get_item_mut(b).unwrap().fail("blank".to_string());
        batch.get_item_mut(c).unwrap().start_processing();

        let stats = batch.stats();
        assert_eq!(
            stats,
            BatchStats {
                total: 3,
                queued: 0,
                processing: 1,
                completed: 1,
                failed: 1
            }
        );
        let done: Vec<_> = batch.completed().map(|(item, _)| item.id).collect();
        assert_eq!(done, vec![a]);

        batch.reset_all();
        assert_eq!(batch.stats().queued, 3);
        assert_eq!(batch.completed().count(), 0);
    }

    #[test]
    fn test_processing_time() {
        let mut item = BatchItem::new(PathBuf::from("a.png"), 1, 1);
        assert!(item.processing_time().is_none());

        item.start_processing();
        assert!(item.started_at.unwrap() >= item.added_at);
        assert!(item.processing_time().is_none());

        item.complete(RgbImage::new(1, 1));
        assert!(item.processing_time().unwrap() >= Duration::zero());

        item.start_processing();
        assert!(item.completed_at.is_none());
        assert!(item.processing_time().is_none());
    }

    #[test]
    fn test_remove_item() {
        let mut batch = Batch::new();
        let a = batch.add_file(PathBuf::from("a.png"), 1, 1).unwrap();
        assert_eq!(batch.remove_item(a).unwrap().file_name, "a.png");
        assert!(batch.remove_item(a).is_none());
        assert!(batch.is_empty());
    }
}
