//! # Images
//!
//! Decoded bitmaps are by far the heaviest resource of a design. They are interned here and
//! the design state, history snapshots and recent-upload list only hold an [`ImageId`], so an
//! undo step costs a few bytes instead of a full copy of the pixels.
//!
//! Nothing is evicted automatically. The editor calls [`Images::retain`] with the set of IDs
//! still reachable from anywhere and the rest is released.

use std::sync::Arc;

pub struct StoredImage;
pub type ImageId = crate::ObjectId<StoredImage>;

/// Shared, immutable pixels of a stored image.
pub type ImageHandle = Arc<image::RgbaImage>;

/// Get the shared global instance of the image repository.
pub fn global() -> &'static Arc<Images> {
    static REPO: std::sync::OnceLock<Arc<Images>> = std::sync::OnceLock::new();
    REPO.get_or_init(|| Arc::new(Images::new()))
}

#[derive(Default)]
pub struct Images {
    // Reads vastly outnumber inserts, which only happen on upload or a destructive edit.
    images: parking_lot::RwLock<hashbrown::HashMap<ImageId, ImageHandle>>,
}
impl Images {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    /// Intern a bitmap, returning its new ID.
    pub fn insert(&self, image: image::RgbaImage) -> ImageId {
        let id = ImageId::fresh();
        log::trace!(
            "storing {id} ({}x{}, {})",
            image.width(),
            image.height(),
            human_bytes::human_bytes(image.as_raw().len() as f64)
        );
        self.images.write().insert(id, Arc::new(image));
        id
    }
    #[must_use]
    pub fn get(&self, id: ImageId) -> Option<ImageHandle> {
        self.images.read().get(&id).cloned()
    }
    /// Dimensions of a stored image, without cloning the handle.
    #[must_use]
    pub fn dimensions(&self, id: ImageId) -> Option<[u32; 2]> {
        self.images
            .read()
            .get(&id)
            .map(|image| [image.width(), image.height()])
    }
    #[must_use]
    pub fn contains(&self, id: ImageId) -> bool {
        self.images.read().contains_key(&id)
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.images.read().len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Release every image for which `keep` returns false. Returns the number released.
    ///
    /// Outstanding [`ImageHandle`]s stay valid, the pixels are freed once the last one drops.
    pub fn retain(&self, mut keep: impl FnMut(ImageId) -> bool) -> usize {
        let mut images = self.images.write();
        let before = images.len();
        images.retain(|id, _| keep(*id));
        let released = before - images.len();
        if released != 0 {
            log::debug!("released {released} unreferenced image(s)");
        }
        released
    }
}
