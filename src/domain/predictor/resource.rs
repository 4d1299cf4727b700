use std::cell::Cell;
use std::fmt;

use crate::domain::errors::AppError;

type ReleaseFn = Box<dyn FnOnce(&str)>;

/// Locally dereferenceable URL for a fetched binary artifact.
///
/// The release action runs at most once: explicitly through [`release`](Self::release)
/// when the handle is superseded, otherwise on drop.
pub struct ResourceHandle {
    url: String,
    release: Cell<Option<ReleaseFn>>,
    released: Cell<bool>,
}

impl ResourceHandle {
    pub fn new(url: impl Into<String>, release: impl FnOnce(&str) + 'static) -> Self {
        Self {
            url: url.into(),
            release: Cell::new(Some(Box::new(release))),
            released: Cell::new(false),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_released(&self) -> bool {
        self.released.get()
    }

    pub fn release(&self) {
        if let Some(release) = self.release.take() {
            self.released.set(true);
            release(&self.url);
        }
    }
}

impl Drop for ResourceHandle {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceHandle")
            .field("url", &self.url)
            .field("released", &self.released.get())
            .finish()
    }
}

/// Turns fetched bytes into a [`ResourceHandle`] (a `blob:` URL in the browser).
pub trait ResourceFactory {
    fn create(&self, bytes: &[u8], content_type: &str) -> Result<ResourceHandle, AppError>;
}
