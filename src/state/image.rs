//! A single photo's metadata, with change notification.
//!
//! `ImageModel` is a cheap clonable handle: the collection and every
//! renderer bound to the photo share one underlying record, matching the
//! reference-identity semantics the rest of the app relies on. Identity is
//! compared with [`ImageModel::same`], never by field values.

use std::cell::RefCell;
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

use chrono::{DateTime, Local};

use super::observer::{ListenerId, Listeners};
use crate::error::{FotagError, Result};

/// Ratings run 0 (unrated) through 5 stars.
pub const MAX_RATING: u8 = 5;

/// Callback invoked after the photo's metadata changed, with the model and
/// the moment of the change.
pub type ImageListenerFn = dyn FnMut(&ImageModel, DateTime<Local>);

struct Inner {
    /// Absolute path of the image file. Immutable after construction.
    path: PathBuf,
    /// Display caption. Immutable after construction.
    caption: String,
    /// Advances to the mutation time on every metadata change.
    modification_date: DateTime<Local>,
    /// Star rating, 0..=MAX_RATING.
    rating: u8,
    /// Not persisted.
    listeners: Listeners<ImageListenerFn>,
}

#[derive(Clone)]
pub struct ImageModel {
    inner: Rc<RefCell<Inner>>,
}

impl ImageModel {
    /// Creates a model for one photo. Rejects ratings above [`MAX_RATING`].
    pub fn new(
        path: impl Into<PathBuf>,
        caption: impl Into<String>,
        modification_date: DateTime<Local>,
        rating: u8,
    ) -> Result<Self> {
        if rating > MAX_RATING {
            return Err(FotagError::InvalidArgument(format!(
                "rating {rating} is outside 0..={MAX_RATING}"
            )));
        }

        Ok(Self {
            inner: Rc::new(RefCell::new(Inner {
                path: path.into(),
                caption: caption.into(),
                modification_date,
                rating,
                listeners: Listeners::new(),
            })),
        })
    }

    /// True when both handles refer to the same underlying photo record.
    pub fn same(&self, other: &ImageModel) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn path(&self) -> PathBuf {
        self.inner.borrow().path.clone()
    }

    pub fn caption(&self) -> String {
        self.inner.borrow().caption.clone()
    }

    pub fn modification_date(&self) -> DateTime<Local> {
        self.inner.borrow().modification_date
    }

    pub fn rating(&self) -> u8 {
        self.inner.borrow().rating
    }

    /// Sets the star rating, with toggle-off semantics: applying the current
    /// rating again clears it to 0. The modification date always advances,
    /// and every registered listener is notified once, even when the rating
    /// toggled back to a previously held value.
    ///
    /// Out-of-range input is rejected before any state change or
    /// notification; the UI only ever supplies 0..=5, so hitting this is a
    /// caller bug.
    pub fn set_rating(&self, rating: u8) -> Result<()> {
        if rating > MAX_RATING {
            return Err(FotagError::InvalidArgument(format!(
                "rating {rating} is outside 0..={MAX_RATING}"
            )));
        }

        let date = Local::now();
        let snapshot = {
            let mut inner = self.inner.borrow_mut();
            inner.rating = if inner.rating == rating { 0 } else { rating };
            inner.modification_date = date;
            inner.listeners.snapshot()
            // Borrow ends here; listeners may read the model.
        };

        for listener in snapshot {
            (listener.borrow_mut())(self, date);
        }

        Ok(())
    }

    /// Registers a metadata-change callback; the returned id removes it.
    pub fn add_listener(&self, listener: impl FnMut(&ImageModel, DateTime<Local>) + 'static) -> ListenerId {
        self.inner
            .borrow_mut()
            .listeners
            .add(Rc::new(RefCell::new(listener)))
    }

    /// Unregisters a callback; a no-op if the id is not registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.inner.borrow_mut().listeners.remove(id)
    }
}

impl fmt::Debug for ImageModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("ImageModel")
            .field("path", &inner.path)
            .field("caption", &inner.caption)
            .field("rating", &inner.rating)
            .finish()
    }
}
