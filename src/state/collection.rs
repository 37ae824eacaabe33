//! The ordered, observable set of photos loaded in the application.
//!
//! The collection owns its entries for lifecycle purposes, but entries are
//! shared handles: any renderer bound to a photo aliases the same record.
//! Besides its own add/remove events the collection re-emits entry-level
//! metadata changes at collection granularity, so one subscription on the
//! collection is enough to observe everything (fan-out).

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{DateTime, Local};
use log::warn;

use super::image::ImageModel;
use super::observer::{ListenerId, Listeners};

/// What changed in the collection, and when.
#[derive(Debug, Clone)]
pub enum CollectionEvent {
    ImageAdded {
        image: ImageModel,
        date: DateTime<Local>,
    },
    ImageRemoved {
        image: ImageModel,
        date: DateTime<Local>,
    },
    /// An entry still in the collection changed its metadata.
    MetaDataChanged {
        image: ImageModel,
        date: DateTime<Local>,
    },
}

impl CollectionEvent {
    /// The photo this event is about.
    pub fn image(&self) -> &ImageModel {
        match self {
            CollectionEvent::ImageAdded { image, .. }
            | CollectionEvent::ImageRemoved { image, .. }
            | CollectionEvent::MetaDataChanged { image, .. } => image,
        }
    }
}

pub type CollectionListenerFn = dyn FnMut(&CollectionEvent);

struct Inner {
    /// Insertion order is display order.
    images: Vec<ImageModel>,
    /// Fan-out subscription per entry, parallel to `images`.
    subscriptions: Vec<ListenerId>,
    listeners: Listeners<CollectionListenerFn>,
}

/// Clonable handle to one photo collection.
#[derive(Clone)]
pub struct ImageCollectionModel {
    inner: Rc<RefCell<Inner>>,
}

impl ImageCollectionModel {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                images: Vec::new(),
                subscriptions: Vec::new(),
                listeners: Listeners::new(),
            })),
        }
    }

    /// True when both handles refer to the same underlying collection.
    pub fn same(&self, other: &ImageCollectionModel) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// A weak handle, for listeners on the collection that need to read it
    /// back without keeping it alive through its own listener list.
    pub fn downgrade(&self) -> WeakImageCollectionModel {
        WeakImageCollectionModel {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Appends a photo and notifies listeners with `ImageAdded`. The
    /// collection also subscribes to the photo, so later metadata changes
    /// surface as collection-level `MetaDataChanged` events.
    ///
    /// A photo already present by identity is a logged no-op: the sequence
    /// never holds duplicates.
    pub fn add_image_model(&self, image: &ImageModel) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.images.iter().any(|existing| existing.same(image)) {
                warn!("ignoring duplicate add of {}", image.path().display());
                return;
            }

            // The hook holds only a weak reference: dropping the collection
            // must not keep it alive through subscriptions on its entries.
            let weak = Rc::downgrade(&self.inner);
            let subscription = image.add_listener(move |model, date| {
                let Some(inner) = weak.upgrade() else { return };
                let snapshot = inner.borrow().listeners.snapshot();
                let event = CollectionEvent::MetaDataChanged {
                    image: model.clone(),
                    date,
                };
                for listener in snapshot {
                    (listener.borrow_mut())(&event);
                }
            });

            inner.images.push(image.clone());
            inner.subscriptions.push(subscription);
        }

        self.notify(&CollectionEvent::ImageAdded {
            image: image.clone(),
            date: Local::now(),
        });
    }

    /// Removes the first entry matching `image` by identity and notifies
    /// listeners with `ImageRemoved`. Silent no-op when the photo is not in
    /// the collection. The fan-out subscription is unregistered first, so
    /// further changes to a removed photo never reach collection listeners.
    pub fn remove_image_model(&self, image: &ImageModel) {
        let removed = {
            let mut inner = self.inner.borrow_mut();
            let position = inner
                .images
                .iter()
                .position(|existing| existing.same(image));
            position.map(|index| {
                let model = inner.images.remove(index);
                let subscription = inner.subscriptions.remove(index);
                (model, subscription)
            })
        };

        let Some((model, subscription)) = removed else {
            return;
        };
        model.remove_listener(subscription);

        self.notify(&CollectionEvent::ImageRemoved {
            image: model,
            date: Local::now(),
        });
    }

    /// The current entries in display order. The returned handles alias the
    /// collection's records, but the sequence itself is the caller's copy.
    pub fn image_models(&self) -> Vec<ImageModel> {
        self.inner.borrow().images.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().images.is_empty()
    }

    pub fn add_listener(&self, listener: impl FnMut(&CollectionEvent) + 'static) -> ListenerId {
        self.inner
            .borrow_mut()
            .listeners
            .add(Rc::new(RefCell::new(listener)))
    }

    /// No-op if the id is not registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.inner.borrow_mut().listeners.remove(id)
    }

    fn notify(&self, event: &CollectionEvent) {
        let snapshot = self.inner.borrow().listeners.snapshot();
        for listener in snapshot {
            (listener.borrow_mut())(event);
        }
    }
}

impl Default for ImageCollectionModel {
    fn default() -> Self {
        Self::new()
    }
}

/// Weak counterpart of [`ImageCollectionModel`].
#[derive(Clone)]
pub struct WeakImageCollectionModel {
    inner: std::rc::Weak<RefCell<Inner>>,
}

impl WeakImageCollectionModel {
    pub fn upgrade(&self) -> Option<ImageCollectionModel> {
        self.inner
            .upgrade()
            .map(|inner| ImageCollectionModel { inner })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn photo(name: &str) -> ImageModel {
        ImageModel::new(format!("/photos/{name}"), name, Local::now(), 0).unwrap()
    }

    /// Records a short tag per received event.
    fn record_events(collection: &ImageCollectionModel) -> Rc<RefCell<Vec<&'static str>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        collection.add_listener(move |event| {
            sink.borrow_mut().push(match event {
                CollectionEvent::ImageAdded { .. } => "added",
                CollectionEvent::ImageRemoved { .. } => "removed",
                CollectionEvent::MetaDataChanged { .. } => "changed",
            });
        });
        events
    }

    #[test]
    fn length_tracks_adds_and_successful_removes() {
        let collection = ImageCollectionModel::new();
        let a = photo("a.jpg");
        let b = photo("b.jpg");
        let stranger = photo("stranger.jpg");

        collection.add_image_model(&a);
        collection.add_image_model(&b);
        assert_eq!(collection.len(), 2);

        collection.remove_image_model(&stranger);
        assert_eq!(collection.len(), 2);

        collection.remove_image_model(&a);
        assert_eq!(collection.len(), 1);
        assert!(collection.image_models()[0].same(&b));
    }

    #[test]
    fn add_notifies_each_listener_exactly_once() {
        let collection = ImageCollectionModel::new();
        let first = record_events(&collection);
        let second = record_events(&collection);

        collection.add_image_model(&photo("a.jpg"));

        assert_eq!(*first.borrow(), vec!["added"]);
        assert_eq!(*second.borrow(), vec!["added"]);
    }

    #[test]
    fn duplicate_add_is_a_silent_noop() {
        let collection = ImageCollectionModel::new();
        let a = photo("a.jpg");
        collection.add_image_model(&a);
        let events = record_events(&collection);

        collection.add_image_model(&a);
        collection.add_image_model(&a.clone());

        assert_eq!(collection.len(), 1);
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn metadata_changes_fan_out_at_collection_level() {
        let collection = ImageCollectionModel::new();
        let a = photo("a.jpg");
        collection.add_image_model(&a);
        let events = record_events(&collection);

        a.set_rating(4).unwrap();
        a.set_rating(2).unwrap();

        assert_eq!(*events.borrow(), vec!["changed", "changed"]);
    }

    #[test]
    fn fan_out_event_carries_the_changed_image() {
        let collection = ImageCollectionModel::new();
        let a = photo("a.jpg");
        let b = photo("b.jpg");
        collection.add_image_model(&a);
        collection.add_image_model(&b);

        let seen = Rc::new(RefCell::new(Vec::new()));
        {
            let seen = Rc::clone(&seen);
            collection.add_listener(move |event| {
                if let CollectionEvent::MetaDataChanged { date, .. } = event {
                    seen.borrow_mut().push((event.image().clone(), *date));
                }
            });
        }

        b.set_rating(5).unwrap();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].0.same(&b));
        assert_eq!(seen[0].1, b.modification_date());
    }

    #[test]
    fn removal_unsubscribes_the_collection_from_the_image() {
        let collection = ImageCollectionModel::new();
        let a = photo("a.jpg");
        collection.add_image_model(&a);
        let events = record_events(&collection);

        collection.remove_image_model(&a);
        assert_eq!(*events.borrow(), vec!["removed"]);

        a.set_rating(3).unwrap();
        a.set_rating(1).unwrap();
        assert_eq!(*events.borrow(), vec!["removed"]);
    }

    #[test]
    fn listener_registered_during_notification_misses_that_event() {
        let collection = ImageCollectionModel::new();
        let late_calls = Rc::new(RefCell::new(0u32));
        let registered = Rc::new(Cell::new(false));
        {
            let collection = collection.clone();
            let late_calls = Rc::clone(&late_calls);
            let registered = Rc::clone(&registered);
            collection.clone().add_listener(move |_event| {
                if !registered.get() {
                    registered.set(true);
                    let late_calls = Rc::clone(&late_calls);
                    collection.add_listener(move |_event| {
                        *late_calls.borrow_mut() += 1;
                    });
                }
            });
        }

        collection.add_image_model(&photo("a.jpg"));
        assert_eq!(*late_calls.borrow(), 0);

        collection.add_image_model(&photo("b.jpg"));
        assert_eq!(*late_calls.borrow(), 1);
    }

    #[test]
    fn removed_collection_listener_is_not_notified() {
        let collection = ImageCollectionModel::new();
        let calls = Rc::new(RefCell::new(0u32));
        let id = {
            let calls = Rc::clone(&calls);
            collection.add_listener(move |_| *calls.borrow_mut() += 1)
        };

        collection.add_image_model(&photo("a.jpg"));
        assert!(collection.remove_listener(id));
        assert!(!collection.remove_listener(id));
        collection.add_image_model(&photo("b.jpg"));

        assert_eq!(*calls.borrow(), 1);
    }
}
