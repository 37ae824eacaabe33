//! Application state: the observable photo models and their persistence.
//!
//! - Listener bookkeeping shared by every observable object (observer.rs)
//! - A single photo's metadata (image.rs)
//! - The ordered photo collection (collection.rs)
//! - The SQLite-backed catalog (library.rs)

pub mod collection;
pub mod image;
pub mod library;
pub mod observer;

pub use collection::{CollectionEvent, ImageCollectionModel, WeakImageCollectionModel};
pub use image::{ImageModel, MAX_RATING};
pub use library::Library;
pub use observer::{ListenerId, Listeners};
