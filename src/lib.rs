//! Fotag: a small native photo organizer.
//!
//! Users import images from disk, view them in a grid or list, rate them
//! 1-5 stars, and filter by rating. The collection persists locally in a
//! SQLite catalog. The design core is an observable model layer
//! (`state`) fanned out to view components (`ui`) through synchronous
//! listener notifications, with the iced application (`app`) as the
//! wiring between the two.

pub mod app;
pub mod error;
pub mod state;
pub mod ui;
