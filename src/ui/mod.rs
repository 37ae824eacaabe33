//! View components: renderers, the collection view, the toolbar, and the
//! file chooser. Everything here consumes the observable models in
//! `crate::state` and produces iced widgets on demand.

pub mod chooser;
pub mod collection_view;
pub mod renderer;
pub mod toolbar;

pub use chooser::{FileChooser, FileDescriptor};
pub use collection_view::ImageCollectionView;
pub use renderer::{ImageRenderer, ImageRendererFactory, ThumbnailRendererFactory};
pub use toolbar::{Toolbar, ToolbarEvent};

use iced::widget::{button, row, text};
use iced::Element;

use crate::state::MAX_RATING;

/// How the collection is laid out on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewType {
    Grid,
    List,
}

/// A row of five clickable stars showing `rating` filled. Used both by the
/// image renderers (rate a photo) and by the toolbar (rating filter).
pub fn star_row<'a, Message: Clone + 'a>(
    rating: u8,
    on_press: impl Fn(u8) -> Message + 'a,
) -> Element<'a, Message> {
    let mut stars = row![].spacing(2);
    for star in 1..=MAX_RATING {
        let label = if star <= rating { "★" } else { "☆" };
        stars = stars.push(
            button(text(label).size(18))
                .style(button::text)
                .padding(2)
                .on_press(on_press(star)),
        );
    }
    stars.into()
}
