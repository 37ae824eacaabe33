//! The visual representation of a single photo.
//!
//! A renderer is bound to exactly one [`ImageModel`] and caches the display
//! state it derives from it (caption, date label, rating, thumbnail handle).
//! When the photo's metadata changes, the collection view refreshes the
//! renderer instead of recreating it; only rebinding to a different model
//! replaces the thumbnail handle.

use chrono::{DateTime, Local};
use iced::widget::{button, column, image, mouse_area, row, text};
use iced::{Alignment, Element, Length};

use super::{star_row, ViewType};
use crate::app::Message;
use crate::state::ImageModel;

/// Produces renderers for a view. Strategies are swapped on the collection
/// view as a whole and compared by reference identity.
pub trait ImageRendererFactory {
    fn create_image_renderer(&self, model: ImageModel) -> ImageRenderer;
}

/// The default strategy: thumbnail plus caption, date, and star row.
pub struct ThumbnailRendererFactory;

impl ImageRendererFactory for ThumbnailRendererFactory {
    fn create_image_renderer(&self, model: ImageModel) -> ImageRenderer {
        ImageRenderer::new(model)
    }
}

pub struct ImageRenderer {
    model: ImageModel,
    view_type: ViewType,
    thumbnail: image::Handle,
    caption: String,
    date_label: String,
    rating: u8,
}

impl ImageRenderer {
    pub fn new(model: ImageModel) -> Self {
        let mut renderer = Self {
            thumbnail: image::Handle::from_path(model.path()),
            caption: String::new(),
            date_label: String::new(),
            rating: 0,
            view_type: ViewType::Grid,
            model,
        };
        renderer.refresh();
        renderer
    }

    /// The photo this renderer displays.
    pub fn image_model(&self) -> &ImageModel {
        &self.model
    }

    /// Rebinds to a different photo, replacing all cached display state.
    pub fn set_image_model(&mut self, model: ImageModel) {
        self.thumbnail = image::Handle::from_path(model.path());
        self.model = model;
        self.refresh();
    }

    /// Re-reads the bound photo into the cached display state.
    pub fn refresh(&mut self) {
        self.caption = self.model.caption();
        self.date_label = format_date(self.model.modification_date());
        self.rating = self.model.rating();
    }

    pub fn set_to_view(&mut self, view_type: ViewType) {
        self.view_type = view_type;
    }

    pub fn current_view(&self) -> ViewType {
        self.view_type
    }

    /// The rating as of the last refresh; the collection view filters on
    /// this without touching the model.
    pub fn rating(&self) -> u8 {
        self.rating
    }

    /// The widget for this photo, as a grid cell or a list row. `index` is
    /// the renderer's position in collection order, which the application
    /// resolves back to a model when handling the emitted messages.
    pub fn view(&self, index: usize) -> Element<'static, Message> {
        let thumbnail = |width: f32| {
            mouse_area(image(self.thumbnail.clone()).width(Length::Fixed(width)))
                .on_press(Message::Enlarge(index))
        };
        let stars = star_row(self.rating, move |rating| Message::SetRating { index, rating });
        let remove = button(text("Remove").size(12)).on_press(Message::RemoveImage(index));

        match self.view_type {
            ViewType::Grid => column![
                thumbnail(180.0),
                text(self.caption.clone()).size(14),
                text(self.date_label.clone()).size(12),
                stars,
                remove,
            ]
            .spacing(6)
            .align_x(Alignment::Center)
            .width(Length::Fixed(200.0))
            .into(),

            ViewType::List => row![
                thumbnail(80.0),
                column![
                    text(self.caption.clone()).size(16),
                    text(self.date_label.clone()).size(12),
                ]
                .spacing(4)
                .width(Length::Fill),
                stars,
                remove,
            ]
            .spacing(12)
            .align_y(Alignment::Center)
            .width(Length::Fill)
            .into(),
        }
    }
}

/// m/d/yyyy, without zero padding.
fn format_date(date: DateTime<Local>) -> String {
    date.format("%-m/%-d/%Y").to_string()
}
