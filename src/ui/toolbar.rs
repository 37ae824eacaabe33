//! The toolbar: two independent pieces of state, the layout mode and the
//! rating filter.
//!
//! The two notification rules are deliberately asymmetric and pinned by
//! tests: `set_to_view` is silent when the mode is unchanged, while
//! `set_rating_filter` always notifies, because its toggle means a repeated
//! value still represents a user action (clearing the filter).

use std::cell::RefCell;
use std::rc::Rc;

use iced::widget::{button, row, text};
use iced::{Alignment, Element, Theme};
use log::debug;

use super::{star_row, ViewType};
use crate::app::Message;
use crate::state::{ListenerId, Listeners, MAX_RATING};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarEvent {
    ViewChanged(ViewType),
    /// Carries the resulting filter (0 after a toggle-off).
    RatingFilterChanged(u8),
}

pub type ToolbarListenerFn = dyn FnMut(&ToolbarEvent);

pub struct Toolbar {
    current_view: ViewType,
    current_rating_filter: u8,
    listeners: Listeners<ToolbarListenerFn>,
}

impl Toolbar {
    pub fn new() -> Self {
        Self {
            current_view: ViewType::Grid,
            current_rating_filter: 0,
            listeners: Listeners::new(),
        }
    }

    /// Switches the layout mode. A no-op, with no notification, when the
    /// requested mode is already current.
    pub fn set_to_view(&mut self, view_type: ViewType) {
        if view_type == self.current_view {
            return;
        }
        self.current_view = view_type;
        debug!("toolbar view -> {view_type:?}");
        self.notify(&ToolbarEvent::ViewChanged(view_type));
    }

    pub fn current_view(&self) -> ViewType {
        self.current_view
    }

    /// Sets the rating filter with toggle semantics: repeating the current
    /// filter clears it to 0. Listeners are notified on every call.
    pub fn set_rating_filter(&mut self, rating: u8) {
        debug_assert!(rating <= MAX_RATING);
        self.current_rating_filter = if rating == self.current_rating_filter {
            0
        } else {
            rating
        };
        debug!("toolbar rating filter -> {}", self.current_rating_filter);
        self.notify(&ToolbarEvent::RatingFilterChanged(self.current_rating_filter));
    }

    /// 0 means unfiltered.
    pub fn current_rating_filter(&self) -> u8 {
        self.current_rating_filter
    }

    pub fn add_listener(&mut self, listener: impl FnMut(&ToolbarEvent) + 'static) -> ListenerId {
        self.listeners.add(Rc::new(RefCell::new(listener)))
    }

    /// No-op if the id is not registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    fn notify(&self, event: &ToolbarEvent) {
        for listener in self.listeners.snapshot() {
            (listener.borrow_mut())(event);
        }
    }

    pub fn view(&self) -> Element<'static, Message> {
        let mode_button = |label: &'static str, mode: ViewType| {
            let style: fn(&Theme, button::Status) -> button::Style = if self.current_view == mode {
                button::primary
            } else {
                button::secondary
            };
            button(text(label).size(14))
                .style(style)
                .padding(8)
                .on_press(Message::SelectView(mode))
        };

        row![
            mode_button("Grid", ViewType::Grid),
            mode_button("List", ViewType::List),
            text("Filter:").size(14),
            star_row(self.current_rating_filter, Message::FilterRating),
        ]
        .spacing(12)
        .align_y(Alignment::Center)
        .into()
    }
}

impl Default for Toolbar {
    fn default() -> Self {
        Self::new()
    }
}
