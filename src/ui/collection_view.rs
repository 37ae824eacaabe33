//! Keeps a set of renderers mirroring an [`ImageCollectionModel`].
//!
//! The view subscribes to the bound collection and reacts to its events:
//! an added photo gets a new renderer appended, a removed photo loses its
//! renderer, and a metadata change refreshes (never recreates) the matching
//! renderer. Renderer order always equals collection order.
//!
//! The handle is clonable so toolbar and collection callbacks can reach the
//! view; the subscription itself holds only a weak reference.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use iced::widget::column;
use iced::{Element, Length};
use iced_aw::Wrap;

use super::renderer::{ImageRenderer, ImageRendererFactory};
use super::ViewType;
use crate::app::Message;
use crate::state::{CollectionEvent, ImageCollectionModel, ListenerId};

struct Inner {
    view_type: ViewType,
    /// 0 = unfiltered; otherwise only photos rated at least this show.
    rating_filter: u8,
    factory: Rc<dyn ImageRendererFactory>,
    /// Mirrors the bound collection, in collection order.
    renderers: Vec<ImageRenderer>,
    /// The bound collection and our subscription on it.
    collection: Option<(ImageCollectionModel, ListenerId)>,
}

#[derive(Clone)]
pub struct ImageCollectionView {
    inner: Rc<RefCell<Inner>>,
}

impl ImageCollectionView {
    pub fn new(factory: Rc<dyn ImageRendererFactory>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                view_type: ViewType::Grid,
                rating_filter: 0,
                factory,
                renderers: Vec::new(),
                collection: None,
            })),
        }
    }

    /// Binds a collection: unsubscribes from any previously bound one,
    /// subscribes to the new one, and rebuilds the renderer list to match
    /// its current contents.
    pub fn set_image_collection_model(&self, collection: &ImageCollectionModel) {
        let previous = self.inner.borrow_mut().collection.take();
        if let Some((old, subscription)) = previous {
            old.remove_listener(subscription);
        }

        let weak = Rc::downgrade(&self.inner);
        let subscription =
            collection.add_listener(move |event| Self::on_collection_event(&weak, event));

        let mut inner = self.inner.borrow_mut();
        inner.collection = Some((collection.clone(), subscription));
        let factory = Rc::clone(&inner.factory);
        let view_type = inner.view_type;
        inner.renderers = collection
            .image_models()
            .into_iter()
            .map(|model| {
                let mut renderer = factory.create_image_renderer(model);
                renderer.set_to_view(view_type);
                renderer
            })
            .collect();
    }

    pub fn image_collection_model(&self) -> Option<ImageCollectionModel> {
        self.inner
            .borrow()
            .collection
            .as_ref()
            .map(|(collection, _)| collection.clone())
    }

    /// Installs a rendering strategy. A factory that is already installed
    /// (by reference identity) is a no-op; a new one discards every
    /// renderer and recreates them in collection order.
    pub fn set_image_renderer_factory(&self, factory: Rc<dyn ImageRendererFactory>) {
        let mut inner = self.inner.borrow_mut();
        if Rc::ptr_eq(&inner.factory, &factory) {
            return;
        }
        inner.factory = Rc::clone(&factory);

        let view_type = inner.view_type;
        let models = inner
            .collection
            .as_ref()
            .map(|(collection, _)| collection.image_models())
            .unwrap_or_default();
        inner.renderers = models
            .into_iter()
            .map(|model| {
                let mut renderer = factory.create_image_renderer(model);
                renderer.set_to_view(view_type);
                renderer
            })
            .collect();
    }

    pub fn image_renderer_factory(&self) -> Rc<dyn ImageRendererFactory> {
        Rc::clone(&self.inner.borrow().factory)
    }

    /// Switches between grid and list layout, propagated to every renderer.
    pub fn set_to_view(&self, view_type: ViewType) {
        let mut inner = self.inner.borrow_mut();
        inner.view_type = view_type;
        for renderer in &mut inner.renderers {
            renderer.set_to_view(view_type);
        }
    }

    pub fn current_view(&self) -> ViewType {
        self.inner.borrow().view_type
    }

    /// Display-state only; models are never mutated by filtering.
    pub fn set_rating_filter(&self, rating: u8) {
        self.inner.borrow_mut().rating_filter = rating;
    }

    pub fn rating_filter(&self) -> u8 {
        self.inner.borrow().rating_filter
    }

    pub fn renderer_count(&self) -> usize {
        self.inner.borrow().renderers.len()
    }

    /// Read access to the renderer list, mainly for tests.
    pub fn with_renderers<R>(&self, f: impl FnOnce(&[ImageRenderer]) -> R) -> R {
        f(&self.inner.borrow().renderers)
    }

    /// The renderers that pass the current rating filter, laid out as a
    /// wrap-around grid or a vertical list.
    pub fn view(&self) -> Element<'static, Message> {
        let inner = self.inner.borrow();
        let filter = inner.rating_filter;
        let visible = inner
            .renderers
            .iter()
            .enumerate()
            .filter(|(_, renderer)| filter == 0 || renderer.rating() >= filter);

        match inner.view_type {
            ViewType::Grid => {
                let cells: Vec<Element<'static, Message>> =
                    visible.map(|(index, renderer)| renderer.view(index)).collect();
                Wrap::with_elements(cells)
                    .spacing(16.0)
                    .line_spacing(16.0)
                    .into()
            }
            ViewType::List => {
                let mut list = column![].spacing(8).width(Length::Fill);
                for (index, renderer) in visible {
                    list = list.push(renderer.view(index));
                }
                list.into()
            }
        }
    }

    fn on_collection_event(weak: &Weak<RefCell<Inner>>, event: &CollectionEvent) {
        let Some(inner) = weak.upgrade() else { return };
        let mut inner = inner.borrow_mut();

        match event {
            CollectionEvent::ImageAdded { image, .. } => {
                let factory = Rc::clone(&inner.factory);
                let mut renderer = factory.create_image_renderer(image.clone());
                renderer.set_to_view(inner.view_type);
                inner.renderers.push(renderer);
            }
            CollectionEvent::ImageRemoved { image, .. } => {
                if let Some(index) = inner
                    .renderers
                    .iter()
                    .position(|renderer| renderer.image_model().same(image))
                {
                    inner.renderers.remove(index);
                }
            }
            CollectionEvent::MetaDataChanged { image, .. } => {
                if let Some(renderer) = inner
                    .renderers
                    .iter_mut()
                    .find(|renderer| renderer.image_model().same(image))
                {
                    renderer.refresh();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ImageModel;
    use crate::ui::renderer::ThumbnailRendererFactory;
    use chrono::Local;
    use std::cell::Cell;

    fn photo(name: &str) -> ImageModel {
        ImageModel::new(format!("/photos/{name}"), name, Local::now(), 0).unwrap()
    }

    fn view_with(collection: &ImageCollectionModel) -> ImageCollectionView {
        let view = ImageCollectionView::new(Rc::new(ThumbnailRendererFactory));
        view.set_image_collection_model(collection);
        view
    }

    /// Counts how many renderers it has produced.
    struct CountingFactory {
        created: Rc<Cell<usize>>,
    }

    impl ImageRendererFactory for CountingFactory {
        fn create_image_renderer(&self, model: ImageModel) -> ImageRenderer {
            self.created.set(self.created.get() + 1);
            ImageRenderer::new(model)
        }
    }

    #[test]
    fn binding_a_collection_creates_one_renderer_per_existing_model() {
        let collection = ImageCollectionModel::new();
        collection.add_image_model(&photo("a.jpg"));
        collection.add_image_model(&photo("b.jpg"));

        let view = view_with(&collection);

        assert_eq!(view.renderer_count(), 2);
        view.with_renderers(|renderers| {
            assert_eq!(renderers[0].image_model().caption(), "a.jpg");
            assert_eq!(renderers[1].image_model().caption(), "b.jpg");
        });
    }

    #[test]
    fn added_model_gets_a_renderer_appended() {
        let collection = ImageCollectionModel::new();
        let view = view_with(&collection);

        collection.add_image_model(&photo("a.jpg"));

        assert_eq!(view.renderer_count(), 1);
    }

    #[test]
    fn removed_model_loses_its_renderer_and_order_is_kept() {
        let collection = ImageCollectionModel::new();
        let a = photo("a.jpg");
        let b = photo("b.jpg");
        let c = photo("c.jpg");
        for model in [&a, &b, &c] {
            collection.add_image_model(model);
        }
        let view = view_with(&collection);

        collection.remove_image_model(&b);

        assert_eq!(view.renderer_count(), 2);
        view.with_renderers(|renderers| {
            assert!(renderers[0].image_model().same(&a));
            assert!(renderers[1].image_model().same(&c));
        });
    }

    #[test]
    fn metadata_change_refreshes_the_matching_renderer_in_place() {
        let collection = ImageCollectionModel::new();
        let a = photo("a.jpg");
        collection.add_image_model(&a);
        let created = Rc::new(Cell::new(0));
        let view = ImageCollectionView::new(Rc::new(CountingFactory {
            created: Rc::clone(&created),
        }));
        view.set_image_collection_model(&collection);
        assert_eq!(created.get(), 1);

        a.set_rating(4).unwrap();

        // Refreshed, not recreated.
        assert_eq!(created.get(), 1);
        view.with_renderers(|renderers| assert_eq!(renderers[0].rating(), 4));
    }

    #[test]
    fn rebinding_unsubscribes_from_the_previous_collection() {
        let first = ImageCollectionModel::new();
        let second = ImageCollectionModel::new();
        let view = view_with(&first);

        view.set_image_collection_model(&second);
        assert!(view.image_collection_model().unwrap().same(&second));

        first.add_image_model(&photo("a.jpg"));
        assert_eq!(view.renderer_count(), 0);

        second.add_image_model(&photo("b.jpg"));
        assert_eq!(view.renderer_count(), 1);
    }

    #[test]
    fn new_factory_recreates_all_renderers_and_same_factory_is_noop() {
        let collection = ImageCollectionModel::new();
        collection.add_image_model(&photo("a.jpg"));
        collection.add_image_model(&photo("b.jpg"));
        let view = view_with(&collection);

        let created = Rc::new(Cell::new(0));
        let factory: Rc<dyn ImageRendererFactory> = Rc::new(CountingFactory {
            created: Rc::clone(&created),
        });

        view.set_image_renderer_factory(Rc::clone(&factory));
        assert_eq!(created.get(), 2);
        assert_eq!(view.renderer_count(), 2);
        assert!(Rc::ptr_eq(&view.image_renderer_factory(), &factory));

        view.set_image_renderer_factory(factory);
        assert_eq!(created.get(), 2);
    }

    #[test]
    fn set_to_view_propagates_to_every_renderer() {
        let collection = ImageCollectionModel::new();
        collection.add_image_model(&photo("a.jpg"));
        collection.add_image_model(&photo("b.jpg"));
        let view = view_with(&collection);

        view.set_to_view(ViewType::List);

        assert_eq!(view.current_view(), ViewType::List);
        view.with_renderers(|renderers| {
            assert!(renderers
                .iter()
                .all(|renderer| renderer.current_view() == ViewType::List));
        });

        // Renderers created after the switch inherit it.
        collection.add_image_model(&photo("c.jpg"));
        view.with_renderers(|renderers| {
            assert_eq!(renderers[2].current_view(), ViewType::List);
        });
    }
}
