//! Application wiring.
//!
//! Composes the catalog, the observable collection, the collection view,
//! the toolbar, and the file chooser, and translates iced messages into
//! model mutations and view state. All reactive synchronization flows
//! through the listener registrations made in [`Fotag::new`]; `update`
//! only ever pokes the component that a message is addressed to.

use std::path::PathBuf;
use std::rc::Rc;

use iced::widget::{
    button, column, container, image, mouse_area, row, scrollable, stack, text,
};
use iced::{Alignment, Color, Element, Length, Task, Theme};
use log::{debug, info, warn};
use rfd::FileDialog;
use walkdir::WalkDir;

use crate::state::{ImageCollectionModel, ImageModel, Library};
use crate::ui::chooser::{FileChooser, FileDescriptor, IMAGE_EXTENSIONS};
use crate::ui::{ImageCollectionView, ImageRendererFactory, ThumbnailRendererFactory};
use crate::ui::{Toolbar, ToolbarEvent, ViewType};

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    /// User clicked the "Choose Files" button
    ChooseFiles,
    /// User clicked the "Import Folder" button
    ImportFolder,
    /// Background folder scan completed
    FolderScanned(Vec<FileDescriptor>),
    /// Toolbar layout button
    SelectView(ViewType),
    /// Toolbar filter star
    FilterRating(u8),
    /// Star clicked on the renderer at `index` (collection order)
    SetRating { index: usize, rating: u8 },
    /// Remove button on the renderer at `index`
    RemoveImage(usize),
    /// Thumbnail clicked; show the photo full size
    Enlarge(usize),
    /// Click anywhere on the enlarged photo dismisses it
    CloseEnlarged,
}

/// Main application state
pub struct Fotag {
    collection: ImageCollectionModel,
    collection_view: ImageCollectionView,
    toolbar: Toolbar,
    file_chooser: FileChooser,
    /// Path of the photo currently shown full size, if any.
    enlarged: Option<PathBuf>,
    /// Status message to display to the user
    status: String,
}

impl Fotag {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        // If this fails, we panic because the app cannot function without
        // its catalog database.
        let library = Rc::new(
            Library::new()
                .expect("Failed to initialize catalog database. Check permissions and disk space."),
        );

        let collection = ImageCollectionModel::new();
        for model in library.load() {
            collection.add_image_model(&model);
        }
        info!("fotag initialized with {} images", collection.len());

        let factory: Rc<dyn ImageRendererFactory> = Rc::new(ThumbnailRendererFactory);
        let collection_view = ImageCollectionView::new(factory);
        collection_view.set_image_collection_model(&collection);

        // Persist after every add, remove, or rating change. The listener
        // reads the collection back through a weak handle so the listener
        // list does not keep its own collection alive.
        {
            let library = Rc::clone(&library);
            let weak = collection.downgrade();
            collection.add_listener(move |event| {
                let Some(collection) = weak.upgrade() else { return };
                debug!("persisting collection after change to {}", event.image().caption());
                if let Err(e) = library.store(&collection.image_models()) {
                    warn!("failed to persist collection: {e}");
                }
            });
        }

        // Toolbar events drive view state only; they never touch models.
        let mut toolbar = Toolbar::new();
        {
            let view = collection_view.clone();
            toolbar.add_listener(move |event| match *event {
                ToolbarEvent::ViewChanged(view_type) => view.set_to_view(view_type),
                ToolbarEvent::RatingFilterChanged(rating) => view.set_rating_filter(rating),
            });
        }

        // Chosen files become unrated models, captioned with the file name.
        let mut file_chooser = FileChooser::new();
        {
            let collection = collection.clone();
            file_chooser.add_listener(move |_chooser, files, _date| {
                for file in files {
                    match ImageModel::new(
                        file.path.clone(),
                        file.name.clone(),
                        file.last_modified,
                        0,
                    ) {
                        Ok(model) => collection.add_image_model(&model),
                        Err(e) => warn!("skipping {}: {e}", file.path.display()),
                    }
                }
            });
        }

        let status = format!("Ready. {} images in library.", collection.len());

        (
            Fotag {
                collection,
                collection_view,
                toolbar,
                file_chooser,
                enlarged: None,
                status,
            },
            Task::none(),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::ChooseFiles => {
                let added = self.file_chooser.choose();
                if added > 0 {
                    self.status = format!("Added {added} images.");
                }
                Task::none()
            }
            Message::ImportFolder => {
                // Show the native folder picker dialog
                let folder = FileDialog::new()
                    .set_title("Select Folder with Photos")
                    .pick_folder();

                if let Some(folder_path) = folder {
                    self.status = format!("Importing from {}...", folder_path.display());
                    return Task::perform(scan_folder(folder_path), Message::FolderScanned);
                }

                Task::none()
            }
            Message::FolderScanned(files) => {
                let added = self.file_chooser.deliver(files);
                self.status = format!("Import complete. Added {added} images.");
                Task::none()
            }
            Message::SelectView(view_type) => {
                self.toolbar.set_to_view(view_type);
                Task::none()
            }
            Message::FilterRating(rating) => {
                self.toolbar.set_rating_filter(rating);
                Task::none()
            }
            Message::SetRating { index, rating } => {
                if let Some(model) = self.collection.image_models().get(index) {
                    if let Err(e) = model.set_rating(rating) {
                        warn!("rating rejected for {}: {e}", model.path().display());
                    }
                }
                Task::none()
            }
            Message::RemoveImage(index) => {
                if let Some(model) = self.collection.image_models().get(index) {
                    self.collection.remove_image_model(model);
                }
                Task::none()
            }
            Message::Enlarge(index) => {
                self.enlarged = self
                    .collection
                    .image_models()
                    .get(index)
                    .map(|model| model.path());
                Task::none()
            }
            Message::CloseEnlarged => {
                self.enlarged = None;
                Task::none()
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let controls = row![
            button("Choose Files").on_press(Message::ChooseFiles).padding(8),
            button("Import Folder").on_press(Message::ImportFolder).padding(8),
            text(&self.status).size(14),
        ]
        .spacing(12)
        .align_y(Alignment::Center);

        let content = column![
            self.toolbar.view(),
            controls,
            scrollable(self.collection_view.view()).height(Length::Fill),
        ]
        .spacing(16)
        .padding(16);

        match &self.enlarged {
            None => content.into(),
            Some(path) => {
                let enlarged = container(
                    image(image::Handle::from_path(path.clone()))
                        .width(Length::Fill)
                        .height(Length::Fill),
                )
                .padding(32)
                .center_x(Length::Fill)
                .center_y(Length::Fill)
                .style(|_theme| container::Style {
                    background: Some(Color::from_rgba(0.0, 0.0, 0.0, 0.85).into()),
                    ..container::Style::default()
                });

                stack![
                    content,
                    mouse_area(enlarged).on_press(Message::CloseEnlarged),
                ]
                .into()
            }
        }
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

pub fn run() -> iced::Result {
    iced::application("Fotag", Fotag::update, Fotag::view)
        .theme(Fotag::theme)
        .centered()
        .run_with(Fotag::new)
}

/// Recursively scans a folder for image files. The walk is filesystem-bound,
/// so it runs on the blocking thread pool instead of the UI executor.
async fn scan_folder(folder_path: PathBuf) -> Vec<FileDescriptor> {
    match tokio::task::spawn_blocking(move || scan_folder_blocking(folder_path)).await {
        Ok(files) => files,
        Err(err) => {
            warn!("folder scan task failed: {err}");
            Vec::new()
        }
    }
}

/// Blocking version of the folder scan
fn scan_folder_blocking(folder_path: PathBuf) -> Vec<FileDescriptor> {
    info!("scanning folder {}", folder_path.display());
    let mut files = Vec::new();

    for entry in WalkDir::new(&folder_path)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let Some(extension) = path.extension() else {
            continue;
        };
        let extension = extension.to_string_lossy().to_lowercase();
        if !IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            continue;
        }

        files.push(FileDescriptor::from_path(path.to_path_buf()));
    }

    info!("folder scan found {} images", files.len());
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn folder_scan_finds_only_image_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("photo.jpg"), b"jpg").unwrap();
        fs::write(dir.path().join("notes.txt"), b"txt").unwrap();
        let nested = dir.path().join("nested");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("deep.PNG"), b"png").unwrap();

        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let mut files = runtime.block_on(scan_folder(dir.path().to_path_buf()));
        files.sort_by(|a, b| a.name.cmp(&b.name));

        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["deep.PNG", "photo.jpg"]);
    }
}
