//! Wraps the native file-selection dialog.
//!
//! On selection the chooser emits `(chooser, files, date)` once to every
//! listener. The background folder scan feeds the same fan-out through
//! [`FileChooser::deliver`], so listeners cannot tell the two import paths
//! apart.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use chrono::{DateTime, Local};
use rfd::FileDialog;

use crate::state::{ListenerId, Listeners};

/// File extensions accepted as images, for both the dialog filter and the
/// folder scan.
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "bmp", "tif", "tiff",
];

/// What the selection surface knows about one chosen file.
#[derive(Debug, Clone)]
pub struct FileDescriptor {
    pub path: PathBuf,
    pub name: String,
    pub last_modified: DateTime<Local>,
}

impl FileDescriptor {
    /// Builds a descriptor from a path on disk. The modification time falls
    /// back to now when the filesystem cannot supply one.
    pub fn from_path(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let last_modified = std::fs::metadata(&path)
            .and_then(|metadata| metadata.modified())
            .map(DateTime::<Local>::from)
            .unwrap_or_else(|_| Local::now());

        Self {
            path,
            name,
            last_modified,
        }
    }
}

pub type ChooserListenerFn = dyn FnMut(&FileChooser, &[FileDescriptor], DateTime<Local>);

pub struct FileChooser {
    listeners: Listeners<ChooserListenerFn>,
}

impl FileChooser {
    pub fn new() -> Self {
        Self {
            listeners: Listeners::new(),
        }
    }

    /// Opens the native picker and delivers the chosen files. Returns the
    /// number of files delivered; cancelling the dialog delivers nothing.
    pub fn choose(&mut self) -> usize {
        let picked = FileDialog::new()
            .set_title("Select Images")
            .add_filter("Images", IMAGE_EXTENSIONS)
            .pick_files();

        match picked {
            Some(paths) => {
                self.deliver(paths.into_iter().map(FileDescriptor::from_path).collect())
            }
            None => 0,
        }
    }

    /// Emits the files to every listener with a single event date.
    pub fn deliver(&mut self, files: Vec<FileDescriptor>) -> usize {
        let date = Local::now();
        let snapshot = self.listeners.snapshot();
        for listener in snapshot {
            (listener.borrow_mut())(self, &files, date);
        }
        files.len()
    }

    pub fn add_listener(
        &mut self,
        listener: impl FnMut(&FileChooser, &[FileDescriptor], DateTime<Local>) + 'static,
    ) -> ListenerId {
        self.listeners.add(Rc::new(RefCell::new(listener)))
    }

    /// No-op if the id is not registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }
}

impl Default for FileChooser {
    fn default() -> Self {
        Self::new()
    }
}
