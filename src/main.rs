use iced::widget::{column, row, text, text_input};
use iced::{event, keyboard, mouse, window};
use iced::{Element, Event, Length, Subscription, Task, Theme};
use rfd::FileDialog;
use std::fs;
use std::path::{Path, PathBuf};

mod processing;
mod state;
mod thumbnail;
mod ui;

use processing::{MockProcessing, ProcessingResponse, ProcessingService};
use state::data::{Item, ItemId, ProfileId};
use state::placement::{PlacementEngine, PlacementEvent, Repository, Snapshot};
use state::profiles::NEW_PROFILE_NAME;
use state::store::{MemoryRepository, SqliteRepository};

/// How many gallery thumbnails fit on one page
const ITEMS_PER_PAGE: usize = 16;

/// File extensions the importer accepts
const IMPORT_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Result of an image import operation
#[derive(Debug, Clone)]
struct ImportOutcome {
    items: Vec<Item>,
    skipped_count: usize,
}

/// Top-level screens reachable from the sidebar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Dashboard,
    Profiles,
}

/// Main application state
struct FaceGallery {
    /// Placement engine owning the gallery/profile snapshot
    placement: PlacementEngine,
    /// Backend the sorted images are submitted to
    processing: Box<dyn ProcessingService>,
    /// Whether a processing request is in flight
    is_processing: bool,
    /// Screen selected in the sidebar
    screen: Screen,
    /// Current gallery page, 1-based
    page: usize,
    /// Profile card currently under the pointer
    hover_target: Option<ProfileId>,
    /// Profile being renamed and the in-progress draft
    editing: Option<(ProfileId, String)>,
    /// Item shown enlarged over the dashboard
    preview: Option<Item>,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User picked a screen from the sidebar
    ScreenSelected(Screen),
    /// User clicked the "Upload" button
    UploadPressed,
    /// A file was dropped onto the window
    FileDropped(PathBuf),
    /// Background import completed with results
    ImportFinished(ImportOutcome),
    /// User clicked a pagination button
    PageSelected(usize),
    /// User clicked the "New Profile" button
    CreateProfilePressed,
    /// User clicked a profile's "Delete" button
    DeleteProfilePressed(ProfileId),
    /// User clicked a profile name to rename it
    RenameStarted(ProfileId),
    /// The rename draft changed
    RenameEdited(String),
    /// The rename editor was submitted
    RenameSubmitted,
    /// User clicked a thumbnail to enlarge it
    PreviewOpened(Item),
    /// The enlarged view was dismissed
    PreviewClosed,
    /// User pressed a gallery thumbnail
    DragStarted(ItemId),
    /// The pointer entered a profile card
    DropTargetEntered(ProfileId),
    /// The pointer left a profile card
    DropTargetLeft(ProfileId),
    /// The left mouse button was released while tracking a drag
    PointerReleased,
    /// Escape cancels a drag, dismisses the enlarged view, or closes the
    /// rename editor
    EscapePressed,
    /// User clicked the "Process" button
    ProcessPressed,
    /// The processing backend responded
    ProcessingFinished(Result<ProcessingResponse, ProcessingResponse>),
}

impl FaceGallery {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        // Open the database; if that fails the session still runs, it just
        // will not survive a restart.
        let repository: Box<dyn Repository> = match SqliteRepository::open_default() {
            Ok(repository) => Box::new(repository),
            Err(error) => {
                eprintln!("⚠️  Falling back to in-memory storage: {}", error);
                Box::new(MemoryRepository::new(Snapshot::seeded()))
            }
        };

        let mut placement = PlacementEngine::with_repository(repository);
        placement.on_change(|snapshot| {
            println!(
                "💾 Snapshot updated: {} unsorted, {} in profiles",
                snapshot.gallery.len(),
                snapshot.profiles.item_count()
            );
        });

        let image_count =
            placement.snapshot().gallery.len() + placement.snapshot().profiles.item_count();
        println!("🖼️ Face Gallery initialized with {} images", image_count);

        let status = format!("Ready. {} images in the gallery.", image_count);

        (
            FaceGallery {
                placement,
                processing: Box::new(MockProcessing::new()),
                is_processing: false,
                screen: Screen::Dashboard,
                page: 1,
                hover_target: None,
                editing: None,
                preview: None,
                status,
            },
            Task::none(),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::ScreenSelected(screen) => {
                self.screen = screen;
                Task::none()
            }
            Message::UploadPressed => {
                // Show the native file picker dialog
                let files = FileDialog::new()
                    .add_filter("Images", &IMPORT_EXTENSIONS)
                    .set_title("Select Images")
                    .pick_files();

                if let Some(paths) = files {
                    self.status = format!("Importing {} file(s)...", paths.len());

                    return Task::perform(import_images_async(paths), Message::ImportFinished);
                }

                Task::none()
            }
            Message::FileDropped(path) => {
                self.status = format!("Importing {}...", path.display());

                Task::perform(import_images_async(vec![path]), Message::ImportFinished)
            }
            Message::ImportFinished(outcome) => {
                let added = self.placement.add_items(outcome.items);

                self.status = if outcome.skipped_count > 0 {
                    format!(
                        "{} image(s) uploaded. {} file(s) skipped.",
                        added, outcome.skipped_count
                    )
                } else {
                    format!("{} image(s) uploaded.", added)
                };

                println!(
                    "📥 Import summary: {} new, {} skipped",
                    added, outcome.skipped_count
                );

                Task::none()
            }
            Message::PageSelected(page) => {
                self.page = page;
                Task::none()
            }
            Message::CreateProfilePressed => {
                self.placement.create_profile();
                self.status =
                    format!("Profile \"{}\" created. Click the name to edit.", NEW_PROFILE_NAME);
                Task::none()
            }
            Message::DeleteProfilePressed(id) => {
                // Close the rename editor if it points at the doomed profile
                if self
                    .editing
                    .as_ref()
                    .is_some_and(|(editing_id, _)| *editing_id == id)
                {
                    self.editing = None;
                }

                self.status = match self.placement.delete_profile(&id) {
                    Ok(name) => format!("Profile \"{}\" removed.", name),
                    Err(error) => error.to_string(),
                };

                Task::none()
            }
            Message::RenameStarted(id) => {
                let Some(profile) = self.placement.snapshot().profiles.get(&id) else {
                    return Task::none();
                };

                self.editing = Some((id, profile.name.clone()));

                Task::batch([
                    text_input::focus(ui::profiles::rename_input_id()),
                    text_input::select_all(ui::profiles::rename_input_id()),
                ])
            }
            Message::RenameEdited(draft) => {
                if let Some((_, current)) = self.editing.as_mut() {
                    *current = draft;
                }
                Task::none()
            }
            Message::RenameSubmitted => {
                // The editor closes whether or not the new name sticks.
                let Some((id, draft)) = self.editing.take() else {
                    return Task::none();
                };

                self.status = match self.placement.rename_profile(&id, &draft) {
                    Ok(()) => String::from("Profile name updated!"),
                    Err(error) => error.to_string(),
                };

                Task::none()
            }
            Message::PreviewOpened(item) => {
                self.preview = Some(item);
                Task::none()
            }
            Message::PreviewClosed => {
                self.preview = None;
                Task::none()
            }
            Message::DragStarted(item) => {
                self.placement.apply(PlacementEvent::DragStart(item));
                Task::none()
            }
            Message::DropTargetEntered(id) => {
                self.hover_target = Some(id);
                Task::none()
            }
            Message::DropTargetLeft(id) => {
                // Ignore a stale exit if the pointer already entered another card
                if self.hover_target.as_ref() == Some(&id) {
                    self.hover_target = None;
                }
                Task::none()
            }
            Message::PointerReleased => {
                let Some(item) = self.placement.dragging().cloned() else {
                    return Task::none();
                };

                let target = self.hover_target.clone();

                if let Some(transfer) = self
                    .placement
                    .apply(PlacementEvent::DragEnd { item, target })
                {
                    let name = self
                        .placement
                        .snapshot()
                        .profiles
                        .get(&transfer.to)
                        .map(|profile| profile.name.clone())
                        .unwrap_or_default();

                    self.status = format!("Image added to profile \"{}\"!", name);
                    self.clamp_page();
                }

                Task::none()
            }
            Message::EscapePressed => {
                // Topmost surface first: drag, then overlay, then editor.
                if self.placement.dragging().is_some() {
                    self.placement.apply(PlacementEvent::DragCancel);
                } else if self.preview.is_some() {
                    self.preview = None;
                } else if self.editing.is_some() {
                    self.editing = None;
                }
                Task::none()
            }
            Message::ProcessPressed => {
                if !self.placement.snapshot().has_items() {
                    self.status = String::from("Upload an image before processing.");
                    return Task::none();
                }

                self.is_processing = true;
                self.status = String::from("Processing images...");

                Task::perform(
                    processing::deliver(self.processing.submit()),
                    Message::ProcessingFinished,
                )
            }
            Message::ProcessingFinished(outcome) => {
                self.is_processing = false;

                let response = match outcome {
                    Ok(response) => {
                        println!("✅ Processing done: {} {}", response.status, response.message);
                        response
                    }
                    Err(response) => {
                        eprintln!(
                            "⚠️  Processing failed: {} {}",
                            response.status, response.message
                        );
                        response
                    }
                };

                self.status = response.message;

                Task::none()
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<'_, Message> {
        let screen: Element<Message> = match self.screen {
            Screen::Dashboard => row![
                ui::gallery::pane(
                    self.visible_items(),
                    self.page,
                    page_count(self.placement.snapshot().gallery.len()),
                    self.is_processing,
                    self.placement.dragging(),
                ),
                ui::profiles::pane(
                    &self.placement.snapshot().profiles,
                    self.editing.as_ref(),
                    self.hover_target.as_ref(),
                    self.placement.dragging().is_some(),
                ),
            ]
            .spacing(16)
            .into(),
            Screen::Profiles => ui::profiles::overview(&self.placement.snapshot().profiles),
        };

        let content = column![screen, text(&self.status).size(14)]
            .spacing(12)
            .padding(16)
            .width(Length::Fill)
            .height(Length::Fill);

        let page = row![ui::sidebar::view(self.screen), content].height(Length::Fill);

        match &self.preview {
            Some(item) => ui::modal(page, ui::preview(item), Message::PreviewClosed),
            None => page.into(),
        }
    }

    /// Subscribe to runtime events
    fn subscription(&self) -> Subscription<Message> {
        let mut subscriptions = vec![event::listen_with(window_events)];

        // Pointer and keyboard tracking only matters mid-drag, mid-rename,
        // or while the enlarged view is open.
        if self.placement.dragging().is_some()
            || self.editing.is_some()
            || self.preview.is_some()
        {
            subscriptions.push(event::listen_with(drag_events));
        }

        Subscription::batch(subscriptions)
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }

    /// Gallery items visible on the current page
    fn visible_items(&self) -> &[Item] {
        let items = self.placement.snapshot().gallery.items();
        let start = ((self.page - 1) * ITEMS_PER_PAGE).min(items.len());
        let end = (start + ITEMS_PER_PAGE).min(items.len());
        &items[start..end]
    }

    /// Pull the current page back into range after the gallery shrinks
    fn clamp_page(&mut self) {
        let pages = page_count(self.placement.snapshot().gallery.len());
        if self.page > pages {
            self.page = pages;
        }
    }
}

fn main() -> iced::Result {
    iced::application("Face Gallery", FaceGallery::update, FaceGallery::view)
        .subscription(FaceGallery::subscription)
        .theme(FaceGallery::theme)
        .centered()
        .run_with(FaceGallery::new)
}

/// Number of gallery pages needed for `count` items.
/// An empty gallery still shows one page.
fn page_count(count: usize) -> usize {
    count.div_ceil(ITEMS_PER_PAGE).max(1)
}

/// Window-level events the app always listens for
fn window_events(event: Event, _status: event::Status, _window: window::Id) -> Option<Message> {
    match event {
        Event::Window(window::Event::FileDropped(path)) => Some(Message::FileDropped(path)),
        _ => None,
    }
}

/// Pointer and keyboard events tracked while a drag or rename is in flight.
/// The event status is ignored so a release over any widget still lands.
fn drag_events(event: Event, _status: event::Status, _window: window::Id) -> Option<Message> {
    match event {
        Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
            Some(Message::PointerReleased)
        }
        Event::Keyboard(keyboard::Event::KeyPressed {
            key: keyboard::Key::Named(keyboard::key::Named::Escape),
            ..
        }) => Some(Message::EscapePressed),
        _ => None,
    }
}

/// Async wrapper around the import so the UI never blocks on decoding.
/// Runs the file work on the blocking pool.
async fn import_images_async(paths: Vec<PathBuf>) -> ImportOutcome {
    let store_dir = import_dir();
    let thumb_dir = thumbnail::cache_dir();

    let task = tokio::task::spawn_blocking(move || {
        import_images_blocking(&paths, store_dir.as_deref(), thumb_dir.as_deref())
    });

    match task.await {
        Ok(outcome) => outcome,
        Err(error) => {
            eprintln!("⚠️  Import task failed: {}", error);
            ImportOutcome {
                items: Vec::new(),
                skipped_count: 0,
            }
        }
    }
}

/// Directory imported images are copied into, created on demand
fn import_dir() -> Option<PathBuf> {
    let mut dir = dirs::data_dir().or_else(|| dirs::home_dir())?;
    dir.push("face-gallery");
    dir.push("imports");
    fs::create_dir_all(&dir).ok()?;
    Some(dir)
}

/// Validate each picked file and copy the keepers into `store_dir`.
/// Files with the wrong extension, or that fail to decode, are skipped.
/// Without a storage directory the items point at the source files.
fn import_images_blocking(
    paths: &[PathBuf],
    store_dir: Option<&Path>,
    thumb_dir: Option<&Path>,
) -> ImportOutcome {
    let mut items = Vec::new();
    let mut skipped_count = 0;

    for path in paths {
        let Some(extension) = path.extension() else {
            skipped_count += 1;
            continue;
        };
        let extension = extension.to_string_lossy().to_lowercase();
        if !IMPORT_EXTENSIONS.contains(&extension.as_str()) {
            skipped_count += 1;
            continue;
        }

        // Decode up front so a broken file never reaches the gallery.
        let decoded = match image::open(path) {
            Ok(decoded) => decoded,
            Err(error) => {
                eprintln!(
                    "⚠️  Error importing {:?}: {}",
                    path.file_name().unwrap_or_default(),
                    error
                );
                skipped_count += 1;
                continue;
            }
        };

        let id = ItemId::new();

        let url = match store_dir {
            Some(dir) => {
                let destination = dir.join(format!("{}.{}", id, extension));
                match fs::copy(path, &destination) {
                    Ok(_) => destination,
                    Err(error) => {
                        eprintln!(
                            "⚠️  Error importing {:?}: {}",
                            path.file_name().unwrap_or_default(),
                            error
                        );
                        skipped_count += 1;
                        continue;
                    }
                }
            }
            None => path.clone(),
        };

        if let Some(dir) = thumb_dir {
            thumbnail::generate_into(dir, &decoded, &id);
        }

        items.push(Item::new(id, url.to_string_lossy()));
    }

    println!(
        "✅ Import complete: {} new, {} skipped",
        items.len(),
        skipped_count
    );

    ImportOutcome {
        items,
        skipped_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use image::RgbaImage;
    use tempfile::TempDir;

    fn write_png(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        RgbaImage::new(32, 32)
            .save(&path)
            .expect("test image should save");
        path
    }

    fn item(id: &str) -> Item {
        Item::new(ItemId(id.into()), format!("/tmp/{id}.jpg"))
    }

    fn dashboard(items: Vec<Item>) -> FaceGallery {
        let repository = MemoryRepository::new(Snapshot::seeded());
        let mut app = FaceGallery {
            placement: PlacementEngine::with_repository(Box::new(repository)),
            processing: Box::new(MockProcessing::new()),
            is_processing: false,
            screen: Screen::Dashboard,
            page: 1,
            hover_target: None,
            editing: None,
            preview: None,
            status: String::new(),
        };
        app.placement.add_items(items);
        app
    }

    #[test]
    fn test_import_copies_accepted_files_and_skips_the_rest() {
        let source = TempDir::new().unwrap();
        let store = TempDir::new().unwrap();
        let thumbs = TempDir::new().unwrap();

        let picture = write_png(source.path(), "portrait.png");
        let notes = source.path().join("notes.txt");
        fs::write(&notes, b"not an image").unwrap();

        let outcome =
            import_images_blocking(&[picture, notes], Some(store.path()), Some(thumbs.path()));

        assert_eq!(outcome.items.len(), 1);
        assert_eq!(outcome.skipped_count, 1);

        let item = &outcome.items[0];
        assert!(item.url.starts_with(store.path().to_string_lossy().as_ref()));
        assert!(Path::new(&item.url).exists());
        assert!(thumbs.path().join(format!("{}.jpg", item.id)).exists());
    }

    #[test]
    fn test_import_rejects_files_that_do_not_decode() {
        let source = TempDir::new().unwrap();
        let store = TempDir::new().unwrap();

        let broken = source.path().join("broken.jpg");
        fs::write(&broken, b"definitely not a jpeg").unwrap();

        let outcome = import_images_blocking(&[broken], Some(store.path()), None);

        assert!(outcome.items.is_empty());
        assert_eq!(outcome.skipped_count, 1);
    }

    #[test]
    fn test_page_count_rounds_up() {
        assert_eq!(page_count(0), 1);
        assert_eq!(page_count(16), 1);
        assert_eq!(page_count(17), 2);
        assert_eq!(page_count(32), 2);
    }

    #[test]
    fn test_clamp_page_pulls_the_page_back_into_range() {
        let mut app = dashboard(vec![item("a"), item("b"), item("c")]);
        app.page = 5;

        app.clamp_page();

        assert_eq!(app.page, 1);
        assert_eq!(app.visible_items().len(), 3);
    }

    #[test]
    fn test_transfer_off_the_last_page_clamps_the_view() {
        let items: Vec<Item> = (0..17).map(|n| item(&format!("img-{n}"))).collect();
        let mut app = dashboard(items);
        app.page = 2;

        let _ = app.update(Message::DragStarted(ItemId("img-16".into())));
        let _ = app.update(Message::DropTargetEntered(ProfileId("aluno-1".into())));
        let _ = app.update(Message::PointerReleased);

        assert_eq!(app.placement.snapshot().gallery.len(), 16);
        assert_eq!(app.page, 1);
    }

    #[test]
    fn test_escape_dismisses_the_preview_before_the_rename_editor() {
        let mut app = dashboard(vec![item("a")]);
        app.editing = Some((ProfileId("aluno-1".into()), "João".into()));

        let _ = app.update(Message::PreviewOpened(item("a")));
        assert_eq!(app.preview.as_ref().map(|i| i.id.0.as_str()), Some("a"));

        let _ = app.update(Message::EscapePressed);
        assert!(app.preview.is_none());
        assert!(app.editing.is_some());

        let _ = app.update(Message::EscapePressed);
        assert!(app.editing.is_none());
    }
}
