/// Widget modules for the dashboard
///
/// - gallery.rs: the unsorted gallery pane with upload and processing
/// - profiles.rs: profile cards, drop zones, and the overview screen
/// - sidebar.rs: screen navigation

pub mod gallery;
pub mod profiles;
pub mod sidebar;

use iced::widget::image;
use iced::widget::{
    button, center, column, container, horizontal_space, mouse_area, opaque, row, stack, text,
    Image,
};
use iced::{Alignment, Color, ContentFit, Element, Length, Theme};

use crate::state::data::Item;
use crate::thumbnail;
use crate::Message;

/// Image widget for an item, preferring the cached thumbnail and falling
/// back to the item's own file.
pub fn item_image(item: &Item) -> Image {
    let handle = if thumbnail::exists(&item.id) {
        match thumbnail::path_for(&item.id) {
            Some(path) => image::Handle::from_path(path),
            None => image::Handle::from_path(&item.url),
        }
    } else {
        image::Handle::from_path(&item.url)
    };

    image(handle)
        .width(100)
        .height(100)
        .content_fit(ContentFit::Cover)
}

/// Enlarged view of a single item, shown over the dashboard. Loads the
/// item's full image, not the cached thumbnail.
pub fn preview(item: &Item) -> Element<'_, Message> {
    let full = image(image::Handle::from_path(&item.url))
        .width(Length::Fill)
        .height(420)
        .content_fit(ContentFit::Contain);

    container(
        column![
            row![
                text("Image Preview").size(20),
                horizontal_space(),
                button("Close")
                    .on_press(Message::PreviewClosed)
                    .style(button::text),
            ]
            .align_y(Alignment::Center),
            full,
        ]
        .spacing(12),
    )
    .width(640)
    .padding(16)
    .style(container::bordered_box)
    .into()
}

/// Lay `overlay` over `base`, dimming everything underneath. The overlay
/// itself keeps the pointer; pressing the dimmed area around it produces
/// `on_dismiss`.
pub fn modal<'a>(
    base: impl Into<Element<'a, Message>>,
    overlay: impl Into<Element<'a, Message>>,
    on_dismiss: Message,
) -> Element<'a, Message> {
    stack![
        base.into(),
        opaque(
            mouse_area(center(opaque(overlay)).style(|_theme: &Theme| {
                container::Style {
                    background: Some(
                        Color {
                            a: 0.8,
                            ..Color::BLACK
                        }
                        .into(),
                    ),
                    ..container::Style::default()
                }
            }))
            .on_press(on_dismiss)
        )
    ]
    .into()
}
