use iced::widget::{button, column, container, horizontal_space, mouse_area, row, text};
use iced::{mouse, Alignment, Element, Length};
use iced_aw::Wrap;

use crate::state::data::{Item, ItemId};
use crate::ui;
use crate::Message;

/// The unsorted gallery: a paged thumbnail grid plus the upload and
/// processing actions.
pub fn pane<'a>(
    items: &'a [Item],
    current_page: usize,
    total_pages: usize,
    is_processing: bool,
    dragging: Option<&ItemId>,
) -> Element<'a, Message> {
    let process_label = if is_processing {
        "Processing..."
    } else {
        "Process"
    };

    let header = row![
        text("Main Gallery").size(20),
        horizontal_space(),
        button("Upload")
            .on_press(Message::UploadPressed)
            .style(button::secondary),
        button(process_label)
            .on_press_maybe((!is_processing).then_some(Message::ProcessPressed))
            .style(button::primary),
    ]
    .spacing(8)
    .align_y(Alignment::Center);

    let body: Element<Message> = if items.is_empty() {
        container(text("Drag and drop images here, or click \"Upload\""))
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into()
    } else {
        let thumbnails: Vec<Element<Message>> = items
            .iter()
            .map(|item| draggable_thumbnail(item, dragging))
            .collect();

        container(Wrap::with_elements(thumbnails).spacing(10.0).line_spacing(10.0))
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    };

    let mut content = column![header, body].spacing(12);

    if total_pages > 1 {
        content = content.push(pagination(current_page, total_pages));
    }

    container(content)
        .width(Length::FillPortion(2))
        .height(Length::Fill)
        .padding(12)
        .style(container::bordered_box)
        .into()
}

/// A gallery thumbnail wired as a drag source. The thumbnail dims while it
/// is the one being dragged. A release in place, a plain click, opens the
/// enlarged view instead.
fn draggable_thumbnail<'a>(item: &'a Item, dragging: Option<&ItemId>) -> Element<'a, Message> {
    let is_dragged = dragging == Some(&item.id);

    let thumbnail = ui::item_image(item).opacity(if is_dragged { 0.5 } else { 1.0 });

    mouse_area(thumbnail)
        .on_press(Message::DragStarted(item.id.clone()))
        .on_release(Message::PreviewOpened(item.clone()))
        .interaction(mouse::Interaction::Grab)
        .into()
}

/// Numbered page buttons, shown only when the gallery spills past one page.
fn pagination<'a>(current_page: usize, total_pages: usize) -> Element<'a, Message> {
    let mut pages = row![].spacing(6);

    for number in 1..=total_pages {
        let style = if number == current_page {
            button::primary
        } else {
            button::text
        };

        pages = pages.push(
            button(text(number.to_string()))
                .style(style)
                .on_press(Message::PageSelected(number)),
        );
    }

    container(pages).center_x(Length::Fill).into()
}
