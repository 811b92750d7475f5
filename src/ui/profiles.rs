use iced::widget::{
    button, column, container, horizontal_space, mouse_area, row, scrollable, text, text_input,
};
use iced::{mouse, Alignment, Element, Length, Theme};
use iced_aw::Wrap;

use crate::state::data::{Profile, ProfileId};
use crate::state::profiles::ProfileRegistry;
use crate::ui;
use crate::Message;

/// Focus handle for the inline rename editor. Only one profile can be in
/// edit mode at a time, so a single id is enough.
pub fn rename_input_id() -> text_input::Id {
    text_input::Id::new("profile-rename")
}

/// The profile column of the dashboard: one card per profile, each a drop
/// target for gallery images.
pub fn pane<'a>(
    profiles: &'a ProfileRegistry,
    editing: Option<&'a (ProfileId, String)>,
    hover_target: Option<&'a ProfileId>,
    dragging: bool,
) -> Element<'a, Message> {
    let header = row![
        text("Profiles").size(20),
        horizontal_space(),
        button("New Profile")
            .on_press(Message::CreateProfilePressed)
            .style(button::success),
    ]
    .spacing(8)
    .align_y(Alignment::Center);

    let mut cards = column![].spacing(12);

    for (id, profile) in profiles.iter() {
        let draft = editing
            .filter(|(editing_id, _)| editing_id == id)
            .map(|(_, draft)| draft.as_str());
        let is_hovered = hover_target == Some(id);

        cards = cards.push(card(id, profile, draft, is_hovered, dragging));
    }

    container(column![header, scrollable(cards).height(Length::Fill)].spacing(12))
        .width(Length::FillPortion(1))
        .height(Length::Fill)
        .padding(12)
        .style(container::bordered_box)
        .into()
}

/// A single profile card. While a drag is in flight the card body doubles
/// as a drop zone and highlights when the pointer is over it. Sorted
/// thumbnails open the enlarged view when clicked.
fn card<'a>(
    id: &'a ProfileId,
    profile: &'a Profile,
    draft: Option<&'a str>,
    is_hovered: bool,
    dragging: bool,
) -> Element<'a, Message> {
    let highlight = is_hovered && dragging;

    let name: Element<Message> = match draft {
        Some(draft) => text_input("Profile name", draft)
            .id(rename_input_id())
            .on_input(Message::RenameEdited)
            .on_submit(Message::RenameSubmitted)
            .size(14)
            .into(),
        None => mouse_area(text(&profile.name).size(16))
            .on_press(Message::RenameStarted(id.clone()))
            .interaction(mouse::Interaction::Pointer)
            .into(),
    };

    let header = row![
        name,
        horizontal_space(),
        button("Delete")
            .on_press(Message::DeleteProfilePressed(id.clone()))
            .style(button::danger),
    ]
    .spacing(8)
    .align_y(Alignment::Center);

    let zone: Element<Message> = if profile.items.is_empty() {
        let hint = if highlight {
            "Drop the image here!"
        } else {
            "Empty profile"
        };

        container(text(hint).size(14))
            .center_x(Length::Fill)
            .center_y(110)
            .into()
    } else {
        let thumbnails: Vec<Element<Message>> = profile
            .items
            .iter()
            .map(|item| {
                mouse_area(ui::item_image(item))
                    .on_press(Message::PreviewOpened(item.clone()))
                    .interaction(mouse::Interaction::Pointer)
                    .into()
            })
            .collect();

        container(Wrap::with_elements(thumbnails).spacing(8.0).line_spacing(8.0))
            .width(Length::Fill)
            .into()
    };

    let drop_zone = container(zone)
        .padding(8)
        .style(move |theme: &Theme| {
            let mut style = container::bordered_box(theme);
            if highlight {
                style.background = Some(theme.extended_palette().primary.weak.color.into());
            }
            style
        });

    let target = mouse_area(drop_zone)
        .on_enter(Message::DropTargetEntered(id.clone()))
        .on_exit(Message::DropTargetLeft(id.clone()));

    column![header, target].spacing(6).into()
}

/// Read-only overview of every profile, shown on its own screen.
pub fn overview(profiles: &ProfileRegistry) -> Element<'_, Message> {
    let heading = column![
        text("Profile Management").size(28),
        text("Browse every profile created in the system.").size(14),
    ]
    .spacing(4);

    let body: Element<Message> = if profiles.is_empty() {
        text("No profiles created yet. Go back to the dashboard to create one.").into()
    } else {
        let cards: Vec<Element<Message>> = profiles
            .iter()
            .map(|(_, profile)| summary_card(profile))
            .collect();

        scrollable(Wrap::with_elements(cards).spacing(12.0).line_spacing(12.0))
            .height(Length::Fill)
            .into()
    };

    column![heading, body].spacing(16).into()
}

fn summary_card(profile: &Profile) -> Element<'_, Message> {
    container(
        column![
            text(&profile.name).size(16),
            text(format!("{} image(s) in this profile.", profile.items.len())).size(14),
        ]
        .spacing(4),
    )
    .width(220)
    .padding(12)
    .style(container::bordered_box)
    .into()
}
