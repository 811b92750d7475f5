use iced::widget::{button, column, container, text};
use iced::{Element, Length};

use crate::{Message, Screen};

/// Navigation between the dashboard and the profiles overview.
pub fn view(active: Screen) -> Element<'static, Message> {
    let entry = |label: &'static str, screen: Screen| {
        let style = if active == screen {
            button::primary
        } else {
            button::text
        };

        button(label)
            .style(style)
            .width(Length::Fill)
            .on_press(Message::ScreenSelected(screen))
    };

    container(
        column![
            text("Face Gallery").size(22),
            entry("Dashboard", Screen::Dashboard),
            entry("Profiles", Screen::Profiles),
        ]
        .spacing(12),
    )
    .width(180)
    .height(Length::Fill)
    .padding(12)
    .style(container::bordered_box)
    .into()
}
