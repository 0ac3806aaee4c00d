//! UI style functions for iced widgets.

use iced::widget::{button, container};
use iced::{Border, Color, Theme};

// Dark map-viewer palette
pub mod palette {
    use iced::Color;

    pub const BG_DARK: Color = Color::from_rgb(0.07, 0.07, 0.08);
    pub const BG_PANEL: Color = Color::from_rgb(0.13, 0.13, 0.15);
    pub const ACCENT: Color = Color::from_rgb(0.50, 1.00, 0.50);
    pub const ACCENT_DIM: Color = Color::from_rgb(0.30, 0.55, 0.30);
    pub const TEXT_PRIMARY: Color = Color::from_rgb(0.90, 0.90, 0.88);
    pub const TEXT_SECONDARY: Color = Color::from_rgb(0.60, 0.60, 0.58);
    pub const TEXT_MUTED: Color = Color::from_rgb(0.42, 0.42, 0.40);
    pub const BORDER: Color = Color::from_rgb(0.25, 0.25, 0.27);
    pub const BORDER_HIGHLIGHT: Color = Color::from_rgb(0.38, 0.45, 0.38);
}

/// Style for toolbar buttons (reset, footprints, screenshot).
pub fn tool_button_style(_theme: &Theme, status: button::Status) -> button::Style {
    let (bg, text_color) = match status {
        button::Status::Active => (palette::BG_PANEL, palette::TEXT_SECONDARY),
        button::Status::Hovered => (palette::BORDER_HIGHLIGHT, palette::ACCENT),
        button::Status::Pressed => (palette::ACCENT_DIM, Color::BLACK),
        button::Status::Disabled => (palette::BG_DARK, palette::TEXT_MUTED),
    };

    button::Style {
        background: Some(iced::Background::Color(bg)),
        text_color,
        border: Border {
            color: palette::BORDER,
            width: 1.0,
            radius: 3.0.into(),
        },
        ..Default::default()
    }
}

/// Style for the window control panel.
pub fn panel_style(_theme: &Theme) -> container::Style {
    container::Style {
        background: Some(iced::Background::Color(palette::BG_PANEL)),
        border: Border {
            color: palette::BORDER,
            width: 1.0,
            radius: 4.0.into(),
        },
        ..Default::default()
    }
}
