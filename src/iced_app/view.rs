//! App::view() method.

use iced::widget::shader::Shader;
use iced::widget::{button, column, container, row, slider, text};
use iced::{Element, Length};

use crate::raster::window::RAW16_MAX;

use super::app::App;
use super::styles::{palette, panel_style, tool_button_style};
use super::Message;

impl App {
    fn build_title_bar(&self) -> Element<'_, Message> {
        let view = self.view;
        row![
            text("Geo Raster View").size(16).color(palette::ACCENT),
            text(format!(
                "{:.2}°, {:.2}°  zoom {:.2}",
                view.longitude, view.latitude, view.zoom
            ))
            .size(12)
            .color(palette::TEXT_SECONDARY),
            text(&self.status).size(12).color(palette::TEXT_MUTED),
        ]
        .spacing(16)
        .into()
    }

    fn build_map_area(&self) -> Element<'_, Message> {
        let shader: Shader<Message, &App> = Shader::new(self)
            .width(Length::Fill)
            .height(Length::Fill);
        container(shader)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn build_window_panel(&self) -> Element<'_, Message> {
        let label = |s: String| text(s).size(12).color(palette::TEXT_PRIMARY).width(Length::Fixed(120.0));
        let input = self.window_input;

        let controls: Element<'_, Message> = match &self.active_layer {
            Some(layer_id) => column![
                text(layer_id).size(12).color(palette::TEXT_SECONDARY),
                row![
                    label(format!("lower {:.0}", input.lower)),
                    slider(0.0..=RAW16_MAX, input.lower, Message::LowerChanged).step(1.0),
                ]
                .spacing(8),
                row![
                    label(format!("upper {:.0}", input.upper)),
                    slider(0.0..=RAW16_MAX, input.upper, Message::UpperChanged).step(1.0),
                ]
                .spacing(8),
                row![
                    label(format!("gamma {:.2}", input.gamma)),
                    slider(0.1..=5.0, input.gamma, Message::GammaChanged).step(0.05),
                ]
                .spacing(8),
            ]
            .spacing(4)
            .into(),
            None => text("No windowed layer")
                .size(12)
                .color(palette::TEXT_MUTED)
                .into(),
        };

        let footprints = if self.config.show_footprints {
            "Hide footprints"
        } else {
            "Show footprints"
        };
        let tools = row![
            button(text("Reset view").size(12))
                .on_press(Message::ResetView)
                .style(tool_button_style),
            button(text(footprints).size(12))
                .on_press(Message::ToggleFootprints)
                .style(tool_button_style),
            button(text("Screenshot").size(12))
                .on_press(Message::SaveScreenshot)
                .style(tool_button_style),
        ]
        .spacing(6);

        container(column![controls, tools].spacing(8))
            .padding(8)
            .width(Length::Fill)
            .style(panel_style)
            .into()
    }

    pub fn view(&self) -> Element<'_, Message> {
        let main_column = column![
            self.build_title_bar(),
            self.build_map_area(),
            self.build_window_panel(),
        ]
        .spacing(5)
        .padding(7);

        container(main_column)
            .width(Length::Fill)
            .height(Length::Fill)
            .style(|_| container::Style {
                background: Some(iced::Background::Color(palette::BG_DARK)),
                ..Default::default()
            })
            .into()
    }
}
