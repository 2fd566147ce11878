//! Title screen

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::utils::centered_rect;

pub fn render_splash(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(
            "♪ Music Nerd ♪",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "How well do you know your favourite artist?",
            Style::default().fg(Color::White),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key to start",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let height = lines.len() as u16;
    let splash = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(splash, centered_rect(area, 50, height));
}
