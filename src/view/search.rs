//! Artist search screen

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, ListItem, Padding, Paragraph},
    Frame,
};

use crate::model::SearchState;
use super::utils::{render_scrollable_list, truncate_string};

pub fn render_search_screen(frame: &mut Frame, area: Rect, search_state: &SearchState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Prompt
            Constraint::Length(3), // Artist name input
            Constraint::Min(0),    // Suggestions
            Constraint::Length(3), // Track status / start button
        ])
        .split(area);

    let prompt = Paragraph::new("Are you a true music fan?")
        .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
    frame.render_widget(prompt, chunks[0]);

    render_input(frame, chunks[1], search_state);
    render_suggestions(frame, chunks[2], search_state);
    render_start_bar(frame, chunks[3], search_state);
}

fn render_input(frame: &mut Frame, area: Rect, search_state: &SearchState) {
    let (text, style) = if search_state.artist_name.is_empty() {
        ("Type an artist name...".to_string(), Style::default().fg(Color::DarkGray))
    } else {
        (format!("{}▏", search_state.artist_name), Style::default().fg(Color::Green))
    };

    let input = Paragraph::new(text).style(style).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Artist ")
            .padding(Padding::horizontal(1))
            .border_style(Style::default().fg(Color::Green)),
    );
    frame.render_widget(input, area);
}

fn render_suggestions(frame: &mut Frame, area: Rect, search_state: &SearchState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Suggestions (↑↓ Enter) ");

    if search_state.suggestions.is_empty() {
        frame.render_widget(block, area);
        return;
    }

    let width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = search_state
        .suggestions
        .iter()
        .enumerate()
        .map(|(i, artist)| {
            let style = if i == search_state.suggestion_selected {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Green)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(format!(" {}", truncate_string(&artist.name, width))).style(style)
        })
        .collect();

    render_scrollable_list(frame, area, items, search_state.suggestion_selected, block);
}

fn render_start_bar(frame: &mut Frame, area: Rect, search_state: &SearchState) {
    let line = match &search_state.selected_artist {
        None => Line::from(Span::styled(
            "Pick an artist to load their top tracks",
            Style::default().fg(Color::DarkGray),
        )),
        Some(artist) if search_state.is_loading => Line::from(Span::styled(
            format!("Loading top tracks for {}...", artist.name),
            Style::default().fg(Color::Yellow),
        )),
        Some(artist) if search_state.can_start_game() => Line::from(vec![
            Span::styled(
                format!("{} tracks by {} ready  ", search_state.tracks.len(), artist.name),
                Style::default().fg(Color::White),
            ),
            Span::styled(
                " Let's go! (Enter) ",
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Some(artist) => Line::from(Span::styled(
            format!("No tracks available for {}", artist.name),
            Style::default().fg(Color::Red),
        )),
    };

    let bar = Paragraph::new(line)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(bar, area);
}
