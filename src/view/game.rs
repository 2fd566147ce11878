//! Quiz screen: score header, choice cards and game over summary

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::model::{GameState, Round};
use super::utils::{centered_rect, truncate_string};

pub fn render_game_screen(frame: &mut Frame, area: Rect, game_state: &GameState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Score + progress
            Constraint::Min(0),    // Round or summary
            Constraint::Length(1), // Key hints
        ])
        .split(area);

    render_header(frame, chunks[0], game_state);

    if game_state.is_over() {
        render_game_over(frame, chunks[1], game_state);
        render_hints(frame, chunks[2], "Enter/R: play again   Esc: new artist   Q: quit");
    } else if let Some(round) = game_state.active_round() {
        render_round(frame, chunks[1], round, game_state.choice_selected);
        render_hints(frame, chunks[2], "←→/1-3: choose   Enter: confirm   Space: replay   Esc: leave   H: help");
    }
}

fn render_header(frame: &mut Frame, area: Rect, game_state: &GameState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let score = Paragraph::new(format!("Score: {}", game_state.score()))
        .style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(score, chunks[0]);

    let progress_text = match game_state.progress() {
        Some((current, total)) => format!("Song {} of {}", current, total),
        None => "Finished".to_string(),
    };
    let progress = Paragraph::new(progress_text)
        .alignment(Alignment::Right)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(progress, chunks[1]);
}

fn render_round(frame: &mut Frame, area: Rect, round: &Round, selected: usize) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Question
            Constraint::Min(0),    // Choices
        ])
        .split(area);

    let question = Paragraph::new("♪ Which song is playing? ♪")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD));
    frame.render_widget(question, chunks[0]);

    let constraints = vec![Constraint::Ratio(1, round.choices.len().max(1) as u32); round.choices.len()];
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(chunks[1]);

    for (i, (track, card)) in round.choices.iter().zip(cards.iter()).enumerate() {
        let is_selected = i == selected;
        let border_style = if is_selected {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };

        let width = card.width.saturating_sub(4) as usize;
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                truncate_string(&track.title, width),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                truncate_string(&track.album_title, width),
                Style::default().fg(Color::DarkGray),
            )),
        ];

        let choice = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border_style)
                    .title(format!(" {} ", i + 1)),
            );
        frame.render_widget(choice, *card);
    }
}

fn render_game_over(frame: &mut Frame, area: Rect, game_state: &GameState) {
    let total = game_state.session.as_ref().map(|session| session.len()).unwrap_or(0);
    let lines = vec![
        Line::from(Span::styled(
            "Game Over",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("Final score: {}", game_state.score()),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("{} songs played", total),
            Style::default().fg(Color::White),
        )),
    ];

    let summary = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(summary, centered_rect(area, 40, 6));
}

fn render_hints(frame: &mut Frame, area: Rect, hints: &str) {
    let hints = Paragraph::new(hints)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(hints, area);
}
