//! Key event handling

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::MutexGuard;

use crate::model::{AppModel, Screen};
use super::AppController;

impl AppController {
    pub async fn handle_key_event(&self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        let model = self.model.lock().await;

        // Ctrl+Q / Ctrl+C quit from anywhere, including text input
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('q') | KeyCode::Char('c'))
        {
            model.set_should_quit(true).await;
            return Ok(());
        }

        // Handle error message first (blocks all other interactions)
        if model.has_error().await {
            return match key.code {
                KeyCode::Esc | KeyCode::Enter => {
                    model.clear_error().await;
                    Ok(())
                }
                _ => Ok(()),
            }
        }

        // Handle help popup
        if model.is_help_popup_open().await {
            return match key.code {
                KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('h') | KeyCode::Char('H') => {
                    model.hide_help_popup().await;
                    Ok(())
                }
                _ => Ok(()),
            }
        }

        if key.code == KeyCode::F(1) {
            model.show_help_popup().await;
            return Ok(());
        }

        match model.screen().await {
            Screen::Splash => {
                if matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q')) {
                    model.set_should_quit(true).await;
                } else {
                    // Any other key skips the title screen
                    model.set_screen(Screen::ArtistSearch).await;
                }
                Ok(())
            }
            Screen::ArtistSearch => self.handle_search_key(model, key).await,
            Screen::Game => self.handle_game_key(model, key).await,
        }
    }

    async fn handle_search_key(&self, model: MutexGuard<'_, AppModel>, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                let generation = model.append_to_search(c).await;
                drop(model);
                self.schedule_suggestions(generation);
            }
            KeyCode::Backspace => {
                let generation = model.backspace_search().await;
                drop(model);
                self.schedule_suggestions(generation);
            }
            KeyCode::Esc => {
                let generation = model.clear_search().await;
                drop(model);
                self.schedule_suggestions(generation);
            }
            KeyCode::Up => model.suggestion_move_up().await,
            KeyCode::Down => model.suggestion_move_down().await,
            KeyCode::Enter => {
                if model.has_suggestions().await {
                    if let Some(artist) = model.select_suggestion().await {
                        drop(model);
                        self.spawn_load_artist_tracks(artist);
                    }
                } else if model.can_start_game().await {
                    drop(model);
                    self.start_game().await;
                }
            }
            _ => {}
        }
        Ok(())
    }

    async fn handle_game_key(&self, model: MutexGuard<'_, AppModel>, key: KeyEvent) -> Result<()> {
        // Result popup waits for acknowledgement
        if model.has_pending_result().await {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                drop(model);
                self.dismiss_result().await;
            }
            return Ok(());
        }

        if model.is_game_over().await {
            match key.code {
                KeyCode::Enter | KeyCode::Char('r') | KeyCode::Char('R') => {
                    drop(model);
                    self.play_again().await;
                }
                KeyCode::Esc => {
                    drop(model);
                    self.leave_game().await;
                }
                KeyCode::Char('q') | KeyCode::Char('Q') => model.set_should_quit(true).await,
                KeyCode::Char('h') | KeyCode::Char('H') => model.show_help_popup().await,
                _ => {}
            }
            return Ok(());
        }

        match key.code {
            KeyCode::Left => model.choice_move_left().await,
            KeyCode::Right => model.choice_move_right().await,
            KeyCode::Char(c @ '1'..='3') => {
                let index = c as usize - '1' as usize;
                drop(model);
                self.answer(Some(index)).await;
            }
            KeyCode::Enter => {
                drop(model);
                self.answer(None).await;
            }
            KeyCode::Char(' ') | KeyCode::Char('p') | KeyCode::Char('P') => {
                drop(model);
                self.replay_snippet().await;
            }
            KeyCode::Esc => {
                drop(model);
                self.leave_game().await;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => model.set_should_quit(true).await,
            KeyCode::Char('h') | KeyCode::Char('H') => model.show_help_popup().await,
            _ => {}
        }
        Ok(())
    }
}
