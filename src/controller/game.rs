//! Quiz flow and snippet playback

use crate::model::Track;
use super::AppController;

impl AppController {
    pub async fn start_game(&self) {
        let model = self.model.lock().await;
        match model.start_game().await {
            Ok(target) => {
                let total = model
                    .get_game_state()
                    .await
                    .session
                    .map(|session| session.len())
                    .unwrap_or(0);
                drop(model);
                tracing::info!(rounds = total, "Quiz started");
                if let Some(track) = target {
                    self.play_snippet(track).await;
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Cannot start quiz");
            }
        }
    }

    /// Answer with the choice at `index`, or the highlighted one.
    pub async fn answer(&self, index: Option<usize>) {
        let model = self.model.lock().await;
        match model.choose(index).await {
            Ok(Some(outcome)) => {
                tracing::info!(
                    correct = outcome.correct,
                    score = outcome.new_score,
                    "Answer recorded"
                );
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Answer rejected");
            }
        }
    }

    /// Close the result popup, stop the snippet and play the next round.
    pub async fn dismiss_result(&self) {
        let model = self.model.lock().await;
        if !model.has_pending_result().await {
            return;
        }
        let next = model.acknowledge_result().await;
        let score = model.get_game_state().await.score();
        drop(model);

        self.stop_snippet().await;

        match next {
            Some(track) => self.play_snippet(track).await,
            None => tracing::info!(score, "Quiz finished"),
        }
    }

    pub async fn play_again(&self) {
        let model = self.model.lock().await;
        let first = model.play_again().await;
        drop(model);

        tracing::info!("Quiz restarted");
        if let Some(track) = first {
            self.play_snippet(track).await;
        }
    }

    pub async fn leave_game(&self) {
        self.stop_snippet().await;
        let model = self.model.lock().await;
        model.leave_game().await;
        tracing::info!("Left quiz");
    }

    pub async fn replay_snippet(&self) {
        let model = self.model.lock().await;
        let target = model.current_target().await;
        drop(model);

        if let Some(track) = target {
            self.play_snippet(track).await;
        }
    }

    /// Claim the output for `track` and download its preview in the background.
    ///
    /// The generation is taken here, before the task runs, so a stop issued
    /// right after this call always wins over the pending download.
    pub(crate) async fn play_snippet(&self, track: Track) {
        if !track.has_preview() {
            tracing::info!(track_id = %track.id, title = %track.title, "Track has no preview");
            let model = self.model.lock().await;
            model.set_error("No preview available for this song.".to_string()).await;
            return;
        }

        let backend = self.audio_backend.lock().await.clone();
        let Some(backend) = backend else {
            tracing::debug!(track_id = %track.id, "Audio backend not ready, skipping snippet");
            return;
        };

        let generation = backend.silence();
        tracing::debug!(track_id = %track.id, generation, "Playing snippet");

        let controller = self.clone();
        tokio::spawn(async move {
            if let Err(e) = backend.play_preview(generation, &track.preview_url).await {
                tracing::warn!(track_id = %track.id, error = %e, "Snippet playback failed");
                let model = controller.model.lock().await;
                model.set_error(Self::format_error(&e)).await;
            }
        });
    }

    async fn stop_snippet(&self) {
        if let Some(backend) = self.audio_backend.lock().await.as_ref() {
            backend.stop();
        }
    }
}
