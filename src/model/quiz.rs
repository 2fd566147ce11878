//! Quiz session: round generation and scoring over a fixed track list
//!
//! The session is a small state machine. It starts in progress at index 0,
//! every resolved selection moves it one track forward, and once the index
//! reaches the end of the list it is terminal until `reset`.

use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;
use thiserror::Error;

use super::track::Track;

/// Upper bound on tracks kept for one session
pub const MAX_TRACKS: usize = 30;
pub const CHOICES_PER_ROUND: usize = 3;
pub const POINTS_PER_CORRECT: u32 = 10;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum QuizError {
    #[error("cannot start a quiz without tracks")]
    EmptyTrackList,
    #[error("the quiz is over, there is no round to answer")]
    NoActiveRound,
}

/// One quiz turn: the playing track plus the tracks offered as answers
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Round {
    pub target: Track,
    pub choices: Vec<Track>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoundState {
    Active(Round),
    Terminal,
}

/// Result of answering a round
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SelectionOutcome {
    pub correct: bool,
    pub new_score: u32,
}

#[derive(Clone, Debug)]
pub struct QuizSession {
    tracks: Vec<Track>,
    current_index: usize,
    score: u32,
}

impl QuizSession {
    /// Start a session over `tracks`, keeping at most [`MAX_TRACKS`] of them.
    pub fn start(mut tracks: Vec<Track>) -> Result<Self, QuizError> {
        if tracks.is_empty() {
            return Err(QuizError::EmptyTrackList);
        }
        tracks.truncate(MAX_TRACKS);

        Ok(Self {
            tracks,
            current_index: 0,
            score: 0,
        })
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_terminal(&self) -> bool {
        self.current_index >= self.tracks.len()
    }

    /// The track the current round is about, if any
    pub fn target(&self) -> Option<&Track> {
        self.tracks.get(self.current_index)
    }

    /// Build the round for the current index.
    ///
    /// Distractors are sampled uniformly without replacement among tracks
    /// whose ids differ from the target and from each other, so the choice
    /// set never holds a duplicate id. Each call draws fresh randomness; the
    /// caller is expected to build a round once and keep it while displayed.
    pub fn current_round<R: Rng + ?Sized>(&self, rng: &mut R) -> RoundState {
        let Some(target) = self.target() else {
            return RoundState::Terminal;
        };

        let mut seen_ids = HashSet::from([target.id.as_str()]);
        let candidates: Vec<&Track> = self
            .tracks
            .iter()
            .filter(|track| seen_ids.insert(track.id.as_str()))
            .collect();

        let mut choices: Vec<Track> = candidates
            .choose_multiple(rng, CHOICES_PER_ROUND - 1)
            .map(|track| (*track).clone())
            .collect();
        choices.push(target.clone());
        choices.shuffle(rng);

        RoundState::Active(Round {
            target: target.clone(),
            choices,
        })
    }

    /// Score the chosen track against the current target and move on.
    ///
    /// The session advances whether or not the answer was right.
    pub fn resolve_selection(&mut self, chosen_track_id: &str) -> Result<SelectionOutcome, QuizError> {
        let correct = self.target().ok_or(QuizError::NoActiveRound)?.id == chosen_track_id;
        if correct {
            self.score += POINTS_PER_CORRECT;
        }
        self.current_index += 1;

        tracing::debug!(
            correct,
            score = self.score,
            index = self.current_index,
            total = self.tracks.len(),
            "Round resolved"
        );

        Ok(SelectionOutcome {
            correct,
            new_score: self.score,
        })
    }

    pub fn reset(&mut self) {
        self.current_index = 0;
        self.score = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn track(id: &str) -> Track {
        Track {
            id: id.to_string(),
            title: format!("Song {id}"),
            album_title: format!("Album {id}"),
            album_art_url: String::new(),
            preview_url: format!("https://p.scdn.co/mp3-preview/{id}"),
        }
    }

    fn tracks(ids: &[&str]) -> Vec<Track> {
        ids.iter().map(|id| track(id)).collect()
    }

    fn active_round(session: &QuizSession, rng: &mut StdRng) -> Round {
        match session.current_round(rng) {
            RoundState::Active(round) => round,
            RoundState::Terminal => panic!("expected an active round"),
        }
    }

    fn choice_ids(round: &Round) -> Vec<&str> {
        round.choices.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn start_rejects_empty_track_list() {
        assert_eq!(QuizSession::start(Vec::new()).unwrap_err(), QuizError::EmptyTrackList);
    }

    #[test]
    fn start_begins_at_first_track_with_zero_score() {
        let mut rng = StdRng::seed_from_u64(1);
        let session = QuizSession::start(tracks(&["a", "b"])).unwrap();

        assert_eq!(session.current_index(), 0);
        assert_eq!(session.score(), 0);
        assert_ne!(session.current_round(&mut rng), RoundState::Terminal);
    }

    #[test]
    fn start_keeps_at_most_thirty_tracks() {
        let ids: Vec<String> = (0..45).map(|i| format!("t{i}")).collect();
        let list = ids.iter().map(|id| track(id)).collect();
        let session = QuizSession::start(list).unwrap();

        assert_eq!(session.len(), MAX_TRACKS);
        assert_eq!(session.target().unwrap().id, "t0");
    }

    #[test]
    fn three_track_scenario() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut session = QuizSession::start(tracks(&["A", "B", "C"])).unwrap();
        assert_eq!(active_round(&session, &mut rng).target.id, "A");

        let first = session.resolve_selection("A").unwrap();
        assert_eq!(first, SelectionOutcome { correct: true, new_score: 10 });
        assert_eq!(session.current_index(), 1);

        let second = session.resolve_selection("X").unwrap();
        assert_eq!(second, SelectionOutcome { correct: false, new_score: 10 });
        assert_eq!(session.current_index(), 2);

        let third = session.resolve_selection("C").unwrap();
        assert_eq!(third, SelectionOutcome { correct: true, new_score: 20 });
        assert_eq!(session.current_index(), 3);
        assert!(session.is_terminal());
        assert_eq!(session.current_round(&mut rng), RoundState::Terminal);
    }

    #[test]
    fn wrong_choice_from_the_round_keeps_score() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut session = QuizSession::start(tracks(&["a", "b", "c", "d"])).unwrap();
        let round = active_round(&session, &mut rng);
        let wrong = round
            .choices
            .iter()
            .find(|t| t.id != round.target.id)
            .unwrap()
            .id
            .clone();

        let outcome = session.resolve_selection(&wrong).unwrap();

        assert!(!outcome.correct);
        assert_eq!(outcome.new_score, 0);
        assert_eq!(session.current_index(), 1);
    }

    #[test]
    fn single_track_round_offers_only_the_target() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut session = QuizSession::start(tracks(&["A"])).unwrap();

        let round = active_round(&session, &mut rng);
        assert_eq!(choice_ids(&round), vec!["A"]);

        let outcome = session.resolve_selection("A").unwrap();
        assert!(outcome.correct);
        assert!(session.is_terminal());
    }

    #[test]
    fn resolving_after_the_end_fails() {
        let mut session = QuizSession::start(tracks(&["A"])).unwrap();
        session.resolve_selection("nope").unwrap();

        assert_eq!(session.resolve_selection("A").unwrap_err(), QuizError::NoActiveRound);
        assert_eq!(session.current_index(), 1);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn every_resolution_advances_by_one_until_terminal() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut session = QuizSession::start(tracks(&["a", "b", "c", "d", "e"])).unwrap();

        for expected in 1..=5 {
            assert!(!session.is_terminal());
            session.resolve_selection("whatever").unwrap();
            assert_eq!(session.current_index(), expected);
        }
        assert_eq!(session.current_round(&mut rng), RoundState::Terminal);
    }

    #[test]
    fn reset_returns_to_start_with_same_tracks() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut session = QuizSession::start(tracks(&["a", "b"])).unwrap();
        session.resolve_selection("a").unwrap();
        session.resolve_selection("b").unwrap();
        assert!(session.is_terminal());

        session.reset();
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.score(), 0);
        assert_eq!(session.len(), 2);
        assert_eq!(active_round(&session, &mut rng).target.id, "a");

        session.reset();
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn choices_hold_target_and_distinct_ids() {
        let mut rng = StdRng::seed_from_u64(42);
        let all = ["a", "b", "c", "d", "e", "f"];

        for len in 1..=all.len() {
            let mut session = QuizSession::start(tracks(&all[..len])).unwrap();
            while !session.is_terminal() {
                let round = active_round(&session, &mut rng);
                let ids = choice_ids(&round);
                let unique: HashSet<&str> = ids.iter().copied().collect();

                assert_eq!(ids.len(), len.min(CHOICES_PER_ROUND));
                assert_eq!(unique.len(), ids.len());
                assert!(ids.contains(&round.target.id.as_str()));

                let target = round.target.id.clone();
                session.resolve_selection(&target).unwrap();
            }
        }
    }

    #[test]
    fn duplicate_ids_in_track_list_never_repeat_in_choices() {
        let mut rng = StdRng::seed_from_u64(8);
        let session = QuizSession::start(tracks(&["A", "A", "B"])).unwrap();

        for _ in 0..50 {
            let round = active_round(&session, &mut rng);
            let mut ids = choice_ids(&round);
            ids.sort_unstable();
            assert_eq!(ids, vec!["A", "B"]);
        }
    }

    #[test]
    fn distractors_are_drawn_from_the_whole_list() {
        let mut rng = StdRng::seed_from_u64(99);
        let session = QuizSession::start(tracks(&["a", "b", "c", "d", "e"])).unwrap();
        let mut offered = HashSet::new();

        for _ in 0..200 {
            let round = active_round(&session, &mut rng);
            offered.extend(round.choices.into_iter().map(|t| t.id));
        }

        assert_eq!(offered.len(), 5);
    }
}
