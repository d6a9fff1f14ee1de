//! Frame driver
//!
//! Owns everything that lives outside the deterministic simulation: input,
//! settings, local saves and the leaderboard client. One call to
//! [`Session::frame`] per animation frame, then [`Session::render_frame`].

use crate::backend::{ScoreBackend, ScoreSubmission, log_outcome};
use crate::editor::{EditorError, LevelEditor};
use crate::highscores::HighScores;
use crate::persistence::Progress;
use crate::platform::{InputState, now_ms};
use crate::renderer::{RenderFrame, build_frame};
use crate::settings::Settings;
use crate::sim::{Achievements, GameEvent, GamePhase, Level, SimulationState, tick};
use crate::tuning::Tuning;

/// Seconds a HUD banner stays up
const BANNER_TIME: f32 = 3.0;

pub struct Session {
    pub state: SimulationState,
    pub input: InputState,
    settings: Settings,
    high_scores: HighScores,
    progress: Progress,
    backend: Box<dyn ScoreBackend>,
    banner: Option<(String, f32)>,
    focused: bool,
    /// Smoothed frames per second
    fps: f32,
}

impl Session {
    /// Build a session, loading settings, high scores and progress from
    /// local storage
    pub fn new(levels: Vec<Level>, tuning: Tuning, backend: Box<dyn ScoreBackend>, seed: u64) -> Self {
        Self::with_saves(
            levels,
            tuning,
            backend,
            seed,
            Settings::load(),
            HighScores::load(),
            Progress::load(),
        )
    }

    pub fn with_saves(
        levels: Vec<Level>,
        tuning: Tuning,
        backend: Box<dyn ScoreBackend>,
        seed: u64,
        settings: Settings,
        high_scores: HighScores,
        progress: Progress,
    ) -> Self {
        let mut state = SimulationState::new(levels, tuning, seed);
        state.achievements = Achievements::from_unlocked(&progress.achievements);
        log::info!("Session ready (backend: {}, seed: {})", backend.name(), seed);
        let mut session = Self {
            state,
            input: InputState::new(),
            settings,
            high_scores,
            progress,
            backend,
            banner: None,
            focused: true,
            fps: 0.0,
        };
        session.apply_settings();
        session
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    /// Replace and persist settings
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
        self.settings.save();
        self.apply_settings();
    }

    fn apply_settings(&mut self) {
        self.state.max_particles = self.settings.max_particles();
        self.state.reduced_motion = self.settings.reduced_motion;
    }

    /// Tab hidden or window blurred: pause a running game and drop held keys
    pub fn auto_pause(&mut self, reason: &str) {
        self.input.release_all();
        if self.state.phase == GamePhase::Playing {
            self.input.request_pause();
            log::info!("Auto-paused ({})", reason);
        }
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// Current sound effect volume, for the audio layer
    pub fn sfx_volume(&self) -> f32 {
        self.settings.effective_sfx_volume(self.focused)
    }

    pub fn music_volume(&self) -> f32 {
        self.settings.effective_music_volume(self.focused)
    }

    /// Advance one animation frame. Returns the frame's game events for
    /// presentation layers (audio, DOM HUD).
    pub fn frame(&mut self, raw_dt: f32) -> Vec<GameEvent> {
        let input = self.input.snapshot();
        tick(&mut self.state, &input, raw_dt);

        if raw_dt.is_finite() && raw_dt > 0.0 {
            let instant = 1.0 / raw_dt;
            self.fps = if self.fps > 0.0 { self.fps * 0.9 + instant * 0.1 } else { instant };
        }

        if let Some((_, left)) = &mut self.banner {
            *left -= crate::clamp_frame_dt(raw_dt);
            if *left <= 0.0 {
                self.banner = None;
            }
        }

        let events = self.state.drain_events();
        for event in &events {
            self.handle_event(event);
        }
        events
    }

    fn handle_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::AchievementUnlocked { achievement } => {
                self.show_banner(format!("Achievement: {}", achievement.title()));
                if !self.state.playtest && !self.progress.has(*achievement) {
                    self.progress.achievements.push(*achievement);
                    self.progress.save();
                }
            }
            GameEvent::RunEnded {
                score,
                level_index,
                coins,
                victory,
            } => self.finish_run(*score, *level_index, *coins, *victory),
            _ => {}
        }
    }

    fn finish_run(&mut self, score: u64, level_index: usize, coins: u32, victory: bool) {
        if self.state.playtest {
            log::info!("Playtest ended, score not recorded");
            return;
        }

        if let Some(rank) = self.high_scores.add_score(score, level_index, coins, now_ms()) {
            self.high_scores.save();
            self.show_banner(format!("New high score! #{}", rank));
        }
        self.progress.record_run(level_index, victory, self.state.achievements.unlocked());
        self.progress.save();

        let submission = ScoreSubmission {
            score,
            level_index,
            coins,
        };
        self.backend
            .submit(submission, Box::new(move |result| log_outcome(submission, result)));
    }

    fn show_banner(&mut self, text: String) {
        self.banner = Some((text, BANNER_TIME));
    }

    /// Hand an editor level to the simulation and start playing it
    pub fn playtest(&mut self, editor: &mut LevelEditor) -> Result<usize, EditorError> {
        editor.playtest(&mut self.state)
    }

    pub fn render_frame(&self) -> RenderFrame {
        let mut frame = build_frame(&self.state, &self.settings);
        frame.hud.banner = self.banner.as_ref().map(|(text, _)| text.clone());
        frame.hud.fps = self.settings.show_fps.then_some(self.fps);
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendError, OfflineBackend, SubmitCallback, SubmitOutcome};
    use crate::sim::Achievement;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records submissions and answers with a fixed result
    struct RecordingBackend {
        sent: Rc<RefCell<Vec<ScoreSubmission>>>,
        reply: Result<SubmitOutcome, BackendError>,
    }

    impl ScoreBackend for RecordingBackend {
        fn name(&self) -> &str {
            "recording"
        }

        fn submit(&self, submission: ScoreSubmission, on_done: SubmitCallback) {
            self.sent.borrow_mut().push(submission);
            on_done(self.reply.clone());
        }
    }

    fn session_with(reply: Result<SubmitOutcome, BackendError>) -> (Session, Rc<RefCell<Vec<ScoreSubmission>>>) {
        let sent = Rc::new(RefCell::new(Vec::new()));
        let backend = RecordingBackend {
            sent: Rc::clone(&sent),
            reply,
        };
        let session = Session::with_saves(
            vec![Level::bordered("A", 20, 10), Level::bordered("B", 20, 10)],
            Tuning::default(),
            Box::new(backend),
            9,
            Settings::default(),
            HighScores::new(),
            Progress::new(),
        );
        (session, sent)
    }

    #[test]
    fn test_enter_key_starts_run() {
        let (mut session, _) = session_with(Ok(SubmitOutcome::default()));
        session.input.key_down("Enter", false);
        let events = session.frame(1.0 / 60.0);
        assert_eq!(session.state.phase, GamePhase::Playing);
        assert!(events.contains(&GameEvent::RunStarted));
    }

    #[test]
    fn test_run_end_saves_locally_and_submits() {
        let (mut session, sent) = session_with(Ok(SubmitOutcome { new_high_score: true }));
        session.state.start_run(1);
        session.state.score = 4200;
        session.state.currency.add(12);
        session.state.end_run(false);
        session.frame(1.0 / 60.0);

        assert_eq!(
            *sent.borrow(),
            vec![ScoreSubmission {
                score: 4200,
                level_index: 1,
                coins: 12
            }]
        );
        assert_eq!(session.high_scores().top_score(), Some(4200));
        assert_eq!(session.progress().highest_level, 1);
        assert_eq!(session.progress().runs_played, 1);
        assert!(session.render_frame().hud.banner.is_some());
    }

    #[test]
    fn test_backend_failure_keeps_local_score() {
        let (mut session, sent) = session_with(Err(BackendError::Unreachable));
        session.state.start_run(0);
        session.state.score = 300;
        session.state.end_run(true);
        session.frame(1.0 / 60.0);
        assert_eq!(sent.borrow().len(), 1);
        assert_eq!(session.high_scores().top_score(), Some(300));
        assert_eq!(session.progress().victories, 1);
    }

    #[test]
    fn test_playtest_runs_are_not_recorded() {
        let (mut session, sent) = session_with(Ok(SubmitOutcome::default()));
        let mut editor = LevelEditor::new(Level::bordered("Draft", 12, 8));
        session.playtest(&mut editor).unwrap();
        assert!(session.state.playtest);
        session.state.score = 999;
        session.state.end_run(false);
        session.frame(1.0 / 60.0);
        assert!(sent.borrow().is_empty());
        assert!(session.high_scores().is_empty());
    }

    #[test]
    fn test_auto_pause_only_while_playing() {
        let (mut session, _) = session_with(Ok(SubmitOutcome::default()));
        session.auto_pause("blur");
        session.frame(1.0 / 60.0);
        assert_eq!(session.state.phase, GamePhase::Menu);

        session.state.start_run(0);
        session.input.key_down("ArrowRight", false);
        session.auto_pause("tab hidden");
        session.frame(1.0 / 60.0);
        assert_eq!(session.state.phase, GamePhase::Paused);
        assert!(!session.input.snapshot().right);
    }

    #[test]
    fn test_saved_achievements_do_not_unlock_twice() {
        let mut progress = Progress::new();
        progress.achievements.push(Achievement::FirstBlood);
        let session = Session::with_saves(
            vec![Level::bordered("A", 20, 10)],
            Tuning::default(),
            Box::new(OfflineBackend),
            1,
            Settings::default(),
            HighScores::new(),
            progress,
        );
        assert!(session.state.achievements.is_unlocked(Achievement::FirstBlood));
    }

    #[test]
    fn test_reduced_motion_reaches_simulation() {
        let (mut session, _) = session_with(Ok(SubmitOutcome::default()));
        session.set_settings(Settings {
            reduced_motion: true,
            ..Settings::default()
        });
        assert!(session.state.reduced_motion);
        assert_eq!(session.state.max_particles, 0);
    }

    #[test]
    fn test_fps_counter_only_when_enabled() {
        let (mut session, _) = session_with(Ok(SubmitOutcome::default()));
        for _ in 0..10 {
            session.frame(1.0 / 50.0);
        }
        assert_eq!(session.render_frame().hud.fps, None);

        session.set_settings(Settings {
            show_fps: true,
            ..Settings::default()
        });
        let fps = session.render_frame().hud.fps.unwrap();
        assert!((fps - 50.0).abs() < 0.5);
    }

    #[test]
    fn test_blur_mutes_music_and_effects() {
        let (mut session, _) = session_with(Ok(SubmitOutcome::default()));
        assert!(session.music_volume() > 0.0);
        session.set_focused(false);
        assert_eq!(session.music_volume(), 0.0);
        assert_eq!(session.sfx_volume(), 0.0);
    }

    #[test]
    fn test_banner_expires() {
        let (mut session, _) = session_with(Ok(SubmitOutcome::default()));
        session.show_banner("hello".to_string());
        for _ in 0..40 {
            session.frame(0.1);
        }
        assert!(session.render_frame().hud.banner.is_none());
    }
}
