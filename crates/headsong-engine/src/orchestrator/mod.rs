//! Stateful pipeline orchestrator
//!
//! Sequences headline fetch, lyric generation and song generation over a
//! single [`PipelineState`]. Stage calls take `&self` and are mutually
//! exclusive: while one is outstanding, every other stage call and every
//! selection change is rejected with `OperationInProgress` before any
//! precondition check or network traffic.
//!
//! The state lock is never held across an `.await`.

mod in_flight;
mod prompt;
mod state;


pub use self::prompt::build_lyrics_prompt;
pub use self::state::{
    ErrorView, HeadlineView, PipelineSnapshot, PipelineState, SongArtifact, SongOutcome,
};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use headsong_adapters::{
    Adapters, AudioGenerator, AudioRequest, AudioResponse, HeadlineProvider, HeadlineRequest,
    TextGenerator, TextRequest,
};
use headsong_config::Config;
use headsong_utils::error::{ConfigError, InvalidInput, PipelineError};
use headsong_utils::logging::{
    log_stage_complete, log_stage_error, log_stage_rejected, log_stage_start, stage_span,
};
use headsong_utils::types::Stage;
use tracing::{Instrument, debug, warn};

use self::in_flight::InFlight;

/// Per-session parameters passed to the adapters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    pub region: String,
    pub max_headlines: u32,
    pub lyrics_max_tokens: u32,
}

impl PipelineSettings {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            region: config.news.region.clone(),
            max_headlines: config.news.max_headlines,
            lyrics_max_tokens: config.lyrics.max_tokens,
        }
    }
}

pub(crate) fn lock_state(state: &Mutex<PipelineState>) -> MutexGuard<'_, PipelineState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Drives one headline-to-song workflow.
pub struct Orchestrator {
    headlines: Arc<dyn HeadlineProvider>,
    lyrics: Arc<dyn TextGenerator>,
    song: Arc<dyn AudioGenerator>,
    settings: PipelineSettings,
    state: Mutex<PipelineState>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("settings", &self.settings)
            .field("stage", &self.stage())
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    pub fn new(
        headlines: Arc<dyn HeadlineProvider>,
        lyrics: Arc<dyn TextGenerator>,
        song: Arc<dyn AudioGenerator>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            headlines,
            lyrics,
            song,
            settings,
            state: Mutex::new(PipelineState::default()),
        }
    }

    pub fn from_adapters(adapters: Adapters, settings: PipelineSettings) -> Self {
        Self::new(adapters.headlines, adapters.lyrics, adapters.song, settings)
    }

    /// Build the production adapters and an empty pipeline from configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the shared HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let adapters = Adapters::from_config(config)?;
        Ok(Self::from_adapters(
            adapters,
            PipelineSettings::from_config(config),
        ))
    }

    #[must_use]
    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    fn lock(&self) -> MutexGuard<'_, PipelineState> {
        lock_state(&self.state)
    }

    /// Current stage, including in-flight and `Error`
    #[must_use]
    pub fn stage(&self) -> Stage {
        self.lock().stage()
    }

    /// Stage the pipeline returns to: the pre-failure stage while in `Error`
    #[must_use]
    pub fn settled_stage(&self) -> Stage {
        self.lock().settled_stage()
    }

    #[must_use]
    pub fn snapshot(&self) -> PipelineSnapshot {
        self.lock().snapshot()
    }

    #[must_use]
    pub fn status_line(&self) -> String {
        self.lock().status_line()
    }

    #[must_use]
    pub fn headlines(&self) -> Vec<String> {
        self.lock().headlines().to_vec()
    }

    #[must_use]
    pub fn lyrics(&self) -> Option<String> {
        self.lock().lyrics().map(str::to_string)
    }

    #[must_use]
    pub fn song(&self) -> Option<SongArtifact> {
        self.lock().song().cloned()
    }

    /// Claim the pipeline for `stage`.
    ///
    /// Rejects with `OperationInProgress` if a stage call is outstanding,
    /// then runs `prepare` for preconditions and inputs. Both checks happen
    /// under one lock acquisition and leave the state untouched on failure.
    fn begin<T>(
        &self,
        stage: Stage,
        prepare: impl FnOnce(&mut PipelineState) -> Result<T, PipelineError>,
    ) -> Result<(InFlight<'_>, T), PipelineError> {
        let mut state = self.lock();

        if state.stage.is_in_flight() {
            let err = PipelineError::OperationInProgress { stage: state.stage };
            log_stage_rejected(stage, &err.to_string());
            return Err(err);
        }

        let prepared = match prepare(&mut *state) {
            Ok(prepared) => prepared,
            Err(err) => {
                log_stage_rejected(stage, &err.to_string());
                return Err(err);
            }
        };

        let previous = state.stage;
        state.stage = stage;
        let saved_partial = state.partial_response.take();
        drop(state);

        log_stage_start(stage);
        Ok((
            InFlight::new(&self.state, stage, previous, saved_partial),
            prepared,
        ))
    }

    /// Record a failed stage, keeping every artifact already produced.
    fn fail(
        state: &mut PipelineState,
        stage: Stage,
        previous: Stage,
        err: PipelineError,
        started: Instant,
    ) -> PipelineError {
        if previous != Stage::Error {
            state.resume_stage = previous;
        }
        state.stage = Stage::Error;
        state.last_error = Some(err.clone());
        log_stage_error(stage, &err.to_string(), started.elapsed().as_millis());
        err
    }

    /// Fetch headlines and reset the downstream state.
    ///
    /// An empty list is a success. On failure the previous headlines,
    /// selection and artifacts are preserved.
    pub async fn fetch_headlines(&self) -> Result<Vec<String>, PipelineError> {
        const STAGE: Stage = Stage::FetchingHeadlines;
        let (guard, ()) = self.begin(STAGE, |_| Ok(()))?;
        let started = Instant::now();

        let request = HeadlineRequest {
            max_count: self.settings.max_headlines,
            region: self.settings.region.clone(),
        };
        let result = self
            .headlines
            .fetch_headlines(request)
            .instrument(stage_span(STAGE))
            .await;

        let previous = guard.finish();
        let mut state = self.lock();
        match result {
            Ok(headlines) => {
                state.headlines = headlines.clone();
                state.selection.clear();
                state.lyrics = None;
                state.song = None;
                state.last_error = None;
                state.stage = Stage::HeadlinesReady;
                log_stage_complete(
                    STAGE,
                    Stage::HeadlinesReady,
                    started.elapsed().as_millis(),
                );
                Ok(headlines)
            }
            Err(e) => Err(Self::fail(
                &mut state,
                STAGE,
                previous,
                PipelineError::HeadlinesFetchFailed(e),
                started,
            )),
        }
    }

    /// Flip membership of `index` in the selection; returns the new membership.
    pub fn toggle_selection(&self, index: usize) -> Result<bool, PipelineError> {
        let mut state = self.lock();
        if state.stage.is_in_flight() {
            return Err(PipelineError::OperationInProgress { stage: state.stage });
        }
        let selected = state.toggle(index)?;
        debug!(index, selected, "Selection toggled");
        Ok(selected)
    }

    /// Generate lyrics from the selected headlines, in index order.
    pub async fn generate_lyrics(&self) -> Result<String, PipelineError> {
        const STAGE: Stage = Stage::GeneratingLyrics;
        let (guard, prompt) = self.begin(STAGE, |state| {
            if state.selection.is_empty() {
                return Err(InvalidInput::EmptySelection.into());
            }
            Ok(build_lyrics_prompt(&state.selected_headlines()))
        })?;
        let started = Instant::now();

        let request = TextRequest {
            prompt,
            max_tokens: self.settings.lyrics_max_tokens,
        };
        let result = self
            .lyrics
            .generate_text(request)
            .instrument(stage_span(STAGE))
            .await;

        let previous = guard.finish();
        let mut state = self.lock();
        match result {
            Ok(text) => {
                state.lyrics = Some(text.clone());
                state.song = None;
                state.last_error = None;
                state.stage = Stage::LyricsReady;
                log_stage_complete(STAGE, Stage::LyricsReady, started.elapsed().as_millis());
                Ok(text)
            }
            Err(e) => Err(Self::fail(
                &mut state,
                STAGE,
                previous,
                PipelineError::LyricsGenerationFailed(e),
                started,
            )),
        }
    }

    /// Submit the current lyrics to the song service.
    ///
    /// A success payload with neither URL nor task id is returned as
    /// [`SongOutcome::Partial`]; it stores nothing and leaves the pipeline
    /// at `LyricsReady`.
    pub async fn generate_song(&self) -> Result<SongOutcome, PipelineError> {
        const STAGE: Stage = Stage::GeneratingSong;
        let (guard, (lyrics, previous_song)) = self.begin(STAGE, |state| {
            let lyrics = state
                .lyrics
                .as_deref()
                .filter(|lyrics| !lyrics.trim().is_empty())
                .ok_or(InvalidInput::NoLyrics)?
                .to_string();
            Ok((lyrics, state.song.take()))
        })?;
        let guard = guard.with_saved_song(previous_song);
        let started = Instant::now();

        let result = self
            .song
            .generate_audio(AudioRequest { lyrics })
            .instrument(stage_span(STAGE))
            .await;

        let previous = guard.finish();
        let mut state = self.lock();
        let outcome = match result {
            Ok(AudioResponse::Ready { url }) => {
                state.song = Some(SongArtifact::Url(url.clone()));
                state.stage = Stage::SongReady;
                SongOutcome::Ready(url)
            }
            Ok(AudioResponse::Pending { payload }) => {
                state.song = Some(SongArtifact::Pending(payload.clone()));
                state.stage = Stage::SongReady;
                SongOutcome::Pending(payload)
            }
            Ok(AudioResponse::Unrecognized { payload }) => {
                warn!(
                    stage = %STAGE,
                    "Song service returned neither an audio URL nor a task id"
                );
                state.partial_response = Some(payload.clone());
                state.stage = Stage::LyricsReady;
                SongOutcome::Partial { raw: payload }
            }
            Err(e) => {
                return Err(Self::fail(
                    &mut state,
                    STAGE,
                    previous,
                    PipelineError::SongGenerationFailed(e),
                    started,
                ));
            }
        };

        state.last_error = None;
        log_stage_complete(STAGE, state.stage, started.elapsed().as_millis());
        Ok(outcome)
    }
}
