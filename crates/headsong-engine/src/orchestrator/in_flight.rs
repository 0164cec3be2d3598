//! Marker for an outstanding stage call

use std::sync::Mutex;

use headsong_utils::types::Stage;
use serde_json::Value;
use tracing::warn;

use super::lock_state;
use super::state::{PipelineState, SongArtifact};

/// Held for the duration of one stage call.
///
/// If the call's future is dropped before it finishes, the guard puts the
/// pipeline back on the stage it was in before the attempt and reinstates
/// anything the attempt cleared up front.
pub(crate) struct InFlight<'a> {
    state: &'a Mutex<PipelineState>,
    stage: Stage,
    previous: Stage,
    saved_song: Option<Option<SongArtifact>>,
    saved_partial: Option<Value>,
    armed: bool,
}

impl<'a> InFlight<'a> {
    pub(crate) fn new(
        state: &'a Mutex<PipelineState>,
        stage: Stage,
        previous: Stage,
        saved_partial: Option<Value>,
    ) -> Self {
        Self {
            state,
            stage,
            previous,
            saved_song: None,
            saved_partial,
            armed: true,
        }
    }

    /// Song artifact to put back on cancellation
    pub(crate) fn with_saved_song(mut self, song: Option<SongArtifact>) -> Self {
        self.saved_song = Some(song);
        self
    }

    /// The call resolved; returns the pre-attempt stage.
    pub(crate) fn finish(mut self) -> Stage {
        self.armed = false;
        self.previous
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        let mut state = lock_state(self.state);
        if state.stage == self.stage {
            state.stage = self.previous;
            if let Some(song) = self.saved_song.take() {
                state.song = song;
            }
            state.partial_response = self.saved_partial.take();
        }
        warn!(
            stage = %self.stage,
            restored = %self.previous,
            "Stage call cancelled before completion"
        );
    }
}
