//! Pipeline engine for headsong
//!
//! The [`Orchestrator`] owns the workflow state and sequences the three
//! adapters: headlines, then lyrics from a selection, then a song from the
//! lyrics. The presentation layer only reads snapshots and triggers
//! transitions.

pub mod orchestrator;

pub use orchestrator::{
    ErrorView, HeadlineView, Orchestrator, PipelineSettings, PipelineSnapshot, PipelineState,
    SongArtifact, SongOutcome, build_lyrics_prompt,
};
