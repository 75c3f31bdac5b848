//! Corpus loading and cleanup
//!
//! Ingests plain-text books, normalizes whitespace and rewrites
//! play-specific speaker markup so it can be stripped without harming
//! prose content.
//!
//! Cleanup is a two-pass affair: speaker cues are tagged while the line
//! structure is still intact (`markup::tag_speaker_cues`), whitespace is
//! collapsed, and the tags are stripped later
//! (`CorpusStore::remove_speaker_markup`). Collapsing first would destroy
//! the newline adjacency the cue detection needs.

pub mod markup;
pub mod store;


pub use store::{Book, CorpusStore};
