//! This module re-exports the entity types from the `entity_api` crate.
//!
//! The purpose of this re-export is to ensure that consumers of the `domain` crate do not need to
//! directly depend on the `entity_api` or `entity` crates.
pub use entity_api::{audio_files, transcription_status, Id};

pub mod audio_file;
pub mod error;
pub mod media;
pub mod media_store;
pub mod pattern;

pub mod gateway;
