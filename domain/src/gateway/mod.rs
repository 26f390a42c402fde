//! HTTP clients for the external services the meeting notes workflows depend on.

pub mod assembly_ai;
pub mod openai;
