//! Core types for the kataribe library
//!
//! - Dialogue: catalog content, choices and the actions bound to them
//! - Step: one entry of a sequence and how its choices are wired

pub mod dialogue;
pub mod step;

pub use dialogue::{Action, BoundChoice, Choice, DialogueContent, DialogueMessage, noop};
pub use step::{ChoiceActions, SequenceStep};
