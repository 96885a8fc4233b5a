//! Presentation sink contract and a single-slot implementation
//!
//! The player never owns what is on screen. It only commands a sink, which
//! holds at most one visible message at a time.

use crate::errors::SelectionError;
use crate::types::dialogue::{BoundChoice, DialogueMessage};
use std::cell::RefCell;

/// Display surface for the current dialogue message
pub trait PresentationSink {
    /// Replace whatever is shown with `message`, optionally with choices
    fn show(&self, message: &DialogueMessage, choices: Option<Vec<BoundChoice>>);

    /// Clear the slot. Calling it with nothing shown is a no-op.
    fn hide(&self);
}

/// What a single-slot sink currently displays
#[derive(Debug, Clone)]
pub struct PresentationState {
    pub message: String,
    pub avatar: String,
    pub speaker_name: String,
    pub choices: Option<Vec<BoundChoice>>,
}

impl PresentationState {
    fn new(message: &DialogueMessage, choices: Option<Vec<BoundChoice>>) -> Self {
        Self {
            message: message.message.clone(),
            avatar: message.avatar.clone(),
            speaker_name: message.speaker_name.clone(),
            choices,
        }
    }

    /// Choice texts in display order
    pub fn choice_texts(&self) -> Vec<&str> {
        self.choices
            .iter()
            .flatten()
            .map(|choice| choice.text.as_str())
            .collect()
    }
}

/// Last-write-wins slot holding the visible dialogue
#[derive(Debug, Default)]
pub struct PresentationSlot {
    current: RefCell<Option<PresentationState>>,
}

impl PresentationSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the visible dialogue
    pub fn current(&self) -> Option<PresentationState> {
        self.current.borrow().clone()
    }

    pub fn is_visible(&self) -> bool {
        self.current.borrow().is_some()
    }

    /// Select the choice at `index` of the visible dialogue.
    ///
    /// The action runs after the slot borrow is released, so it may show or
    /// hide dialogue itself.
    pub fn select(&self, index: usize) -> Result<(), SelectionError> {
        let choice = {
            let current = self.current.borrow();
            let state = current.as_ref().ok_or(SelectionError::NothingShown)?;
            let choices = state.choices.as_ref().ok_or(SelectionError::NoChoices)?;
            choices
                .get(index)
                .cloned()
                .ok_or(SelectionError::OutOfRange {
                    index,
                    max: choices.len().saturating_sub(1),
                })?
        };

        log::debug!("[Choice] Selected {} '{}'", index, choice.text);
        choice.select();
        Ok(())
    }
}

impl PresentationSink for PresentationSlot {
    fn show(&self, message: &DialogueMessage, choices: Option<Vec<BoundChoice>>) {
        *self.current.borrow_mut() = Some(PresentationState::new(message, choices));
    }

    fn hide(&self) {
        self.current.borrow_mut().take();
    }
}
