//! Terminal presentation sink for the CLI player

use crate::errors::SelectionError;
use crate::presentation::{PresentationSink, PresentationSlot};
use crate::types::dialogue::{BoundChoice, DialogueMessage};

/// Prints each shown message and keeps the current one for choice input
pub struct TerminalSink {
    slot: PresentationSlot,
    debug: bool,
}

impl TerminalSink {
    pub fn new(debug: bool) -> Self {
        Self {
            slot: PresentationSlot::new(),
            debug,
        }
    }

    /// Whether the visible message waits on a choice
    pub fn awaiting_choice(&self) -> bool {
        self.slot
            .current()
            .is_some_and(|state| state.choices.is_some())
    }

    /// Number of choices on screen
    pub fn choice_count(&self) -> usize {
        self.slot
            .current()
            .map(|state| state.choice_texts().len())
            .unwrap_or(0)
    }

    /// Pick a choice by its 1-based number as typed by the user
    pub fn select_numbered(&self, number: usize) -> Result<(), SelectionError> {
        match number.checked_sub(1) {
            Some(index) => self.slot.select(index),
            None => Err(SelectionError::OutOfRange {
                index: 0,
                max: self.choice_count().saturating_sub(1),
            }),
        }
    }
}

impl PresentationSink for TerminalSink {
    fn show(&self, message: &DialogueMessage, choices: Option<Vec<BoundChoice>>) {
        println!();
        if message.speaker_name.is_empty() {
            println!("{}", message.message);
        } else {
            println!("{}:", message.speaker_name);
            println!("{}", message.message);
        }
        if self.debug && !message.avatar.is_empty() {
            println!("[portrait: {}]", message.avatar);
        }

        if let Some(choices) = &choices {
            println!("--- Choice ---");
            for (i, choice) in choices.iter().enumerate() {
                println!("{}. {}", i + 1, choice.text);
            }
        }

        self.slot.show(message, choices);
    }

    fn hide(&self) {
        if self.debug && self.slot.is_visible() {
            println!("[hide]");
        }
        self.slot.hide();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn numbered_selection_is_one_based() {
        let sink = TerminalSink::new(false);
        let picked = Rc::new(Cell::new(None));
        let choices = ["Light it", "Leave it"]
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let picked = picked.clone();
                BoundChoice::new(*text, Rc::new(move || picked.set(Some(i))))
            })
            .collect();

        sink.show(&DialogueMessage::new("Light it?", "", "Keeper"), Some(choices));
        assert!(sink.awaiting_choice());
        assert_eq!(sink.choice_count(), 2);

        assert!(matches!(
            sink.select_numbered(0),
            Err(SelectionError::OutOfRange { max: 1, .. })
        ));
        sink.select_numbered(2).unwrap();
        assert_eq!(picked.get(), Some(1));

        sink.hide();
        assert!(!sink.awaiting_choice());
    }
}
