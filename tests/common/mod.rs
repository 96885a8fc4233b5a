//! Shared fixtures for integration tests

#![allow(dead_code)]

use kataribe::{
    Action, BoundChoice, DialogueCatalog, DialogueMessage, PlayerConfig, PresentationSink,
    PresentationSlot, SequencePlayer, TimerQueue,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

/// One command received by a [`RecordingSink`]
#[derive(Debug, Clone, PartialEq)]
pub enum SinkCall {
    Show {
        message: String,
        choices: Option<Vec<String>>,
    },
    Hide,
}

/// Sink that records every command and keeps a real slot for selections
#[derive(Default)]
pub struct RecordingSink {
    pub calls: RefCell<Vec<SinkCall>>,
    pub slot: PresentationSlot,
}

impl RecordingSink {
    /// Messages shown so far, in order
    pub fn shows(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                SinkCall::Show { message, .. } => Some(message.clone()),
                SinkCall::Hide => None,
            })
            .collect()
    }

    pub fn hides(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| matches!(call, SinkCall::Hide))
            .count()
    }

    pub fn last_call(&self) -> Option<SinkCall> {
        self.calls.borrow().last().cloned()
    }

    /// Message currently visible, if any
    pub fn visible(&self) -> Option<String> {
        self.slot.current().map(|state| state.message)
    }

    pub fn select(&self, index: usize) {
        self.slot.select(index).unwrap();
    }
}

impl PresentationSink for RecordingSink {
    fn show(&self, message: &DialogueMessage, choices: Option<Vec<BoundChoice>>) {
        self.calls.borrow_mut().push(SinkCall::Show {
            message: message.message.clone(),
            choices: choices
                .as_ref()
                .map(|choices| choices.iter().map(|choice| choice.text.clone()).collect()),
        });
        self.slot.show(message, choices);
    }

    fn hide(&self) {
        self.calls.borrow_mut().push(SinkCall::Hide);
        self.slot.hide();
    }
}

/// A player wired to a recording sink and a virtual clock
pub struct Harness {
    pub queue: Rc<TimerQueue>,
    pub sink: Rc<RecordingSink>,
    pub player: SequencePlayer,
}

impl Harness {
    pub fn new(catalog: DialogueCatalog, config: PlayerConfig) -> Self {
        let queue = Rc::new(TimerQueue::new());
        let sink = Rc::new(RecordingSink::default());
        let player =
            SequencePlayer::with_config(Rc::new(catalog), sink.clone(), queue.clone(), config);
        Self {
            queue,
            sink,
            player,
        }
    }

    pub fn advance_ms(&self, millis: u64) {
        self.queue.advance(Duration::from_millis(millis));
    }
}

/// Lighthouse keeper lines used across tests
pub fn lighthouse_catalog() -> DialogueCatalog {
    DialogueCatalog::new()
        .with_line("greet", "Keeper", "keeper.png", "Evening, traveller.")
        .with_line("storm", "Keeper", "keeper.png", "A storm is coming in.")
        .with_line("lamp_lit", "Keeper", "keeper.png", "The lamp burns bright.")
        .with_line("lamp_dark", "Keeper", "keeper.png", "Then we wait in the dark.")
        .with_line("bye", "Keeper", "keeper.png", "Safe travels.")
        .with_question(
            "ask_lamp",
            "Keeper",
            "keeper.png",
            "Will you light the lamp?",
            &["Light it", "Leave it"],
        )
}

/// A counting action and the counter it bumps
pub fn counter() -> (Rc<Cell<u32>>, Action) {
    let count = Rc::new(Cell::new(0));
    let c = count.clone();
    (count, Rc::new(move || c.set(c.get() + 1)))
}

/// An action that appends `label` to a shared log
pub fn recorder(log: &Rc<RefCell<Vec<String>>>, label: &str) -> Action {
    let log = log.clone();
    let label = label.to_string();
    Rc::new(move || log.borrow_mut().push(label.clone()))
}
