//! Helpers for composing branch handlers
//!
//! A branch handler is any [`Action`]. The usual shape is "hide the prompt,
//! wait a moment, play the next sequence, then hand over to whatever comes
//! after it", which [`Continuation`] builds. [`ProgressTracker`] covers the
//! common leaf of such a tree: count a solved beat and tell the caller.

use crate::errors::SequenceError;
use crate::runtime::player::{SequencePlayer, WeakSequencePlayer};
use crate::types::dialogue::Action;
use crate::types::step::SequenceStep;
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

/// Builder for a handler that starts a new run
pub struct Continuation {
    player: SequencePlayer,
    steps: Vec<SequenceStep>,
    pause: Duration,
    then: Option<Action>,
}

impl Continuation {
    /// Continue with `steps`, pausing for the player's configured choice pause
    pub fn new(player: &SequencePlayer, steps: Vec<SequenceStep>) -> Self {
        Self {
            pause: player.config().choice_pause(),
            player: player.clone(),
            steps,
            then: None,
        }
    }

    /// Wait this long after hiding the prompt before playing
    pub fn pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    /// Invoke `action` once the continued sequence completes
    pub fn then(mut self, action: Action) -> Self {
        self.then = Some(action);
        self
    }

    /// Validate the steps and produce the handler.
    ///
    /// The handler holds the player weakly, so storing it in the sink does
    /// not keep the player alive.
    pub fn build(self) -> Result<Action, SequenceError> {
        self.player.validate(&self.steps)?;

        let player = self.player.downgrade();
        let steps = self.steps;
        let pause = self.pause;
        let then = self.then;
        Ok(Rc::new(move || {
            let Some(handle) = player.upgrade() else {
                return;
            };
            handle.hide();
            if pause.is_zero() {
                play(&handle, steps.clone(), then.clone());
            } else {
                let steps = steps.clone();
                let then = then.clone();
                handle.after(pause, move |handle| play(handle, steps, then));
            }
        }))
    }
}

fn play(player: &SequencePlayer, steps: Vec<SequenceStep>, then: Option<Action>) {
    if let Err(error) = player.play_sequence(steps, then) {
        log::error!("[Branch] Continuation could not start: {}", error);
    }
}

/// Handler that hides the prompt and does nothing else
pub fn dismiss(player: &SequencePlayer) -> Action {
    let player: WeakSequencePlayer = player.downgrade();
    Rc::new(move || {
        if let Some(player) = player.upgrade() {
            player.hide();
        }
    })
}

/// Run `actions` one after another
pub fn chain(actions: Vec<Action>) -> Action {
    Rc::new(move || {
        for action in &actions {
            action();
        }
    })
}

/// Shared counter of solved beats
#[derive(Clone)]
pub struct ProgressTracker {
    inner: Rc<ProgressInner>,
}

struct ProgressInner {
    solved: Cell<u32>,
    total: u32,
    on_progress: Box<dyn Fn(u32, u32)>,
}

impl ProgressTracker {
    /// `on_progress` receives `(solved, total)` after every increment
    pub fn new(total: u32, on_progress: impl Fn(u32, u32) + 'static) -> Self {
        Self {
            inner: Rc::new(ProgressInner {
                solved: Cell::new(0),
                total,
                on_progress: Box::new(on_progress),
            }),
        }
    }

    /// Count one more solved beat and notify. Saturates at the total.
    pub fn advance(&self) -> u32 {
        let inner = &self.inner;
        let solved = inner.solved.get();
        if solved >= inner.total {
            log::warn!("[Progress] Already at {}/{}, ignoring", solved, inner.total);
            return solved;
        }

        let solved = solved + 1;
        inner.solved.set(solved);
        log::info!("[Progress] {}/{}", solved, inner.total);
        (inner.on_progress)(solved, inner.total);
        solved
    }

    /// [`advance`](Self::advance) as a handler
    pub fn advance_action(&self) -> Action {
        let tracker = self.clone();
        Rc::new(move || {
            tracker.advance();
        })
    }

    pub fn solved(&self) -> u32 {
        self.inner.solved.get()
    }

    pub fn total(&self) -> u32 {
        self.inner.total
    }

    pub fn is_complete(&self) -> bool {
        self.solved() >= self.total()
    }
}
