//! # kataribe
//!
//! A timed dialogue sequence player. Dialogue content lives in a keyed
//! catalog; a [`SequencePlayer`] shows it step by step on a
//! [`PresentationSink`], pacing plain lines with timers and halting on
//! lines that offer choices until the user picks one.
//!
//! ## Quick Start
//!
//! ```rust
//! use kataribe::{DialogueCatalog, PresentationSlot, SequencePlayer, SequenceStep, TimerQueue};
//! use std::rc::Rc;
//! use std::time::Duration;
//!
//! let catalog = DialogueCatalog::new()
//!     .with_line("hello", "Keeper", "keeper.png", "Evening.")
//!     .with_line("storm", "Keeper", "keeper.png", "A storm is coming.");
//! let sink = Rc::new(PresentationSlot::new());
//! let timers = Rc::new(TimerQueue::new());
//! let player = SequencePlayer::new(Rc::new(catalog), sink.clone(), timers.clone());
//!
//! player
//!     .play_sequence(vec!["hello".into(), "storm".into()], None)
//!     .unwrap();
//! assert_eq!(sink.current().unwrap().message, "Evening.");
//!
//! timers.advance(Duration::from_secs(5));
//! assert_eq!(sink.current().unwrap().message, "A storm is coming.");
//! ```
//!
//! Branching is built from [`Continuation`]s, which turn a follow-up
//! sequence into a choice action, or authored as data with a
//! [`SceneGraph`] played by a [`SceneWalker`].

pub mod branch;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod errors;
pub mod graph;
pub mod presentation;
pub mod runtime;
pub mod storage;
pub mod types;

pub use branch::{Continuation, ProgressTracker, chain, dismiss};
pub use catalog::DialogueCatalog;
pub use config::PlayerConfig;
pub use errors::{CatalogError, SceneError, SelectionError, SequenceError};
pub use graph::{
    EffectRegistry, Edge, Next, SceneGraph, SceneNode, SceneWalker, check as check_scene,
};
pub use presentation::{PresentationSink, PresentationSlot, PresentationState};
pub use runtime::{PlayerStatus, RunId, Scheduler, SequencePlayer, TimerQueue};
pub use storage::{SceneDocument, SceneRepository};
pub use types::{
    Action, BoundChoice, Choice, ChoiceActions, DialogueContent, DialogueMessage, SequenceStep,
};
