//! Runtime: the sequence player and the timers that pace it
//!
//! Playback is single-threaded and cooperative. A run never blocks; every
//! wait is a task on a [`Scheduler`], and a wait for a choice is simply the
//! absence of a task until the user fires a bound choice.

pub mod player;
pub mod timer;


pub use player::{PlayerStatus, RunId, SequencePlayer, WeakSequencePlayer};
pub use timer::{Scheduler, Task, TimerQueue};
