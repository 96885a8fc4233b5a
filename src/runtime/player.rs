//! Sequence player: plays steps through a presentation sink with timed pacing

use crate::catalog::DialogueCatalog;
use crate::config::PlayerConfig;
use crate::errors::SequenceError;
use crate::presentation::PresentationSink;
use crate::runtime::timer::Scheduler;
use crate::types::dialogue::{Action, BoundChoice, Choice, DialogueContent};
use crate::types::step::{ChoiceActions, SequenceStep};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

/// Identifies one run. Every new run gets a larger id than the last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RunId(u64);

impl RunId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where the current run stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerStatus {
    /// Nothing has been played, or the last run was stopped
    Idle,
    /// Showing `step` or pacing towards it
    Playing { step: usize },
    /// Halted on `step` until the user picks a choice
    AwaitingChoice { step: usize },
    /// The run reached its end, or a choice was picked
    Completed,
}

/// Plays sequences of catalog steps.
///
/// Only one run is live at a time: starting a run supersedes the previous
/// one, and any timer or choice left over from a superseded run is discarded
/// when it fires. Cloning gives another handle to the same player.
#[derive(Clone)]
pub struct SequencePlayer {
    inner: Rc<PlayerInner>,
}

/// Non-owning handle to a [`SequencePlayer`]
#[derive(Clone)]
pub struct WeakSequencePlayer {
    inner: Weak<PlayerInner>,
}

impl WeakSequencePlayer {
    pub fn upgrade(&self) -> Option<SequencePlayer> {
        self.inner.upgrade().map(|inner| SequencePlayer { inner })
    }
}

struct PlayerInner {
    catalog: Rc<DialogueCatalog>,
    sink: Rc<dyn PresentationSink>,
    scheduler: Rc<dyn Scheduler>,
    config: PlayerConfig,
    generation: Cell<u64>,
    status: Cell<PlayerStatus>,
}

struct Run {
    id: RunId,
    steps: Vec<ResolvedStep>,
    on_complete: Option<Action>,
}

struct ResolvedStep {
    content: DialogueContent,
    delay: Duration,
    choice_actions: ChoiceActions,
}

impl SequencePlayer {
    pub fn new(
        catalog: Rc<DialogueCatalog>,
        sink: Rc<dyn PresentationSink>,
        scheduler: Rc<dyn Scheduler>,
    ) -> Self {
        Self::with_config(catalog, sink, scheduler, PlayerConfig::default())
    }

    pub fn with_config(
        catalog: Rc<DialogueCatalog>,
        sink: Rc<dyn PresentationSink>,
        scheduler: Rc<dyn Scheduler>,
        config: PlayerConfig,
    ) -> Self {
        Self {
            inner: Rc::new(PlayerInner {
                catalog,
                sink,
                scheduler,
                config,
                generation: Cell::new(0),
                status: Cell::new(PlayerStatus::Idle),
            }),
        }
    }

    /// A handle that does not keep the player alive, for closures the sink stores
    pub fn downgrade(&self) -> WeakSequencePlayer {
        WeakSequencePlayer {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn catalog(&self) -> &DialogueCatalog {
        &self.inner.catalog
    }

    pub fn config(&self) -> PlayerConfig {
        self.inner.config
    }

    pub fn status(&self) -> PlayerStatus {
        self.inner.status.get()
    }

    /// Id of the most recently started run
    pub fn current_run(&self) -> RunId {
        RunId(self.inner.generation.get())
    }

    pub fn is_current(&self, run: RunId) -> bool {
        self.inner.is_current(run)
    }

    /// Hide whatever the sink shows without touching the current run
    pub fn hide(&self) {
        self.inner.sink.hide();
    }

    /// Check that every step's key exists in the catalog
    pub fn validate(&self, steps: &[SequenceStep]) -> Result<(), SequenceError> {
        for step in steps {
            self.inner.catalog.get(&step.key)?;
        }
        Ok(())
    }

    /// Play `steps` in order.
    ///
    /// Plain steps stay up for their delay, then the sink is hidden and the
    /// next step is shown after the inter-message gap. A step with choices
    /// halts the run until one of them is picked; `on_complete` only fires
    /// when the run runs out of steps without halting.
    ///
    /// Every key is resolved before anything is shown. On a missing key the
    /// sink is hidden, the previous run is superseded, and the error is
    /// returned.
    pub fn play_sequence(
        &self,
        steps: Vec<SequenceStep>,
        on_complete: Option<Action>,
    ) -> Result<RunId, SequenceError> {
        let resolved = match self.resolve_steps(steps) {
            Ok(resolved) => resolved,
            Err(error) => {
                log::error!("[Run] Refusing to start sequence: {}", error);
                self.stop();
                return Err(error);
            }
        };
        Ok(PlayerInner::start(&self.inner, resolved, on_complete))
    }

    /// Show one piece of content directly, bypassing the catalog
    pub fn play_single(
        &self,
        content: DialogueContent,
        choice_actions: impl Into<ChoiceActions>,
    ) -> RunId {
        let step = ResolvedStep {
            content,
            delay: self.inner.config.default_step_delay(),
            choice_actions: choice_actions.into(),
        };
        PlayerInner::start(&self.inner, vec![step], None)
    }

    /// Supersede the current run without starting another, and hide the sink
    pub fn stop(&self) {
        let id = self.inner.next_generation();
        log::debug!("[Run] Stopped; run {} holds no steps", id);
        self.inner.status.set(PlayerStatus::Idle);
        self.inner.sink.hide();
    }

    /// Run `task` after `delay`, unless another run has started by then
    pub fn after(&self, delay: Duration, task: impl FnOnce(&SequencePlayer) + 'static) {
        let run = self.current_run();
        let weak = Rc::downgrade(&self.inner);
        self.inner.scheduler.schedule(
            delay,
            Box::new(move || {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                if !inner.is_current(run) {
                    log::trace!("[Timer] Dropping deferred task from superseded run {}", run);
                    return;
                }
                task(&SequencePlayer { inner });
            }),
        );
    }

    fn resolve_steps(&self, steps: Vec<SequenceStep>) -> Result<Vec<ResolvedStep>, SequenceError> {
        let default_delay = self.inner.config.default_step_delay();
        steps
            .into_iter()
            .map(|step| -> Result<ResolvedStep, SequenceError> {
                let content = self.inner.catalog.get(&step.key)?.clone();
                Ok(ResolvedStep {
                    content,
                    delay: step.delay.unwrap_or(default_delay),
                    choice_actions: step.choice_actions,
                })
            })
            .collect()
    }
}

impl PlayerInner {
    fn is_current(&self, run: RunId) -> bool {
        self.generation.get() == run.0
    }

    fn next_generation(&self) -> RunId {
        let next = self.generation.get() + 1;
        self.generation.set(next);
        RunId(next)
    }

    fn start(this: &Rc<Self>, steps: Vec<ResolvedStep>, on_complete: Option<Action>) -> RunId {
        let previous = this.status.get();
        let id = this.next_generation();
        if matches!(
            previous,
            PlayerStatus::Playing { .. } | PlayerStatus::AwaitingChoice { .. }
        ) {
            log::debug!("[Run] Run {} supersedes a run still {:?}", id, previous);
        }
        log::info!("[Run] Starting run {} with {} step(s)", id, steps.len());

        let run = Rc::new(Run {
            id,
            steps,
            on_complete,
        });

        if run.steps.is_empty() {
            // Nothing replaces the previous message, so take it down
            this.sink.hide();
            this.complete(&run);
        } else {
            this.status.set(PlayerStatus::Playing { step: 0 });
            Self::show_step(this, &run, 0);
        }
        id
    }

    fn show_step(this: &Rc<Self>, run: &Rc<Run>, index: usize) {
        let Some(step) = run.steps.get(index) else {
            return;
        };

        match &step.content {
            DialogueContent::WithChoices(message, choices) => {
                let bound = Self::bind_choices(this, run, choices, &step.choice_actions);
                this.status.set(PlayerStatus::AwaitingChoice { step: index });
                log::debug!(
                    "[Run] Run {} step {} shows '{}' and waits on {} choice(s)",
                    run.id,
                    index,
                    message.speaker_name,
                    bound.len()
                );
                this.sink.show(message, Some(bound));
            }
            DialogueContent::Plain(message) => {
                this.status.set(PlayerStatus::Playing { step: index });
                log::debug!(
                    "[Run] Run {} step {} shows '{}'",
                    run.id,
                    index,
                    message.speaker_name
                );
                this.sink.show(message, None);

                if index + 1 == run.steps.len() {
                    this.complete(run);
                    return;
                }

                let weak = Rc::downgrade(this);
                let run = run.clone();
                this.scheduler.schedule(
                    step.delay,
                    Box::new(move || {
                        if let Some(inner) = weak.upgrade() {
                            Self::advance(&inner, &run, index + 1);
                        }
                    }),
                );
            }
        }
    }

    /// Hide the previous line, then show step `index` after the gap
    fn advance(this: &Rc<Self>, run: &Rc<Run>, index: usize) {
        if !this.is_current(run.id) {
            log::trace!("[Timer] Discarding step timer of superseded run {}", run.id);
            return;
        }
        this.sink.hide();
        this.status.set(PlayerStatus::Playing { step: index });

        let weak = Rc::downgrade(this);
        let run = run.clone();
        this.scheduler.schedule(
            this.config.inter_message_gap(),
            Box::new(move || {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                if inner.is_current(run.id) {
                    Self::show_step(&inner, &run, index);
                } else {
                    log::trace!("[Timer] Discarding gap timer of superseded run {}", run.id);
                }
            }),
        );
    }

    fn complete(&self, run: &Run) {
        self.status.set(PlayerStatus::Completed);
        log::info!("[Run] Run {} completed", run.id);
        if let Some(on_complete) = run.on_complete.clone() {
            on_complete();
        }
    }

    /// Bind actions to choices, each guarded so it fires at most once and only
    /// while its run is waiting on it
    fn bind_choices(
        this: &Rc<Self>,
        run: &Run,
        choices: &[Choice],
        actions: &ChoiceActions,
    ) -> Vec<BoundChoice> {
        actions
            .bind(choices)
            .into_iter()
            .enumerate()
            .map(|(index, choice)| {
                let weak: Weak<Self> = Rc::downgrade(this);
                let run_id = run.id;
                let action = choice.action;
                let guarded: Action = Rc::new(move || {
                    let Some(inner) = weak.upgrade() else {
                        return;
                    };
                    if !inner.take_choice(run_id) {
                        log::debug!(
                            "[Choice] Ignoring choice {} of run {}: no longer awaited",
                            index,
                            run_id
                        );
                        return;
                    }
                    log::debug!("[Choice] Run {} resumes through choice {}", run_id, index);
                    action();
                });
                BoundChoice::new(choice.text, guarded)
            })
            .collect()
    }

    fn take_choice(&self, run: RunId) -> bool {
        if self.is_current(run) && matches!(self.status.get(), PlayerStatus::AwaitingChoice { .. })
        {
            self.status.set(PlayerStatus::Completed);
            true
        } else {
            false
        }
    }
}

impl fmt::Debug for SequencePlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequencePlayer")
            .field("run", &self.current_run())
            .field("status", &self.status())
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}
