//! Scene graphs: branching dialogue authored as data
//!
//! A scene is a set of nodes. Each node is a list of steps plus edges: one
//! per choice index, and one taken when the node's steps run out. Edges fire
//! named effects (author side effects registered at walk time) and then
//! either move to another node or finish the scene. [`SceneWalker`] plays a
//! graph on a [`SequencePlayer`].

use crate::errors::SceneError;
use crate::runtime::player::{RunId, SequencePlayer, WeakSequencePlayer};
use crate::types::dialogue::Action;
use crate::types::step::{ChoiceActions, SequenceStep};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

pub mod check;

pub use check::{CheckResult, IssueLevel, SceneIssue, check};

/// The continuation graph of a scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneGraph {
    /// Node the walk starts from
    pub root: String,
    pub nodes: HashMap<String, SceneNode>,
}

impl SceneGraph {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            nodes: HashMap::new(),
        }
    }

    pub fn with_node(mut self, id: impl Into<String>, node: SceneNode) -> Self {
        self.nodes.insert(id.into(), node);
        self
    }

    pub fn node(&self, id: &str) -> Result<&SceneNode, SceneError> {
        self.nodes
            .get(id)
            .ok_or_else(|| SceneError::unknown_node(id))
    }

    /// Node ids, sorted
    pub fn node_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.nodes.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

/// One node: steps to play, then where to go
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneNode {
    pub steps: Vec<NodeStep>,
    /// Edge per choice index of the node's choice step
    pub choices: Vec<Edge>,
    /// Edge taken when the steps run out without halting on a choice
    pub next: Edge,
}

impl SceneNode {
    pub fn new(steps: Vec<NodeStep>) -> Self {
        Self {
            steps,
            ..Self::default()
        }
    }

    pub fn with_choices(mut self, choices: Vec<Edge>) -> Self {
        self.choices = choices;
        self
    }

    pub fn with_next(mut self, next: Edge) -> Self {
        self.next = next;
        self
    }
}

/// A step inside a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStep {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_ms: Option<u64>,
}

impl NodeStep {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            delay_ms: None,
        }
    }

    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = Some(delay_ms);
        self
    }
}

impl From<&str> for NodeStep {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// A transition out of a node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Edge {
    /// Effects fired, in order, when the edge is taken
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<String>,
    pub then: Next,
    /// Pause before the target node starts. Defaults to the player's choice
    /// pause for choice edges and its step delay for completion edges.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pause_ms: Option<u64>,
}

impl Edge {
    pub fn to(node: impl Into<String>) -> Self {
        Self {
            then: Next::Node(node.into()),
            ..Self::default()
        }
    }

    pub fn finish() -> Self {
        Self::default()
    }

    pub fn with_effect(mut self, effect: impl Into<String>) -> Self {
        self.effects.push(effect.into());
        self
    }

    pub fn with_pause_ms(mut self, pause_ms: u64) -> Self {
        self.pause_ms = Some(pause_ms);
        self
    }
}

/// Where an edge leads
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Next {
    /// End the scene
    #[default]
    Finish,
    /// Play another node
    Node(String),
}

/// Author side effects, addressed by name from edges
#[derive(Clone, Default)]
pub struct EffectRegistry {
    actions: HashMap<String, Action>,
}

impl EffectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, action: Action) {
        self.actions.insert(name.into(), action);
    }

    pub fn with(mut self, name: impl Into<String>, action: Action) -> Self {
        self.register(name, action);
        self
    }

    pub fn get(&self, name: &str) -> Result<&Action, SceneError> {
        self.actions
            .get(name)
            .ok_or_else(|| SceneError::unknown_effect(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }
}

impl fmt::Debug for EffectRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.actions.keys().collect();
        names.sort();
        f.debug_struct("EffectRegistry")
            .field("effects", &names)
            .finish()
    }
}

/// Walks a [`SceneGraph`] on a player
#[derive(Clone)]
pub struct SceneWalker {
    inner: Rc<WalkerInner>,
}

struct WalkerInner {
    graph: SceneGraph,
    effects: EffectRegistry,
    player: WeakSequencePlayer,
    on_finish: Option<Action>,
    path: RefCell<Vec<String>>,
    finished: Cell<bool>,
}

impl SceneWalker {
    /// Check `graph` against the player's catalog and `effects`.
    ///
    /// Errors reject the graph; warnings are logged.
    pub fn new(
        player: &SequencePlayer,
        graph: SceneGraph,
        effects: EffectRegistry,
        on_finish: Option<Action>,
    ) -> Result<Self, SceneError> {
        let result = check(&graph, player.catalog(), Some(&effects));
        for issue in &result.issues {
            match issue.level {
                IssueLevel::Error => log::error!("[Scene] {}", issue),
                IssueLevel::Warning => log::warn!("[Scene] {}", issue),
            }
        }
        if let Some(first) = result.errors().next() {
            return Err(SceneError::Invalid {
                errors: result.error_count(),
                first: first.to_string(),
            });
        }

        Ok(Self {
            inner: Rc::new(WalkerInner {
                graph,
                effects,
                player: player.downgrade(),
                on_finish,
                path: RefCell::new(Vec::new()),
                finished: Cell::new(false),
            }),
        })
    }

    /// Play the root node
    pub fn start(&self) -> Result<RunId, SceneError> {
        self.inner.path.borrow_mut().clear();
        self.inner.finished.set(false);
        let root = self.inner.graph.root.clone();
        self.enter(&root)
    }

    /// Play the node `id`
    pub fn enter(&self, id: &str) -> Result<RunId, SceneError> {
        let node = self.inner.graph.node(id)?;
        let player = self
            .inner
            .player
            .upgrade()
            .ok_or(SceneError::PlayerGone)?;

        let choice_actions = ChoiceActions::PerChoice(
            node.choices
                .iter()
                .map(|edge| self.edge_action(edge, true))
                .collect(),
        );
        let steps = node
            .steps
            .iter()
            .map(|step| {
                let sequence_step = SequenceStep::new(step.key.clone())
                    .on_choice(choice_actions.clone());
                match step.delay_ms {
                    Some(delay_ms) => sequence_step.with_delay_ms(delay_ms),
                    None => sequence_step,
                }
            })
            .collect();

        log::info!("[Scene] Entering node '{}'", id);
        self.inner.path.borrow_mut().push(id.to_string());
        let on_complete = self.edge_action(&node.next, false);
        Ok(player.play_sequence(steps, Some(on_complete))?)
    }

    /// Nodes entered since the last `start`, in order
    pub fn path(&self) -> Vec<String> {
        self.inner.path.borrow().clone()
    }

    pub fn current_node(&self) -> Option<String> {
        if self.is_finished() {
            None
        } else {
            self.inner.path.borrow().last().cloned()
        }
    }

    pub fn is_finished(&self) -> bool {
        self.inner.finished.get()
    }

    fn edge_action(&self, edge: &Edge, from_choice: bool) -> Action {
        let walker = self.clone();
        let edge = edge.clone();
        Rc::new(move || walker.follow(&edge, from_choice))
    }

    fn follow(&self, edge: &Edge, from_choice: bool) {
        let Some(player) = self.inner.player.upgrade() else {
            return;
        };
        if from_choice {
            player.hide();
        }

        for name in &edge.effects {
            match self.inner.effects.get(name) {
                Ok(effect) => {
                    log::debug!("[Scene] Firing effect '{}'", name);
                    effect();
                }
                Err(error) => log::error!("[Scene] {}", error),
            }
        }

        let target = match &edge.then {
            Next::Finish => {
                self.finish();
                return;
            }
            Next::Node(target) => target.clone(),
        };

        let config = player.config();
        let pause = match edge.pause_ms {
            Some(pause_ms) => Duration::from_millis(pause_ms),
            None if from_choice => config.choice_pause(),
            None => config.default_step_delay(),
        };

        let walker = self.clone();
        if from_choice {
            if pause.is_zero() {
                walker.enter_logged(&target);
            } else {
                player.after(pause, move |_| walker.enter_logged(&target));
            }
        } else {
            // The last line stays up for the pause, then gets the usual gap
            let gap = config.inter_message_gap();
            player.after(pause, move |player| {
                player.hide();
                player.after(gap, move |_| walker.enter_logged(&target));
            });
        }
    }

    fn enter_logged(&self, id: &str) {
        if let Err(error) = self.enter(id) {
            log::error!("[Scene] Could not enter node '{}': {}", id, error);
        }
    }

    fn finish(&self) {
        log::info!("[Scene] Finished after {:?}", self.inner.path.borrow());
        self.inner.finished.set(true);
        if let Some(on_finish) = self.inner.on_finish.clone() {
            on_finish();
        }
    }
}

impl fmt::Debug for SceneWalker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneWalker")
            .field("root", &self.inner.graph.root)
            .field("path", &self.inner.path.borrow())
            .field("finished", &self.inner.finished.get())
            .finish()
    }
}
