//! Sequence steps: what the caller hands to the player

use crate::types::dialogue::{Action, BoundChoice, Choice, noop};
use std::fmt;
use std::time::Duration;

/// Actions to attach to a step's choices
#[derive(Clone, Default)]
pub enum ChoiceActions {
    /// Every choice is inert
    #[default]
    None,
    /// The same action for every choice
    Shared(Action),
    /// One action per choice, by position
    PerChoice(Vec<Action>),
}

impl ChoiceActions {
    /// Bind actions to `choices` by position.
    ///
    /// A choice without a matching action gets a no-op so the scene cannot
    /// soft-lock on a missing binding.
    pub fn bind(&self, choices: &[Choice]) -> Vec<BoundChoice> {
        if let Self::PerChoice(actions) = self
            && actions.len() < choices.len()
        {
            log::warn!(
                "[Choice] {} choices but only {} actions supplied, binding no-ops to the rest",
                choices.len(),
                actions.len()
            );
        }

        choices
            .iter()
            .enumerate()
            .map(|(index, choice)| {
                let action = match self {
                    Self::None => noop(),
                    Self::Shared(action) => action.clone(),
                    Self::PerChoice(actions) => actions.get(index).cloned().unwrap_or_else(noop),
                };
                BoundChoice::new(choice.text.clone(), action)
            })
            .collect()
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl From<Action> for ChoiceActions {
    fn from(action: Action) -> Self {
        Self::Shared(action)
    }
}

impl From<Vec<Action>> for ChoiceActions {
    fn from(actions: Vec<Action>) -> Self {
        Self::PerChoice(actions)
    }
}

impl fmt::Debug for ChoiceActions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Shared(_) => f.write_str("Shared(..)"),
            Self::PerChoice(actions) => write!(f, "PerChoice({} actions)", actions.len()),
        }
    }
}

/// One scripted beat: a catalog key plus pacing and branching metadata
#[derive(Debug, Clone)]
pub struct SequenceStep {
    pub key: String,
    /// Time the line stays up before the next one; `None` uses the player default
    pub delay: Option<Duration>,
    pub choice_actions: ChoiceActions,
}

impl SequenceStep {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            delay: None,
            choice_actions: ChoiceActions::None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_delay_ms(self, millis: u64) -> Self {
        self.with_delay(Duration::from_millis(millis))
    }

    /// Attach actions to the choices of this step's content
    pub fn on_choice(mut self, actions: impl Into<ChoiceActions>) -> Self {
        self.choice_actions = actions.into();
        self
    }
}

impl From<&str> for SequenceStep {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}
