//! Dialogue content as authored in a catalog, and choices as bound at play time

use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// A zero-argument continuation invoked by the player or by a bound choice.
///
/// Playback is single-threaded, so actions are reference counted rather than
/// `Send`.
pub type Action = Rc<dyn Fn()>;

/// An action that does nothing
pub fn noop() -> Action {
    Rc::new(|| {})
}

/// One line of dialogue: who says it, what they say, and their portrait
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueMessage {
    /// Message text
    pub message: String,
    /// Portrait reference understood by the presentation layer
    #[serde(default)]
    pub avatar: String,
    /// Name displayed next to the message
    #[serde(default)]
    pub speaker_name: String,
}

impl DialogueMessage {
    pub fn new(
        message: impl Into<String>,
        avatar: impl Into<String>,
        speaker_name: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            avatar: avatar.into(),
            speaker_name: speaker_name.into(),
        }
    }
}

/// A choice as stored in the catalog. It carries no behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub text: String,
}

impl Choice {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Catalog content, resolved once into either a plain line or a line with choices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawContent", into = "RawContent")]
pub enum DialogueContent {
    /// A line that is shown for a while and then replaced
    Plain(DialogueMessage),
    /// A line that waits for the user to pick one of the choices
    WithChoices(DialogueMessage, Vec<Choice>),
}

impl DialogueContent {
    pub fn plain(message: DialogueMessage) -> Self {
        Self::Plain(message)
    }

    /// Build content with choices. An empty choice list yields `Plain`.
    pub fn with_choices(message: DialogueMessage, choices: Vec<Choice>) -> Self {
        if choices.is_empty() {
            Self::Plain(message)
        } else {
            Self::WithChoices(message, choices)
        }
    }

    pub fn message(&self) -> &DialogueMessage {
        match self {
            Self::Plain(message) | Self::WithChoices(message, _) => message,
        }
    }

    /// Choices carried by this content, empty for plain lines
    pub fn choices(&self) -> &[Choice] {
        match self {
            Self::Plain(_) => &[],
            Self::WithChoices(_, choices) => choices,
        }
    }

    pub fn has_choices(&self) -> bool {
        matches!(self, Self::WithChoices(..))
    }
}

/// Flat JSON shape of a catalog entry
#[derive(Serialize, Deserialize)]
struct RawContent {
    #[serde(flatten)]
    message: DialogueMessage,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    choices: Vec<Choice>,
}

impl From<RawContent> for DialogueContent {
    fn from(raw: RawContent) -> Self {
        DialogueContent::with_choices(raw.message, raw.choices)
    }
}

impl From<DialogueContent> for RawContent {
    fn from(content: DialogueContent) -> Self {
        match content {
            DialogueContent::Plain(message) => RawContent {
                message,
                choices: Vec::new(),
            },
            DialogueContent::WithChoices(message, choices) => RawContent { message, choices },
        }
    }
}

/// A choice with its action attached, as handed to the presentation sink
#[derive(Clone)]
pub struct BoundChoice {
    pub text: String,
    pub action: Action,
}

impl BoundChoice {
    pub fn new(text: impl Into<String>, action: Action) -> Self {
        Self {
            text: text.into(),
            action,
        }
    }

    /// Fire the bound action
    pub fn select(&self) {
        (self.action)();
    }
}

impl fmt::Debug for BoundChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundChoice")
            .field("text", &self.text)
            .finish_non_exhaustive()
    }
}
