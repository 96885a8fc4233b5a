//! Static validation of scene graphs against a catalog

use super::{Edge, EffectRegistry, Next, SceneGraph, SceneNode};
use crate::catalog::DialogueCatalog;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::fmt;

/// Issue severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueLevel {
    /// The scene cannot be played
    Error,
    /// The scene plays, but probably not as intended
    Warning,
}

/// A problem found in a scene
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneIssue {
    pub level: IssueLevel,
    /// Node the issue was found in, if any
    pub node: Option<String>,
    pub message: String,
}

impl fmt::Display for SceneIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.level {
            IssueLevel::Error => "error",
            IssueLevel::Warning => "warning",
        };
        match &self.node {
            Some(node) => write!(f, "{level} in node '{node}': {}", self.message),
            None => write!(f, "{level}: {}", self.message),
        }
    }
}

/// Result of checking a scene
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub issues: Vec<SceneIssue>,
}

impl CheckResult {
    fn error(&mut self, node: Option<&str>, message: String) {
        self.push(IssueLevel::Error, node, message);
    }

    fn warning(&mut self, node: Option<&str>, message: String) {
        self.push(IssueLevel::Warning, node, message);
    }

    fn push(&mut self, level: IssueLevel, node: Option<&str>, message: String) {
        self.issues.push(SceneIssue {
            level,
            node: node.map(str::to_string),
            message,
        });
    }

    pub fn errors(&self) -> impl Iterator<Item = &SceneIssue> {
        self.issues
            .iter()
            .filter(|issue| issue.level == IssueLevel::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &SceneIssue> {
        self.issues
            .iter()
            .filter(|issue| issue.level == IssueLevel::Warning)
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Check a scene graph.
///
/// Errors: missing root, unknown catalog keys, edges to unknown nodes, and
/// (when `effects` is given) unregistered effects.
///
/// Warnings: empty nodes, choice/edge count mismatches, steps that can never
/// play because an earlier step halts on a choice, and unreachable nodes.
pub fn check(
    graph: &SceneGraph,
    catalog: &DialogueCatalog,
    effects: Option<&EffectRegistry>,
) -> CheckResult {
    let mut result = CheckResult::default();

    if !graph.nodes.contains_key(&graph.root) {
        result.error(None, format!("root node '{}' is not defined", graph.root));
    }

    for id in graph.node_ids() {
        let Some(node) = graph.nodes.get(id) else {
            continue;
        };
        check_steps(id, node, catalog, &mut result);
        for edge in node.choices.iter().chain(std::iter::once(&node.next)) {
            check_edge(id, edge, graph, effects, &mut result);
        }
    }

    for id in unreachable(graph) {
        result.warning(Some(id), "node is unreachable from the root".to_string());
    }

    result
}

fn check_steps(id: &str, node: &SceneNode, catalog: &DialogueCatalog, result: &mut CheckResult) {
    if node.steps.is_empty() {
        result.warning(Some(id), "node has no steps".to_string());
    }

    let mut halting_step = None;
    for (index, step) in node.steps.iter().enumerate() {
        let content = match catalog.get(&step.key) {
            Ok(content) => content,
            Err(_) => {
                result.error(
                    Some(id),
                    format!("step {} uses unknown key '{}'", index, step.key),
                );
                continue;
            }
        };

        if let Some((halt_index, _)) = halting_step {
            result.warning(
                Some(id),
                format!(
                    "step {} ('{}') never plays: step {} waits on a choice",
                    index, step.key, halt_index
                ),
            );
        } else if content.has_choices() {
            halting_step = Some((index, content.choices().len()));
        }
    }

    match halting_step {
        Some((index, count)) if node.choices.len() < count => result.warning(
            Some(id),
            format!(
                "step {} offers {} choices but only {} edge(s) are defined; the rest do nothing",
                index,
                count,
                node.choices.len()
            ),
        ),
        Some((index, count)) if node.choices.len() > count => result.warning(
            Some(id),
            format!(
                "{} choice edge(s) defined but step {} offers only {} choices",
                node.choices.len(),
                index,
                count
            ),
        ),
        None if !node.choices.is_empty() => result.warning(
            Some(id),
            "choice edges are defined but no step offers choices".to_string(),
        ),
        _ => {}
    }
}

fn check_edge(
    id: &str,
    edge: &Edge,
    graph: &SceneGraph,
    effects: Option<&EffectRegistry>,
    result: &mut CheckResult,
) {
    if let Next::Node(target) = &edge.then
        && !graph.nodes.contains_key(target)
    {
        result.error(Some(id), format!("edge leads to unknown node '{}'", target));
    }

    if let Some(effects) = effects {
        for name in &edge.effects {
            if !effects.contains(name) {
                result.error(Some(id), format!("edge fires unknown effect '{}'", name));
            }
        }
    }
}

/// Nodes not reachable from the root, sorted
fn unreachable(graph: &SceneGraph) -> Vec<&str> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<&str> = VecDeque::new();
    if graph.nodes.contains_key(&graph.root) {
        queue.push_back(graph.root.as_str());
    }

    while let Some(id) = queue.pop_front() {
        if !seen.insert(id) {
            continue;
        }
        let Some(node) = graph.nodes.get(id) else {
            continue;
        };
        for edge in node.choices.iter().chain(std::iter::once(&node.next)) {
            if let Next::Node(target) = &edge.then
                && graph.nodes.contains_key(target)
            {
                queue.push_back(target.as_str());
            }
        }
    }

    graph
        .node_ids()
        .into_iter()
        .filter(|id| !seen.contains(id))
        .collect()
}
