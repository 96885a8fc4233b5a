//! CUI player mode for running scenes
//!
//! Timers run on tokio's clock: the loop sleeps until the next pending
//! deadline and advances the player's timer queue to the elapsed time. When
//! nothing is pending and a choice is on screen, it reads the user's pick,
//! and brings the queue up to the moment of the answer before applying it.

use crate::{
    cli::terminal::TerminalSink,
    graph::{EffectRegistry, SceneGraph, SceneWalker, check},
    runtime::{SequencePlayer, TimerQueue},
    storage::SceneDocument,
};
use std::cell::Cell;
use std::collections::BTreeSet;
use std::io::{self, Write};
use std::rc::Rc;
use std::time::Duration;

/// Play a scene document in the terminal until it finishes or the user quits
pub async fn run_play(scene: SceneDocument, debug: bool) -> anyhow::Result<()> {
    let queue = Rc::new(TimerQueue::new());
    let sink = Rc::new(TerminalSink::new(debug));
    let effects = announce_effects(&scene.graph, debug);
    let player = SequencePlayer::with_config(
        Rc::new(scene.catalog),
        sink.clone(),
        queue.clone(),
        scene.config,
    );

    let finished = Rc::new(Cell::new(false));
    let done = finished.clone();
    let walker = SceneWalker::new(
        &player,
        scene.graph,
        effects,
        Some(Rc::new(move || done.set(true))),
    )?;

    println!("=== kataribe Scene Player ===");
    println!();
    println!("Controls:");
    println!("  1-9:   select choice");
    println!("  q:     quit");

    let session = Session {
        queue,
        sink,
        finished,
    };
    let started = tokio::time::Instant::now();
    walker.start()?;

    loop {
        match session.poll(started.elapsed()) {
            Turn::Wait(deadline) => tokio::time::sleep_until(started + deadline).await,
            Turn::Finished => {
                println!();
                println!("== THE END ==");
                break;
            }
            Turn::Stalled => {
                log::warn!("[Play] No pending timers and no choice on screen, stopping");
                break;
            }
            Turn::Ask => {
                let Some(input) = read_input("Select (1-9):").await? else {
                    break;
                };
                if !session.answer(&input, started.elapsed()) {
                    println!("Goodbye!");
                    break;
                }
            }
        }
    }

    if debug {
        println!("[debug] path={:?}", walker.path());
    }
    Ok(())
}

/// What the play loop does next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Turn {
    /// Sleep until this point on the session clock
    Wait(Duration),
    /// The scene reached a finish edge
    Finished,
    /// A choice is on screen and nothing else is pending
    Ask,
    /// Nothing pending and nothing to answer
    Stalled,
}

/// Ties the virtual timer queue to wall time elapsed since the scene started
struct Session {
    queue: Rc<TimerQueue>,
    sink: Rc<TerminalSink>,
    finished: Rc<Cell<bool>>,
}

impl Session {
    /// Run everything due by `elapsed`
    fn poll(&self, elapsed: Duration) -> Turn {
        self.queue.advance_to(elapsed);
        if let Some(deadline) = self.queue.next_deadline() {
            Turn::Wait(deadline)
        } else if self.finished.get() {
            Turn::Finished
        } else if self.sink.awaiting_choice() {
            Turn::Ask
        } else {
            Turn::Stalled
        }
    }

    /// Handle one line typed at `elapsed`. Returns `false` when the user quits.
    fn answer(&self, input: &str, elapsed: Duration) -> bool {
        if input == "q" {
            return false;
        }

        // The clock stood still while the prompt was up; catch it up so the
        // chosen branch schedules its delays from now
        self.queue.advance_to(elapsed);
        match input.parse::<usize>() {
            Ok(number) => {
                if let Err(error) = self.sink.select_numbered(number) {
                    println!("Invalid choice: {error}");
                }
            }
            Err(_) => println!("Invalid input. Enter a number or 'q'."),
        }
        true
    }
}

/// Print the issues found in a scene. Returns whether it is playable.
pub fn run_check(scene: &SceneDocument) -> bool {
    let result = check(&scene.graph, &scene.catalog, None);
    for issue in &result.issues {
        println!("{issue}");
    }
    println!(
        "{} error(s), {} warning(s)",
        result.error_count(),
        result.warning_count()
    );
    !result.has_errors()
}

/// Effects in a terminal session only announce themselves
fn announce_effects(graph: &SceneGraph, debug: bool) -> EffectRegistry {
    let names: BTreeSet<&String> = graph
        .nodes
        .values()
        .flat_map(|node| node.choices.iter().chain(std::iter::once(&node.next)))
        .flat_map(|edge| edge.effects.iter())
        .collect();

    let mut effects = EffectRegistry::new();
    for name in names {
        let label = name.clone();
        effects.register(
            name.clone(),
            Rc::new(move || {
                if debug {
                    println!("[effect: {label}]");
                }
            }),
        );
    }
    effects
}

/// Read one trimmed line off the async thread. `None` on end of input.
async fn read_input(prompt: &str) -> io::Result<Option<String>> {
    print!("{prompt} ");
    io::stdout().flush()?;

    tokio::task::spawn_blocking(|| -> io::Result<Option<String>> {
        let mut input = String::new();
        let read = io::stdin().read_line(&mut input)?;
        Ok((read > 0).then(|| input.trim().to_string()))
    })
    .await
    .map_err(io::Error::other)?
}
