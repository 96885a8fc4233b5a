//! Sequence player behavior through the public API, on virtual time

mod common;

use common::{Harness, RecordingSink, SinkCall, counter, lighthouse_catalog, recorder};
use kataribe::{
    ChoiceActions, Choice, DialogueCatalog, DialogueContent, DialogueMessage, PlayerConfig,
    PlayerStatus, PresentationSink, SequenceStep,
};
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn plain_steps_show_in_order_and_complete_once() {
    let h = Harness::new(lighthouse_catalog(), PlayerConfig::default());
    let (done, on_done) = counter();

    h.player
        .play_sequence(
            vec!["greet".into(), "storm".into(), "bye".into()],
            Some(on_done),
        )
        .unwrap();
    h.queue.run_until_idle();

    assert_eq!(
        h.sink.shows(),
        vec![
            "Evening, traveller.",
            "A storm is coming in.",
            "Safe travels."
        ]
    );
    assert_eq!(done.get(), 1);
    assert_eq!(h.player.status(), PlayerStatus::Completed);
    assert!(h.queue.is_idle());
}

#[test]
fn choice_step_is_the_last_show_before_halt() {
    let h = Harness::new(lighthouse_catalog(), PlayerConfig::default());
    let (done, on_done) = counter();
    let (picked, on_pick) = counter();

    h.player
        .play_sequence(
            vec![
                "greet".into(),
                SequenceStep::new("ask_lamp").on_choice(on_pick),
                "bye".into(),
            ],
            Some(on_done),
        )
        .unwrap();
    h.queue.run_until_idle();

    assert_eq!(
        h.sink.last_call(),
        Some(SinkCall::Show {
            message: "Will you light the lamp?".to_string(),
            choices: Some(vec!["Light it".to_string(), "Leave it".to_string()]),
        })
    );
    assert_eq!(h.player.status(), PlayerStatus::AwaitingChoice { step: 1 });
    assert_eq!(done.get(), 0);

    h.sink.select(1);
    h.queue.run_until_idle();

    assert_eq!(picked.get(), 1);
    assert_eq!(done.get(), 0);
    assert!(!h.sink.shows().contains(&"Safe travels.".to_string()));
}

#[test]
fn hide_with_nothing_shown_is_a_no_op() {
    let sink = RecordingSink::default();
    sink.hide();
    sink.hide();
    assert!(sink.visible().is_none());

    let h = Harness::new(lighthouse_catalog(), PlayerConfig::default());
    h.player.hide();
    h.player.stop();
    assert_eq!(h.player.status(), PlayerStatus::Idle);
}

#[test]
fn per_choice_actions_bind_by_index() {
    let h = Harness::new(lighthouse_catalog(), PlayerConfig::default());
    let log = Rc::new(RefCell::new(Vec::new()));

    h.player
        .play_sequence(
            vec![SequenceStep::new("ask_lamp").on_choice(vec![
                recorder(&log, "a0"),
                recorder(&log, "a1"),
            ])],
            None,
        )
        .unwrap();
    h.sink.select(0);

    assert_eq!(*log.borrow(), vec!["a0"]);
}

#[test]
fn shared_action_serves_every_choice() {
    for index in 0..2 {
        let h = Harness::new(lighthouse_catalog(), PlayerConfig::default());
        let (count, shared) = counter();

        h.player
            .play_sequence(vec![SequenceStep::new("ask_lamp").on_choice(shared)], None)
            .unwrap();
        h.sink.select(index);

        assert_eq!(count.get(), 1, "choice {index}");
    }
}

#[test]
fn missing_actions_leave_choices_inert() {
    let h = Harness::new(lighthouse_catalog(), PlayerConfig::default());
    let (count, only_first) = counter();

    h.player
        .play_sequence(
            vec![SequenceStep::new("ask_lamp").on_choice(vec![only_first])],
            None,
        )
        .unwrap();
    // The second choice has no action of its own
    h.sink.select(1);
    assert_eq!(count.get(), 0);

    let h = Harness::new(lighthouse_catalog(), PlayerConfig::default());
    h.player
        .play_sequence(vec!["ask_lamp".into()], None)
        .unwrap();
    h.sink.select(0);
    assert_eq!(h.player.status(), PlayerStatus::Completed);
}

#[test]
fn explicit_delay_gates_the_next_show() {
    let h = Harness::new(lighthouse_catalog(), PlayerConfig::immediate());

    h.player
        .play_sequence(
            vec![
                SequenceStep::new("greet").with_delay_ms(1500),
                "storm".into(),
            ],
            None,
        )
        .unwrap();

    h.advance_ms(1499);
    assert_eq!(h.sink.shows().len(), 1);

    h.advance_ms(1);
    assert_eq!(h.sink.shows().len(), 2);
    assert_eq!(h.sink.visible().as_deref(), Some("A storm is coming in."));
}

#[test]
fn default_delay_and_gap_pace_plain_steps() {
    let h = Harness::new(lighthouse_catalog(), PlayerConfig::default());

    h.player
        .play_sequence(vec!["greet".into(), "storm".into()], None)
        .unwrap();

    h.advance_ms(3000);
    assert_eq!(h.sink.visible(), None);
    assert_eq!(h.sink.hides(), 1);

    h.advance_ms(299);
    assert_eq!(h.sink.shows().len(), 1);
    h.advance_ms(1);
    assert_eq!(h.sink.shows().len(), 2);
}

#[test]
fn single_choice_step_shows_noop_choices_and_waits() {
    let catalog = DialogueCatalog::new().with_entry(
        "A",
        DialogueContent::with_choices(
            DialogueMessage::new("hi", "", ""),
            vec![Choice::new("yes"), Choice::new("no")],
        ),
    );
    let h = Harness::new(catalog, PlayerConfig::default());
    let (done, on_done) = counter();

    h.player
        .play_sequence(vec!["A".into()], Some(on_done))
        .unwrap();
    h.queue.run_until_idle();

    assert_eq!(
        *h.sink.calls.borrow(),
        vec![SinkCall::Show {
            message: "hi".to_string(),
            choices: Some(vec!["yes".to_string(), "no".to_string()]),
        }]
    );
    assert_eq!(done.get(), 0);

    h.sink.select(0);
    assert_eq!(done.get(), 0);
    assert_eq!(h.sink.calls.borrow().len(), 1);
}

#[test]
fn short_delay_then_final_step_completes() {
    let catalog = DialogueCatalog::new()
        .with_entry("A", DialogueContent::plain(DialogueMessage::new("m1", "", "")))
        .with_entry("B", DialogueContent::plain(DialogueMessage::new("m2", "", "")));
    let h = Harness::new(catalog, PlayerConfig::immediate());
    let (done, on_done) = counter();

    h.player
        .play_sequence(
            vec![SequenceStep::new("A").with_delay_ms(100), "B".into()],
            Some(on_done),
        )
        .unwrap();

    h.advance_ms(99);
    assert_eq!(h.sink.shows(), vec!["m1"]);
    assert_eq!(done.get(), 0);

    h.advance_ms(1);
    assert_eq!(h.sink.shows(), vec!["m1", "m2"]);
    assert_eq!(done.get(), 1);

    h.advance_ms(10_000);
    assert_eq!(h.sink.shows(), vec!["m1", "m2"]);
    assert_eq!(done.get(), 1);
}

#[test]
fn unknown_key_hides_and_fails_loudly() {
    let h = Harness::new(lighthouse_catalog(), PlayerConfig::default());
    h.player
        .play_sequence(vec!["greet".into(), "storm".into()], None)
        .unwrap();

    let error = h
        .player
        .play_sequence(vec!["greet".into(), "kraken".into()], None)
        .unwrap_err();

    assert_eq!(error.missing_key(), Some("kraken"));
    assert_eq!(h.sink.visible(), None);
    assert_eq!(h.sink.last_call(), Some(SinkCall::Hide));

    // The interrupted run does not come back
    h.queue.run_until_idle();
    assert_eq!(h.sink.shows(), vec!["Evening, traveller."]);
}

#[test]
fn new_run_supersedes_the_pending_one() {
    let h = Harness::new(lighthouse_catalog(), PlayerConfig::default());
    let (first_done, on_first) = counter();
    let (second_done, on_second) = counter();

    let first = h
        .player
        .play_sequence(vec!["greet".into(), "storm".into()], Some(on_first))
        .unwrap();
    h.advance_ms(1000);
    let second = h
        .player
        .play_sequence(vec!["bye".into()], Some(on_second))
        .unwrap();
    h.queue.run_until_idle();

    assert!(second > first);
    assert!(!h.player.is_current(first));
    assert_eq!(h.sink.shows(), vec!["Evening, traveller.", "Safe travels."]);
    assert_eq!(h.sink.visible().as_deref(), Some("Safe travels."));
    assert_eq!(first_done.get(), 0);
    assert_eq!(second_done.get(), 1);
}

#[test]
fn play_single_takes_content_directly() {
    let h = Harness::new(DialogueCatalog::new(), PlayerConfig::default());
    let (count, action) = counter();

    h.player.play_single(
        DialogueContent::with_choices(
            DialogueMessage::new("Ring the bell?", "keeper.png", "Keeper"),
            vec![Choice::new("Ring")],
        ),
        ChoiceActions::from(action),
    );
    h.sink.select(0);
    h.sink.select(0);

    assert_eq!(count.get(), 1);
}
