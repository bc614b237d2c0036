//! Integration tests for the console state machine.
//!
//! Each test drives the console through operator and channel events and
//! checks the ordered action stream, the oracle being the wire text the
//! vehicle would see.

use std::time::Duration;

use helm_app::{Console, ConsoleAction, ConsoleEvent, InputSource};
use helm_core::env::testing::{SimClock, SimInstant};
use helm_core::ChannelId;
use helm_proto::{Command, Direction, SpeedLevel};

fn connect(console: &mut Console<SimInstant>, clock: &SimClock) -> ChannelId {
    let _ = console.handle(ConsoleEvent::Connect {
        host: "192.168.1.20".to_string(),
        port: "8765".to_string(),
    });
    let actions = console.handle(ConsoleEvent::ChannelOpened { now: clock.now() });
    match actions.first() {
        Some(ConsoleAction::Announce { channel }) => *channel,
        other => unreachable!("expected announce, got {other:?}"),
    }
}

fn transmitted_texts(actions: &[ConsoleAction]) -> Vec<(ChannelId, String)> {
    actions
        .iter()
        .filter_map(|action| match action {
            ConsoleAction::Transmit { channel, text } => Some((*channel, text.clone())),
            _ => None,
        })
        .collect()
}

#[test]
fn teardown_emits_neutral_before_close() {
    let clock = SimClock::new();
    let mut console = Console::new();
    let channel = connect(&mut console, &clock);

    // Forward is active when the operator quits.
    let _ = console.handle(ConsoleEvent::Press {
        source: InputSource::Keyboard,
        direction: Direction::Forward,
    });

    let actions = console.handle(ConsoleEvent::Teardown);

    let transmit_pos = actions
        .iter()
        .position(|a| matches!(a, ConsoleAction::Transmit { .. }));
    let close_pos = actions.iter().position(|a| matches!(a, ConsoleAction::Close { .. }));

    let (Some(transmit_pos), Some(close_pos)) = (transmit_pos, close_pos) else {
        unreachable!("teardown must transmit and close: {actions:?}");
    };
    assert!(transmit_pos < close_pos, "neutral command must precede the close");

    let texts = transmitted_texts(&actions);
    assert_eq!(texts.len(), 1);
    assert_eq!(texts[0].0, channel);
    let neutral = Command::direction(None).encode().map_err(|e| e.to_string());
    assert_eq!(Ok(texts[0].1.clone()), neutral);

    assert!(matches!(actions.last(), Some(ConsoleAction::Quit)));
}

#[test]
fn stale_release_produces_no_third_command() {
    let clock = SimClock::new();
    let mut console = Console::new();
    let _ = connect(&mut console, &clock);

    let mut texts = Vec::new();
    let events = [
        ConsoleEvent::Press { source: InputSource::Keyboard, direction: Direction::Left },
        ConsoleEvent::Press { source: InputSource::Pointer, direction: Direction::Right },
        ConsoleEvent::Release { source: InputSource::Keyboard, direction: Direction::Left },
    ];
    for event in events {
        texts.extend(transmitted_texts(&console.handle(event)));
    }

    assert_eq!(texts.len(), 2, "stale release must not emit: {texts:?}");
    assert!(texts[0].1.contains(r#""left":true"#));
    assert!(texts[1].1.contains(r#""right":true"#));
}

#[test]
fn drop_and_reopen_redirects_commands_to_new_channel() {
    let mut clock = SimClock::new();
    let mut console = Console::new();
    let old_channel = connect(&mut console, &clock);

    // Unexpected drop: the console schedules exactly one reconnect open.
    let actions = console.handle(ConsoleEvent::ChannelClosed);
    let opens: Vec<_> =
        actions.iter().filter(|a| matches!(a, ConsoleAction::Open { .. })).collect();
    assert_eq!(opens.len(), 1);

    // The reconnect succeeds; subsequent commands ride the new channel.
    let actions =
        console.handle(ConsoleEvent::ChannelOpened { now: clock.advance(Duration::from_millis(30)) });
    let new_channel = match actions.first() {
        Some(ConsoleAction::Announce { channel }) => *channel,
        other => unreachable!("expected announce, got {other:?}"),
    };
    assert_ne!(new_channel, old_channel);

    let actions = console.handle(ConsoleEvent::SelectSpeed { level: SpeedLevel::High });
    let texts = transmitted_texts(&actions);
    assert_eq!(texts.len(), 1);
    assert_eq!(texts[0].0, new_channel);
}

#[test]
fn failed_reconnect_alerts_and_settles_disconnected() {
    let clock = SimClock::new();
    let mut console = Console::new();
    let _ = connect(&mut console, &clock);

    let _ = console.handle(ConsoleEvent::ChannelClosed);
    let actions =
        console.handle(ConsoleEvent::OpenFailed { reason: "connection refused".to_string() });

    assert!(actions.iter().any(|a| matches!(a, ConsoleAction::Alert { .. })));
    assert!(!actions.iter().any(|a| matches!(a, ConsoleAction::Open { .. })));
    assert_eq!(console.session_state(), helm_core::SessionState::Disconnected);
}

#[test]
fn hatch_lockout_survives_reconnect() {
    let mut clock = SimClock::new();
    let mut console = Console::new();
    let _ = connect(&mut console, &clock);

    let first = console.handle(ConsoleEvent::ToggleHatch { now: clock.now() });
    assert_eq!(transmitted_texts(&first).len(), 1);

    // Channel drops and reopens inside the settle window.
    let _ = console.handle(ConsoleEvent::ChannelClosed);
    let now = clock.advance(Duration::from_millis(300));
    let _ = console.handle(ConsoleEvent::ChannelOpened { now });

    // Still locked: the reconnect does not reset the actuator window.
    let second = console.handle(ConsoleEvent::ToggleHatch { now });
    assert!(transmitted_texts(&second).is_empty());

    let later = clock.advance(Duration::from_secs(2));
    let third = console.handle(ConsoleEvent::ToggleHatch { now: later });
    assert_eq!(transmitted_texts(&third).len(), 1);
    assert!(transmitted_texts(&third)[0].1.contains(r#""action":"close""#));
}

#[test]
fn ticks_emit_heartbeats_only_while_connected() {
    let mut clock = SimClock::new();
    let mut console: Console<SimInstant> = Console::new();

    // Disconnected: ticks are silent.
    let now = clock.advance(Duration::from_secs(5));
    assert!(console.handle(ConsoleEvent::Tick { now }).is_empty());

    let _ = connect(&mut console, &clock);
    let now = clock.advance(Duration::from_secs(1));
    let actions = console.handle(ConsoleEvent::Tick { now });
    let texts = transmitted_texts(&actions);
    assert_eq!(texts.len(), 1);
    assert_eq!(texts[0].1, r#"{"type":"heartbeat"}"#);
}
