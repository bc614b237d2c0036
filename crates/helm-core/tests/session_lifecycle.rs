//! Lifecycle tests for the session state machine.
//!
//! These run on virtual time and verify the liveness and recovery
//! behavior end to end:
//! - heartbeat cadence (settle delay, then one per interval)
//! - exactly one reconnect attempt per drop, to the same endpoint
//! - commands after a reconnect ride the new channel, not the old one

use std::time::Duration;

use helm_core::env::testing::{SimClock, SimInstant};
use helm_core::{
    ChannelId, Endpoint, Session, SessionAction, SessionConfig, SessionState,
};
use helm_proto::{Command, SpeedLevel};

fn endpoint() -> Endpoint {
    match Endpoint::new("192.168.1.20", "8765") {
        Ok(endpoint) => endpoint,
        Err(_) => unreachable!("valid endpoint"),
    }
}

fn open_session(clock: &SimClock) -> (Session<SimInstant>, ChannelId) {
    let mut session = Session::new(SessionConfig::default());
    let actions = session.connect(endpoint());
    assert!(matches!(actions.as_deref(), Ok([SessionAction::Open { .. }])));

    let Some(channel) = session.channel_opened(clock.now()) else {
        unreachable!("open after connect is accepted");
    };
    (session, channel)
}

#[test]
fn heartbeat_liveness_over_thirty_seconds() {
    let mut clock = SimClock::new();
    let (mut session, channel) = open_session(&clock);

    // Drive ticks every 100ms for 30s and collect heartbeat instants.
    let mut heartbeats: Vec<SimInstant> = Vec::new();
    for _ in 0..300 {
        let now = clock.advance(Duration::from_millis(100));
        for action in session.tick(now) {
            if let SessionAction::Transmit { channel: ch, text } = action {
                assert_eq!(ch, channel);
                assert_eq!(text, r#"{"type":"heartbeat"}"#);
                heartbeats.push(now);
            }
        }
    }

    assert!(heartbeats.len() >= 3, "expected at least 3 heartbeats, got {}", heartbeats.len());

    // First one comes after the settle delay, not instantly on connect.
    let origin = SimInstant::from_millis(0);
    let first = heartbeats[0] - origin;
    assert!(first >= Duration::from_millis(700));
    assert!(first < Duration::from_secs(2));

    // Subsequent ones are ~10s apart.
    for pair in heartbeats.windows(2) {
        let gap = pair[1] - pair[0];
        assert!(gap >= Duration::from_secs(10));
        assert!(gap <= Duration::from_millis(10_100));
    }
}

#[test]
fn reconnect_targets_same_endpoint_exactly_once() {
    let mut clock = SimClock::new();
    let (mut session, old_channel) = open_session(&clock);

    let actions = session.channel_closed();
    assert_eq!(session.state(), SessionState::Reconnecting);
    match actions.as_slice() {
        [SessionAction::Open { endpoint: target, after }] => {
            assert_eq!(target, &endpoint());
            assert_eq!(*after, Duration::ZERO);
        },
        other => unreachable!("expected one open action, got {other:?}"),
    }

    // The single attempt fails: no further opens, operator alerted.
    let actions = session.open_failed("connection refused");
    assert_eq!(session.state(), SessionState::Disconnected);
    assert!(matches!(actions.as_slice(), [SessionAction::Alert { .. }]));

    // Manual reconnect by the operator works from here.
    let actions = session.connect(endpoint());
    assert!(matches!(actions.as_deref(), Ok([SessionAction::Open { .. }])));
    let new_channel = session.channel_opened(clock.advance(Duration::from_millis(50)));
    assert!(new_channel.is_some());
    assert_ne!(new_channel, Some(old_channel));
}

#[test]
fn commands_after_reconnect_ride_the_new_channel() {
    let mut clock = SimClock::new();
    let (mut session, old_channel) = open_session(&clock);

    let _ = session.channel_closed();
    let Some(new_channel) = session.channel_opened(clock.advance(Duration::from_millis(20)))
    else {
        unreachable!("reconnect open is accepted");
    };
    assert_ne!(new_channel, old_channel);

    let command = Command::speed(SpeedLevel::Low);
    match session.transmit(&command) {
        Ok(Some(SessionAction::Transmit { channel, .. })) => assert_eq!(channel, new_channel),
        other => unreachable!("expected routed transmit, got {other:?}"),
    }
}

#[test]
fn heartbeats_stop_during_reconnect_window() {
    let mut clock = SimClock::new();
    let (mut session, _) = open_session(&clock);

    // Let one heartbeat out, then drop the channel.
    let now = clock.advance(Duration::from_secs(1));
    assert!(!session.tick(now).is_empty());

    let _ = session.channel_closed();
    let now = clock.advance(Duration::from_secs(30));
    assert!(session.tick(now).is_empty(), "no heartbeats outside Connected");
}

#[test]
fn bounded_backoff_keeps_retrying_with_delays() {
    let clock = SimClock::new();
    let policy = helm_core::BoundedBackoff {
        max_attempts: 3,
        base_delay: Duration::from_millis(500),
        max_delay: Duration::from_secs(4),
    };
    let mut session: Session<SimInstant> =
        Session::with_retry_policy(SessionConfig::default(), Box::new(policy));

    let _ = session.connect(endpoint());
    let _ = session.channel_opened(clock.now());
    let _ = session.channel_closed();
    assert_eq!(session.state(), SessionState::Reconnecting);

    // Attempt 2 is scheduled with the base delay after attempt 1 fails.
    let actions = session.open_failed("refused");
    match actions.as_slice() {
        [SessionAction::Open { after, .. }] => assert_eq!(*after, Duration::from_millis(500)),
        other => unreachable!("expected retry open, got {other:?}"),
    }

    // Attempt 3 doubles the delay; attempt 4 exceeds the cap on attempts.
    let actions = session.open_failed("refused");
    match actions.as_slice() {
        [SessionAction::Open { after, .. }] => assert_eq!(*after, Duration::from_secs(1)),
        other => unreachable!("expected retry open, got {other:?}"),
    }
    let actions = session.open_failed("refused");
    assert!(matches!(actions.as_slice(), [SessionAction::Alert { .. }]));
    assert_eq!(session.state(), SessionState::Disconnected);
}
