//! Integration tests for the action state machine and protocol codec

use tcp_action::{
    hal::{MockClock, MockDelay, MockPin},
    ActionConfig, ActionController, ActionRequest, Clock, Decoded, Level, Mode, OutputState,
    ProtocolBytes, ProtocolCodec,
};

fn controller_with(
    config: &ActionConfig,
) -> (ActionController<MockPin, MockDelay>, MockPin, MockClock) {
    let clock = MockClock::new();
    let pin = MockPin::new(Level::Low).with_clock(clock.clone());
    let delay = MockDelay::new().with_clock(clock.clone());
    let controller = ActionController::new(pin.clone(), delay, config).unwrap();
    pin.clear_writes();
    (controller, pin, clock)
}

fn controller(mode: Mode) -> (ActionController<MockPin, MockDelay>, MockPin, MockClock) {
    controller_with(&ActionConfig::default().with_mode(mode))
}

// ============================================================================
// On/Off
// ============================================================================

#[test]
fn enable_twice_stays_on_and_reasserts() {
    let (mut ctl, pin, _) = controller(Mode::OnOff);

    ctl.apply(ActionRequest::Enable).unwrap();
    ctl.apply(ActionRequest::Enable).unwrap();

    assert_eq!(ctl.state(), OutputState::On);
    assert_eq!(
        pin.writes(),
        vec![(0, Level::High), (0, Level::High)],
        "on-level must be issued each time"
    );
}

#[test]
fn encode_state_distinct_from_action_bytes() {
    let codec = ProtocolCodec::new(Mode::OnOff, ProtocolBytes::default());
    let on = codec.encode_state(OutputState::On).unwrap();
    let off = codec.encode_state(OutputState::Off).unwrap();

    assert_eq!(on, 0x01);
    assert_eq!(off, 0x00);
    assert_ne!(on, off);
    assert_eq!(codec.decode(on), Decoded::Action(ActionRequest::Enable));
    assert_eq!(codec.decode(off), Decoded::Action(ActionRequest::Disable));
}

#[test]
fn inverted_levels_complement_plain_levels() {
    let (mut plain, plain_pin, _) = controller(Mode::OnOff);
    let (mut inverted, inverted_pin, _) = controller(Mode::OnOffInverted);

    for request in [ActionRequest::Enable, ActionRequest::Disable] {
        let a = plain.apply(request).unwrap();
        let b = inverted.apply(request).unwrap();
        assert_eq!(a, b, "logical state must not depend on polarity");
        assert_eq!(plain_pin.level(), !inverted_pin.level());
    }
}

#[test]
fn inverted_codec_identical_to_plain() {
    let plain = ProtocolCodec::new(Mode::OnOff, ProtocolBytes::default());
    let inverted = ProtocolCodec::new(Mode::OnOffInverted, ProtocolBytes::default());
    for byte in 0..=u8::MAX {
        assert_eq!(plain.decode(byte), inverted.decode(byte));
    }
    assert_eq!(
        plain.encode_state(OutputState::On),
        inverted.encode_state(OutputState::On)
    );
}

// ============================================================================
// Toggle
// ============================================================================

#[test]
fn two_toggles_restore_original_level() {
    for boot_on in [false, true] {
        let config = ActionConfig::default()
            .with_mode(Mode::Toggle)
            .with_boot_on(boot_on);
        let (mut ctl, pin, _) = controller_with(&config);
        let original = pin.level();

        ctl.apply(ActionRequest::Toggle).unwrap();
        assert_eq!(pin.level(), !original);
        ctl.apply(ActionRequest::Toggle).unwrap();
        assert_eq!(pin.level(), original);
        assert_eq!(ctl.state(), OutputState::Level(original));
    }
}

#[test]
fn toggle_state_tracks_hardware_after_external_change() {
    let (mut ctl, pin, _) = controller(Mode::Toggle);
    pin.force_level(Level::High);

    // Live level wins over the recorded one
    ctl.apply(ActionRequest::Toggle).unwrap();
    assert_eq!(pin.level(), Level::Low);
    assert_eq!(ctl.state(), OutputState::Level(Level::Low));
}

// ============================================================================
// Pulse
// ============================================================================

#[test]
fn pulse_restores_resting_level_after_hold() {
    for (mode, resting) in [(Mode::PulseLow, Level::High), (Mode::PulseHigh, Level::Low)] {
        let config = ActionConfig::default().with_mode(mode).with_pulse_ms(250);
        let (mut ctl, pin, clock) = controller_with(&config);
        let before = ctl.state();
        assert_eq!(pin.level(), resting);

        ctl.apply(ActionRequest::Pulse).unwrap();

        assert_eq!(ctl.state(), before);
        assert_eq!(pin.level(), resting);

        let writes = pin.writes();
        assert_eq!(writes.len(), 2);
        let (start, active) = writes[0];
        let (end, restored) = writes[1];
        assert_eq!(active, !resting);
        assert_eq!(restored, resting);
        assert!(end - start >= 250, "{:?} held for {} ms", mode, end - start);
        assert_eq!(clock.now_ms(), 250);
    }
}

#[test]
fn pulse_uses_configured_duration() {
    let config = ActionConfig::default()
        .with_mode(Mode::PulseHigh)
        .with_pulse_ms(1200);
    let (mut ctl, pin, _) = controller_with(&config);

    ctl.apply(ActionRequest::Pulse).unwrap();
    ctl.apply(ActionRequest::Pulse).unwrap();

    let times: Vec<u64> = pin.writes().into_iter().map(|(t, _)| t).collect();
    assert_eq!(times, vec![0, 1200, 1200, 2400]);
}

// ============================================================================
// Mode mismatch
// ============================================================================

#[test]
fn requests_of_other_modes_are_ignored() {
    for mode in Mode::ALL {
        let (mut ctl, pin, _) = controller(mode);
        let before = ctl.state();
        for request in [
            ActionRequest::Enable,
            ActionRequest::Disable,
            ActionRequest::Toggle,
            ActionRequest::Pulse,
        ] {
            if !mode.accepts(request) {
                assert_eq!(ctl.apply(request).unwrap(), before);
            }
        }
        assert_eq!(pin.write_count(), 0, "{:?}", mode);
    }
}
