//! Traffic light phase machine

use grid_traffic::simulation::{
    LightColor, LightId, LightParams, LightUpdateResult, Position, SimId, SimTrafficLight,
    DEFAULT_GREEN_LENGTH, DEFAULT_YELLOW_LENGTH,
};

fn light(params: LightParams) -> SimTrafficLight {
    SimTrafficLight::new(LightId(SimId(0)), Position::new(3, 3), params)
}

#[test]
fn test_light_defaults() {
    let light = light(LightParams::default());
    assert_eq!(light.color(), LightColor::Red);
    assert_eq!(light.ticks_at_last_change(), 0);
    assert_eq!(light.green_length, DEFAULT_GREEN_LENGTH);
    assert_eq!(light.yellow_length, DEFAULT_YELLOW_LENGTH);
    assert!(light.auto);
}

/// Red has no automatic exit
#[test]
fn test_red_light_stays_red_without_broadcast() {
    let mut light = light(LightParams {
        green_length: 10,
        ..LightParams::default()
    });

    for tick in 1..=100 {
        assert_eq!(light.update(tick), LightUpdateResult::Unchanged);
        assert_eq!(light.color(), LightColor::Red);
    }
    assert_eq!(light.ticks_at_last_change(), 0);
}

#[test]
fn test_green_yellow_red_cycle_timing() {
    let mut light = light(LightParams {
        green_length: 10,
        yellow_length: 3,
        auto: true,
    });
    assert!(light.force_color(LightColor::Green, 0));

    // Green holds while elapsed <= green_length
    for tick in 1..=10 {
        assert_eq!(light.update(tick), LightUpdateResult::Unchanged, "tick {}", tick);
    }
    assert_eq!(light.update(11), LightUpdateResult::TurnedYellow);
    assert_eq!(light.color(), LightColor::Yellow);
    assert_eq!(light.ticks_at_last_change(), 11);

    for tick in 12..=14 {
        assert_eq!(light.update(tick), LightUpdateResult::Unchanged, "tick {}", tick);
    }
    assert_eq!(light.update(15), LightUpdateResult::TurnedRed);
    assert_eq!(light.color(), LightColor::Red);
    assert_eq!(light.ticks_at_last_change(), 15);

    assert_eq!(light.update(100), LightUpdateResult::Unchanged);
}

#[test]
fn test_manual_light_never_changes_on_its_own() {
    let mut light = light(LightParams {
        auto: false,
        ..LightParams::default()
    });
    light.force_color(LightColor::Green, 0);

    for tick in 1..=50 {
        assert_eq!(light.update(tick), LightUpdateResult::Unchanged);
    }
    assert_eq!(light.color(), LightColor::Green);
    assert_eq!(light.ticks_at_last_change(), 0);
}

/// A broadcast changes the color but leaves the change tick alone
#[test]
fn test_receive_green_keeps_change_tick() {
    let mut light = light(LightParams::default());

    assert!(light.receive_green());
    assert_eq!(light.color(), LightColor::Green);
    assert_eq!(light.ticks_at_last_change(), 0);

    assert!(!light.receive_green());
    assert_eq!(light.ticks_at_last_change(), 0);
}

#[test]
fn test_broadcast_green_can_interrupt_yellow() {
    let mut light = light(LightParams::default());
    light.force_color(LightColor::Yellow, 2);

    assert!(light.receive_green());
    assert_eq!(light.color(), LightColor::Green);
    assert_eq!(light.ticks_at_last_change(), 2);
}

/// Green time after a broadcast is measured from the light's own last change
#[test]
fn test_broadcast_green_times_out_from_previous_change() {
    let mut light = light(LightParams {
        green_length: 10,
        yellow_length: 3,
        auto: true,
    });
    light.force_color(LightColor::Yellow, 2);
    light.receive_green();

    assert_eq!(light.update(12), LightUpdateResult::Unchanged);
    assert_eq!(light.update(13), LightUpdateResult::TurnedYellow);
    assert_eq!(light.ticks_at_last_change(), 13);
}

/// Forcing a color is an explicit change and records the tick
#[test]
fn test_force_color_records_change_tick() {
    let mut light = light(LightParams::default());

    assert!(light.force_color(LightColor::Green, 6));
    assert_eq!(light.ticks_at_last_change(), 6);

    assert!(!light.force_color(LightColor::Green, 9));
    assert_eq!(light.ticks_at_last_change(), 6);
}

/// Without outside help the color only moves forward and the change tick
/// only moves when the color does
#[test]
fn test_phase_progression_is_monotonic() {
    let mut light = light(LightParams {
        green_length: 4,
        yellow_length: 2,
        auto: true,
    });
    light.force_color(LightColor::Green, 0);

    let rank = |color: LightColor| match color {
        LightColor::Green => 0,
        LightColor::Yellow => 1,
        LightColor::Red => 2,
    };

    let mut previous_color = light.color();
    let mut previous_change = light.ticks_at_last_change();
    for tick in 1..=40 {
        let result = light.update(tick);
        assert!(rank(light.color()) >= rank(previous_color));
        if result == LightUpdateResult::Unchanged {
            assert_eq!(light.color(), previous_color);
            assert_eq!(light.ticks_at_last_change(), previous_change);
        } else {
            assert_eq!(rank(light.color()), rank(previous_color) + 1);
            assert_eq!(light.ticks_at_last_change(), tick);
        }
        previous_color = light.color();
        previous_change = light.ticks_at_last_change();
    }
    assert_eq!(light.color(), LightColor::Red);
}
