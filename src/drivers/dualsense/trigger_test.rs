use std::error::Error;

use crate::drivers::dualsense::{
    error::DriverError,
    hid_report::PackedControlBlock,
    trigger::{TriggerEffect, TriggerEffectPlan, TriggerTarget, ZoneBitmap},
};

fn assert_out_of_range(effect: TriggerEffect, expected_field: &str) {
    match effect.encode() {
        Err(DriverError::ParameterOutOfRange { field, .. }) => {
            assert_eq!(field, expected_field, "{effect:?}")
        }
        result => panic!(
            "Expected {expected_field} to be out of range for {effect:?}, got {result:?}"
        ),
    }
}

#[test]
fn test_off() -> Result<(), Box<dyn Error>> {
    let plan = TriggerEffect::Off.encode()?;
    assert_eq!(
        plan,
        TriggerEffectPlan {
            mode: 0x05,
            params: [0; 9]
        }
    );
    Ok(())
}

#[test]
fn test_feedback() -> Result<(), Box<dyn Error>> {
    let plan = TriggerEffect::Feedback {
        position: 0,
        strength: 8,
    }
    .encode()?;
    assert_eq!(plan.mode, 0x21);
    assert_eq!(plan.params, [0xff, 0x03, 0xff, 0xff, 0xff, 0x3f, 0, 0, 0]);
    Ok(())
}

#[test]
fn test_feedback_matches_raw() -> Result<(), Box<dyn Error>> {
    for position in 0..=9 {
        for strength in 1..=8 {
            let plan = TriggerEffect::Feedback { position, strength }.encode()?;
            let mut strengths = [0; 10];
            for zone in strengths.iter_mut().skip(position as usize) {
                *zone = strength;
            }
            let raw = TriggerEffect::FeedbackRaw { strengths }.encode()?;
            assert_eq!(plan, raw, "position {position} strength {strength}");
        }
    }
    Ok(())
}

#[test]
fn test_weapon() -> Result<(), Box<dyn Error>> {
    let plan = TriggerEffect::Weapon {
        start: 2,
        end: 5,
        strength: 3,
    }
    .encode()?;
    assert_eq!(plan.mode, 0x25);
    assert_eq!(plan.params, [0x24, 0x00, 0x02, 0, 0, 0, 0, 0, 0]);

    for start in 2..=7 {
        for end in start + 1..=8 {
            let plan = TriggerEffect::Weapon {
                start,
                end,
                strength: 8,
            }
            .encode()?;
            let zones = u16::from_le_bytes([plan.params[0], plan.params[1]]);
            assert_eq!(zones.count_ones(), 2);
            assert_eq!(zones, (1 << start) | (1 << end));
        }
    }
    Ok(())
}

#[test]
fn test_weapon_out_of_range() {
    let effect = TriggerEffect::Weapon {
        start: 1,
        end: 5,
        strength: 3,
    };
    assert_out_of_range(effect, "start");
    let effect = TriggerEffect::Weapon {
        start: 4,
        end: 4,
        strength: 3,
    };
    assert_out_of_range(effect, "end");
    let effect = TriggerEffect::Weapon {
        start: 4,
        end: 6,
        strength: 0,
    };
    assert_out_of_range(effect, "strength");
}

#[test]
fn test_bow() -> Result<(), Box<dyn Error>> {
    let plan = TriggerEffect::Bow {
        start: 0,
        end: 8,
        strength: 2,
        snap_force: 3,
    }
    .encode()?;
    assert_eq!(plan.mode, 0x22);
    assert_eq!(plan.params, [0x01, 0x01, 0x11, 0, 0, 0, 0, 0, 0]);
    Ok(())
}

#[test]
fn test_bow_out_of_range() {
    let effect = TriggerEffect::Bow {
        start: 0,
        end: 1,
        strength: 9,
        snap_force: 1,
    };
    assert_out_of_range(effect, "strength");
    let effect = TriggerEffect::Bow {
        start: 3,
        end: 9,
        strength: 1,
        snap_force: 1,
    };
    assert_out_of_range(effect, "end");
    let effect = TriggerEffect::Bow {
        start: 3,
        end: 5,
        strength: 1,
        snap_force: 0,
    };
    assert_out_of_range(effect, "snap_force");
}

#[test]
fn test_galloping() -> Result<(), Box<dyn Error>> {
    // Frequencies above 8 are only warned about
    let plan = TriggerEffect::Galloping {
        start: 0,
        end: 9,
        first_foot: 2,
        second_foot: 5,
        frequency: 12,
    }
    .encode()?;
    assert_eq!(plan.mode, 0x23);
    assert_eq!(plan.params, [0x01, 0x02, 0x15, 12, 0, 0, 0, 0, 0]);

    let effect = TriggerEffect::Galloping {
        start: 0,
        end: 9,
        first_foot: 4,
        second_foot: 4,
        frequency: 1,
    };
    assert_out_of_range(effect, "second_foot");
    let effect = TriggerEffect::Galloping {
        start: 0,
        end: 9,
        first_foot: 7,
        second_foot: 7,
        frequency: 1,
    };
    assert_out_of_range(effect, "first_foot");
    let effect = TriggerEffect::Galloping {
        start: 0,
        end: 9,
        first_foot: 1,
        second_foot: 2,
        frequency: 0,
    };
    assert_out_of_range(effect, "frequency");
    Ok(())
}

#[test]
fn test_machine() -> Result<(), Box<dyn Error>> {
    let plan = TriggerEffect::Machine {
        start: 1,
        end: 9,
        strength_a: 7,
        strength_b: 3,
        frequency: 5,
        period: 20,
    }
    .encode()?;
    assert_eq!(plan.mode, 0x27);
    assert_eq!(plan.params, [0x02, 0x02, 0x1f, 5, 20, 0, 0, 0, 0]);

    let effect = TriggerEffect::Machine {
        start: 0,
        end: 9,
        strength_a: 1,
        strength_b: 1,
        frequency: 5,
        period: 0,
    };
    assert_out_of_range(effect, "start");
    let effect = TriggerEffect::Machine {
        start: 1,
        end: 9,
        strength_a: 1,
        strength_b: 8,
        frequency: 5,
        period: 0,
    };
    assert_out_of_range(effect, "strength_b");
    Ok(())
}

#[test]
fn test_vibration() -> Result<(), Box<dyn Error>> {
    let plan = TriggerEffect::Vibration {
        position: 9,
        amplitude: 8,
        frequency: 30,
    }
    .encode()?;
    assert_eq!(plan.mode, 0x26);
    assert_eq!(plan.params, [0x00, 0x02, 0x00, 0x00, 0x00, 0x38, 0, 0, 30]);

    let raw = TriggerEffect::VibrationRaw {
        amplitudes: [0, 0, 0, 0, 0, 0, 0, 0, 0, 8],
        frequency: 30,
    }
    .encode()?;
    assert_eq!(plan, raw);

    let effect = TriggerEffect::Vibration {
        position: 3,
        amplitude: 2,
        frequency: 0,
    };
    assert_out_of_range(effect, "frequency");
    let effect = TriggerEffect::Vibration {
        position: 10,
        amplitude: 2,
        frequency: 1,
    };
    assert_out_of_range(effect, "position");
    Ok(())
}

#[test]
fn test_raw_arrays_out_of_range() {
    let effect = TriggerEffect::FeedbackRaw {
        strengths: [0, 1, 2, 9, 0, 0, 0, 0, 0, 0],
    };
    assert_out_of_range(effect, "strengths[3]");
    let effect = TriggerEffect::VibrationRaw {
        amplitudes: [0, 0, 0, 0, 0, 0, 0, 0, 0, 10],
        frequency: 0,
    };
    assert_out_of_range(effect, "amplitudes[9]");
}

#[test]
fn test_raw_is_verbatim() -> Result<(), Box<dyn Error>> {
    let params = [0xff, 0xee, 0xdd, 0xcc, 0xbb, 0xaa, 0x99, 0x88, 0x77];
    let plan = TriggerEffect::Raw { mode: 0xfc, params }.encode()?;
    assert_eq!(plan, TriggerEffectPlan { mode: 0xfc, params });
    Ok(())
}

#[test]
fn test_zone_bitmap() {
    let mut bitmap = ZoneBitmap::new();
    bitmap.set(1, 2);
    bitmap.set(1, 4);
    bitmap.set(10, 8);
    assert_eq!(bitmap.active(), 0b10);

    let mut params = [0; 9];
    bitmap.write_params(&mut params);
    // Zone 1 strength 4 is stored as 3 in bits 3-5
    assert_eq!(params, [0x02, 0x00, 0x18, 0, 0, 0, 0, 0, 0]);
}

#[test]
fn test_apply_plan() -> Result<(), Box<dyn Error>> {
    let plan = TriggerEffect::Weapon {
        start: 2,
        end: 5,
        strength: 3,
    }
    .encode()?;

    let mut state = PackedControlBlock::default();
    plan.apply(TriggerTarget::Left, &mut state);
    assert!(state.allow_left_trigger_ffb);
    assert!(!state.allow_right_trigger_ffb);
    assert_eq!(state.left_trigger_mode, 0x25);
    assert_eq!(state.right_trigger_mode, 0x25);
    assert_eq!(state.left_trigger_params, [0x24, 0, 0x02, 0, 0, 0, 0, 0, 0, 0]);
    assert_eq!(state.left_trigger_params, state.right_trigger_params);

    let mut state = PackedControlBlock::default();
    plan.apply(TriggerTarget::Right, &mut state);
    assert!(!state.allow_left_trigger_ffb);
    assert!(state.allow_right_trigger_ffb);

    let mut state = PackedControlBlock::default();
    plan.apply(TriggerTarget::Both, &mut state);
    assert!(state.allow_left_trigger_ffb);
    assert!(state.allow_right_trigger_ffb);

    Ok(())
}
