//! Adaptive trigger effects.
//!
//! Every effect is reduced to a motor mode byte and 9 parameter bytes. Most
//! effects address the 10 zones along the trigger travel with a zone bitmap:
//! a 10-bit set of active zones in the first two parameter bytes, followed by
//! a 3-bit strength per zone.
use packed_struct::prelude::*;

use super::error::{check_range, DriverError};
use super::hid_report::PackedControlBlock;

/// Number of zones along the trigger travel
pub const TRIGGER_ZONES: usize = 10;
/// Number of parameter bytes in an effect plan
pub const TRIGGER_PLAN_PARAMS: usize = 9;

/// Motor modes understood by the trigger firmware
#[derive(PrimitiveEnum_u8, Clone, Copy, PartialEq, Debug)]
pub enum TriggerMode {
    Off = 0x05,
    Feedback = 0x21,
    Bow = 0x22,
    Galloping = 0x23,
    Weapon = 0x25,
    Vibration = 0x26,
    Machine = 0x27,
}

/// Which trigger(s) an effect is applied to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerTarget {
    Left,
    Right,
    Both,
}

/// High-level description of an adaptive trigger effect
#[derive(Debug, Clone, PartialEq)]
pub enum TriggerEffect {
    Off,
    Feedback {
        position: u8,
        strength: u8,
    },
    Weapon {
        start: u8,
        end: u8,
        strength: u8,
    },
    Bow {
        start: u8,
        end: u8,
        strength: u8,
        snap_force: u8,
    },
    Galloping {
        start: u8,
        end: u8,
        first_foot: u8,
        second_foot: u8,
        frequency: u8,
    },
    Machine {
        start: u8,
        end: u8,
        strength_a: u8,
        strength_b: u8,
        frequency: u8,
        period: u8,
    },
    Vibration {
        position: u8,
        amplitude: u8,
        frequency: u8,
    },
    FeedbackRaw {
        strengths: [u8; TRIGGER_ZONES],
    },
    VibrationRaw {
        amplitudes: [u8; TRIGGER_ZONES],
        frequency: u8,
    },
    /// Mode and parameters sent to the device as-is
    Raw {
        mode: u8,
        params: [u8; TRIGGER_PLAN_PARAMS],
    },
}

/// Encoded form of a trigger effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TriggerEffectPlan {
    pub mode: u8,
    pub params: [u8; TRIGGER_PLAN_PARAMS],
}

impl TriggerEffectPlan {
    /// Write the plan into both trigger parameter arrays of the given control
    /// block and enable the trigger(s) selected by `target`.
    pub fn apply(&self, target: TriggerTarget, state: &mut PackedControlBlock) {
        state.allow_left_trigger_ffb = matches!(target, TriggerTarget::Left | TriggerTarget::Both);
        state.allow_right_trigger_ffb =
            matches!(target, TriggerTarget::Right | TriggerTarget::Both);

        state.right_trigger_mode = self.mode;
        state.left_trigger_mode = self.mode;
        state.right_trigger_params[..TRIGGER_PLAN_PARAMS].copy_from_slice(&self.params);
        state.left_trigger_params[..TRIGGER_PLAN_PARAMS].copy_from_slice(&self.params);
    }
}

/// Set of active zones with a strength for each of them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ZoneBitmap {
    active: u16,
    strengths: u32,
}

impl ZoneBitmap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a bitmap from per-zone strengths, where 0 leaves the zone
    /// inactive and 1-8 activates it.
    pub fn from_strengths(strengths: &[u8; TRIGGER_ZONES]) -> Self {
        let mut bitmap = Self::new();
        for (zone, strength) in strengths.iter().enumerate() {
            if *strength > 0 {
                bitmap.set(zone, *strength);
            }
        }
        bitmap
    }

    /// Activate the given zone with a strength of 1-8
    pub fn set(&mut self, zone: usize, strength: u8) {
        if zone >= TRIGGER_ZONES {
            return;
        }
        let value = (strength.saturating_sub(1) & 0x07) as u32;
        self.active |= 1 << zone;
        self.strengths &= !(0x07 << (3 * zone));
        self.strengths |= value << (3 * zone);
    }

    /// Active zones, one bit per zone
    pub fn active(&self) -> u16 {
        self.active
    }

    /// Write the active zones to params 0-1 and the strengths to params 2-5
    pub fn write_params(&self, params: &mut [u8; TRIGGER_PLAN_PARAMS]) {
        params[..2].copy_from_slice(&self.active.to_le_bytes());
        params[2..6].copy_from_slice(&self.strengths.to_le_bytes());
    }
}

/// Zone bitmap with only the start and end zones active
fn zone_pair(start: u8, end: u8) -> u16 {
    (1 << start) | (1 << end)
}

fn check_strengths(field: &str, values: &[u8; TRIGGER_ZONES]) -> Result<(), DriverError> {
    for (i, value) in values.iter().enumerate() {
        check_range(format!("{field}[{i}]").as_str(), *value, 0, 8)?;
    }
    Ok(())
}

impl TriggerEffect {
    /// Check the effect parameters against the ranges the firmware accepts.
    /// Out of range values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), DriverError> {
        match *self {
            TriggerEffect::Off | TriggerEffect::Raw { .. } => (),
            TriggerEffect::Feedback { position, strength } => {
                check_range("position", position, 0, 9)?;
                check_range("strength", strength, 1, 8)?;
            }
            TriggerEffect::Weapon {
                start,
                end,
                strength,
            } => {
                check_range("start", start, 2, 7)?;
                check_range("end", end, start + 1, 8)?;
                check_range("strength", strength, 1, 8)?;
            }
            TriggerEffect::Bow {
                start,
                end,
                strength,
                snap_force,
            } => {
                check_range("start", start, 0, 8)?;
                check_range("end", end, start + 1, 8)?;
                check_range("strength", strength, 1, 8)?;
                check_range("snap_force", snap_force, 1, 8)?;
            }
            TriggerEffect::Galloping {
                start,
                end,
                first_foot,
                second_foot,
                frequency,
            } => {
                check_range("start", start, 0, 8)?;
                check_range("end", end, start + 1, 9)?;
                check_range("first_foot", first_foot, 0, 6)?;
                check_range("second_foot", second_foot, first_foot + 1, 7)?;
                check_range("frequency", frequency, 1, u8::MAX)?;
                if frequency > 8 {
                    log::warn!("Galloping frequency {frequency} is above 8 and may not be felt");
                }
            }
            TriggerEffect::Machine {
                start,
                end,
                strength_a,
                strength_b,
                frequency,
                ..
            } => {
                check_range("start", start, 1, 8)?;
                check_range("end", end, start + 1, 9)?;
                check_range("strength_a", strength_a, 0, 7)?;
                check_range("strength_b", strength_b, 0, 7)?;
                check_range("frequency", frequency, 1, u8::MAX)?;
            }
            TriggerEffect::Vibration {
                position,
                amplitude,
                frequency,
            } => {
                check_range("position", position, 0, 9)?;
                check_range("amplitude", amplitude, 1, 8)?;
                check_range("frequency", frequency, 1, u8::MAX)?;
            }
            TriggerEffect::FeedbackRaw { ref strengths } => {
                check_strengths("strengths", strengths)?;
            }
            TriggerEffect::VibrationRaw { ref amplitudes, .. } => {
                check_strengths("amplitudes", amplitudes)?;
            }
        }
        Ok(())
    }

    /// Validate the effect and encode it into a mode and parameter bytes
    pub fn encode(&self) -> Result<TriggerEffectPlan, DriverError> {
        self.validate()?;

        let mut params = [0u8; TRIGGER_PLAN_PARAMS];
        let mode = match *self {
            TriggerEffect::Off => TriggerMode::Off,
            TriggerEffect::Feedback { position, strength } => {
                let mut bitmap = ZoneBitmap::new();
                for zone in position as usize..TRIGGER_ZONES {
                    bitmap.set(zone, strength);
                }
                bitmap.write_params(&mut params);
                TriggerMode::Feedback
            }
            TriggerEffect::Weapon {
                start,
                end,
                strength,
            } => {
                params[..2].copy_from_slice(&zone_pair(start, end).to_le_bytes());
                params[2] = strength - 1;
                TriggerMode::Weapon
            }
            TriggerEffect::Bow {
                start,
                end,
                strength,
                snap_force,
            } => {
                params[..2].copy_from_slice(&zone_pair(start, end).to_le_bytes());
                params[2] = (strength - 1) | ((snap_force - 1) << 3);
                TriggerMode::Bow
            }
            TriggerEffect::Galloping {
                start,
                end,
                first_foot,
                second_foot,
                frequency,
            } => {
                params[..2].copy_from_slice(&zone_pair(start, end).to_le_bytes());
                params[2] = second_foot | (first_foot << 3);
                params[3] = frequency;
                TriggerMode::Galloping
            }
            TriggerEffect::Machine {
                start,
                end,
                strength_a,
                strength_b,
                frequency,
                period,
            } => {
                params[..2].copy_from_slice(&zone_pair(start, end).to_le_bytes());
                params[2] = strength_a | (strength_b << 3);
                params[3] = frequency;
                params[4] = period;
                TriggerMode::Machine
            }
            TriggerEffect::Vibration {
                position,
                amplitude,
                frequency,
            } => {
                let mut bitmap = ZoneBitmap::new();
                for zone in position as usize..TRIGGER_ZONES {
                    bitmap.set(zone, amplitude);
                }
                bitmap.write_params(&mut params);
                params[8] = frequency;
                TriggerMode::Vibration
            }
            TriggerEffect::FeedbackRaw { ref strengths } => {
                ZoneBitmap::from_strengths(strengths).write_params(&mut params);
                TriggerMode::Feedback
            }
            TriggerEffect::VibrationRaw {
                ref amplitudes,
                frequency,
            } => {
                ZoneBitmap::from_strengths(amplitudes).write_params(&mut params);
                params[8] = frequency;
                TriggerMode::Vibration
            }
            TriggerEffect::Raw { mode, params } => {
                return Ok(TriggerEffectPlan { mode, params });
            }
        };

        Ok(TriggerEffectPlan {
            mode: mode.to_primitive(),
            params,
        })
    }
}
