use std::error::Error;
use std::fmt::Display;

use clap::{Subcommand, ValueEnum};

use crate::drivers::dualsense::trigger::{
    TriggerEffect, TriggerTarget, TRIGGER_PLAN_PARAMS, TRIGGER_ZONES,
};

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum TriggerSide {
    Left,
    Right,
    Both,
}

impl From<TriggerSide> for TriggerTarget {
    fn from(value: TriggerSide) -> Self {
        match value {
            TriggerSide::Left => Self::Left,
            TriggerSide::Right => Self::Right,
            TriggerSide::Both => Self::Both,
        }
    }
}

impl Display for TriggerSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            TriggerSide::Left => "left",
            TriggerSide::Right => "right",
            TriggerSide::Both => "both",
        };
        write!(f, "{}", value)
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum TriggerCommand {
    /// Turn off the trigger effect
    Off,
    /// Resist from the given position to the end of the travel
    Feedback {
        /// Start position (0-9)
        position: u8,
        /// Resistance (1-8)
        strength: u8,
    },
    /// Resist between two positions, then snap like a gun trigger
    Weapon {
        /// Start position (2-7)
        start: u8,
        /// End position (start+1 to 8)
        end: u8,
        /// Resistance (1-8)
        strength: u8,
    },
    /// Resist between two positions, then snap back like a bowstring
    Bow {
        /// Start position (0-8)
        start: u8,
        /// End position (start+1 to 8)
        end: u8,
        /// Resistance (1-8)
        strength: u8,
        /// Strength of the snap back (1-8)
        snap_force: u8,
    },
    /// Rhythmic kicks like a galloping horse
    Galloping {
        /// Start position (0-8)
        start: u8,
        /// End position (start+1 to 9)
        end: u8,
        /// Position of the first foot in the cycle (0-6)
        first_foot: u8,
        /// Position of the second foot in the cycle (first_foot+1 to 7)
        second_foot: u8,
        /// Cycles per second, felt best up to 8
        frequency: u8,
    },
    /// Vibrate between two amplitudes like a machine
    Machine {
        /// Start position (1-8)
        start: u8,
        /// End position (start+1 to 9)
        end: u8,
        /// First amplitude (0-7)
        strength_a: u8,
        /// Second amplitude (0-7)
        strength_b: u8,
        /// Vibration frequency in Hz
        frequency: u8,
        /// Time between the amplitudes in tenths of a second
        period: u8,
    },
    /// Vibrate from the given position to the end of the travel
    Vibration {
        /// Start position (0-9)
        position: u8,
        /// Vibration strength (1-8)
        amplitude: u8,
        /// Vibration frequency in Hz
        frequency: u8,
    },
    /// Set the resistance of each of the 10 zones (0-8 each)
    FeedbackRaw {
        #[arg(num_args = TRIGGER_ZONES, required = true)]
        strengths: Vec<u8>,
    },
    /// Set the amplitude of each of the 10 zones (0-8 each) followed by the
    /// frequency
    VibrationRaw {
        #[arg(num_args = TRIGGER_ZONES + 1, required = true)]
        values: Vec<u8>,
    },
    /// Send a motor mode and up to 9 parameters as-is
    Raw {
        #[arg(value_parser = parse_byte)]
        mode: u8,
        #[arg(num_args = 0..=TRIGGER_PLAN_PARAMS, value_parser = parse_byte)]
        params: Vec<u8>,
    },
}

impl TriggerCommand {
    /// Convert the command into the effect to send to the controller
    pub fn into_effect(self) -> Result<TriggerEffect, Box<dyn Error>> {
        let effect = match self {
            TriggerCommand::Off => TriggerEffect::Off,
            TriggerCommand::Feedback { position, strength } => {
                TriggerEffect::Feedback { position, strength }
            }
            TriggerCommand::Weapon {
                start,
                end,
                strength,
            } => TriggerEffect::Weapon {
                start,
                end,
                strength,
            },
            TriggerCommand::Bow {
                start,
                end,
                strength,
                snap_force,
            } => TriggerEffect::Bow {
                start,
                end,
                strength,
                snap_force,
            },
            TriggerCommand::Galloping {
                start,
                end,
                first_foot,
                second_foot,
                frequency,
            } => TriggerEffect::Galloping {
                start,
                end,
                first_foot,
                second_foot,
                frequency,
            },
            TriggerCommand::Machine {
                start,
                end,
                strength_a,
                strength_b,
                frequency,
                period,
            } => TriggerEffect::Machine {
                start,
                end,
                strength_a,
                strength_b,
                frequency,
                period,
            },
            TriggerCommand::Vibration {
                position,
                amplitude,
                frequency,
            } => TriggerEffect::Vibration {
                position,
                amplitude,
                frequency,
            },
            TriggerCommand::FeedbackRaw { strengths } => {
                let strengths = strengths.try_into().map_err(|v: Vec<u8>| {
                    format!("Expected {TRIGGER_ZONES} strengths, got {}", v.len())
                })?;
                TriggerEffect::FeedbackRaw { strengths }
            }
            TriggerCommand::VibrationRaw { mut values } => {
                let Some(frequency) = values.pop() else {
                    return Err("Missing vibration frequency".into());
                };
                let amplitudes = values.try_into().map_err(|v: Vec<u8>| {
                    format!("Expected {TRIGGER_ZONES} amplitudes, got {}", v.len())
                })?;
                TriggerEffect::VibrationRaw {
                    amplitudes,
                    frequency,
                }
            }
            TriggerCommand::Raw { mode, params } => {
                if params.len() > TRIGGER_PLAN_PARAMS {
                    let msg = format!("At most {TRIGGER_PLAN_PARAMS} parameters are allowed");
                    return Err(msg.into());
                }
                let mut buf = [0; TRIGGER_PLAN_PARAMS];
                buf[..params.len()].copy_from_slice(&params);
                TriggerEffect::Raw { mode, params: buf }
            }
        };

        Ok(effect)
    }
}

/// Parse a byte given in decimal or with a "0x" prefix in hexadecimal
pub fn parse_byte(value: &str) -> Result<u8, String> {
    let result = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => value.parse::<u8>(),
    };
    result.map_err(|e| format!("invalid byte '{value}': {e}"))
}
