//! Spray nozzle state
//!
//! The gun carries an upper and a lower nozzle, each with a gas and a liquid
//! valve. Liquid is never commanded without gas on the same nozzle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which nozzle of the spray gun
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Nozzle {
    Upper,
    Lower,
}

impl fmt::Display for Nozzle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upper => write!(f, "upper"),
            Self::Lower => write!(f, "lower"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
struct NozzleFlags {
    #[serde(default)]
    upper_gas: bool,
    #[serde(default)]
    upper_liquid: bool,
    #[serde(default)]
    lower_gas: bool,
    #[serde(default)]
    lower_liquid: bool,
}

/// Valve state of both nozzles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "NozzleFlags", into = "NozzleFlags")]
pub struct NozzleState {
    upper_gas: bool,
    upper_liquid: bool,
    lower_gas: bool,
    lower_liquid: bool,
}

impl NozzleState {
    /// All valves closed
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a state, turning gas on wherever liquid is requested
    pub fn with_flags(upper_gas: bool, upper_liquid: bool, lower_gas: bool, lower_liquid: bool) -> Self {
        Self {
            upper_gas: upper_gas || upper_liquid,
            upper_liquid,
            lower_gas: lower_gas || lower_liquid,
            lower_liquid,
        }
    }

    pub fn gas(&self, nozzle: Nozzle) -> bool {
        match nozzle {
            Nozzle::Upper => self.upper_gas,
            Nozzle::Lower => self.lower_gas,
        }
    }

    pub fn liquid(&self, nozzle: Nozzle) -> bool {
        match nozzle {
            Nozzle::Upper => self.upper_liquid,
            Nozzle::Lower => self.lower_liquid,
        }
    }

    /// Switch gas; closing gas also closes liquid on that nozzle
    pub fn set_gas(&mut self, nozzle: Nozzle, on: bool) {
        let (gas, liquid) = self.valves_mut(nozzle);
        *gas = on;
        if !on {
            *liquid = false;
        }
    }

    /// Switch liquid; opening liquid also opens gas on that nozzle
    pub fn set_liquid(&mut self, nozzle: Nozzle, on: bool) {
        let (gas, liquid) = self.valves_mut(nozzle);
        *liquid = on;
        if on {
            *gas = true;
        }
    }

    fn valves_mut(&mut self, nozzle: Nozzle) -> (&mut bool, &mut bool) {
        match nozzle {
            Nozzle::Upper => (&mut self.upper_gas, &mut self.upper_liquid),
            Nozzle::Lower => (&mut self.lower_gas, &mut self.lower_liquid),
        }
    }

    /// Decimal-digit packed status word: `1000·UG + 100·UL + 10·LG + LL`.
    ///
    /// Each valve occupies one decimal digit of the value sent to the device.
    pub fn status_code(&self) -> u16 {
        1000 * u16::from(self.upper_gas)
            + 100 * u16::from(self.upper_liquid)
            + 10 * u16::from(self.lower_gas)
            + u16::from(self.lower_liquid)
    }
}

impl From<NozzleFlags> for NozzleState {
    fn from(flags: NozzleFlags) -> Self {
        Self::with_flags(
            flags.upper_gas,
            flags.upper_liquid,
            flags.lower_gas,
            flags.lower_liquid,
        )
    }
}

impl From<NozzleState> for NozzleFlags {
    fn from(state: NozzleState) -> Self {
        Self {
            upper_gas: state.upper_gas,
            upper_liquid: state.upper_liquid,
            lower_gas: state.lower_gas,
            lower_liquid: state.lower_liquid,
        }
    }
}
