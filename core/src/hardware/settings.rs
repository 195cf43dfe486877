use serde::{Deserialize, Serialize};

use super::{HardwareError, HardwareResult};
use crate::prelude::ELEMENT_COUNT;

/// Largest value the beamformer gain register accepts.
pub const MAX_ELEMENT_GAIN: u8 = 127;

/// Transmit attenuation applied when an external source is used.
pub const TX_DISABLED_GAIN_DB: f64 = -80.0;

/// Where the received tone comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalSource {
    /// External free-running 10.5 GHz module; the board transmitter is muted.
    #[default]
    Hb100,
    Out1,
    Out2,
}

impl std::str::FromStr for SignalSource {
    type Err = HardwareError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "hb100" => Ok(Self::Hb100),
            "out1" => Ok(Self::Out1),
            "out2" => Ok(Self::Out2),
            other => Err(HardwareError::InvalidSetting(format!(
                "unknown signal source '{other}' (expected hb100, out1 or out2)"
            ))),
        }
    }
}

impl std::fmt::Display for SignalSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Hb100 => "HB100",
            Self::Out1 => "OUT1",
            Self::Out2 => "OUT2",
        };
        f.write_str(name)
    }
}

/// GPIO lines that select the LO source and the transmit port.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpioRouting {
    /// Onboard PLL drives the LO (otherwise the external LO input).
    pub onboard_lo: bool,
    /// LO goes to the transmit circuitry (otherwise to LO_OUT).
    pub lo_to_tx: bool,
    /// Transmit switch on OUT1 (otherwise OUT2).
    pub tx_out1: bool,
    pub divider_reset: bool,
    pub divider_select: [bool; 3],
    pub tx_gain_override_db: Option<f64>,
}

impl GpioRouting {
    pub fn for_source(source: SignalSource) -> Self {
        let base = Self {
            onboard_lo: true,
            lo_to_tx: true,
            tx_out1: false,
            divider_reset: true,
            divider_select: [false; 3],
            tx_gain_override_db: None,
        };
        match source {
            SignalSource::Out1 => Self {
                tx_out1: true,
                ..base
            },
            SignalSource::Out2 => base,
            SignalSource::Hb100 => Self {
                tx_gain_override_db: Some(TX_DISABLED_GAIN_DB),
                ..base
            },
        }
    }
}

/// Everything the front end is programmed with before the sweep starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HardwareSettings {
    pub signal_source: SignalSource,
    pub sample_rate_hz: f64,
    pub tx_lo_hz: f64,
    pub rx_lo_hz: f64,
    /// Mixer LO, `signal + rx_lo`.
    pub mixer_lo_hz: f64,
    pub rx_gain_db: f64,
    pub tx_gain_db: f64,
    pub buffer_size: usize,
    pub element_gains: [u8; ELEMENT_COUNT],
    pub routing: GpioRouting,
}

impl HardwareSettings {
    pub fn validate(&self) -> HardwareResult<()> {
        if !self.sample_rate_hz.is_finite() || self.sample_rate_hz <= 0.0 {
            return Err(HardwareError::InvalidSetting(format!(
                "sample rate {} must be positive",
                self.sample_rate_hz
            )));
        }
        if self.buffer_size == 0 {
            return Err(HardwareError::InvalidSetting(
                "buffer size must be non-zero".into(),
            ));
        }
        if let Some((idx, gain)) = self
            .element_gains
            .iter()
            .enumerate()
            .find(|&(_, &gain)| gain > MAX_ELEMENT_GAIN)
        {
            return Err(HardwareError::InvalidSetting(format!(
                "element {} gain {} exceeds {}",
                idx + 1,
                gain,
                MAX_ELEMENT_GAIN
            )));
        }
        Ok(())
    }

    /// Transmit gain after the routing's override.
    pub fn effective_tx_gain_db(&self) -> f64 {
        self.routing.tx_gain_override_db.unwrap_or(self.tx_gain_db)
    }
}
