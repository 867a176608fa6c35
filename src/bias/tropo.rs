#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

fn default_zenith_delay_m() -> f64 {
    2.3
}

fn default_scale_height_m() -> f64 {
    7_000.0
}

/// Exponential troposphere delay, function of the receiver altitude only.
/// The zenith delay is applied to every line of sight, there is no mapping function.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExponentialTroposphere {
    /// Zenith delay at sea level, in meters of delay
    #[cfg_attr(feature = "serde", serde(default = "default_zenith_delay_m"))]
    pub zenith_delay_m: f64,
    /// Scale height (m)
    #[cfg_attr(feature = "serde", serde(default = "default_scale_height_m"))]
    pub scale_height_m: f64,
}

impl Default for ExponentialTroposphere {
    fn default() -> Self {
        Self {
            zenith_delay_m: default_zenith_delay_m(),
            scale_height_m: default_scale_height_m(),
        }
    }
}

impl ExponentialTroposphere {
    /// Delay (m) at given altitude above the ellipsoid (m)
    pub fn delay_m(&self, alt_m: f64) -> f64 {
        self.zenith_delay_m * (-alt_m / self.scale_height_m).exp()
    }
}
