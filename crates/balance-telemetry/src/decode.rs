//! Controller telemetry record decoding.
//!
//! The controller publishes one flat JSON object per control cycle, e.g.
//!
//! ```json
//! {"anglex": 1.25, "gyroX": -0.4, "gyroY": 0.0, "gyroZ": 0.1, "PWM": 120, "Kp": 1.0, "Kd": 2.5}
//! ```
//!
//! Only the plotted channels and the echoed gains are read; unknown fields are
//! ignored and missing channels default to `0.0`.

use balance_errors::DecodeError;
use serde::{Deserialize, Serialize};

use crate::channel::{ChannelId, ChannelValues};

#[derive(Debug, Deserialize)]
struct RawTelemetry {
    #[serde(default, rename = "anglex")]
    angle: Option<f64>,
    #[serde(default, rename = "gyroX")]
    gyro_x: Option<f64>,
    #[serde(default, rename = "PWM")]
    pwm: Option<f64>,
    #[serde(default, rename = "Kp")]
    kp: Option<f64>,
    #[serde(default, rename = "Kd")]
    kd: Option<f64>,
}

/// Gains the controller reports it is currently running with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviceGains {
    pub kp: f64,
    pub kd: f64,
}

/// Result of decoding one telemetry record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodedTelemetry {
    pub values: ChannelValues,
    /// Present only when the record carries both `Kp` and `Kd`
    pub reported_gains: Option<DeviceGains>,
}

/// Decode a raw telemetry payload.
///
/// # Errors
///
/// Returns [`DecodeError`] when the payload is empty, not UTF-8, not valid
/// JSON, not a JSON object, or when a known field holds a non-numeric value.
pub fn decode_payload(payload: &[u8]) -> Result<DecodedTelemetry, DecodeError> {
    if payload.is_empty() {
        return Err(DecodeError::Empty);
    }

    let text = std::str::from_utf8(payload).map_err(DecodeError::invalid_utf8)?;
    let document: serde_json::Value =
        serde_json::from_str(text).map_err(DecodeError::malformed)?;
    if !document.is_object() {
        return Err(DecodeError::malformed("telemetry record is not a JSON object"));
    }
    let raw = RawTelemetry::deserialize(document).map_err(DecodeError::malformed)?;

    let mut values = ChannelValues::ZERO;
    values.set(ChannelId::Angle, raw.angle.unwrap_or_default());
    values.set(ChannelId::AngularVelocity, raw.gyro_x.unwrap_or_default());
    values.set(ChannelId::ActuatorCommand, raw.pwm.unwrap_or_default());

    let reported_gains = match (raw.kp, raw.kd) {
        (Some(kp), Some(kd)) => Some(DeviceGains { kp, kd }),
        _ => None,
    };

    Ok(DecodedTelemetry {
        values,
        reported_gains,
    })
}
