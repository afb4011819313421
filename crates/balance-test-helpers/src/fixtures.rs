//! Controller telemetry record builders.
//!
//! Records serialize to the same flat JSON object the controller publishes on
//! its data topic, so tests can feed them straight into a bus or an ingestor.

use serde::Serialize;

/// One telemetry record as the controller sends it.
///
/// Fields set to `None` are left out of the JSON entirely.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TelemetryRecord {
    #[serde(rename = "anglex", skip_serializing_if = "Option::is_none")]
    pub angle: Option<f64>,
    #[serde(rename = "gyroX", skip_serializing_if = "Option::is_none")]
    pub gyro_x: Option<f64>,
    #[serde(rename = "gyroY", skip_serializing_if = "Option::is_none")]
    pub gyro_y: Option<f64>,
    #[serde(rename = "gyroZ", skip_serializing_if = "Option::is_none")]
    pub gyro_z: Option<f64>,
    #[serde(rename = "PWM", skip_serializing_if = "Option::is_none")]
    pub pwm: Option<f64>,
    #[serde(rename = "Kp", skip_serializing_if = "Option::is_none")]
    pub kp: Option<f64>,
    #[serde(rename = "Kd", skip_serializing_if = "Option::is_none")]
    pub kd: Option<f64>,
}

impl TelemetryRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record carrying the three plotted channels.
    pub fn channels(angle: f64, gyro_x: f64, pwm: f64) -> Self {
        Self {
            angle: Some(angle),
            gyro_x: Some(gyro_x),
            pwm: Some(pwm),
            ..Self::default()
        }
    }

    /// Every field the controller sends, with a balanced, idle robot.
    pub fn full() -> Self {
        Self {
            angle: Some(0.0),
            gyro_x: Some(0.0),
            gyro_y: Some(0.0),
            gyro_z: Some(0.0),
            pwm: Some(0.0),
            kp: Some(1.0),
            kd: Some(1.0),
        }
    }

    pub fn with_angle(mut self, angle: f64) -> Self {
        self.angle = Some(angle);
        self
    }

    pub fn with_gyro_x(mut self, gyro_x: f64) -> Self {
        self.gyro_x = Some(gyro_x);
        self
    }

    pub fn with_pwm(mut self, pwm: f64) -> Self {
        self.pwm = Some(pwm);
        self
    }

    pub fn with_gains(mut self, kp: f64, kd: f64) -> Self {
        self.kp = Some(kp);
        self.kd = Some(kd);
        self
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| panic!("fixture serialization failed: {e}"))
    }

    pub fn to_payload(&self) -> Vec<u8> {
        self.to_json().into_bytes()
    }
}

/// `count` records whose channels increase linearly from zero.
pub fn ramp_records(count: usize) -> Vec<TelemetryRecord> {
    (0..count)
        .map(|i| {
            let step = i as f64;
            TelemetryRecord::channels(step, step * 0.5, step * 10.0)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channels_record_json() {
        let json = TelemetryRecord::channels(1.5, -2.0, 120.0).to_json();
        assert_eq!(json, r#"{"anglex":1.5,"gyroX":-2.0,"PWM":120.0}"#);
    }

    #[test]
    fn test_empty_record_is_empty_object() {
        assert_eq!(TelemetryRecord::new().to_json(), "{}");
    }

    #[test]
    fn test_full_record_has_gains() {
        let json = TelemetryRecord::full().with_gains(2.0, 0.5).to_json();
        assert!(json.contains(r#""Kp":2.0"#));
        assert!(json.contains(r#""Kd":0.5"#));
    }

    #[test]
    fn test_ramp() {
        let records = ramp_records(3);
        assert_eq!(records.len(), 3);
        assert_eq!(records.last().and_then(|r| r.pwm), Some(20.0));
    }
}
