//! Telemetry channels and samples.

use core::fmt;

use serde::{Deserialize, Serialize};

/// One plotted telemetry series.
///
/// Storage everywhere is sized by [`ChannelId::COUNT`], so adding a channel is
/// a matter of adding a variant here and a field to the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelId {
    /// Estimated tilt angle (`anglex`)
    Angle,
    /// Gyro rate around the balancing axis (`gyroX`)
    AngularVelocity,
    /// Motor duty cycle commanded by the controller (`PWM`)
    ActuatorCommand,
}

impl ChannelId {
    pub const COUNT: usize = 3;

    pub const ALL: [ChannelId; Self::COUNT] = [
        ChannelId::Angle,
        ChannelId::AngularVelocity,
        ChannelId::ActuatorCommand,
    ];

    /// Position of this channel in per-channel storage.
    pub const fn index(self) -> usize {
        match self {
            ChannelId::Angle => 0,
            ChannelId::AngularVelocity => 1,
            ChannelId::ActuatorCommand => 2,
        }
    }

    /// Field name used by the controller's JSON records.
    pub const fn wire_name(self) -> &'static str {
        match self {
            ChannelId::Angle => "anglex",
            ChannelId::AngularVelocity => "gyroX",
            ChannelId::ActuatorCommand => "PWM",
        }
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelId::Angle => write!(f, "Angle"),
            ChannelId::AngularVelocity => write!(f, "GyroX"),
            ChannelId::ActuatorCommand => write!(f, "PWM"),
        }
    }
}

/// One value per [`ChannelId`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChannelValues([f64; ChannelId::COUNT]);

impl ChannelValues {
    pub const ZERO: Self = Self([0.0; ChannelId::COUNT]);

    pub const fn new(angle: f64, angular_velocity: f64, actuator_command: f64) -> Self {
        Self([angle, angular_velocity, actuator_command])
    }

    pub fn get(&self, channel: ChannelId) -> f64 {
        self.0.get(channel.index()).copied().unwrap_or_default()
    }

    pub fn set(&mut self, channel: ChannelId, value: f64) {
        if let Some(slot) = self.0.get_mut(channel.index()) {
            *slot = value;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ChannelId, f64)> + '_ {
        ChannelId::ALL.into_iter().zip(self.0.iter().copied())
    }

    pub fn as_array(&self) -> &[f64; ChannelId::COUNT] {
        &self.0
    }
}

/// A multi-channel reading on the shared time axis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Sample {
    /// Seconds since the viewer started
    pub timestamp: f64,
    pub values: ChannelValues,
}

impl Sample {
    pub const fn new(timestamp: f64, values: ChannelValues) -> Self {
        Self { timestamp, values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_match_all_order() {
        for (position, channel) in ChannelId::ALL.iter().enumerate() {
            assert_eq!(channel.index(), position);
        }
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(ChannelId::Angle.wire_name(), "anglex");
        assert_eq!(ChannelId::AngularVelocity.wire_name(), "gyroX");
        assert_eq!(ChannelId::ActuatorCommand.wire_name(), "PWM");
    }

    #[test]
    fn test_values_get_set() {
        let mut values = ChannelValues::ZERO;
        values.set(ChannelId::AngularVelocity, -4.5);
        assert_eq!(values.get(ChannelId::AngularVelocity).to_bits(), (-4.5f64).to_bits());
        assert_eq!(values.get(ChannelId::Angle).to_bits(), 0.0f64.to_bits());

        let collected: Vec<_> = values.iter().map(|(channel, _)| channel).collect();
        assert_eq!(collected, ChannelId::ALL.to_vec());
    }
}
