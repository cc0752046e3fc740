//! IMU sample type and the read-only source trait feeding the serializer

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Wire key names, in record order
pub const FIELD_NAMES: [&str; 10] = [
    "accX", "accY", "accZ", "gyrX", "gyrY", "gyrZ", "magX", "magY", "magZ", "temp",
];

/// Read-only view of a sensor exposing the ten scaled readings
///
/// Implemented by hardware adapters and by test fixtures. The serializer only
/// ever sees an [`ImuSample`] snapshot taken through this trait.
pub trait ImuSource {
    /// Accelerometer X (mg)
    fn acc_x(&self) -> f32;
    /// Accelerometer Y (mg)
    fn acc_y(&self) -> f32;
    /// Accelerometer Z (mg)
    fn acc_z(&self) -> f32;
    /// Gyroscope X (°/s)
    fn gyr_x(&self) -> f32;
    /// Gyroscope Y (°/s)
    fn gyr_y(&self) -> f32;
    /// Gyroscope Z (°/s)
    fn gyr_z(&self) -> f32;
    /// Magnetometer X (µT)
    fn mag_x(&self) -> f32;
    /// Magnetometer Y (µT)
    fn mag_y(&self) -> f32;
    /// Magnetometer Z (µT)
    fn mag_z(&self) -> f32;
    /// Die temperature (°C)
    fn temp(&self) -> f32;
}

/// One scaled accelerometer/gyroscope/magnetometer/temperature reading
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImuSample {
    #[serde(rename = "accX")]
    pub acc_x: f32,
    #[serde(rename = "accY")]
    pub acc_y: f32,
    #[serde(rename = "accZ")]
    pub acc_z: f32,
    #[serde(rename = "gyrX")]
    pub gyr_x: f32,
    #[serde(rename = "gyrY")]
    pub gyr_y: f32,
    #[serde(rename = "gyrZ")]
    pub gyr_z: f32,
    #[serde(rename = "magX")]
    pub mag_x: f32,
    #[serde(rename = "magY")]
    pub mag_y: f32,
    #[serde(rename = "magZ")]
    pub mag_z: f32,
    pub temp: f32,
}

impl ImuSample {
    /// Snapshot the current readings of any source
    pub fn from_source<S: ImuSource + ?Sized>(source: &S) -> Self {
        Self {
            acc_x: source.acc_x(),
            acc_y: source.acc_y(),
            acc_z: source.acc_z(),
            gyr_x: source.gyr_x(),
            gyr_y: source.gyr_y(),
            gyr_z: source.gyr_z(),
            mag_x: source.mag_x(),
            mag_y: source.mag_y(),
            mag_z: source.mag_z(),
            temp: source.temp(),
        }
    }

    /// Decode an accepted wire record into a sample
    ///
    /// Framing only checks bracket shape, so this is where inner content is
    /// actually validated. All ten keys must be present.
    pub fn from_json(record: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(record)?)
    }

    /// Field values in wire order
    pub fn values(&self) -> [f32; 10] {
        [
            self.acc_x, self.acc_y, self.acc_z,
            self.gyr_x, self.gyr_y, self.gyr_z,
            self.mag_x, self.mag_y, self.mag_z,
            self.temp,
        ]
    }
}

impl ImuSource for ImuSample {
    fn acc_x(&self) -> f32 {
        self.acc_x
    }
    fn acc_y(&self) -> f32 {
        self.acc_y
    }
    fn acc_z(&self) -> f32 {
        self.acc_z
    }
    fn gyr_x(&self) -> f32 {
        self.gyr_x
    }
    fn gyr_y(&self) -> f32 {
        self.gyr_y
    }
    fn gyr_z(&self) -> f32 {
        self.gyr_z
    }
    fn mag_x(&self) -> f32 {
        self.mag_x
    }
    fn mag_y(&self) -> f32 {
        self.mag_y
    }
    fn mag_z(&self) -> f32 {
        self.mag_z
    }
    fn temp(&self) -> f32 {
        self.temp
    }
}
