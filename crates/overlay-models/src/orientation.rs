//! Display rotation, camera facing and device class definitions.
//!
//! Rotations use the platform's quarter-turn ordinals:
//!
//! - `0`: natural orientation
//! - `1`: 90° clockwise
//! - `2`: 180°
//! - `3`: 270° clockwise

use schemars::gen::SchemaGenerator;
use schemars::schema::Schema;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Display rotation in quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// All rotations in ordinal order.
    pub const ALL: &'static [Rotation] = &[
        Rotation::Deg0,
        Rotation::Deg90,
        Rotation::Deg180,
        Rotation::Deg270,
    ];

    /// Rotation for a quarter-turn ordinal, or `None` outside `0..=3`.
    pub fn from_ordinal(ordinal: i32) -> Option<Self> {
        match ordinal {
            0 => Some(Rotation::Deg0),
            1 => Some(Rotation::Deg90),
            2 => Some(Rotation::Deg180),
            3 => Some(Rotation::Deg270),
            _ => None,
        }
    }

    /// Rotation for a value in degrees, or `None` if not a multiple of 90 below 360.
    pub fn from_degrees(degrees: u32) -> Option<Self> {
        match degrees {
            0 => Some(Rotation::Deg0),
            90 => Some(Rotation::Deg90),
            180 => Some(Rotation::Deg180),
            270 => Some(Rotation::Deg270),
            _ => None,
        }
    }

    pub fn ordinal(&self) -> i32 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 1,
            Rotation::Deg180 => 2,
            Rotation::Deg270 => 3,
        }
    }

    pub fn degrees(&self) -> u32 {
        self.ordinal() as u32 * 90
    }

    /// True for 0° and 180°, where the analysis resolution is read portrait-first.
    pub fn is_portrait_natural(&self) -> bool {
        matches!(self, Rotation::Deg0 | Rotation::Deg180)
    }

    /// True for 90° and 270°.
    pub fn is_quarter_turn(&self) -> bool {
        !self.is_portrait_natural()
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

impl FromStr for Rotation {
    type Err = ModelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let digits = lower
            .trim_start_matches("deg")
            .trim_start_matches("rotation_")
            .trim_end_matches('°');
        digits
            .parse::<u32>()
            .ok()
            .and_then(Rotation::from_degrees)
            .ok_or_else(|| ModelParseError::Rotation(s.to_string()))
    }
}

/// Which camera produced the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum CameraFacing {
    #[default]
    Back,
    /// Front camera previews are mirrored horizontally.
    Front,
}

impl CameraFacing {
    pub fn is_front(&self) -> bool {
        matches!(self, CameraFacing::Front)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CameraFacing::Back => "back",
            CameraFacing::Front => "front",
        }
    }
}

impl fmt::Display for CameraFacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CameraFacing {
    type Err = ModelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "back" | "rear" => Ok(CameraFacing::Back),
            "front" | "selfie" => Ok(CameraFacing::Front),
            _ => Err(ModelParseError::CameraFacing(s.to_string())),
        }
    }
}

/// Form factor of the device, from the screen size bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    #[default]
    Phone,
    Tablet,
}

impl DeviceClass {
    pub fn is_tablet(&self) -> bool {
        matches!(self, DeviceClass::Tablet)
    }
}

impl FromStr for DeviceClass {
    type Err = ModelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "phone" | "handheld" => Ok(DeviceClass::Phone),
            "tablet" => Ok(DeviceClass::Tablet),
            _ => Err(ModelParseError::DeviceClass(s.to_string())),
        }
    }
}

/// Camera sensor mount orientation relative to the device's natural orientation.
///
/// Serialized as plain degrees (`0`, `90`, `180`, `270`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct SensorOrientation(Rotation);

impl SensorOrientation {
    pub const fn new(rotation: Rotation) -> Self {
        Self(rotation)
    }

    pub fn degrees(&self) -> u32 {
        self.0.degrees()
    }

    /// Sensor long edge runs along the device's natural horizontal axis.
    pub fn is_horizontal_mount(&self) -> bool {
        self.0.is_portrait_natural()
    }
}

impl Default for SensorOrientation {
    /// Phones typically mount the back sensor at 90°.
    fn default() -> Self {
        Self(Rotation::Deg90)
    }
}

impl TryFrom<u32> for SensorOrientation {
    type Error = ModelParseError;

    fn try_from(degrees: u32) -> Result<Self, Self::Error> {
        Rotation::from_degrees(degrees)
            .map(SensorOrientation)
            .ok_or(ModelParseError::SensorOrientation(degrees))
    }
}

impl From<SensorOrientation> for u32 {
    fn from(value: SensorOrientation) -> Self {
        value.degrees()
    }
}

impl JsonSchema for SensorOrientation {
    fn schema_name() -> String {
        "SensorOrientation".to_string()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        u32::json_schema(gen)
    }
}

/// Device characteristics that affect how the detector frame lines up with the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
pub struct DeviceProfile {
    pub class: DeviceClass,
    #[serde(default)]
    pub sensor_orientation: SensorOrientation,
}

impl DeviceProfile {
    pub fn new(class: DeviceClass, sensor_orientation: SensorOrientation) -> Self {
        Self {
            class,
            sensor_orientation,
        }
    }

    /// A tablet whose sensor is mounted at 0° or 180°.
    pub fn is_horizontal_camera_tablet(&self) -> bool {
        self.class.is_tablet() && self.sensor_orientation.is_horizontal_mount()
    }
}

/// When the effective frame axes are exchanged before scaling to the overlay.
///
/// Two device-handling variants exist in the field; `HorizontalMountGated` is
/// the standalone mapper behavior, `Always` is the older inline behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum AxisSwapPolicy {
    /// Swap only on horizontal-camera tablets, for tablets at 0°/180° relative
    /// rotation or phones at 90°/270°.
    #[default]
    HorizontalMountGated,
    /// Swap for tablets at 0°/180° and for every device at 90°/270°.
    Always,
    /// Never swap.
    Never,
}

impl AxisSwapPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            AxisSwapPolicy::HorizontalMountGated => "horizontal_mount_gated",
            AxisSwapPolicy::Always => "always",
            AxisSwapPolicy::Never => "never",
        }
    }

    /// Whether the frame axes should be swapped for this device at `relative` rotation.
    pub fn should_swap(&self, device: &DeviceProfile, relative: Rotation) -> bool {
        let tablet = device.class.is_tablet();
        match self {
            AxisSwapPolicy::HorizontalMountGated => {
                device.is_horizontal_camera_tablet()
                    && ((tablet && relative.is_portrait_natural())
                        || (!tablet && relative.is_quarter_turn()))
            }
            AxisSwapPolicy::Always => {
                (tablet && relative.is_portrait_natural()) || relative.is_quarter_turn()
            }
            AxisSwapPolicy::Never => false,
        }
    }
}

impl fmt::Display for AxisSwapPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AxisSwapPolicy {
    type Err = ModelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "horizontal_mount_gated" | "gated" => Ok(AxisSwapPolicy::HorizontalMountGated),
            "always" => Ok(AxisSwapPolicy::Always),
            "never" | "off" => Ok(AxisSwapPolicy::Never),
            _ => Err(ModelParseError::AxisSwapPolicy(s.to_string())),
        }
    }
}

/// Parse failures for the orientation and device enums.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelParseError {
    #[error("Unknown rotation: {0}")]
    Rotation(String),

    #[error("Unknown camera facing: {0}")]
    CameraFacing(String),

    #[error("Unknown device class: {0}")]
    DeviceClass(String),

    #[error("Unsupported sensor orientation: {0} degrees")]
    SensorOrientation(u32),

    #[error("Unknown axis swap policy: {0}")]
    AxisSwapPolicy(String),
}
