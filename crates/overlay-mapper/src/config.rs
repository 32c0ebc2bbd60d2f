//! Mapper configuration.

use overlay_models::{AxisSwapPolicy, DeviceClass, DeviceProfile, SensorOrientation, TrackerFilter};

use crate::error::{MapperError, MapperResult};
use crate::overlay::OverlayOptions;

/// Mapper and overlay dispatch configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapperConfig {
    /// When to swap the effective frame axes
    pub axis_swap_policy: AxisSwapPolicy,
    /// Device the preview runs on
    pub device: DeviceProfile,
    /// Labelling and filtering for overlay items
    pub overlay: OverlayOptions,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            axis_swap_policy: AxisSwapPolicy::HorizontalMountGated,
            device: DeviceProfile::default(),
            overlay: OverlayOptions::default(),
        }
    }
}

impl MapperConfig {
    /// Create config from environment variables.
    pub fn from_env() -> MapperResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> MapperResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let default_filter = TrackerFilter::default();

        let axis_swap_policy = match lookup("OVERLAY_AXIS_SWAP_POLICY") {
            Some(v) => v
                .parse::<AxisSwapPolicy>()
                .map_err(|e| MapperError::config("OVERLAY_AXIS_SWAP_POLICY", format!("{}", e)))?,
            None => defaults.axis_swap_policy,
        };

        let class = match lookup("OVERLAY_DEVICE_CLASS") {
            Some(v) => v
                .parse::<DeviceClass>()
                .map_err(|e| MapperError::config("OVERLAY_DEVICE_CLASS", format!("{}", e)))?,
            None => defaults.device.class,
        };

        let sensor_orientation = match lookup("OVERLAY_SENSOR_ORIENTATION") {
            Some(v) => {
                let degrees: u32 = v.trim().parse().map_err(|_| {
                    MapperError::config("OVERLAY_SENSOR_ORIENTATION", format!("not a number: {}", v))
                })?;
                SensorOrientation::try_from(degrees)
                    .map_err(|_| MapperError::InvalidSensorOrientation(degrees))?
            }
            None => defaults.device.sensor_orientation,
        };

        let filter = TrackerFilter {
            barcode: parse_flag(&lookup, "OVERLAY_FILTER_BARCODE", default_filter.barcode)?,
            ocr: parse_flag(&lookup, "OVERLAY_FILTER_OCR", default_filter.ocr)?,
            product_and_shelf: parse_flag(
                &lookup,
                "OVERLAY_FILTER_PRODUCT_AND_SHELF",
                default_filter.product_and_shelf,
            )?,
        };

        Ok(Self {
            axis_swap_policy,
            device: DeviceProfile::new(class, sensor_orientation),
            overlay: OverlayOptions {
                filter,
                tracker_labels: parse_flag(&lookup, "OVERLAY_TRACKER_LABELS", false)?,
                show_sku_accuracy: parse_flag(&lookup, "OVERLAY_SHOW_SKU_ACCURACY", false)?,
            },
        })
    }
}

fn parse_flag<F>(lookup: &F, key: &str, default: bool) -> MapperResult<bool>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(v) => match v.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(MapperError::config(key, format!("expected a boolean, got {}", other))),
        },
    }
}
