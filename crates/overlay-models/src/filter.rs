//! Tracker filter selections.
//!
//! The tracker can run the barcode decoder, the OCR engine and the retail
//! (product and shelf) module independently; the user's checklist decides which
//! result families are drawn.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entity::Entity;

/// Which result families the tracker is allowed to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct TrackerFilter {
    pub barcode: bool,
    pub ocr: bool,
    pub product_and_shelf: bool,
}

impl Default for TrackerFilter {
    /// Barcode only, matching the first-launch checklist.
    fn default() -> Self {
        Self {
            barcode: true,
            ocr: false,
            product_and_shelf: false,
        }
    }
}

impl TrackerFilter {
    /// Every family enabled.
    pub const fn all() -> Self {
        Self {
            barcode: true,
            ocr: true,
            product_and_shelf: true,
        }
    }

    /// True if no family is enabled.
    pub fn is_empty(&self) -> bool {
        !self.barcode && !self.ocr && !self.product_and_shelf
    }

    /// Whether results of this entity's family pass the filter.
    pub fn allows(&self, entity: &Entity) -> bool {
        match entity {
            Entity::Barcode(_) => self.barcode,
            Entity::Paragraph(_) => self.ocr,
            Entity::Shelf(_) | Entity::Label(_) | Entity::Product(_) => self.product_and_shelf,
        }
    }

    /// Barcode/OCR combination of this filter.
    pub fn filter_type(&self) -> FilterType {
        FilterType::from_checks(self.barcode, self.ocr)
    }
}

/// Combination of the barcode and OCR checkboxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FilterType {
    Barcode,
    Ocr,
    Both,
    None,
}

impl FilterType {
    pub fn from_checks(barcode_checked: bool, ocr_checked: bool) -> Self {
        match (barcode_checked, ocr_checked) {
            (true, true) => FilterType::Both,
            (true, false) => FilterType::Barcode,
            (false, true) => FilterType::Ocr,
            (false, false) => FilterType::None,
        }
    }
}
