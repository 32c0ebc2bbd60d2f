//! Detection entities reported by the vision SDK.
//!
//! The SDK hands back heterogeneous result lists (barcodes, OCR paragraphs,
//! retail shelves, labels and products). They are modelled as one tagged enum
//! so consumers dispatch with `match` instead of runtime type checks.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::rect::PixelRect;

/// A single detected entity in native frame coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entity {
    /// Decoded barcode.
    Barcode(BarcodeEntity),
    /// OCR paragraph made of lines and words.
    Paragraph(ParagraphEntity),
    /// Retail shelf edge.
    Shelf(ShelfEntity),
    /// Shelf or peg price label.
    Label(LabelEntity),
    /// Recognized product facing.
    Product(ProductEntity),
}

impl Entity {
    /// Short name used in logs and metrics labels.
    pub fn kind_str(&self) -> &'static str {
        match self {
            Entity::Barcode(_) => "barcode",
            Entity::Paragraph(_) => "paragraph",
            Entity::Shelf(_) => "shelf",
            Entity::Label(_) => "label",
            Entity::Product(_) => "product",
        }
    }

    /// Bounding box for single-box entities. Paragraphs carry per-word boxes instead.
    pub fn bounding_box(&self) -> Option<PixelRect> {
        match self {
            Entity::Barcode(b) => b.bbox,
            Entity::Paragraph(_) => None,
            Entity::Shelf(s) => s.bbox,
            Entity::Label(l) => l.bbox,
            Entity::Product(p) => p.bbox,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BarcodeEntity {
    /// Decoded payload
    pub value: String,
    /// Symbology name as reported by the decoder (e.g. "QRCODE", "EAN13")
    #[serde(default)]
    pub symbology: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<PixelRect>,
    /// Stable id assigned by the entity tracker, if tracking is active
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct ParagraphEntity {
    #[serde(default)]
    pub lines: Vec<LineEntity>,
}

impl ParagraphEntity {
    /// Iterate every word of every line.
    pub fn words(&self) -> impl Iterator<Item = &WordEntity> {
        self.lines.iter().flat_map(|line| line.words.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct LineEntity {
    #[serde(default)]
    pub words: Vec<WordEntity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WordEntity {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complex_bbox: Option<ComplexBBox>,
}

/// Quadrilateral word box as parallel x/y corner arrays.
///
/// Corners run clockwise from the top-left, so indices 0 and 2 are opposite.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct ComplexBBox {
    pub x: Vec<f32>,
    pub y: Vec<f32>,
}

impl ComplexBBox {
    /// Axis-aligned rectangle spanned by corners 0 and 2.
    ///
    /// Returns `None` when fewer than three corners are present on either axis.
    pub fn to_rect(&self) -> Option<PixelRect> {
        if self.x.len() < 3 || self.y.len() < 3 {
            return None;
        }
        Some(PixelRect::from_corners(self.x[0], self.y[0], self.x[2], self.y[2]))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct ShelfEntity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<PixelRect>,
}

/// Price label class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LabelClass {
    ShelfLabel,
    PegLabel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LabelEntity {
    pub class: LabelClass,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<PixelRect>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct ProductEntity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<PixelRect>,
    /// Candidate SKUs, best match first
    #[serde(default)]
    pub top_skus: Vec<SkuInfo>,
}

impl ProductEntity {
    pub fn best_sku(&self) -> Option<&SkuInfo> {
        self.top_skus.first()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SkuInfo {
    pub product_sku: String,
    /// Match confidence in [0, 1]
    pub accuracy: f32,
}
