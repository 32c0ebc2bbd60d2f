//! Dispatch of detection results into overlay items.
//!
//! One call per processed frame: every entity that passes the tracker filter
//! and carries a box is mapped into overlay space and tagged with what should
//! be drawn for it. Drawing itself is left to the caller.

use std::collections::BTreeMap;

use overlay_models::{
    BarcodeEntity, Entity, LabelClass, LabelEntity, ParagraphEntity, PixelRect, ProductEntity,
    TrackerFilter,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::mapper::{BoundingBoxMapper, DisplayProbe};
use crate::metrics;

/// What an overlay item represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayKind {
    Barcode,
    OcrWord,
    Shelf,
    ShelfLabel,
    PegLabel,
    Product,
}

/// A mapped box ready to draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayItem {
    pub kind: OverlayKind,
    /// Box in overlay pixels
    pub rect: PixelRect,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// All overlay items for one frame.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OverlayFrame {
    pub items: Vec<OverlayItem>,
}

impl OverlayFrame {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Items of one kind, in dispatch order.
    pub fn of_kind(&self, kind: OverlayKind) -> impl Iterator<Item = &OverlayItem> {
        self.items.iter().filter(move |item| item.kind == kind)
    }

    /// Item count per kind.
    pub fn counts(&self) -> BTreeMap<OverlayKind, usize> {
        let mut counts = BTreeMap::new();
        for item in &self.items {
            *counts.entry(item.kind).or_insert(0) += 1;
        }
        counts
    }
}

/// Labelling and filtering options for overlay dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OverlayOptions {
    /// Result families to draw
    #[serde(default)]
    pub filter: TrackerFilter,
    /// Prefix barcode labels with the last four digits of the tracking id
    #[serde(default)]
    pub tracker_labels: bool,
    /// Append the best SKU's accuracy to product labels
    #[serde(default)]
    pub show_sku_accuracy: bool,
}

/// Turns per-frame entity lists into overlay items.
#[derive(Debug, Clone)]
pub struct OverlayBuilder {
    mapper: BoundingBoxMapper,
    options: OverlayOptions,
}

impl OverlayBuilder {
    pub fn new(mapper: BoundingBoxMapper, options: OverlayOptions) -> Self {
        Self { mapper, options }
    }

    pub fn mapper(&self) -> &BoundingBoxMapper {
        &self.mapper
    }

    pub fn options(&self) -> &OverlayOptions {
        &self.options
    }

    /// Map one frame's entities into overlay items.
    pub fn build<P: DisplayProbe + ?Sized>(&self, entities: &[Entity], display: &P) -> OverlayFrame {
        if self.options.filter.is_empty() && !entities.is_empty() {
            debug!(entities = entities.len(), "Tracker filter allows no results");
        }
        let mut items = Vec::with_capacity(entities.len());

        for entity in entities {
            if !self.options.filter.allows(entity) {
                metrics::record_entity_skipped(entity.kind_str(), "filtered");
                continue;
            }
            match entity {
                Entity::Barcode(barcode) => self.push_barcode(barcode, display, &mut items),
                Entity::Paragraph(paragraph) => self.push_paragraph(paragraph, display, &mut items),
                Entity::Shelf(_) => {
                    self.push_boxed(entity, OverlayKind::Shelf, None, display, &mut items)
                }
                Entity::Label(label) => self.push_label(entity, label, display, &mut items),
                Entity::Product(product) => self.push_product(entity, product, display, &mut items),
            }
        }

        let frame = OverlayFrame { items };
        debug!(
            filter = ?self.options.filter.filter_type(),
            entities = entities.len(),
            items = frame.len(),
            counts = ?frame.counts(),
            "Built overlay frame"
        );
        frame
    }

    fn push_barcode<P: DisplayProbe + ?Sized>(
        &self,
        barcode: &BarcodeEntity,
        display: &P,
        items: &mut Vec<OverlayItem>,
    ) {
        let Some(bbox) = barcode.bbox else {
            warn!(value = %barcode.value, "Barcode has no bounding box");
            metrics::record_entity_skipped("barcode", "missing_bbox");
            return;
        };

        let label = match (self.options.tracker_labels, barcode.tracking_id) {
            (true, Some(id)) => format!("{}:{}", tracking_suffix(id), barcode.value),
            _ => barcode.value.clone(),
        };
        debug!(value = %barcode.value, symbology = %barcode.symbology, "Detected barcode");

        items.push(OverlayItem {
            kind: OverlayKind::Barcode,
            rect: self.mapper.map_with_probe(bbox, display),
            label: Some(label),
        });
    }

    fn push_paragraph<P: DisplayProbe + ?Sized>(
        &self,
        paragraph: &ParagraphEntity,
        display: &P,
        items: &mut Vec<OverlayItem>,
    ) {
        for word in paragraph.words() {
            if word.text.is_empty() {
                continue;
            }
            let Some(rect) = word.complex_bbox.as_ref().and_then(|bbox| bbox.to_rect()) else {
                metrics::record_entity_skipped("paragraph", "missing_bbox");
                continue;
            };
            items.push(OverlayItem {
                kind: OverlayKind::OcrWord,
                rect: self.mapper.map_with_probe(rect, display),
                label: Some(word.text.clone()),
            });
        }
    }

    fn push_label<P: DisplayProbe + ?Sized>(
        &self,
        entity: &Entity,
        label: &LabelEntity,
        display: &P,
        items: &mut Vec<OverlayItem>,
    ) {
        let kind = match label.class {
            LabelClass::ShelfLabel => OverlayKind::ShelfLabel,
            LabelClass::PegLabel => OverlayKind::PegLabel,
        };
        self.push_boxed(entity, kind, None, display, items);
    }

    fn push_product<P: DisplayProbe + ?Sized>(
        &self,
        entity: &Entity,
        product: &ProductEntity,
        display: &P,
        items: &mut Vec<OverlayItem>,
    ) {
        let label = match product.best_sku() {
            Some(sku) if self.options.show_sku_accuracy => {
                format!("{} ({:.2})", sku.product_sku, sku.accuracy)
            }
            Some(sku) => sku.product_sku.clone(),
            None => String::new(),
        };
        self.push_boxed(entity, OverlayKind::Product, Some(label), display, items);
    }

    fn push_boxed<P: DisplayProbe + ?Sized>(
        &self,
        entity: &Entity,
        kind: OverlayKind,
        label: Option<String>,
        display: &P,
        items: &mut Vec<OverlayItem>,
    ) {
        match entity.bounding_box() {
            Some(bbox) => items.push(OverlayItem {
                kind,
                rect: self.mapper.map_with_probe(bbox, display),
                label,
            }),
            None => {
                warn!(kind = entity.kind_str(), "Entity has no bounding box");
                metrics::record_entity_skipped(entity.kind_str(), "missing_bbox");
            }
        }
    }
}

/// Last four digits of a tracking id, or the whole id if shorter.
fn tracking_suffix(id: u64) -> String {
    let digits = id.to_string();
    if digits.len() >= 4 {
        digits[digits.len() - 4..].to_string()
    } else {
        digits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::StaticDisplay;
    use crate::session::FrameSession;
    use overlay_models::{
        AxisSwapPolicy, CameraFacing, ComplexBBox, DeviceProfile, FrameSize, LineEntity,
        OverlaySize, Rotation, ShelfEntity, SkuInfo, WordEntity,
    };

    /// Frame and overlay are both 500x500 scaled 2x, so overlay = 2 * frame.
    fn builder(options: OverlayOptions) -> (OverlayBuilder, StaticDisplay) {
        let session = FrameSession::new(
            FrameSize::new(500, 500),
            Rotation::Deg0,
            CameraFacing::Back,
            DeviceProfile::default(),
        )
        .unwrap();
        let mapper = BoundingBoxMapper::new(session, AxisSwapPolicy::default());
        let display = StaticDisplay {
            rotation: Rotation::Deg0,
            overlay: OverlaySize::new(1000, 1000),
        };
        (OverlayBuilder::new(mapper, options), display)
    }

    fn barcode(value: &str, bbox: Option<PixelRect>, tracking_id: Option<u64>) -> Entity {
        Entity::Barcode(BarcodeEntity {
            value: value.to_string(),
            symbology: "QRCODE".to_string(),
            bbox,
            tracking_id,
        })
    }

    fn word(text: &str, x: [f32; 4], y: [f32; 4]) -> WordEntity {
        WordEntity {
            text: text.to_string(),
            complex_bbox: Some(ComplexBBox {
                x: x.to_vec(),
                y: y.to_vec(),
            }),
        }
    }

    fn all_families() -> OverlayOptions {
        OverlayOptions {
            filter: TrackerFilter::all(),
            ..OverlayOptions::default()
        }
    }

    #[test]
    fn test_barcode_mapped_with_value_label() {
        let (builder, display) = builder(OverlayOptions::default());
        let frame = builder.build(&[barcode("ABC", Some(PixelRect::new(10, 20, 30, 40)), None)], &display);

        assert_eq!(frame.len(), 1);
        assert_eq!(frame.items[0].kind, OverlayKind::Barcode);
        assert_eq!(frame.items[0].rect, PixelRect::new(20, 40, 60, 80));
        assert_eq!(frame.items[0].label.as_deref(), Some("ABC"));
    }

    #[test]
    fn test_barcode_without_bbox_skipped() {
        let (builder, display) = builder(OverlayOptions::default());
        let frame = builder.build(&[barcode("ABC", None, Some(1))], &display);
        assert!(frame.is_empty());
    }

    #[test]
    fn test_tracker_labels_use_last_four_digits() {
        let options = OverlayOptions {
            tracker_labels: true,
            ..OverlayOptions::default()
        };
        let (builder, display) = builder(options);
        let rect = Some(PixelRect::new(0, 0, 1, 1));
        let frame = builder.build(
            &[
                barcode("LONG", rect, Some(123_456_789)),
                barcode("SHORT", rect, Some(42)),
                barcode("UNTRACKED", rect, None),
            ],
            &display,
        );

        let labels: Vec<_> = frame.items.iter().map(|i| i.label.clone().unwrap()).collect();
        assert_eq!(labels, vec!["6789:LONG", "42:SHORT", "UNTRACKED"]);
    }

    #[test]
    fn test_ocr_words_from_complex_boxes() {
        let (builder, display) = builder(all_families());
        let paragraph = Entity::Paragraph(ParagraphEntity {
            lines: vec![LineEntity {
                words: vec![
                    word("hello", [10.0, 50.0, 50.0, 10.0], [5.0, 5.0, 25.0, 25.0]),
                    word("", [0.0, 1.0, 1.0, 0.0], [0.0, 0.0, 1.0, 1.0]),
                    WordEntity {
                        text: "nobox".to_string(),
                        complex_bbox: None,
                    },
                    // Corners reported bottom-right first.
                    word("world", [120.0, 60.0, 60.0, 120.0], [25.0, 25.0, 5.0, 5.0]),
                ],
            }],
        });

        let frame = builder.build(&[paragraph], &display);
        let words: Vec<_> = frame.of_kind(OverlayKind::OcrWord).collect();

        assert_eq!(words.len(), 2);
        assert_eq!(words[0].label.as_deref(), Some("hello"));
        assert_eq!(words[0].rect, PixelRect::new(20, 10, 100, 50));
        assert_eq!(words[1].label.as_deref(), Some("world"));
        assert_eq!(words[1].rect, PixelRect::new(120, 10, 240, 50));
    }

    #[test]
    fn test_retail_entities_dispatch() {
        let (builder, display) = builder(all_families());
        let rect = Some(PixelRect::new(1, 1, 2, 2));
        let entities = vec![
            Entity::Shelf(ShelfEntity { bbox: rect }),
            Entity::Label(LabelEntity {
                class: LabelClass::ShelfLabel,
                bbox: rect,
            }),
            Entity::Label(LabelEntity {
                class: LabelClass::PegLabel,
                bbox: rect,
            }),
            Entity::Product(ProductEntity {
                bbox: rect,
                top_skus: vec![
                    SkuInfo {
                        product_sku: "SKU-1".to_string(),
                        accuracy: 0.934,
                    },
                    SkuInfo {
                        product_sku: "SKU-2".to_string(),
                        accuracy: 0.5,
                    },
                ],
            }),
            Entity::Product(ProductEntity {
                bbox: rect,
                top_skus: vec![],
            }),
            Entity::Shelf(ShelfEntity { bbox: None }),
        ];

        let frame = builder.build(&entities, &display);
        let counts = frame.counts();

        assert_eq!(counts.get(&OverlayKind::Shelf), Some(&1));
        assert_eq!(counts.get(&OverlayKind::ShelfLabel), Some(&1));
        assert_eq!(counts.get(&OverlayKind::PegLabel), Some(&1));
        assert_eq!(counts.get(&OverlayKind::Product), Some(&2));

        let products: Vec<_> = frame.of_kind(OverlayKind::Product).collect();
        assert_eq!(products[0].label.as_deref(), Some("SKU-1"));
        assert_eq!(products[1].label.as_deref(), Some(""));
    }

    #[test]
    fn test_sku_accuracy_label() {
        let options = OverlayOptions {
            filter: TrackerFilter::all(),
            show_sku_accuracy: true,
            ..OverlayOptions::default()
        };
        let (builder, display) = builder(options);
        let product = Entity::Product(ProductEntity {
            bbox: Some(PixelRect::new(0, 0, 10, 10)),
            top_skus: vec![SkuInfo {
                product_sku: "SKU-9".to_string(),
                accuracy: 0.876,
            }],
        });

        let frame = builder.build(&[product], &display);
        assert_eq!(frame.items[0].label.as_deref(), Some("SKU-9 (0.88)"));
    }

    #[test]
    fn test_filter_drops_disabled_families() {
        let (builder, display) = builder(OverlayOptions::default());
        let rect = Some(PixelRect::new(0, 0, 10, 10));
        let entities = vec![
            barcode("A", rect, None),
            Entity::Shelf(ShelfEntity { bbox: rect }),
            Entity::Paragraph(ParagraphEntity {
                lines: vec![LineEntity {
                    words: vec![word("w", [0.0, 1.0, 1.0, 0.0], [0.0, 0.0, 1.0, 1.0])],
                }],
            }),
        ];

        let frame = builder.build(&entities, &display);
        assert_eq!(frame.len(), 1);
        assert_eq!(frame.items[0].kind, OverlayKind::Barcode);
    }

    #[test]
    fn test_overlay_not_laid_out_passes_boxes_through() {
        let (builder, _) = builder(OverlayOptions::default());
        let display = StaticDisplay {
            rotation: Rotation::Deg90,
            overlay: OverlaySize::new(0, 0),
        };
        let bbox = PixelRect::new(10, 20, 30, 40);

        let frame = builder.build(&[barcode("A", Some(bbox), None)], &display);
        assert_eq!(frame.items[0].rect, bbox);
    }

    #[test]
    fn test_boxless_retail_entities_skipped() {
        let (builder, display) = builder(all_families());
        let entities = vec![
            Entity::Label(LabelEntity {
                class: LabelClass::PegLabel,
                bbox: None,
            }),
            Entity::Product(ProductEntity {
                bbox: None,
                top_skus: vec![],
            }),
            Entity::Label(LabelEntity {
                class: LabelClass::ShelfLabel,
                bbox: Some(PixelRect::new(5, 5, 10, 10)),
            }),
        ];

        let frame = builder.build(&entities, &display);
        assert_eq!(frame.len(), 1);
        assert_eq!(frame.items[0].kind, OverlayKind::ShelfLabel);
        assert_eq!(frame.items[0].rect, PixelRect::new(10, 10, 20, 20));
    }

    #[test]
    fn test_empty_filter_draws_nothing() {
        let options = OverlayOptions {
            filter: TrackerFilter {
                barcode: false,
                ocr: false,
                product_and_shelf: false,
            },
            ..OverlayOptions::default()
        };
        let (builder, display) = builder(options);
        let rect = Some(PixelRect::new(0, 0, 10, 10));

        let frame = builder.build(
            &[barcode("A", rect, None), Entity::Shelf(ShelfEntity { bbox: rect })],
            &display,
        );
        assert!(frame.is_empty());
    }

    #[test]
    fn test_tracking_suffix() {
        assert_eq!(tracking_suffix(1234), "1234");
        assert_eq!(tracking_suffix(98_761_234), "1234");
        assert_eq!(tracking_suffix(7), "7");
    }

    #[test]
    fn test_overlay_frame_json() {
        let frame = OverlayFrame {
            items: vec![OverlayItem {
                kind: OverlayKind::PegLabel,
                rect: PixelRect::new(1, 2, 3, 4),
                label: None,
            }],
        };
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["items"][0]["kind"], "peg_label");
        assert!(json["items"][0].get("label").is_none());
    }
}
