//! # Catalog Types
//!
//! Product and variant records as the e-commerce platform's catalog API
//! returns them. The cart never fetches these; hosts hand them over when the
//! shopper picks a variant.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Catalog Types                                   │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────────┐   ┌─────────────────┐   │
//! │  │    Product      │   │   ProductVariant    │   │  ProductImage   │   │
//! │  │  ─────────────  │   │  ─────────────────  │   │  ─────────────  │   │
//! │  │  id             │──►│  id (line identity) │   │  src            │   │
//! │  │  name (i18n)    │   │  price  "100.00"    │   │  position       │   │
//! │  │  variants       │   │  promotional_price  │   │  alt            │   │
//! │  │  images         │   │  compare_at_price   │   └─────────────────┘   │
//! │  └─────────────────┘   └─────────────────────┘                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Schema Drift
//! The platform adds fields over time. Every record keeps unknown fields in
//! an `extra` map and writes them back untouched, so a variant snapshot
//! stored in the cart survives a round trip even if this crate is older than
//! the catalog.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use ts_rs::TS;

/// Opaque numeric product identifier.
pub type ProductId = u64;

/// Opaque numeric variant identifier. Unique key for a cart line.
pub type VariantId = u64;

// =============================================================================
// Localized Text
// =============================================================================

/// A catalog string that is either plain or translated per language.
///
/// ```rust
/// use storefront_core::types::LocalizedText;
///
/// let name: LocalizedText = serde_json::from_str(r#"{"pt":"Camisa","es":"Camisa ES"}"#).unwrap();
/// assert_eq!(name.resolve("pt"), "Camisa");
/// assert_eq!(name.resolve("fr"), "Camisa ES");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocalizedText {
    Plain(String),
    Translated(BTreeMap<String, String>),
}

/// Fallback order when the requested language is missing.
const FALLBACK_LANGUAGES: [&str; 3] = ["es", "pt", "en"];

impl LocalizedText {
    /// Picks the best translation for `lang`.
    ///
    /// Order: `lang`, then `es`, `pt`, `en`, then any non-empty translation.
    pub fn resolve(&self, lang: &str) -> &str {
        match self {
            LocalizedText::Plain(text) => text,
            LocalizedText::Translated(map) => std::iter::once(lang)
                .chain(FALLBACK_LANGUAGES)
                .find_map(|code| map.get(code).filter(|s| !s.is_empty()))
                .or_else(|| map.values().find(|s| !s.is_empty()))
                .map_or("", String::as_str),
        }
    }
}

impl Default for LocalizedText {
    fn default() -> Self {
        LocalizedText::Plain(String::new())
    }
}

// =============================================================================
// Product Variant
// =============================================================================

/// A purchasable configuration of a product (size, color, ...).
///
/// Prices are string-encoded decimals, exactly as the catalog sends them.
/// The cart parses them when a line is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductVariant {
    #[ts(type = "number")]
    pub id: VariantId,

    #[serde(default)]
    #[ts(type = "number")]
    pub product_id: ProductId,

    #[serde(default)]
    pub position: u32,

    /// Regular price, e.g. `"100.00"`.
    pub price: String,

    /// Pre-discount reference price, display only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub compare_at_price: Option<String>,

    /// Sale price. Wins over `price` when present and parseable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub promotional_price: Option<String>,

    #[serde(default)]
    pub stock_management: bool,

    #[serde(default)]
    #[ts(type = "number | null")]
    pub stock: Option<i64>,

    #[serde(default)]
    pub weight: Option<String>,

    #[serde(default)]
    pub width: Option<String>,

    #[serde(default)]
    pub height: Option<String>,

    #[serde(default)]
    pub depth: Option<String>,

    #[serde(default)]
    pub sku: Option<String>,

    /// Option labels per language, e.g. `[{"es": "Rojo"}, {"es": "M"}]`.
    #[serde(default)]
    pub values: Vec<BTreeMap<String, String>>,

    #[serde(default)]
    pub barcode: Option<String>,

    #[serde(default)]
    pub mpn: Option<String>,

    #[serde(default)]
    pub age_group: Option<String>,

    #[serde(default)]
    pub gender: Option<String>,

    #[serde(default)]
    pub created_at: Option<String>,

    #[serde(default)]
    pub updated_at: Option<String>,

    /// Fields this crate does not model, passed through opaquely.
    #[serde(flatten)]
    #[ts(skip)]
    pub extra: Map<String, Value>,
}

impl ProductVariant {
    /// Minimal variant with only an id and a regular price.
    pub fn new(id: VariantId, price: impl Into<String>) -> Self {
        ProductVariant {
            id,
            product_id: 0,
            position: 0,
            price: price.into(),
            compare_at_price: None,
            promotional_price: None,
            stock_management: false,
            stock: None,
            weight: None,
            width: None,
            height: None,
            depth: None,
            sku: None,
            values: Vec::new(),
            barcode: None,
            mpn: None,
            age_group: None,
            gender: None,
            created_at: None,
            updated_at: None,
            extra: Map::new(),
        }
    }

    /// Builder-style setter for the promotional price.
    pub fn with_promotional_price(mut self, price: impl Into<String>) -> Self {
        self.promotional_price = Some(price.into());
        self
    }

    /// Builder-style setter for the compare-at price.
    pub fn with_compare_at_price(mut self, price: impl Into<String>) -> Self {
        self.compare_at_price = Some(price.into());
        self
    }

    /// Option labels resolved for one language, e.g. `["Rojo", "M"]`.
    pub fn option_labels(&self, lang: &str) -> Vec<&str> {
        self.values
            .iter()
            .filter_map(|labels| {
                labels
                    .get(lang)
                    .or_else(|| FALLBACK_LANGUAGES.iter().find_map(|code| labels.get(*code)))
                    .or_else(|| labels.values().next())
                    .map(String::as_str)
            })
            .collect()
    }
}

// =============================================================================
// Product Image
// =============================================================================

/// An image attached to a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    pub id: u64,

    #[serde(default)]
    pub product_id: ProductId,

    pub src: String,

    #[serde(default)]
    pub position: u32,

    #[serde(default)]
    pub alt: Option<String>,
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product with its variants and images.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,

    #[serde(default)]
    pub name: LocalizedText,

    #[serde(default)]
    pub description: LocalizedText,

    #[serde(default)]
    pub handle: LocalizedText,

    #[serde(default)]
    pub published: bool,

    #[serde(default)]
    pub free_shipping: bool,

    #[serde(default)]
    pub brand: Option<String>,

    #[serde(default)]
    pub tags: Option<String>,

    #[serde(default)]
    pub variants: Vec<ProductVariant>,

    #[serde(default)]
    pub images: Vec<ProductImage>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Product {
    /// Finds one of this product's variants.
    pub fn variant(&self, variant_id: VariantId) -> Option<&ProductVariant> {
        self.variants.iter().find(|v| v.id == variant_id)
    }

    /// The image with the lowest position, if any.
    pub fn primary_image(&self) -> Option<&ProductImage> {
        self.images.iter().min_by_key(|img| img.position)
    }

    /// Display name for one language.
    pub fn display_name(&self, lang: &str) -> &str {
        self.name.resolve(lang)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG_PRODUCT: &str = r#"{
        "id": 10,
        "name": {"es": "Remera", "pt": "Camiseta"},
        "handle": "remera",
        "published": true,
        "brand": null,
        "variants": [
            {
                "id": 1,
                "product_id": 10,
                "position": 1,
                "price": "100.00",
                "compare_at_price": null,
                "promotional_price": "80.00",
                "stock_management": true,
                "stock": 4,
                "weight": "0.300",
                "sku": "REM-M",
                "values": [{"es": "M"}],
                "barcode": null,
                "image_id": 99
            }
        ],
        "images": [
            {"id": 2, "product_id": 10, "src": "https://cdn/b.jpg", "position": 2},
            {"id": 1, "product_id": 10, "src": "https://cdn/a.jpg", "position": 1, "alt": null}
        ],
        "canonical_url": "https://shop/remera"
    }"#;

    #[test]
    fn test_parse_catalog_product() {
        let product: Product = serde_json::from_str(CATALOG_PRODUCT).unwrap();

        assert_eq!(product.display_name("pt"), "Camiseta");
        assert_eq!(product.display_name("en"), "Remera");
        assert_eq!(product.handle.resolve("es"), "remera");
        assert_eq!(product.primary_image().unwrap().src, "https://cdn/a.jpg");
        assert!(product.extra.contains_key("canonical_url"));

        let variant = product.variant(1).unwrap();
        assert_eq!(variant.promotional_price.as_deref(), Some("80.00"));
        assert_eq!(variant.compare_at_price, None);
        assert_eq!(variant.stock, Some(4));
        assert_eq!(variant.option_labels("es"), vec!["M"]);
        assert!(product.variant(2).is_none());
    }

    #[test]
    fn test_unknown_variant_fields_round_trip() {
        let product: Product = serde_json::from_str(CATALOG_PRODUCT).unwrap();
        let variant = product.variant(1).unwrap();

        let json = serde_json::to_value(variant).unwrap();
        assert_eq!(json["image_id"], 99);

        let back: ProductVariant = serde_json::from_value(json).unwrap();
        assert_eq!(&back, variant);
    }

    #[test]
    fn test_minimal_variant() {
        let variant: ProductVariant =
            serde_json::from_str(r#"{"id": 5, "price": "12.50"}"#).unwrap();
        assert_eq!(variant, ProductVariant::new(5, "12.50"));
    }

    #[test]
    fn test_localized_text_fallbacks() {
        let only_en = LocalizedText::Translated(BTreeMap::from([(
            "en".to_string(),
            "Shirt".to_string(),
        )]));
        assert_eq!(only_en.resolve("es"), "Shirt");

        let odd = LocalizedText::Translated(BTreeMap::from([
            ("es".to_string(), String::new()),
            ("it".to_string(), "Maglia".to_string()),
        ]));
        assert_eq!(odd.resolve("es"), "Maglia");

        assert_eq!(LocalizedText::default().resolve("es"), "");
    }

    #[test]
    fn test_variant_bindings_mark_prices_optional() {
        let decl = ProductVariant::decl();
        assert!(decl.contains("promotional_price?: string"), "{decl}");
        assert!(decl.contains("compare_at_price?: string"), "{decl}");
        assert!(decl.contains("price: string"), "{decl}");
    }
}
