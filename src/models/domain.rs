use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Gender bucket detected for the uploaded item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Men,
    Women,
    Unisex,
}

impl Gender {
    /// Case-insensitive parse of the three enum values; anything else is `None`
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "men" => Some(Gender::Men),
            "women" => Some(Gender::Women),
            "unisex" => Some(Gender::Unisex),
            _ => None,
        }
    }

    /// Catalog tags a product must carry to be offered for this gender.
    /// `Unisex` places no constraint.
    pub fn catalog_tags(&self) -> Option<Vec<String>> {
        match self {
            Gender::Men => Some(vec!["men".to_string(), "unisex".to_string()]),
            Gender::Women => Some(vec!["women".to_string(), "unisex".to_string()]),
            Gender::Unisex => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Men => "Men",
            Gender::Women => "Women",
            Gender::Unisex => "Unisex",
        }
    }
}

impl Default for Gender {
    fn default() -> Self {
        Gender::Unisex
    }
}

/// The vision model's description of the uploaded item
///
/// Enumerable fields are kept as raw strings: out-of-vocabulary values are
/// carried through and simply fail to match in the catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifiedItem {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub season: Option<String>,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub occasion: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl IdentifiedItem {
    /// Gender used for catalog matching, `Unisex` when absent or unrecognised
    pub fn detected_gender(&self) -> Gender {
        self.gender
            .as_deref()
            .and_then(Gender::parse)
            .unwrap_or_default()
    }
}

/// One complementary piece proposed by the vision model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchFilter {
    #[serde(alias = "piece_type")]
    pub piece_type: String,
    #[serde(default)]
    pub styles: Option<Vec<String>>,
    #[serde(default)]
    pub colors: Option<Vec<String>>,
    #[serde(default)]
    pub season: Option<String>,
    #[serde(default, alias = "match_reason")]
    pub match_reason: String,
}

impl MatchFilter {
    pub fn active_styles(&self) -> Option<&[String]> {
        non_empty(self.styles.as_deref())
    }

    pub fn active_colors(&self) -> Option<&[String]> {
        non_empty(self.colors.as_deref())
    }

    pub fn active_season(&self) -> Option<&str> {
        self.season
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

fn non_empty(values: Option<&[String]>) -> Option<&[String]> {
    values.filter(|v| !v.is_empty())
}

/// A structurally valid analysis from one vision provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisionAnalysis {
    pub identified_item: IdentifiedItem,
    pub filters: Vec<MatchFilter>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
}

impl StockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::InStock => "in_stock",
            StockStatus::LowStock => "low_stock",
            StockStatus::OutOfStock => "out_of_stock",
        }
    }

    pub fn from_db(value: &str) -> Self {
        match value {
            "in_stock" => StockStatus::InStock,
            "low_stock" => StockStatus::LowStock,
            _ => StockStatus::OutOfStock,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    pub url: String,
    #[serde(rename = "type")]
    pub image_type: String,
}

/// A product record as stored in the catalog (read-only here)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogProduct {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub price: f64,
    #[serde(default)]
    pub discount_price: Option<f64>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub styles: Vec<String>,
    #[serde(default)]
    pub season: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub piece_type: String,
    pub stock_status: StockStatus,
    #[serde(default)]
    pub affiliate_link: Option<String>,
    #[serde(default)]
    pub images: Vec<ProductImage>,
}

/// A single bounded catalog lookup (always limit 1)
///
/// `None` on an optional constraint means the constraint is not applied.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogQuery {
    pub piece_type: String,
    pub stock_status: StockStatus,
    pub styles: Option<Vec<String>>,
    pub colors: Option<Vec<String>>,
    pub season: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl CatalogQuery {
    pub fn in_stock(piece_type: &str) -> Self {
        Self {
            piece_type: piece_type.to_string(),
            stock_status: StockStatus::InStock,
            styles: None,
            colors: None,
            season: None,
            tags: None,
        }
    }
}

/// A matched product projected for the client, tagged with its originating filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub price: f64,
    pub discount_price: Option<f64>,
    pub colors: Vec<String>,
    pub image: Option<String>,
    pub accent: String,
    pub affiliate_link: Option<String>,
    pub match_reason: String,
    pub category: String,
}

/// Errors raised while decoding an uploaded image
#[derive(Debug, Error, PartialEq)]
pub enum ImageError {
    #[error("Image payload is empty")]
    Empty,

    #[error("Image is not valid base64: {0}")]
    InvalidEncoding(String),

    #[error("Unsupported image type: {0}")]
    UnsupportedType(String),

    #[error("Image exceeds {limit} bytes")]
    TooLarge { limit: usize },
}

/// Request-scoped image payload; never persisted
#[derive(Clone, PartialEq)]
pub struct ImageInput {
    bytes: Vec<u8>,
    mime_type: String,
}

impl std::fmt::Debug for ImageInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageInput")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ImageInput {
    pub fn new(bytes: Vec<u8>, mime_type: &str) -> Result<Self, ImageError> {
        if bytes.is_empty() {
            return Err(ImageError::Empty);
        }
        // Parameters such as `; charset=binary` are not part of the media type
        let essence = mime_type.split(';').next().unwrap_or_default();
        let mime_type = essence.trim().to_lowercase();
        if !mime_type.starts_with("image/") {
            return Err(ImageError::UnsupportedType(mime_type));
        }
        Ok(Self { bytes, mime_type })
    }

    /// Decode either a `data:image/...;base64,` URL or bare base64.
    /// Bare base64 uses `fallback_mime` (JPEG when absent).
    pub fn from_encoded(encoded: &str, fallback_mime: Option<&str>) -> Result<Self, ImageError> {
        let encoded = encoded.trim();
        if encoded.is_empty() {
            return Err(ImageError::Empty);
        }

        let (mime_type, payload) = match encoded.strip_prefix("data:") {
            Some(rest) => {
                let (header, payload) = rest
                    .split_once(',')
                    .ok_or_else(|| ImageError::InvalidEncoding("malformed data URL".into()))?;
                let mime = header.trim_end_matches(";base64");
                (mime.to_string(), payload)
            }
            None => (fallback_mime.unwrap_or("image/jpeg").to_string(), encoded),
        };

        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|e| ImageError::InvalidEncoding(e.to_string()))?;

        Self::new(bytes, &mime_type)
    }

    pub fn ensure_within(self, limit: usize) -> Result<Self, ImageError> {
        if self.bytes.len() > limit {
            return Err(ImageError::TooLarge { limit });
        }
        Ok(self)
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }
}
