use crate::models::ProductImage;

/// Gradient used when the product's primary color has no entry
pub const DEFAULT_ACCENT: &str = "linear-gradient(135deg, #1f2937 0%, #111827 100%)";

const ACCENTS: &[(&str, &str)] = &[
    ("black", "linear-gradient(135deg, #374151 0%, #030712 100%)"),
    ("white", "linear-gradient(135deg, #f9fafb 0%, #d1d5db 100%)"),
    ("gray", "linear-gradient(135deg, #9ca3af 0%, #4b5563 100%)"),
    ("grey", "linear-gradient(135deg, #9ca3af 0%, #4b5563 100%)"),
    ("navy", "linear-gradient(135deg, #1e3a8a 0%, #172554 100%)"),
    ("blue", "linear-gradient(135deg, #60a5fa 0%, #1d4ed8 100%)"),
    ("red", "linear-gradient(135deg, #f87171 0%, #b91c1c 100%)"),
    ("green", "linear-gradient(135deg, #4ade80 0%, #15803d 100%)"),
    ("beige", "linear-gradient(135deg, #f5f0e1 0%, #d6c7a1 100%)"),
    ("brown", "linear-gradient(135deg, #a16207 0%, #713f12 100%)"),
    ("pink", "linear-gradient(135deg, #f9a8d4 0%, #db2777 100%)"),
    ("purple", "linear-gradient(135deg, #c084fc 0%, #7e22ce 100%)"),
    ("yellow", "linear-gradient(135deg, #fde047 0%, #ca8a04 100%)"),
    ("orange", "linear-gradient(135deg, #fdba74 0%, #ea580c 100%)"),
];

/// Fallback visual accent keyed by the product's primary color
pub fn accent_for(colors: &[String]) -> &'static str {
    let Some(primary) = colors.first() else {
        return DEFAULT_ACCENT;
    };
    let primary = primary.trim().to_lowercase();

    ACCENTS
        .iter()
        .find(|(color, _)| *color == primary)
        .map(|(_, gradient)| *gradient)
        .unwrap_or(DEFAULT_ACCENT)
}

/// The image tagged "thumbnail", else the first image, else none
pub fn select_thumbnail(images: &[ProductImage]) -> Option<String> {
    images
        .iter()
        .find(|img| img.image_type.eq_ignore_ascii_case("thumbnail"))
        .or_else(|| images.first())
        .map(|img| img.url.clone())
}
