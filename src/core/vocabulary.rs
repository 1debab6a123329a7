use serde::Deserialize;

/// Enumerable fields of the analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Color,
    Style,
    Gender,
    Season,
    Mood,
    Occasion,
    PieceType,
}

/// Valid-value tables for every enumerable field
///
/// Rendered into the instruction prompt. Model output is never rejected
/// against these tables; an out-of-vocabulary value just fails to match.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Vocabulary {
    pub colors: Vec<String>,
    pub styles: Vec<String>,
    pub genders: Vec<String>,
    pub seasons: Vec<String>,
    pub moods: Vec<String>,
    pub occasions: Vec<String>,
    pub piece_types: Vec<String>,
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            colors: owned(&[
                "Black", "White", "Gray", "Navy", "Blue", "Red", "Green", "Beige", "Brown",
                "Pink", "Purple", "Yellow", "Orange",
            ]),
            styles: owned(&[
                "Casual", "Formal", "Streetwear", "Sporty", "Bohemian", "Minimalist", "Vintage",
                "Elegant", "Business",
            ]),
            genders: owned(&["Men", "Women", "Unisex"]),
            seasons: owned(&["Spring", "Summer", "Autumn", "Winter", "All Season"]),
            moods: owned(&["Confident", "Relaxed", "Playful", "Romantic", "Bold", "Calm"]),
            occasions: owned(&[
                "Everyday", "Work", "Party", "Date", "Sport", "Travel", "Wedding",
            ]),
            piece_types: owned(&[
                "T-Shirt", "Shirt", "Sweater", "Hoodie", "Jacket", "Coat", "Pants", "Jeans",
                "Shorts", "Skirt", "Dress", "Shoes", "Sneakers", "Boots", "Accessories", "Bag",
            ]),
        }
    }
}

impl Vocabulary {
    pub fn values(&self, field: Field) -> &[String] {
        match field {
            Field::Color => &self.colors,
            Field::Style => &self.styles,
            Field::Gender => &self.genders,
            Field::Season => &self.seasons,
            Field::Mood => &self.moods,
            Field::Occasion => &self.occasions,
            Field::PieceType => &self.piece_types,
        }
    }

    /// Case-insensitive membership check (advisory only)
    pub fn contains(&self, field: Field, value: &str) -> bool {
        let value = value.trim();
        self.values(field)
            .iter()
            .any(|v| v.eq_ignore_ascii_case(value))
    }
}
