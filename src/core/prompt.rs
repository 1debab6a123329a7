use crate::core::vocabulary::{Field, Vocabulary};

/// Number of complementary filters requested from the model
pub const FILTER_COUNT: usize = 4;

fn list(vocab: &Vocabulary, field: Field) -> String {
    vocab.values(field).join(", ")
}

/// Build the fixed instruction prompt sent alongside the image
pub fn build_instruction_prompt(vocab: &Vocabulary) -> String {
    format!(
        r#"You are a fashion stylist. Look at the clothing item in the image and suggest {count} complementary pieces that complete an outfit with it.

Valid values:
- color: {colors}
- style: {styles}
- gender: {genders}
- season: {seasons}
- mood: {moods}
- occasion: {occasions}
- pieceType: {pieces}

Respond with ONLY a single JSON object, no prose and no markdown, in exactly this shape:
{{
  "identifiedItem": {{
    "name": "short item name",
    "color": "<color>",
    "style": "<style>",
    "gender": "<gender>",
    "season": "<season>",
    "mood": "<mood>",
    "occasion": "<occasion>",
    "description": "one sentence describing the item"
  }},
  "filters": [
    {{
      "pieceType": "<pieceType>",
      "styles": ["<style>"],
      "colors": ["<color>"],
      "season": "<season>",
      "matchReason": "why this piece works with the item"
    }}
  ]
}}

Rules:
- "filters" must contain exactly {count} entries, each with a different pieceType that is not the identified item's own type.
- Use only the valid values listed above for every enumerable field."#,
        count = FILTER_COUNT,
        colors = list(vocab, Field::Color),
        styles = list(vocab, Field::Style),
        genders = list(vocab, Field::Gender),
        seasons = list(vocab, Field::Season),
        moods = list(vocab, Field::Mood),
        occasions = list(vocab, Field::Occasion),
        pieces = list(vocab, Field::PieceType),
    )
}
