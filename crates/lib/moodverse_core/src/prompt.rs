//! Soul-reading prompt template.

use crate::validation::SanitizedPortrait;

const NO_TAGS: &str = "none selected";
const NO_JOURNAL: &str = "No entry today.";

/// Exact JSON shape the model is asked to return.
const READING_SHAPE: &str = r#"{
  "portrait_title": "A poetic 3-5 word title for this emotional portrait",
  "soul_color_primary": "a hex color that represents their primary emotion",
  "soul_color_secondary": "a hex color for secondary emotion",
  "soul_color_accent": "a hex color for accent",
  "mood_summary": "2-3 sentences describing their emotional state poetically and insightfully",
  "inner_weather": "one phrase like 'A storm clearing into gold' that describes their inner state",
  "energy_description": "one evocative sentence about their energy",
  "insight": "3-4 sentences of genuine psychological/emotional insight based on their inputs. Be specific, warm, and wise.",
  "affirmation": "A beautiful, personal affirmation (1-2 sentences) crafted specifically for this emotional moment. Make it poetic and powerful.",
  "mood_chips": ["chip1", "chip2", "chip3"],
  "canvas_style": "describe in 10 words a visual abstract art style that matches this mood"
}"#;

/// Render the prompt for one submission. Only the four user fields vary.
pub fn build_prompt(portrait: &SanitizedPortrait) -> String {
    let tags = non_empty_or(&portrait.tags, NO_TAGS);
    let journal = non_empty_or(&portrait.journal, NO_JOURNAL);

    format!(
        "You are a poetic AI soul reader for an app called Moodverse.\n\
         \n\
         The user's emotional data:\n\
         - Core mood: {mood}\n\
         - Energy level: {energy}/10\n\
         - Descriptors: {tags}\n\
         - Journal entry: \"{journal}\"\n\
         \n\
         Generate a deeply personal, poetic soul reading. \
         Return ONLY valid JSON with this exact structure:\n\
         {READING_SHAPE}",
        mood = portrait.mood,
        energy = portrait.energy,
    )
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() { fallback } else { value }
}
