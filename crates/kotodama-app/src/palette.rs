//! Emotion scores → background palette
//!
//! The emotion map only ever picks a discrete case: the strongest emotion
//! selects one of the fixed 4-color palettes below. Remote palette
//! generation belongs to a collaborator; these tables are the local
//! stand-in and the fallback.

use kotodama_core::Color;
use std::collections::HashMap;

fn hex(literal: &str) -> Color {
    Color::from_hex(literal).unwrap_or(Color::WHITE)
}

/// Soft default palette, also used when no emotion dominates
fn fallback() -> [Color; 4] {
    [hex("#E6E6FA"), hex("#B0E0E6"), hex("#F0E68C"), hex("#FFB6C1")]
}

/// Pick the palette for the strongest emotion
pub fn palette_for(emotions: &HashMap<String, f32>) -> [Color; 4] {
    let Some((name, _)) = emotions
        .iter()
        .max_by(|a, b| a.1.total_cmp(b.1))
    else {
        return fallback();
    };

    match name.as_str() {
        "happy" => [hex("#FFD700"), hex("#FFE680"), hex("#FFF4C2"), hex("#FFB347")],
        "sad" => [hex("#4169E1"), hex("#6A8DE8"), hex("#9BB2F0"), hex("#2E4FA3")],
        "angry" => [hex("#FF4500"), hex("#FF7040"), hex("#FF9E73"), hex("#C23616")],
        "fearful" => [hex("#800080"), hex("#9B4D9B"), hex("#B57EB5"), hex("#5C005C")],
        "disgusted" => [hex("#006400"), hex("#2E8B57"), hex("#66AA7F"), hex("#004B00")],
        "surprised" => [hex("#FF69B4"), hex("#FF8FC6"), hex("#FFB5D8"), hex("#E0489A")],
        _ => fallback(),
    }
}

/// Parse `name=value` pairs, comma-separated. Intensities clamp to [0, 1];
/// malformed entries are dropped.
pub fn parse_emotions(input: &str) -> HashMap<String, f32> {
    input
        .split(',')
        .filter_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            let intensity: f32 = value.trim().parse().ok()?;
            Some((name.trim().to_string(), intensity.clamp(0.0, 1.0)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dominant_emotion_picks_its_palette() {
        let emotions = parse_emotions("happy=0.9,sad=0.3");
        let palette = palette_for(&emotions);
        assert_eq!(palette[0], Color::from_hex("#FFD700").unwrap());
    }

    #[test]
    fn unknown_or_empty_emotions_fall_back() {
        assert_eq!(palette_for(&HashMap::new()), fallback());
        let emotions = parse_emotions("melancholy=1.0");
        assert_eq!(palette_for(&emotions), fallback());
    }

    #[test]
    fn intensities_clamp_to_unit_range() {
        let emotions = parse_emotions("happy=7.5,sad=-2.0");
        assert_eq!(emotions["happy"], 1.0);
        assert_eq!(emotions["sad"], 0.0);
    }

    #[test]
    fn malformed_pairs_are_dropped() {
        let emotions = parse_emotions("happy=0.5,notapair,angry=x");
        assert_eq!(emotions.len(), 1);
        assert!(emotions.contains_key("happy"));
    }
}
