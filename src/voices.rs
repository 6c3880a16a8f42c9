//! Speaker-to-voice assignment.

/// Prebuilt voices cycled through when the caller supplies no palette.
pub const DEFAULT_PALETTE: [&str; 4] = ["Zephyr", "Puck", "Oriole", "Breeze"];

/// Split a comma-separated palette override, falling back to the default
/// when nothing usable remains. The result is always non-empty.
pub fn parse_palette(arg: Option<&str>) -> Vec<String> {
    let voices: Vec<String> = arg
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|voice| !voice.is_empty())
        .map(String::from)
        .collect();

    if voices.is_empty() {
        DEFAULT_PALETTE.iter().map(|voice| voice.to_string()).collect()
    } else {
        voices
    }
}

/// Deterministic assignment: `speakers[i]` gets `palette[i mod len]`.
/// The palette must be non-empty (use [`parse_palette`]).
pub fn assign(speakers: &[String], palette: &[String]) -> Vec<(String, String)> {
    speakers
        .iter()
        .enumerate()
        .map(|(index, speaker)| (speaker.clone(), palette[index % palette.len()].clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn assignment_wraps_around_the_palette() {
        let speakers = owned(&["Amy", "Bob", "Cid"]);
        let palette = owned(&["V1", "V2"]);
        let cast = assign(&speakers, &palette);
        assert_eq!(
            cast,
            vec![
                ("Amy".to_string(), "V1".to_string()),
                ("Bob".to_string(), "V2".to_string()),
                ("Cid".to_string(), "V1".to_string()),
            ]
        );
    }

    #[test]
    fn no_speakers_means_no_assignments() {
        assert!(assign(&[], &owned(&["V1"])).is_empty());
    }

    #[test]
    fn blank_palette_falls_back_to_default() {
        assert_eq!(parse_palette(None).len(), DEFAULT_PALETTE.len());
        assert_eq!(parse_palette(Some("")).len(), DEFAULT_PALETTE.len());
        assert_eq!(parse_palette(Some(" , ,")).len(), DEFAULT_PALETTE.len());
    }

    #[test]
    fn palette_override_is_trimmed() {
        assert_eq!(
            parse_palette(Some("Zephyr, Puck ,Oriole")),
            owned(&["Zephyr", "Puck", "Oriole"])
        );
    }
}
