//! Card name normalization.
//!
//! Reference files are named like `hog-rider_medium.png`,
//! `barbarians_evolutionMedium.png`, or (for operator-confirmed images)
//! `hog-rider_1718000000000.png`. All of them map to a display name such as
//! `Hog Rider` or `Barbarians Evo`.

use regex::Regex;
use std::sync::LazyLock;

/// Trailing millisecond timestamp appended to learned images.
static TIMESTAMP_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<base>.+)_\d+$").expect("valid timestamp pattern"));

const EVOLUTION_SUFFIX: &str = "_evolutionMedium";
const MEDIUM_SUFFIX: &str = "_medium";

/// Suffix that distinguishes an evolution variant from its base card.
pub const EVO_SUFFIX: &str = " Evo";

/// Title-cases text: the first letter of every run of letters is upper case,
/// the rest lower case. `mini p.e.k.k.a` becomes `Mini P.E.K.K.A`.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_is_letter = false;

    for c in text.chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            out.push(c);
            previous_is_letter = false;
        }
    }

    out
}

/// Derives the canonical card name from a template file stem.
pub fn canonical_card_name(stem: &str) -> String {
    let mut is_evolution = stem.contains(EVOLUTION_SUFFIX);
    let stripped = stem.replace(EVOLUTION_SUFFIX, "").replace(MEDIUM_SUFFIX, "");

    let base = match TIMESTAMP_SUFFIX.captures(&stripped) {
        Some(caps) => caps["base"].to_string(),
        None => stripped,
    };

    let mut words = Vec::new();
    for token in base
        .split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|token| !token.is_empty())
    {
        let lower = token.to_lowercase();
        if lower == "evo" || lower == "evolution" {
            is_evolution = true;
            continue;
        }
        words.push(token);
    }

    let mut name = title_case(&words.join(" "));
    if is_evolution && !name.is_empty() {
        name.push_str(EVO_SUFFIX);
    }
    name
}

/// Normalizes free-form operator input with the same rules as file stems,
/// so a typed name matches the name its learned image reloads under.
/// Input that yields no name gives `None`.
pub fn normalize_operator_input(input: &str) -> Option<String> {
    let name = canonical_card_name(input.trim());
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// File stem for a learned image of `card_name`, before the timestamp.
pub fn learned_file_stem(card_name: &str) -> String {
    card_name
        .trim()
        .to_lowercase()
        .replace([' ', '_'], "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("hog rider"), "Hog Rider");
        assert_eq!(title_case("HOG RIDER"), "Hog Rider");
        assert_eq!(title_case("mini p.e.k.k.a"), "Mini P.E.K.K.A");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_canonical_name_from_reference_art() {
        assert_eq!(canonical_card_name("hog-rider_medium"), "Hog Rider");
        assert_eq!(canonical_card_name("mini-p.e.k.k.a_medium"), "Mini P.E.K.K.A");
        assert_eq!(canonical_card_name("barbarians_evolutionMedium"), "Barbarians Evo");
        assert_eq!(canonical_card_name("fireball"), "Fireball");
    }

    #[test]
    fn test_canonical_name_from_learned_image() {
        assert_eq!(canonical_card_name("hog-rider_1718000000000"), "Hog Rider");
        assert_eq!(canonical_card_name("barbarians-evo_1718000000000"), "Barbarians Evo");
        assert_eq!(canonical_card_name("x-bow_1718000000000"), "X Bow");
    }

    #[test]
    fn test_canonical_name_of_bare_evo_is_empty() {
        assert_eq!(canonical_card_name("evo"), "");
    }

    #[test]
    fn test_normalize_operator_input() {
        assert_eq!(normalize_operator_input("   "), None);
        assert_eq!(normalize_operator_input(""), None);
        assert_eq!(
            normalize_operator_input("  electro wizard \n"),
            Some("Electro Wizard".to_string())
        );
        assert_eq!(normalize_operator_input("evo"), None);
    }

    #[test]
    fn test_operator_input_matches_file_stem_rules() {
        assert_eq!(normalize_operator_input("x-bow"), Some("X Bow".to_string()));
        assert_eq!(normalize_operator_input("ice_golem"), Some("Ice Golem".to_string()));
        assert_eq!(
            normalize_operator_input("barbarians evo"),
            Some("Barbarians Evo".to_string())
        );

        for typed in ["x-bow", "ice_golem", "Mini P.E.K.K.A", "royal  giant"] {
            let name = normalize_operator_input(typed).unwrap();
            let stem = format!("{}_{}", learned_file_stem(&name), 1718000000000u64);
            assert_eq!(canonical_card_name(&stem), name, "typed {:?}", typed);
        }
    }

    #[test]
    fn test_learned_stem_round_trips() {
        assert_eq!(learned_file_stem("Hog Rider"), "hog-rider");
        assert_eq!(learned_file_stem(" Barbarians Evo "), "barbarians-evo");
        assert_eq!(learned_file_stem("Ice_Golem"), "ice-golem");

        let stem = format!("{}_{}", learned_file_stem("Barbarians Evo"), 1718000000000u64);
        assert_eq!(canonical_card_name(&stem), "Barbarians Evo");
    }
}
