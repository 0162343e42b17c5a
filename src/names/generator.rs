//! Name Generator
//!
//! Turns a first and last name into something suitably Irish.

use rand::seq::IndexedRandom;
use rand::Rng;

/// First names used when the user supplies none
pub const FIRST_NAMES: [&str; 30] = [
    "Finnegan", "Seamus", "Patrick", "Liam", "Connor", "Aiden", "Rory", "Declan", "Kieran",
    "Brendan", "Colin", "Darragh", "Eamon", "Fergus", "Grady", "Hugh", "Ian", "Jarlath",
    "Killian", "Lorcan", "Mickey", "Niall", "Oisin", "Padraig", "Quinn", "Rafferty", "Shane",
    "Tadhg", "Ultan", "Vaughn",
];

/// Last names used when the user supplies none
pub const LAST_NAMES: [&str; 30] = [
    "O'Malley", "Fitzgerald", "O'Brien", "Murphy", "Kelly", "Sullivan", "Walsh", "McCarthy",
    "O'Connor", "Doyle", "Kennedy", "Ryan", "Gallagher", "Doherty", "McLoughlin", "O'Donnell",
    "Murray", "Quinn", "Moore", "McGrath", "Burke", "Smith", "White", "Flynn", "Campbell",
    "Johnston", "Brown", "Wilson", "Taylor", "Davis",
];

const IRISH_PREFIXES: [&str; 3] = ["Mc", "O'", "Fitz"];
const IRISH_SUFFIXES: [&str; 4] = ["-een", "-y", " the Lucky", " of the Emerald Isle"];

const PREFIX_CHANCE: f64 = 0.3;
const SUFFIX_CHANCE: f64 = 0.2;

/// Generates a leprechaun name.
///
/// When either part is empty a completely random name is drawn from
/// [`FIRST_NAMES`] and [`LAST_NAMES`]. Otherwise the last name gets an Irish
/// prefix 30% of the time and a suffix 20% of the time.
pub fn generate_leprechaun_name<R: Rng + ?Sized>(first: &str, last: &str, rng: &mut R) -> String {
    if first.is_empty() || last.is_empty() {
        let first = FIRST_NAMES.choose(rng).copied().unwrap_or("Finnegan");
        let last = LAST_NAMES.choose(rng).copied().unwrap_or("O'Malley");
        return format!("{first} {last}");
    }

    let mut last = last.to_string();
    if rng.random_bool(PREFIX_CHANCE) {
        if let Some(prefix) = IRISH_PREFIXES.choose(rng) {
            last.insert_str(0, prefix);
        }
    }
    if rng.random_bool(SUFFIX_CHANCE) {
        if let Some(suffix) = IRISH_SUFFIXES.choose(rng) {
            last.push_str(suffix);
        }
    }

    format!("{first} {last}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_name_when_parts_missing() {
        let mut rng = StdRng::seed_from_u64(7);

        for (first, last) in [("", ""), ("Finn", ""), ("", "Murphy")] {
            let name = generate_leprechaun_name(first, last, &mut rng);
            let (gen_first, gen_last) = name.split_once(' ').unwrap();
            assert!(FIRST_NAMES.contains(&gen_first), "unexpected first name {gen_first}");
            assert!(LAST_NAMES.contains(&gen_last), "unexpected last name {gen_last}");
        }
    }

    #[test]
    fn test_keeps_first_name() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let name = generate_leprechaun_name("Brigid", "Kelly", &mut rng);
            assert!(name.starts_with("Brigid "));
            assert!(name.contains("Kelly"));
        }
    }

    #[test]
    fn test_decorations_come_from_fixed_lists() {
        let mut rng = StdRng::seed_from_u64(1234);
        let mut saw_plain = false;
        let mut saw_decorated = false;

        for _ in 0..500 {
            let name = generate_leprechaun_name("Ann", "Kelly", &mut rng);
            let last = name.strip_prefix("Ann ").unwrap();
            let (prefix, rest) = last.split_once("Kelly").unwrap();

            assert!(prefix.is_empty() || IRISH_PREFIXES.contains(&prefix));
            assert!(rest.is_empty() || IRISH_SUFFIXES.contains(&rest));

            if prefix.is_empty() && rest.is_empty() {
                saw_plain = true;
            } else {
                saw_decorated = true;
            }
        }

        assert!(saw_plain && saw_decorated);
    }
}
