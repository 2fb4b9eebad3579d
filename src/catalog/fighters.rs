// Known fighter codes and fuzzy spelling suggestions

use crate::models::FighterCode;
use std::collections::HashMap;

/// Internal codes of the vanilla roster, as they appear under `fighter/`.
pub const KNOWN_FIGHTER_CODES: &[&str] = &[
    "bayonetta", "brave", "buddy", "captain", "chrom", "cloud", "daisy", "dedede", "demon",
    "diddy", "dolly", "donkey", "duckhunt", "edge", "eflame", "elight", "falco", "fox",
    "gamewatch", "ganon", "gaogaen", "gekkouga", "ike", "inkling", "jack", "kamui", "ken",
    "kirby", "koopa", "koopajr", "krool", "link", "littlemac", "lucario", "lucas", "lucina",
    "luigi", "mario", "mariod", "marth", "master", "metaknight", "mewtwo", "miifighter",
    "miigunner", "miiswordsman", "murabito", "nana", "ness", "packun", "pacman", "palutena",
    "peach", "pfushigisou", "pichu", "pickel", "pikachu", "pikmin", "pit", "pitb", "plizardon",
    "popo", "ptrainer", "purin", "pzenigame", "reflet", "richter", "ridley", "robot", "rockman",
    "rosetta", "roy", "ryu", "samus", "samusd", "sheik", "shizue", "shulk", "simon", "snake",
    "sonic", "szerosuit", "tantan", "toonlink", "trail", "wario", "wiifit", "wolf", "yoshi",
    "younglink", "zelda",
];

/// Similarity of two strings in [0, 1]: shared letters (with multiplicity)
/// over the length of the longer string. An anagram scores 1.
pub fn similarity(a: &str, b: &str) -> f64 {
    let (short, long) = if a.chars().count() > b.chars().count() {
        (b, a)
    } else {
        (a, b)
    };
    let long_len = long.chars().count();
    if long_len == 0 {
        return 0.0;
    }

    let mut long_counts: HashMap<char, usize> = HashMap::new();
    for c in long.chars() {
        *long_counts.entry(c).or_default() += 1;
    }
    let mut short_counts: HashMap<char, usize> = HashMap::new();
    for c in short.chars() {
        *short_counts.entry(c).or_default() += 1;
    }

    let shared: usize = short_counts
        .iter()
        .map(|(c, count)| (*count).min(long_counts.get(c).copied().unwrap_or(0)))
        .sum();

    shared as f64 / long_len as f64
}

/// Known codes scoring at least `threshold` against `code`, best first.
pub fn suggestions<'a>(
    code: &str,
    known: impl IntoIterator<Item = &'a FighterCode>,
    threshold: f64,
) -> Vec<&'a FighterCode> {
    let mut scored: Vec<(f64, &FighterCode)> = known
        .into_iter()
        .map(|candidate| (similarity(code, candidate.as_str()), candidate))
        .filter(|(score, _)| *score >= threshold)
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    scored.into_iter().map(|(_, candidate)| candidate).collect()
}
