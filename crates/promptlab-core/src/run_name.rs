//! Run name generation and duplication.

use std::sync::OnceLock;

use rand::seq::IndexedRandom;
use rand::Rng;
use regex::Regex;

const ADJECTIVES: &[&str] = &[
    "able", "bold", "brave", "calm", "clever", "crisp", "eager", "gentle", "glad", "keen",
    "lively", "merry", "nimble", "proud", "quick", "quiet", "rare", "sharp", "swift", "witty",
];

const NOUNS: &[&str] = &[
    "ant", "bass", "crane", "deer", "eel", "finch", "fox", "gnu", "hawk", "ibis", "jay", "koi",
    "lark", "mole", "newt", "owl", "puma", "robin", "seal", "wren",
];

/// `adjective-noun-NNN`, e.g. `swift-owl-042`.
pub fn generate_run_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    let adjective = ADJECTIVES.choose(rng).copied().unwrap_or("new");
    let noun = NOUNS.choose(rng).copied().unwrap_or("run");
    let number: u32 = rng.random_range(0..1000);
    format!("{adjective}-{noun}-{number:03}")
}

/// [`generate_run_name`] with the thread-local generator.
pub fn random_run_name() -> String {
    generate_run_name(&mut rand::rng())
}

fn copy_suffix_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s\(\d+\)$").expect("valid regex"))
}

/// Name for a copy of `original`: `"<base> (k)"` with the smallest k ≥ 1
/// not in `existing`, where `<base>` is `original` without any trailing
/// `" (N)"`.
pub fn duplicated_run_name<S: AsRef<str>>(original: &str, existing: &[S]) -> String {
    let base = copy_suffix_regex().replace(original, "");
    let mut k: u32 = 1;
    loop {
        let candidate = format!("{base} ({k})");
        if !existing.iter().any(|name| name.as_ref() == candidate) {
            return candidate;
        }
        k += 1;
    }
}
