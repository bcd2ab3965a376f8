use anyhow::{Context, Result};
use regex::{Regex, RegexBuilder};
use tracing::debug;

/// A match against any of these marks the file as a special.
const SPECIAL_PATTERNS: &[&str] = &[r"special", r"SP[0-9]+", r"OVA", r"Extra", r"Bonus"];

/// Episode patterns paired with the capture group holding the number.
/// Evaluated top to bottom, the first pattern that matches wins.
const EPISODE_PATTERNS: &[(&str, usize)] = &[
    (r"Episode[ ]*([0-9]{1,3})", 1),      // Episode 1, Episode 12
    (r"Ep[ ]*([0-9]{1,3})", 1),           // Ep 1, Ep12
    (r"E([0-9]{1,3})([^0-9]|$)", 1),      // E01, E12
    (r"-[ ]*([0-9]{1,3})([^0-9]|$)", 1),  // - 01, -12
    (r"S[0-9]+[ ]*-[ ]*([0-9]{1,3})", 1), // S2 - 10
    (r"S[0-9]+[ ]+([0-9]{1,3})", 1),      // S2 08
    (r"SP[ ]*([0-9]{1,3})", 1),           // SP01, SP 3
    (r" ([0-9]{1,2})[^0-9]", 1),          // isolated number
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inference {
    pub episode: u32,
    pub special: bool,
}

/// Compiled special and episode pattern tables. Build once, share by reference.
#[derive(Debug)]
pub struct EpisodeExtractor {
    special_patterns: Vec<Regex>,
    episode_patterns: Vec<(Regex, usize)>,
}

fn compile(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .with_context(|| format!("Failed to compile pattern {:?}", pattern))
}

impl EpisodeExtractor {
    pub fn new() -> Result<Self> {
        let special_patterns = SPECIAL_PATTERNS
            .iter()
            .map(|pattern| compile(pattern))
            .collect::<Result<Vec<_>>>()?;

        let episode_patterns = EPISODE_PATTERNS
            .iter()
            .map(|(pattern, group)| compile(pattern).map(|re| (re, *group)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            special_patterns,
            episode_patterns,
        })
    }

    pub fn is_special(&self, file_name: &str) -> bool {
        self.special_patterns.iter().any(|re| re.is_match(file_name))
    }

    /// Returns the episode number captured by the first matching pattern,
    /// or 0 when nothing matches.
    pub fn extract_episode_number(&self, file_name: &str) -> u32 {
        for (index, (re, group)) in self.episode_patterns.iter().enumerate() {
            let Some(captures) = re.captures(file_name) else {
                continue;
            };
            let Some(number) = captures.get(*group) else {
                continue;
            };
            // At most three ASCII digits, so this never overflows.
            let Ok(episode) = number.as_str().parse::<u32>() else {
                continue;
            };
            debug!(file_name, pattern = index + 1, episode, "episode pattern matched");
            return episode;
        }
        0
    }

    pub fn infer(&self, file_name: &str) -> Option<Inference> {
        let episode = self.extract_episode_number(file_name);
        if episode == 0 {
            debug!(file_name, "no episode number found");
            return None;
        }
        let special = self.is_special(file_name);
        debug!(file_name, episode, special, "inferred episode");
        Some(Inference { episode, special })
    }
}
