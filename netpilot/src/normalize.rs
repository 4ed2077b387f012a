//! Output normalization.
//!
//! Devices decorate command output with banner lines that carry no data
//! (CPU load headers, clock source notices). [`OutputNormalizer`] removes
//! every line matching one of its patterns and trims the result.

use regex::Regex;

/// Noise lines every platform strips.
pub const DEFAULT_NOISE: &[&str] = &[r"^Load for five secs", r"^Time source is "];

/// Removes noise lines from command output.
#[derive(Debug, Clone)]
pub struct OutputNormalizer {
    patterns: Vec<Regex>,
}

impl OutputNormalizer {
    /// Build a normalizer from line patterns.
    pub fn new<I, S>(patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| Regex::new(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Normalizer with [`DEFAULT_NOISE`] plus `extra` patterns.
    pub fn with_defaults<I, S>(extra: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalizer = Self::new(DEFAULT_NOISE)?;
        normalizer.patterns.extend(Self::new(extra)?.patterns);
        Ok(normalizer)
    }

    /// Remove noise lines and trim surrounding whitespace.
    ///
    /// Idempotent: `normalize(normalize(x)) == normalize(x)`.
    pub fn normalize(&self, raw: &str) -> String {
        let kept: Vec<&str> = raw
            .split('\n')
            .filter(|line| !self.is_noise(line.trim()))
            .collect();
        kept.join("\n").trim().to_string()
    }

    fn is_noise(&self, line: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(line))
    }
}

impl Default for OutputNormalizer {
    fn default() -> Self {
        Self {
            patterns: DEFAULT_NOISE
                .iter()
                .filter_map(|p| Regex::new(p).ok())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_strips_noise_lines() {
        let normalizer = OutputNormalizer::default();
        let raw = "Load for five secs: 2%/0%; one minute: 1%\n\
                   Time source is NTP, 10:00:00.000 UTC Mon Jan 1 2024\n\
                   \n\
                   Interface    Status\n\
                   Gi0/1        up\n";
        assert_eq!(normalizer.normalize(raw), "Interface    Status\nGi0/1        up");
    }

    #[test]
    fn test_noise_only_output_is_empty() {
        let normalizer = OutputNormalizer::default();
        assert_eq!(normalizer.normalize("  Time source is hardware calendar\n"), "");
        assert_eq!(normalizer.normalize(""), "");
    }

    #[test]
    fn test_noise_mid_line_kept() {
        let normalizer = OutputNormalizer::default();
        let raw = "description Time source is upstream";
        assert_eq!(normalizer.normalize(raw), raw);
    }

    #[test]
    fn test_extra_patterns() {
        let normalizer =
            OutputNormalizer::with_defaults([r"^Building configuration", r"^Current configuration :"])
                .unwrap();
        let raw = "Building configuration...\n\nCurrent configuration : 1024 bytes\n!\nhostname r1\n";
        assert_eq!(normalizer.normalize(raw), "!\nhostname r1");
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        assert!(OutputNormalizer::new(["("]).is_err());
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(
            lines in proptest::collection::vec(
                prop_oneof![
                    "[ a-zA-Z0-9:/]{0,24}",
                    Just("Load for five secs: 1%/0%".to_string()),
                    Just("  Time source is NTP".to_string()),
                    Just("".to_string()),
                ],
                0..12,
            )
        ) {
            let normalizer = OutputNormalizer::default();
            let once = normalizer.normalize(&lines.join("\n"));
            prop_assert_eq!(normalizer.normalize(&once), once.clone());
        }
    }
}
