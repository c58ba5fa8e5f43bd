use crate::config::AuthorConfig;
use std::collections::{HashMap, HashSet};

/// Maps raw author names onto canonical, case-folded identities.
///
/// Construction lower-cases the excluded set and both sides of the alias
/// table, so lookups are plain string comparisons afterwards.
#[derive(Debug, Clone, Default)]
pub struct AuthorNormalizer {
    aliases: HashMap<String, String>,
    excluded: HashSet<String>,
}

impl AuthorNormalizer {
    pub fn new(config: &AuthorConfig) -> Self {
        let aliases = config
            .aliases
            .iter()
            .map(|(raw, canonical)| (raw.to_lowercase(), canonical.to_lowercase()))
            .collect();
        let excluded = config.excluded.iter().map(|a| a.to_lowercase()).collect();
        Self { aliases, excluded }
    }

    /// `None` when the author is excluded, otherwise the canonical name.
    pub fn normalize(&self, raw: &str) -> Option<String> {
        let lowered = raw.to_lowercase();
        if self.excluded.contains(&lowered) {
            return None;
        }
        let canonical = self.aliases.get(&lowered).cloned().unwrap_or(lowered);
        if self.excluded.contains(&canonical) {
            return None;
        }
        Some(canonical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn normalizer(aliases: &[(&str, &str)], excluded: &[&str]) -> AuthorNormalizer {
        AuthorNormalizer::new(&AuthorConfig {
            aliases: aliases
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
            excluded: excluded.iter().map(|s| s.to_string()).collect(),
        })
    }

    #[test]
    fn alias_applies_after_case_folding() {
        let n = normalizer(&[("alice", "alice.smith")], &[]);
        assert_eq!(n.normalize("Alice").as_deref(), Some("alice.smith"));
        assert_eq!(n.normalize("Bob").as_deref(), Some("bob"));
    }

    #[test]
    fn exclusion_wins_over_alias() {
        let n = normalizer(&[("ci-bot", "release")], &["CI-Bot"]);
        assert_eq!(n.normalize("ci-bot"), None);
        assert_eq!(n.normalize("CI-BOT"), None);
    }

    #[test]
    fn alias_onto_excluded_name_is_dropped() {
        let n = normalizer(&[("dependabot[bot]", "bot")], &["bot"]);
        assert_eq!(n.normalize("dependabot[bot]"), None);
    }

    #[test]
    fn normalization_is_idempotent() {
        let n = normalizer(&[("al", "Alice.Smith"), ("alice", "alice.smith")], &[]);
        for raw in ["AL", "alice", "Carol"] {
            let once = n.normalize(raw).unwrap();
            assert_eq!(n.normalize(&once).as_deref(), Some(once.as_str()));
        }
    }
}
