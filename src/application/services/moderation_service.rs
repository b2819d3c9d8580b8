use regex_lite::Regex;

use crate::infrastructure::config::ModerationConfig;

/// Why a message was flagged
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    Link,
    BannedWord(String),
}

impl Violation {
    pub fn reason(&self) -> String {
        match self {
            Violation::Link => "link".to_string(),
            Violation::BannedWord(word) => format!("banned word: {}", word),
        }
    }

    pub fn warning(&self) -> &'static str {
        match self {
            Violation::Link => "Links are not allowed in this group.",
            Violation::BannedWord(_) => "Please keep the conversation civil.",
        }
    }
}

/// Flags group messages that break the configured rules
pub struct ModerationService {
    enabled: bool,
    link_pattern: Option<Regex>,
    banned_words: Vec<String>,
}

impl ModerationService {
    pub fn new(config: &ModerationConfig) -> Self {
        // Literal pattern, cannot fail to compile
        let link_pattern = config
            .block_links
            .then(|| Regex::new(r"(?i)(https?://|www\.|chat\.whatsapp\.com/)\S+").ok())
            .flatten();

        Self {
            enabled: config.enabled,
            link_pattern,
            banned_words: config.banned_words.iter().map(|w| w.to_lowercase()).collect(),
        }
    }

    pub fn check(&self, body: &str) -> Option<Violation> {
        if !self.enabled {
            return None;
        }

        if let Some(pattern) = &self.link_pattern {
            if pattern.is_match(body) {
                return Some(Violation::Link);
            }
        }

        let lower = body.to_lowercase();
        lower
            .split(|c: char| !c.is_alphanumeric())
            .find_map(|token| self.banned_words.iter().find(|w| w.as_str() == token))
            .map(|word| Violation::BannedWord(word.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(block_links: bool, banned: &[&str]) -> ModerationConfig {
        ModerationConfig {
            enabled: true,
            block_links,
            banned_words: banned.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_links_are_flagged() {
        let moderation = ModerationService::new(&config(true, &[]));
        assert_eq!(moderation.check("join https://chat.whatsapp.com/abc"), Some(Violation::Link));
        assert_eq!(moderation.check("see WWW.example.com"), Some(Violation::Link));
        assert_eq!(moderation.check("no links here"), None);
    }

    #[test]
    fn test_banned_words_match_whole_tokens() {
        let moderation = ModerationService::new(&config(false, &["Spam"]));
        assert_eq!(moderation.check("buy SPAM now!"), Some(Violation::BannedWord("spam".to_string())));
        assert_eq!(moderation.check("spammer"), None);
        assert_eq!(moderation.check("http://x.y"), None);
    }

    #[test]
    fn test_disabled_moderation_flags_nothing() {
        let mut cfg = config(true, &["spam"]);
        cfg.enabled = false;
        assert_eq!(ModerationService::new(&cfg).check("spam http://x.y"), None);
    }
}
