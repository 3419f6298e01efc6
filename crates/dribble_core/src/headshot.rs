use crate::models::{Player, PlayerId};
use serde::{Deserialize, Serialize};

pub const DEFAULT_HEADSHOT_FILE: &str = "default.png";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadshotSize {
    #[default]
    Large,
    Medium,
    Small,
}

impl HeadshotSize {
    pub fn suffix(&self) -> &'static str {
        match self {
            HeadshotSize::Large => "",
            HeadshotSize::Medium => "_medium",
            HeadshotSize::Small => "_small",
        }
    }
}

/// `base + id + suffix + ".png"`, or the shared placeholder when the player has no headshot.
pub fn headshot_url(base_url: &str, player_id: PlayerId, has_headshot: bool, size: HeadshotSize) -> String {
    if has_headshot {
        format!("{base_url}{player_id}{}.png", size.suffix())
    } else {
        format!("{base_url}{DEFAULT_HEADSHOT_FILE}")
    }
}

/// Headshot URLs against one storage bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadshotResolver {
    base_url: String,
}

impl HeadshotResolver {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self { base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url_for(&self, player: &Player, size: HeadshotSize) -> String {
        headshot_url(&self.base_url, player.id, player.has_headshot, size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://cdn.example/headshots/";

    #[test]
    fn test_headshot_url_sizes() {
        assert_eq!(headshot_url(BASE, 201939, true, HeadshotSize::Large), format!("{BASE}201939.png"));
        assert_eq!(headshot_url(BASE, 201939, true, HeadshotSize::Medium), format!("{BASE}201939_medium.png"));
        assert_eq!(headshot_url(BASE, 201939, true, HeadshotSize::Small), format!("{BASE}201939_small.png"));
    }

    #[test]
    fn test_missing_headshot_uses_default_for_every_size() {
        for size in [HeadshotSize::Large, HeadshotSize::Medium, HeadshotSize::Small] {
            assert_eq!(headshot_url(BASE, 7, false, size), format!("{BASE}default.png"));
        }
    }

    #[test]
    fn test_resolver_appends_slash() {
        let resolver = HeadshotResolver::new("https://cdn.example/headshots");
        assert_eq!(resolver.base_url(), BASE);
    }
}
