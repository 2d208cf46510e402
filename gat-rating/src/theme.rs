//! School visual themes
//!
//! Every school maps onto one entry of a fixed palette. The mapping is a pure
//! function of the school's identity so the same school renders identically
//! across sessions and reloads.
//!
//! Resolution order (first match wins):
//! 1. Name override table (case-insensitive substring match)
//! 2. Theme name declared by the provider, if it is a palette entry
//! 3. `PALETTE[school_id % PALETTE.len()]`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Palette entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Emerald,
    Blue,
    Amber,
    Rose,
    Violet,
    Cyan,
}

/// Fixed palette; order defines the id fallback
pub const PALETTE: [Theme; 6] = [
    Theme::Emerald,
    Theme::Blue,
    Theme::Amber,
    Theme::Rose,
    Theme::Violet,
    Theme::Cyan,
];

/// Institutions pinned to a theme by name (upper-cased needle)
const NAME_OVERRIDES: [(&str, Theme); 2] = [("HORIZON", Theme::Emerald), ("ДЖОМИ", Theme::Blue)];

impl Theme {
    pub fn name(&self) -> &'static str {
        match self {
            Theme::Emerald => "emerald",
            Theme::Blue => "blue",
            Theme::Amber => "amber",
            Theme::Rose => "rose",
            Theme::Violet => "violet",
            Theme::Cyan => "cyan",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        PALETTE
            .iter()
            .copied()
            .find(|theme| theme.name().eq_ignore_ascii_case(needle))
            .ok_or_else(|| format!("unknown theme: {}", s))
    }
}

/// Resolve the theme for a school
pub fn theme_of(school_id: u64, theme_name: Option<&str>, school_name: Option<&str>) -> Theme {
    if let Some(name) = school_name {
        let upper = name.to_uppercase();
        if let Some((_, theme)) = NAME_OVERRIDES.iter().find(|(needle, _)| upper.contains(needle)) {
            return *theme;
        }
    }

    if let Some(theme) = theme_name.and_then(|n| n.parse::<Theme>().ok()) {
        return theme;
    }

    PALETTE[(school_id % PALETTE.len() as u64) as usize]
}
