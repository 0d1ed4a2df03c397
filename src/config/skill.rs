//! Skill catalog structures

use serde::Deserialize;

/// A concrete skill listed in the rulebook
#[derive(Debug, Clone, Deserialize)]
pub struct SkillDefinition {
    pub name: String,
    /// Base value before any allocation
    #[serde(default)]
    pub base: i32,
    /// May not receive personal-interest points at creation (Mitos de Cthulhu, Crédito)
    #[serde(default)]
    pub forbidden_at_creation: bool,
}

/// Base value shared by unlisted specializations of a family, e.g. "Ciencia (Geología)"
#[derive(Debug, Clone, Deserialize)]
pub struct SkillFamily {
    pub name: String,
    #[serde(default)]
    pub base: i32,
}
