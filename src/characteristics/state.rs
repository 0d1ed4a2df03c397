//! Characteristic keys and the complete characteristic block

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Lowest legal characteristic value after modifiers
pub const CHARACTERISTIC_MIN: i32 = 1;
/// Highest legal characteristic value after modifiers
pub const CHARACTERISTIC_MAX: i32 = 99;

/// One of the nine core attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Characteristic {
    /// Fuerza (STR)
    #[serde(rename = "FUE")]
    Fue,
    /// Constitución
    #[serde(rename = "CON")]
    Con,
    /// Tamaño (SIZ)
    #[serde(rename = "TAM")]
    Tam,
    /// Destreza (DEX)
    #[serde(rename = "DES")]
    Des,
    /// Apariencia (APP)
    #[serde(rename = "APA")]
    Apa,
    /// Inteligencia
    #[serde(rename = "INT")]
    Int,
    /// Poder (POW)
    #[serde(rename = "POD")]
    Pod,
    /// Educación
    #[serde(rename = "EDU")]
    Edu,
    /// Suerte (Luck)
    #[serde(rename = "SUERTE")]
    Suerte,
}

impl Characteristic {
    /// All nine, in sheet order
    pub const ALL: [Characteristic; 9] = [
        Characteristic::Fue,
        Characteristic::Con,
        Characteristic::Tam,
        Characteristic::Des,
        Characteristic::Apa,
        Characteristic::Int,
        Characteristic::Pod,
        Characteristic::Edu,
        Characteristic::Suerte,
    ];

    /// Parse a key; English abbreviations are accepted as aliases
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "FUE" | "STR" => Some(Characteristic::Fue),
            "CON" => Some(Characteristic::Con),
            "TAM" | "SIZ" => Some(Characteristic::Tam),
            "DES" | "DEX" => Some(Characteristic::Des),
            "APA" | "APP" => Some(Characteristic::Apa),
            "INT" => Some(Characteristic::Int),
            "POD" | "POW" => Some(Characteristic::Pod),
            "EDU" => Some(Characteristic::Edu),
            "SUERTE" | "LUCK" | "SUE" => Some(Characteristic::Suerte),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Characteristic::Fue => "FUE",
            Characteristic::Con => "CON",
            Characteristic::Tam => "TAM",
            Characteristic::Des => "DES",
            Characteristic::Apa => "APA",
            Characteristic::Int => "INT",
            Characteristic::Pod => "POD",
            Characteristic::Edu => "EDU",
            Characteristic::Suerte => "SUERTE",
        }
    }
}

impl fmt::Display for Characteristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Complete characteristic block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct Characteristics {
    pub fue: i32,
    pub con: i32,
    pub tam: i32,
    pub des: i32,
    pub apa: i32,
    pub int: i32,
    pub pod: i32,
    pub edu: i32,
    pub suerte: i32,
}

impl Characteristics {
    /// Every characteristic set to `value`
    pub fn uniform(value: i32) -> Self {
        Self {
            fue: value,
            con: value,
            tam: value,
            des: value,
            apa: value,
            int: value,
            pod: value,
            edu: value,
            suerte: value,
        }
    }

    #[inline]
    pub fn get(&self, characteristic: Characteristic) -> i32 {
        match characteristic {
            Characteristic::Fue => self.fue,
            Characteristic::Con => self.con,
            Characteristic::Tam => self.tam,
            Characteristic::Des => self.des,
            Characteristic::Apa => self.apa,
            Characteristic::Int => self.int,
            Characteristic::Pod => self.pod,
            Characteristic::Edu => self.edu,
            Characteristic::Suerte => self.suerte,
        }
    }

    #[inline]
    pub fn set(&mut self, characteristic: Characteristic, value: i32) {
        let slot = match characteristic {
            Characteristic::Fue => &mut self.fue,
            Characteristic::Con => &mut self.con,
            Characteristic::Tam => &mut self.tam,
            Characteristic::Des => &mut self.des,
            Characteristic::Apa => &mut self.apa,
            Characteristic::Int => &mut self.int,
            Characteristic::Pod => &mut self.pod,
            Characteristic::Edu => &mut self.edu,
            Characteristic::Suerte => &mut self.suerte,
        };
        *slot = value;
    }

    /// Build from a partial map; `None` unless all nine are present
    pub fn from_partial(values: &BTreeMap<Characteristic, i32>) -> Option<Self> {
        let mut characteristics = Self::default();
        for key in Characteristic::ALL {
            characteristics.set(key, *values.get(&key)?);
        }
        Some(characteristics)
    }

    pub fn to_map(&self) -> BTreeMap<Characteristic, i32> {
        Characteristic::ALL
            .iter()
            .map(|&key| (key, self.get(key)))
            .collect()
    }

    /// Characteristics outside `[1, 99]`
    pub fn out_of_range(&self) -> Vec<(Characteristic, i32)> {
        Characteristic::ALL
            .iter()
            .map(|&key| (key, self.get(key)))
            .filter(|(_, value)| !(CHARACTERISTIC_MIN..=CHARACTERISTIC_MAX).contains(value))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_aliases() {
        assert_eq!(Characteristic::from_str("fue"), Some(Characteristic::Fue));
        assert_eq!(Characteristic::from_str("STR"), Some(Characteristic::Fue));
        assert_eq!(Characteristic::from_str("SIZ"), Some(Characteristic::Tam));
        assert_eq!(Characteristic::from_str("Luck"), Some(Characteristic::Suerte));
        assert_eq!(Characteristic::from_str("CHA"), None);
    }

    #[test]
    fn test_from_partial_requires_all_nine() {
        let mut values: BTreeMap<Characteristic, i32> = Characteristics::uniform(50).to_map();
        assert!(Characteristics::from_partial(&values).is_some());

        values.remove(&Characteristic::Suerte);
        assert!(Characteristics::from_partial(&values).is_none());
    }

    #[test]
    fn test_get_set() {
        let mut chars = Characteristics::uniform(50);
        chars.set(Characteristic::Edu, 80);
        assert_eq!(chars.get(Characteristic::Edu), 80);
        assert_eq!(chars.edu, 80);
    }

    #[test]
    fn test_out_of_range() {
        let mut chars = Characteristics::uniform(50);
        chars.set(Characteristic::Apa, 0);
        chars.set(Characteristic::Edu, 100);
        assert_eq!(
            chars.out_of_range(),
            vec![(Characteristic::Apa, 0), (Characteristic::Edu, 100)]
        );
    }

    #[test]
    fn test_serde_keys() {
        let json = serde_json::to_string(&Characteristics::uniform(1)).unwrap();
        assert!(json.contains("\"SUERTE\":1"));
        assert!(json.contains("\"FUE\":1"));
    }
}
