//! Creature and egg data model.
//!
//! An egg's genetics are fixed the moment it is created; incubation only
//! advances its step counter. Hatching turns an egg into a `Creature`,
//! adding the square-shiny roll and the capture timestamp. Both shapes
//! serialize with the camelCase keys of the save layout.

use serde::{Deserialize, Serialize};

use crate::balance::MAX_IV;

/// Creature gender. Stored as "Male" / "Female" / "-".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    #[serde(rename = "-")]
    Genderless,
}

impl Gender {
    /// Parse a display label ("Genderless" and the "-" code both accepted).
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Male" => Some(Gender::Male),
            "Female" => Some(Gender::Female),
            "Genderless" | "-" => Some(Gender::Genderless),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Genderless => "Genderless",
        }
    }
}

/// The six IV stats, in canonical display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Stat {
    Hp,
    Atk,
    Def,
    SpAtk,
    SpDef,
    Spd,
}

impl Stat {
    pub const ALL: [Stat; 6] = [
        Stat::Hp,
        Stat::Atk,
        Stat::Def,
        Stat::SpAtk,
        Stat::SpDef,
        Stat::Spd,
    ];

    /// Parse a display label as the filter builder shows it.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "HP" => Some(Stat::Hp),
            "ATK" => Some(Stat::Atk),
            "DEF" => Some(Stat::Def),
            "SP.ATK" => Some(Stat::SpAtk),
            "SP.DEF" => Some(Stat::SpDef),
            "SPD" => Some(Stat::Spd),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Stat::Hp => "HP",
            Stat::Atk => "ATK",
            Stat::Def => "DEF",
            Stat::SpAtk => "SP.ATK",
            Stat::SpDef => "SP.DEF",
            Stat::Spd => "SPD",
        }
    }
}

/// One 0-31 value per stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IvSpread {
    pub hp: u8,
    pub atk: u8,
    pub def: u8,
    pub sp_atk: u8,
    pub sp_def: u8,
    pub spd: u8,
}

impl IvSpread {
    pub fn get(&self, stat: Stat) -> u8 {
        match stat {
            Stat::Hp => self.hp,
            Stat::Atk => self.atk,
            Stat::Def => self.def,
            Stat::SpAtk => self.sp_atk,
            Stat::SpDef => self.sp_def,
            Stat::Spd => self.spd,
        }
    }

    pub fn set(&mut self, stat: Stat, value: u8) {
        match stat {
            Stat::Hp => self.hp = value,
            Stat::Atk => self.atk = value,
            Stat::Def => self.def = value,
            Stat::SpAtk => self.sp_atk = value,
            Stat::SpDef => self.sp_def = value,
            Stat::Spd => self.spd = value,
        }
    }

    /// Stats whose IV sits at the maximum.
    pub fn perfect_count(&self) -> usize {
        Stat::ALL
            .iter()
            .filter(|&&stat| self.get(stat) == MAX_IV)
            .count()
    }
}

impl Default for IvSpread {
    fn default() -> Self {
        Self {
            hp: 0,
            atk: 0,
            def: 0,
            sp_atk: 0,
            sp_def: 0,
            spd: 0,
        }
    }
}

/// An unhatched egg. Genetics are already decided; `steps` is the only
/// field incubation touches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Egg {
    /// Species this egg hatches into.
    #[serde(rename = "speciesId")]
    pub species: u32,
    /// Incubation steps accumulated so far.
    #[serde(rename = "accumulatedSteps")]
    pub steps: u32,
    pub is_shiny: bool,
    pub is_alpha: bool,
    pub ivs: IvSpread,
    pub nature: String,
    pub gender: Gender,
    /// Retro sprite tag, "base" for the modern look.
    #[serde(rename = "retroVariant")]
    pub retro: String,
}

/// A hatched creature in PC storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Creature {
    #[serde(rename = "speciesId")]
    pub species: u32,
    pub is_shiny: bool,
    /// Rolled only for shiny hatches, 1 in 16.
    pub is_square_shiny: bool,
    pub is_alpha: bool,
    pub ivs: IvSpread,
    pub nature: String,
    pub gender: Gender,
    #[serde(rename = "retroVariant")]
    pub retro: String,
    /// Hatch time, unix epoch milliseconds.
    pub captured_at: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gender_label_round_trip() {
        for gender in [Gender::Male, Gender::Female, Gender::Genderless] {
            assert_eq!(Gender::from_label(gender.label()), Some(gender));
        }
        assert_eq!(Gender::from_label("-"), Some(Gender::Genderless));
        assert_eq!(Gender::from_label("male"), None);
    }

    #[test]
    fn test_stat_label_round_trip() {
        for stat in Stat::ALL {
            assert_eq!(Stat::from_label(stat.label()), Some(stat));
        }
        assert_eq!(Stat::from_label("SPATK"), None);
    }

    #[test]
    fn test_iv_get_set_agree() {
        let mut ivs = IvSpread::default();
        ivs.set(Stat::SpDef, 17);
        assert_eq!(ivs.get(Stat::SpDef), 17);
        assert_eq!(ivs.sp_def, 17);
        assert_eq!(ivs.get(Stat::SpAtk), 0);
    }

    #[test]
    fn test_perfect_count() {
        let mut ivs = IvSpread::default();
        assert_eq!(ivs.perfect_count(), 0);
        ivs.set(Stat::Hp, 31);
        ivs.set(Stat::Spd, 31);
        ivs.set(Stat::Atk, 30);
        assert_eq!(ivs.perfect_count(), 2);
    }
}
