//! Species catalog - the static table every engine reads.
//!
//! Table order is load-bearing: wild generation walks entries front to
//! back with cumulative rarity weights, so reordering the table changes
//! which species a given roll lands on. The serde field names follow the
//! original dataset (snake_case), which is distinct from the camelCase
//! save layout.

use serde::{Deserialize, Serialize};

use crate::balance::wild;
use crate::creature::Gender;

/// Rarity tier. Drives the wild-roll weighting and the breeding timer
/// bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Special,
}

impl Rarity {
    /// Rank used for breeding-timer bucketing, common=1 .. special=4.
    pub fn rank(self) -> u8 {
        match self {
            Rarity::Common => 1,
            Rarity::Uncommon => 2,
            Rarity::Rare => 3,
            Rarity::Special => 4,
        }
    }

    /// Weight in the wild roll. Special species never hatch from wild
    /// eggs and carry no weight.
    pub fn wild_weight(self) -> Option<u32> {
        match self {
            Rarity::Common => Some(wild::COMMON_WEIGHT),
            Rarity::Uncommon => Some(wild::UNCOMMON_WEIGHT),
            Rarity::Rare => Some(wild::RARE_WEIGHT),
            Rarity::Special => None,
        }
    }

    /// Parse the capitalized display label the filter builder uses.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Common" => Some(Rarity::Common),
            "Uncommon" => Some(Rarity::Uncommon),
            "Rare" => Some(Rarity::Rare),
            "Special" => Some(Rarity::Special),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Uncommon => "Uncommon",
            Rarity::Rare => "Rare",
            Rarity::Special => "Special",
        }
    }
}

/// A condition attached to an evolution rule. Every listed method must
/// pass for the rule to fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvolutionMethod {
    /// Spend rare candy equal to the rule's candy cost.
    Level,
    /// The creature's gender must equal the rule's required gender.
    Gender,
    /// Evolution items are not implemented; this always fails.
    Item,
}

/// One evolution edge. `candy_cost` and `required_gender` are read only
/// when the matching method is listed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionRule {
    pub evolves_to: String,
    #[serde(rename = "method")]
    pub methods: Vec<EvolutionMethod>,
    #[serde(rename = "value", default)]
    pub candy_cost: u64,
    #[serde(rename = "value_2", default)]
    pub required_gender: Option<Gender>,
}

/// Static species record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Species {
    pub id: u32,
    pub name: String,
    /// Breeding compatibility tags. Empty means the species cannot breed.
    #[serde(rename = "egg_group", default)]
    pub egg_groups: Vec<String>,
    /// -1 genderless, 0 always female, 100 always male, otherwise the
    /// percent chance of hatching male.
    pub gender_rate: i8,
    #[serde(default)]
    pub rarity: Option<Rarity>,
    #[serde(rename = "gen")]
    pub generation: u8,
    /// Incubation steps required to hatch.
    pub egg_steps: u32,
    /// Species without an egg form never appear in wild rolls.
    #[serde(default = "default_egg_capable")]
    pub egg_capable: bool,
    #[serde(default)]
    pub evolutions: Vec<EvolutionRule>,
}

fn default_egg_capable() -> bool {
    true
}

impl Species {
    /// Timer-bucket rank, treating unrated species as common.
    pub fn rarity_rank(&self) -> u8 {
        self.rarity.map_or(1, Rarity::rank)
    }

    pub fn is_genderless(&self) -> bool {
        self.gender_rate < 0
    }
}

/// Insertion-ordered species table with id and name lookup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeciesTable {
    entries: Vec<Species>,
}

impl SpeciesTable {
    pub fn new(entries: Vec<Species>) -> Self {
        Self { entries }
    }

    pub fn get(&self, id: u32) -> Option<&Species> {
        self.entries.iter().find(|s| s.id == id)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Species> {
        self.entries.iter().find(|s| s.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Species> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
