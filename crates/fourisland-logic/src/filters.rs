//! Declarative hatch filters.
//!
//! Filters decide the fate of a freshly hatched creature: kept creatures
//! go to the PC, rejected ones are released on the spot. Evaluation is
//! pure and never fails; malformed ranges are refused at authoring time
//! instead. A creature is kept iff it satisfies every criterion of at
//! least one active filter, and with no active filters at all everything
//! is kept.

use serde::{Deserialize, Serialize};

use crate::balance::MAX_IV;
use crate::creature::{Creature, Gender, Stat};
use crate::retro::BASE;
use crate::species::{Rarity, SpeciesTable};

/// Legacy selector meaning "any tag except base". Saved filters may
/// carry it forever, so it stays supported.
pub const ANY_NON_BASE: &str = "__any_non_base__";

/// Retro criterion payload. New filters store a set of tags; old saves
/// may hold a single tag or the any-non-base sentinel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RetroSelector {
    Set(Vec<String>),
    One(String),
}

impl RetroSelector {
    fn matches(&self, tag: &str) -> bool {
        match self {
            RetroSelector::Set(tags) => tags.iter().any(|t| t == tag),
            RetroSelector::One(sentinel) if sentinel == ANY_NON_BASE => tag != BASE,
            RetroSelector::One(exact) => tag == exact,
        }
    }

    fn is_valid(&self) -> bool {
        match self {
            RetroSelector::Set(tags) => !tags.is_empty(),
            RetroSelector::One(_) => true,
        }
    }
}

/// One condition inside a filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Criterion {
    Shiny {
        value: bool,
    },
    Alpha {
        value: bool,
    },
    Nature {
        value: String,
    },
    Gender {
        value: Gender,
    },
    IvStat {
        #[serde(rename = "value")]
        stat: Stat,
        #[serde(rename = "minIv", default)]
        min: u8,
        #[serde(rename = "maxIv", default = "default_max_iv")]
        max: u8,
    },
    Rarity {
        value: Rarity,
    },
    PerfectIvCount {
        value: u8,
    },
    Species {
        value: String,
    },
    RetroSprite {
        value: RetroSelector,
    },
}

fn default_max_iv() -> u8 {
    MAX_IV
}

impl Criterion {
    /// Authoring-time soundness. Evaluation itself never errors.
    pub fn is_valid(&self) -> bool {
        match self {
            Criterion::IvStat { min, max, .. } => min <= max,
            Criterion::RetroSprite { value } => value.is_valid(),
            _ => true,
        }
    }
}

/// A saved filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    pub id: u64,
    pub name: String,
    pub criteria: Vec<Criterion>,
    pub active: bool,
    /// Creation time, unix epoch milliseconds.
    pub created_at: u64,
}

impl Filter {
    /// A filter is storable when it has at least one criterion and every
    /// criterion is sound.
    pub fn validate(&self) -> bool {
        !self.criteria.is_empty() && self.criteria.iter().all(Criterion::is_valid)
    }
}

/// Evaluate a single criterion against a creature.
pub fn matches_criterion(creature: &Creature, criterion: &Criterion, table: &SpeciesTable) -> bool {
    match criterion {
        Criterion::Shiny { value } => creature.is_shiny == *value,
        Criterion::Alpha { value } => creature.is_alpha == *value,
        Criterion::Nature { value } => creature.nature == *value,
        Criterion::Gender { value } => creature.gender == *value,
        Criterion::IvStat { stat, min, max } => {
            let iv = creature.ivs.get(*stat);
            iv >= *min && iv <= *max
        }
        Criterion::Rarity { value } => table
            .get(creature.species)
            .and_then(|s| s.rarity)
            .is_some_and(|r| r == *value),
        Criterion::PerfectIvCount { value } => creature.ivs.perfect_count() >= *value as usize,
        Criterion::Species { value } => table
            .get(creature.species)
            .is_some_and(|s| s.name == *value),
        Criterion::RetroSprite { value } => {
            let tag = if creature.retro.is_empty() {
                BASE
            } else {
                creature.retro.as_str()
            };
            value.matches(tag)
        }
    }
}

/// All criteria of one filter (vacuously true when empty).
pub fn matches_filter(creature: &Creature, filter: &Filter, table: &SpeciesTable) -> bool {
    filter
        .criteria
        .iter()
        .all(|criterion| matches_criterion(creature, criterion, table))
}

/// The keep decision: any active filter fully matched, or no active
/// filters at all.
pub fn should_keep(creature: &Creature, filters: &[Filter], table: &SpeciesTable) -> bool {
    let mut any_active = false;
    for filter in filters.iter().filter(|f| f.active) {
        any_active = true;
        if matches_filter(creature, filter, table) {
            return true;
        }
    }
    !any_active
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creature::IvSpread;
    use crate::species::Species;

    fn table() -> SpeciesTable {
        SpeciesTable::new(vec![Species {
            id: 25,
            name: "Pikachu".to_string(),
            egg_groups: vec!["field".to_string(), "fairy".to_string()],
            gender_rate: 50,
            rarity: Some(Rarity::Uncommon),
            generation: 1,
            egg_steps: 2500,
            egg_capable: true,
            evolutions: Vec::new(),
        }])
    }

    fn creature() -> Creature {
        Creature {
            species: 25,
            is_shiny: false,
            is_square_shiny: false,
            is_alpha: false,
            ivs: IvSpread {
                hp: 31,
                atk: 10,
                def: 20,
                sp_atk: 31,
                sp_def: 5,
                spd: 0,
            },
            nature: "Jolly".to_string(),
            gender: Gender::Female,
            retro: "base".to_string(),
            captured_at: 0,
        }
    }

    fn filter(criteria: Vec<Criterion>) -> Filter {
        Filter {
            id: 1,
            name: "test".to_string(),
            criteria,
            active: true,
            created_at: 0,
        }
    }

    #[test]
    fn test_no_active_filters_keeps_everything() {
        let c = creature();
        assert!(should_keep(&c, &[], &table()));

        let mut inactive = filter(vec![Criterion::Shiny { value: true }]);
        inactive.active = false;
        assert!(should_keep(&c, &[inactive], &table()));
    }

    #[test]
    fn test_no_matching_filter_rejects() {
        let c = creature();
        let shiny_only = filter(vec![Criterion::Shiny { value: true }]);
        assert!(!should_keep(&c, &[shiny_only], &table()));
    }

    #[test]
    fn test_or_across_filters_and_within() {
        let c = creature();
        let wrong = filter(vec![
            Criterion::Nature {
                value: "Jolly".to_string(),
            },
            Criterion::Alpha { value: true },
        ]);
        let right = filter(vec![
            Criterion::Nature {
                value: "Jolly".to_string(),
            },
            Criterion::Gender {
                value: Gender::Female,
            },
        ]);
        assert!(!matches_filter(&c, &wrong, &table()));
        assert!(matches_filter(&c, &right, &table()));
        assert!(should_keep(&c, &[wrong, right], &table()));
    }

    #[test]
    fn test_iv_range_inclusive_both_ends() {
        let c = creature();
        let at_min = Criterion::IvStat {
            stat: Stat::Atk,
            min: 10,
            max: 15,
        };
        let at_max = Criterion::IvStat {
            stat: Stat::Atk,
            min: 5,
            max: 10,
        };
        let outside = Criterion::IvStat {
            stat: Stat::Atk,
            min: 11,
            max: 31,
        };
        assert!(matches_criterion(&c, &at_min, &table()));
        assert!(matches_criterion(&c, &at_max, &table()));
        assert!(!matches_criterion(&c, &outside, &table()));
    }

    #[test]
    fn test_perfect_iv_count_threshold() {
        let c = creature();
        assert!(matches_criterion(
            &c,
            &Criterion::PerfectIvCount { value: 2 },
            &table()
        ));
        assert!(!matches_criterion(
            &c,
            &Criterion::PerfectIvCount { value: 3 },
            &table()
        ));
    }

    #[test]
    fn test_species_and_rarity_resolve_through_table() {
        let c = creature();
        assert!(matches_criterion(
            &c,
            &Criterion::Species {
                value: "Pikachu".to_string()
            },
            &table()
        ));
        assert!(matches_criterion(
            &c,
            &Criterion::Rarity {
                value: Rarity::Uncommon
            },
            &table()
        ));

        let mut stranger = c;
        stranger.species = 999;
        assert!(!matches_criterion(
            &stranger,
            &Criterion::Species {
                value: "Pikachu".to_string()
            },
            &table()
        ));
        assert!(!matches_criterion(
            &stranger,
            &Criterion::Rarity {
                value: Rarity::Uncommon
            },
            &table()
        ));
    }

    #[test]
    fn test_retro_selector_forms() {
        let mut c = creature();
        c.retro = "frlg".to_string();

        let in_set = Criterion::RetroSprite {
            value: RetroSelector::Set(vec!["frlg".to_string(), "rb".to_string()]),
        };
        let exact = Criterion::RetroSprite {
            value: RetroSelector::One("frlg".to_string()),
        };
        let any_non_base = Criterion::RetroSprite {
            value: RetroSelector::One(ANY_NON_BASE.to_string()),
        };
        assert!(matches_criterion(&c, &in_set, &table()));
        assert!(matches_criterion(&c, &exact, &table()));
        assert!(matches_criterion(&c, &any_non_base, &table()));

        c.retro = "base".to_string();
        assert!(!matches_criterion(&c, &in_set, &table()));
        assert!(!matches_criterion(&c, &any_non_base, &table()));
    }

    #[test]
    fn test_validation_rejects_malformed() {
        let empty = filter(Vec::new());
        assert!(!empty.validate());

        let inverted = filter(vec![Criterion::IvStat {
            stat: Stat::Hp,
            min: 20,
            max: 10,
        }]);
        assert!(!inverted.validate());

        let empty_set = filter(vec![Criterion::RetroSprite {
            value: RetroSelector::Set(Vec::new()),
        }]);
        assert!(!empty_set.validate());

        let sound = filter(vec![Criterion::Shiny { value: true }]);
        assert!(sound.validate());
    }
}
