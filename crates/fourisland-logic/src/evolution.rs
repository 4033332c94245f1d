//! Evolution eligibility checks.
//!
//! Rules live on the species record; a rule fires only when every listed
//! method passes and the creature's retro sprite has art for the evolved
//! form's generation. Actually spending the candy and rewriting the
//! creature is the session's job.

use crate::creature::Creature;
use crate::retro::covers_generation;
use crate::species::{EvolutionMethod, EvolutionRule, Species, SpeciesTable};

/// Whether a rule's conditions all hold for this creature given the
/// current rare candy balance.
pub fn check_conditions(
    creature: &Creature,
    rule: &EvolutionRule,
    table: &SpeciesTable,
    rare_candy: u64,
) -> bool {
    // A retro'd creature cannot evolve into a form its sprite set never
    // drew.
    if let Some(evolved) = table.get_by_name(&rule.evolves_to) {
        if !covers_generation(&creature.retro, evolved.generation) {
            return false;
        }
    }

    for method in &rule.methods {
        let passes = match method {
            EvolutionMethod::Level => rare_candy >= rule.candy_cost,
            EvolutionMethod::Gender => rule
                .required_gender
                .map_or(false, |required| creature.gender == required),
            EvolutionMethod::Item => false,
        };
        if !passes {
            return false;
        }
    }

    true
}

/// Every rule of the creature's species that can fire right now.
pub fn possible_evolutions<'a>(
    creature: &Creature,
    table: &'a SpeciesTable,
    rare_candy: u64,
) -> Vec<&'a EvolutionRule> {
    let Some(base) = table.get(creature.species) else {
        return Vec::new();
    };
    base.evolutions
        .iter()
        .filter(|rule| check_conditions(creature, rule, table, rare_candy))
        .collect()
}

pub fn can_evolve(creature: &Creature, table: &SpeciesTable, rare_candy: u64) -> bool {
    !possible_evolutions(creature, table, rare_candy).is_empty()
}

/// Candy price of the first level-gated rule, if any.
pub fn candies_needed(creature: &Creature, table: &SpeciesTable) -> Option<u64> {
    let base = table.get(creature.species)?;
    base.evolutions
        .iter()
        .find(|rule| rule.methods.contains(&EvolutionMethod::Level))
        .map(|rule| rule.candy_cost)
}

/// Resolve the species a named rule evolves into.
pub fn evolution_target<'a>(rule: &EvolutionRule, table: &'a SpeciesTable) -> Option<&'a Species> {
    table.get_by_name(&rule.evolves_to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creature::{Gender, IvSpread};
    use crate::species::Rarity;

    fn rule(evolves_to: &str, methods: Vec<EvolutionMethod>, candy: u64) -> EvolutionRule {
        EvolutionRule {
            evolves_to: evolves_to.to_string(),
            methods,
            candy_cost: candy,
            required_gender: None,
        }
    }

    fn species(id: u32, name: &str, generation: u8, evolutions: Vec<EvolutionRule>) -> Species {
        Species {
            id,
            name: name.to_string(),
            egg_groups: vec!["field".to_string()],
            gender_rate: 50,
            rarity: Some(Rarity::Common),
            generation,
            egg_steps: 3000,
            egg_capable: true,
            evolutions,
        }
    }

    fn creature(species: u32) -> Creature {
        Creature {
            species,
            is_shiny: false,
            is_square_shiny: false,
            is_alpha: false,
            ivs: IvSpread::default(),
            nature: "Hardy".to_string(),
            gender: Gender::Female,
            retro: "base".to_string(),
            captured_at: 0,
        }
    }

    fn table() -> SpeciesTable {
        SpeciesTable::new(vec![
            species(
                1,
                "Bulbasaur",
                1,
                vec![rule("Ivysaur", vec![EvolutionMethod::Level], 25)],
            ),
            species(2, "Ivysaur", 1, Vec::new()),
            species(
                415,
                "Combee",
                4,
                vec![EvolutionRule {
                    evolves_to: "Vespiquen".to_string(),
                    methods: vec![EvolutionMethod::Level, EvolutionMethod::Gender],
                    candy_cost: 30,
                    required_gender: Some(Gender::Female),
                }],
            ),
            species(416, "Vespiquen", 4, Vec::new()),
        ])
    }

    #[test]
    fn test_level_rule_gates_on_candy() {
        let c = creature(1);
        assert!(!can_evolve(&c, &table(), 24));
        assert!(can_evolve(&c, &table(), 25));
        assert_eq!(candies_needed(&c, &table()), Some(25));
    }

    #[test]
    fn test_all_methods_must_pass() {
        let mut c = creature(415);
        c.gender = Gender::Female;
        assert!(can_evolve(&c, &table(), 30));
        assert!(!can_evolve(&c, &table(), 29));

        c.gender = Gender::Male;
        assert!(!can_evolve(&c, &table(), 100));
    }

    #[test]
    fn test_item_method_never_passes() {
        let t = SpeciesTable::new(vec![
            species(
                133,
                "Eevee",
                1,
                vec![rule("Vaporeon", vec![EvolutionMethod::Item], 0)],
            ),
            species(134, "Vaporeon", 1, Vec::new()),
        ]);
        let c = creature(133);
        assert!(!can_evolve(&c, &t, 1_000_000));
    }

    #[test]
    fn test_retro_sprite_blocks_uncovered_generation() {
        // frlg covers up to gen 3; an evolved form in gen 4 is blocked.
        let t = SpeciesTable::new(vec![
            species(
                439,
                "MimeJr",
                4,
                vec![rule("MrMime", vec![EvolutionMethod::Level], 10)],
            ),
            species(122, "MrMime", 4, Vec::new()),
        ]);
        let mut c = creature(439);
        c.retro = "frlg".to_string();
        assert!(!can_evolve(&c, &t, 100));

        c.retro = "base".to_string();
        assert!(can_evolve(&c, &t, 100));

        c.retro = "bw".to_string();
        assert!(can_evolve(&c, &t, 100));
    }

    #[test]
    fn test_unknown_species_has_no_evolutions() {
        let c = creature(999);
        assert!(possible_evolutions(&c, &table(), 100).is_empty());
        assert_eq!(candies_needed(&c, &table()), None);
    }
}
