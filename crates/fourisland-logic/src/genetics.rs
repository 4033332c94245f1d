//! Breeding rules: pair compatibility, trait inheritance, egg assembly.
//!
//! Inheritance never guarantees a trait. Parent flags only scale the base
//! odds (clamped to certainty), IV slots are copied into an otherwise
//! random spread, and a shared nature is copied at the configured match
//! chance. The retro variant goes through the two-phase roll in
//! [`crate::retro`] with the parents' tags in play.

use rand::Rng;

use crate::balance::{daycare, odds};
use crate::config::{GeneticsConfig, NatureInheritance, TraitBoost};
use crate::creature::{Creature, Egg, Gender, IvSpread, Stat};
use crate::probability::{roll_gender, roll_ivs, roll_nature, roll_odds};
use crate::retro;
use crate::species::{Species, SpeciesTable};

/// Species name that breeds with anything sharing an egg group.
pub const DITTO: &str = "Ditto";

/// Whether two creatures can breed. Requires a shared egg group, then
/// gender rules: two genderless never pair, a single genderless partner
/// must be Ditto, and a gendered pair must be opposite.
pub fn are_compatible(a: &Creature, b: &Creature, table: &SpeciesTable) -> bool {
    let (species_a, species_b) = match (table.get(a.species), table.get(b.species)) {
        (Some(sa), Some(sb)) => (sa, sb),
        _ => return false,
    };

    let shared_group = species_a
        .egg_groups
        .iter()
        .any(|group| species_b.egg_groups.contains(group));
    if !shared_group {
        return false;
    }

    let genderless_a = a.gender == Gender::Genderless;
    let genderless_b = b.gender == Gender::Genderless;

    if genderless_a && genderless_b {
        return false;
    }
    if genderless_a {
        return species_a.name == DITTO;
    }
    if genderless_b {
        return species_b.name == DITTO;
    }

    a.gender != b.gender
}

/// Which species the egg hatches into: the female side's species, unless
/// the female side is Ditto, in which case the other side's. When neither
/// parent is female the second slot counts as the female side, which is
/// how a Ditto pairing resolves to the non-Ditto partner in either slot
/// order.
pub fn resolve_egg_species<'a>(
    parent1: &Creature,
    parent2: &Creature,
    table: &'a SpeciesTable,
) -> Option<&'a Species> {
    let (female, male) = if parent1.gender == Gender::Female {
        (parent1, parent2)
    } else {
        (parent2, parent1)
    };

    let female_species = table.get(female.species)?;
    if female_species.name == DITTO {
        table.get(male.species)
    } else {
        Some(female_species)
    }
}

/// IV inheritance: start from a fully random spread, then copy
/// `min(3 + boost_level, 6)` distinct stats from the combined parent
/// pool. Each draw removes a pool entry whether or not its stat was
/// already taken, so a stat picked from one parent blocks the other
/// parent's copy of that stat too.
pub fn inherit_ivs(
    rng: &mut impl Rng,
    parent1: &IvSpread,
    parent2: &IvSpread,
    boost_level: u32,
) -> IvSpread {
    let total_inherit = (daycare::INHERITED_IV_COUNT + boost_level as usize).min(Stat::ALL.len());

    let mut ivs = roll_ivs(rng);

    let mut pool: Vec<(Stat, u8)> = Vec::with_capacity(Stat::ALL.len() * 2);
    for stat in Stat::ALL {
        pool.push((stat, parent1.get(stat)));
        pool.push((stat, parent2.get(stat)));
    }

    let mut chosen: Vec<Stat> = Vec::with_capacity(total_inherit);
    while chosen.len() < total_inherit && !pool.is_empty() {
        let index = rng.gen_range(0..pool.len());
        let (stat, value) = pool.remove(index);
        if !chosen.contains(&stat) {
            ivs.set(stat, value);
            chosen.push(stat);
        }
    }

    ivs
}

/// Shared roll for the shiny/alpha flags: base `1 in denominator` odds,
/// scaled by the boost for however many parents carry the flag.
pub fn inherit_flag(
    rng: &mut impl Rng,
    parent1_has: bool,
    parent2_has: bool,
    denominator: u32,
    boost: &TraitBoost,
) -> bool {
    let carriers = usize::from(parent1_has) + usize::from(parent2_has);
    roll_odds(rng, denominator, boost.multiplier(carriers))
}

/// Nature inheritance: parents sharing a nature pass it on at the match
/// chance; everything else falls back to a uniform roll.
pub fn inherit_nature(
    rng: &mut impl Rng,
    parent1: &str,
    parent2: &str,
    config: &NatureInheritance,
) -> String {
    if config.enabled && parent1 == parent2 && rng.gen::<f64>() < config.match_chance / 100.0 {
        return parent1.to_string();
    }
    roll_nature(rng).to_string()
}

/// Retro inheritance: parents' tags join the roll when enabled, otherwise
/// the egg gets the plain wild roll.
pub fn inherit_retro(
    rng: &mut impl Rng,
    parent1: &Creature,
    parent2: &Creature,
    generation: u8,
    boost: &TraitBoost,
) -> String {
    if !boost.enabled {
        return retro::select_retro_sprite(rng, generation);
    }
    retro::roll_retro_sprite(
        rng,
        generation,
        Some(&parent1.retro),
        Some(&parent2.retro),
        boost,
    )
}

/// Assemble a bred egg. `None` when the egg species cannot be resolved
/// from the table.
pub fn breed(
    rng: &mut impl Rng,
    parent1: &Creature,
    parent2: &Creature,
    table: &SpeciesTable,
    genetics: &GeneticsConfig,
    iv_boost_level: u32,
) -> Option<Egg> {
    let egg_species = resolve_egg_species(parent1, parent2, table)?;

    Some(Egg {
        species: egg_species.id,
        steps: 0,
        is_shiny: inherit_flag(
            rng,
            parent1.is_shiny,
            parent2.is_shiny,
            odds::SHINY,
            &genetics.shiny,
        ),
        is_alpha: inherit_flag(
            rng,
            parent1.is_alpha,
            parent2.is_alpha,
            odds::ALPHA,
            &genetics.alpha,
        ),
        ivs: inherit_ivs(rng, &parent1.ivs, &parent2.ivs, iv_boost_level),
        nature: inherit_nature(rng, &parent1.nature, &parent2.nature, &genetics.nature),
        gender: roll_gender(rng, egg_species.gender_rate),
        retro: inherit_retro(
            rng,
            parent1,
            parent2,
            egg_species.generation,
            &genetics.retro,
        ),
    })
}

/// Breeding timer for a parent pair: the base timer of the rounded-up
/// average rarity rank, shortened by the egg-speed multiplier per level
/// and floored to whole milliseconds.
pub fn breeding_duration_ms(
    parent1: &Creature,
    parent2: &Creature,
    table: &SpeciesTable,
    egg_speed_level: u32,
) -> u64 {
    let rank1 = table.get(parent1.species).map_or(1, Species::rarity_rank);
    let rank2 = table.get(parent2.species).map_or(1, Species::rarity_rank);
    let avg_rank = (rank1 + rank2 + 1) / 2;

    let base = daycare::base_timer_ms(avg_rank);
    let multiplier = daycare::EGG_SPEED_MULTIPLIER.powi(egg_speed_level as i32);
    (base as f64 * multiplier).floor() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::Rarity;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn species(id: u32, name: &str, groups: &[&str], gender_rate: i8) -> Species {
        Species {
            id,
            name: name.to_string(),
            egg_groups: groups.iter().map(|g| g.to_string()).collect(),
            gender_rate,
            rarity: Some(Rarity::Common),
            generation: 1,
            egg_steps: 3000,
            egg_capable: true,
            evolutions: Vec::new(),
        }
    }

    fn creature(species: u32, gender: Gender) -> Creature {
        Creature {
            species,
            is_shiny: false,
            is_square_shiny: false,
            is_alpha: false,
            ivs: IvSpread::default(),
            nature: "Hardy".to_string(),
            gender,
            retro: "base".to_string(),
            captured_at: 0,
        }
    }

    fn test_table() -> SpeciesTable {
        SpeciesTable::new(vec![
            species(1, "Bulbasaur", &["monster", "grass"], 88),
            species(4, "Charmander", &["monster", "dragon"], 88),
            species(132, "Ditto", &["ditto"], -1),
            species(81, "Magnemite", &["mineral"], -1),
        ])
    }

    fn ditto_table() -> SpeciesTable {
        // Ditto shares a group here so the gender rules get exercised.
        SpeciesTable::new(vec![
            species(1, "Bulbasaur", &["monster", "grass"], 88),
            species(132, "Ditto", &["monster"], -1),
            species(81, "Magnemite", &["monster"], -1),
        ])
    }

    #[test]
    fn test_compatibility_requires_shared_group() {
        let table = SpeciesTable::new(vec![
            species(1, "Bulbasaur", &["monster", "grass"], 88),
            species(7, "Squirtle", &["water"], 88),
        ]);
        let male = creature(1, Gender::Male);
        let female = creature(7, Gender::Female);
        assert!(!are_compatible(&male, &female, &table));
    }

    #[test]
    fn test_opposite_genders_in_shared_group() {
        let table = test_table();
        let male = creature(1, Gender::Male);
        let female = creature(4, Gender::Female);
        let second_male = creature(4, Gender::Male);
        assert!(are_compatible(&male, &female, &table));
        assert!(!are_compatible(&male, &second_male, &table));
    }

    #[test]
    fn test_only_ditto_breeds_while_genderless() {
        let table = ditto_table();
        let ditto = creature(132, Gender::Genderless);
        let magnemite = creature(81, Gender::Genderless);
        let female = creature(1, Gender::Female);

        assert!(are_compatible(&ditto, &female, &table));
        assert!(are_compatible(&female, &ditto, &table));
        assert!(!are_compatible(&magnemite, &female, &table));
        assert!(!are_compatible(&ditto, &magnemite, &table));
    }

    #[test]
    fn test_egg_species_follows_female() {
        let table = test_table();
        let male = creature(4, Gender::Male);
        let female = creature(1, Gender::Female);
        let egg = resolve_egg_species(&male, &female, &table).unwrap();
        assert_eq!(egg.name, "Bulbasaur");
        let egg = resolve_egg_species(&female, &male, &table).unwrap();
        assert_eq!(egg.name, "Bulbasaur");
    }

    #[test]
    fn test_ditto_pair_resolves_partner_species_both_orders() {
        let table = ditto_table();
        let ditto = creature(132, Gender::Genderless);
        let male = creature(1, Gender::Male);

        let egg = resolve_egg_species(&ditto, &male, &table).unwrap();
        assert_eq!(egg.name, "Bulbasaur");
        let egg = resolve_egg_species(&male, &ditto, &table).unwrap();
        assert_eq!(egg.name, "Bulbasaur");
    }

    #[test]
    fn test_inherited_iv_count_and_sources() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut p1 = IvSpread::default();
        let mut p2 = IvSpread::default();
        // Parent values sit outside what a casual random roll would make
        // obvious, so count matches by membership.
        for stat in Stat::ALL {
            p1.set(stat, 31);
            p2.set(stat, 31);
        }

        for _ in 0..100 {
            let child = inherit_ivs(&mut rng, &p1, &p2, 0);
            let inherited = Stat::ALL.iter().filter(|&&s| child.get(s) == 31).count();
            // Exactly three slots are forced to 31; random slots can also
            // land on 31, so the count can only grow.
            assert!(inherited >= 3, "inherited {inherited} of 3");
        }
    }

    #[test]
    fn test_iv_boost_level_caps_at_six() {
        let mut rng = StdRng::seed_from_u64(12);
        let mut p1 = IvSpread::default();
        let p2 = IvSpread::default();
        for stat in Stat::ALL {
            p1.set(stat, 31);
        }

        // At boost 10 every stat is inherited; parents hold 31s and 0s, so
        // no middle values can survive.
        for _ in 0..50 {
            let child = inherit_ivs(&mut rng, &p1, &p2, 10);
            for stat in Stat::ALL {
                let iv = child.get(stat);
                assert!(iv == 0 || iv == 31, "non-parent IV {iv} slipped through");
            }
        }
    }

    #[test]
    fn test_flag_inheritance_certainty_boost() {
        let mut rng = StdRng::seed_from_u64(13);
        let boost = TraitBoost {
            enabled: true,
            one_parent: odds::SHINY as f64,
            two_parents: odds::SHINY as f64,
        };
        for _ in 0..50 {
            assert!(inherit_flag(&mut rng, true, false, odds::SHINY, &boost));
        }
    }

    #[test]
    fn test_disabled_boost_ignores_parents() {
        let mut rng = StdRng::seed_from_u64(13);
        let hits = (0..2000)
            .filter(|_| inherit_flag(&mut rng, true, true, odds::SHINY, &TraitBoost::disabled()))
            .count();
        // Base 1/8192 odds; 2000 trials at base odds almost never hit.
        assert!(hits <= 3, "disabled boost still boosted ({hits} hits)");
    }

    #[test]
    fn test_matching_natures_inherit_at_full_chance() {
        let mut rng = StdRng::seed_from_u64(14);
        let config = NatureInheritance {
            enabled: true,
            match_chance: 100.0,
        };
        for _ in 0..50 {
            assert_eq!(inherit_nature(&mut rng, "Modest", "Modest", &config), "Modest");
        }
    }

    #[test]
    fn test_mismatched_natures_roll_uniform() {
        let mut rng = StdRng::seed_from_u64(14);
        let config = NatureInheritance {
            enabled: true,
            match_chance: 100.0,
        };
        let mut seen_other = false;
        for _ in 0..200 {
            let nature = inherit_nature(&mut rng, "Modest", "Adamant", &config);
            if nature != "Modest" && nature != "Adamant" {
                seen_other = true;
            }
        }
        assert!(seen_other, "mismatched parents never rolled a fresh nature");
    }

    #[test]
    fn test_breed_produces_resolved_species() {
        let mut rng = StdRng::seed_from_u64(15);
        let table = test_table();
        let male = creature(4, Gender::Male);
        let female = creature(1, Gender::Female);

        let egg = breed(
            &mut rng,
            &male,
            &female,
            &table,
            &GeneticsConfig::default(),
            0,
        )
        .unwrap();
        assert_eq!(egg.species, 1);
        assert_eq!(egg.steps, 0);
        assert_ne!(egg.gender, Gender::Genderless);
    }

    #[test]
    fn test_breed_fails_without_table_entry() {
        let mut rng = StdRng::seed_from_u64(15);
        let table = test_table();
        let male = creature(999, Gender::Male);
        let female = creature(998, Gender::Female);
        assert!(breed(
            &mut rng,
            &male,
            &female,
            &table,
            &GeneticsConfig::default(),
            0
        )
        .is_none());
    }

    #[test]
    fn test_breeding_duration_buckets_and_speed() {
        let table = SpeciesTable::new(vec![
            species(1, "Bulbasaur", &["monster"], 88),
            Species {
                rarity: Some(Rarity::Special),
                ..species(150, "Mewtwo", &["monster"], -1)
            },
        ]);
        let common = creature(1, Gender::Female);
        let special = creature(150, Gender::Male);

        // common+common averages rank 1
        assert_eq!(
            breeding_duration_ms(&common, &common, &table, 0),
            daycare::EGG_TIMER_COMMON_MS
        );
        // common+special averages ceil(2.5) = 3 -> rare bucket
        assert_eq!(
            breeding_duration_ms(&common, &special, &table, 0),
            daycare::EGG_TIMER_RARE_MS
        );
        // one speed level: 60000 * 0.9
        assert_eq!(breeding_duration_ms(&common, &special, &table, 1), 54_000);
    }
}
