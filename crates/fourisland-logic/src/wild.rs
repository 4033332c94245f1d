//! Wild egg generation: which species hatches from a shelter egg, and
//! the fully rolled egg itself.

use rand::Rng;

use crate::balance::odds;
use crate::creature::Egg;
use crate::probability::{roll_gender, roll_ivs, roll_nature, roll_one_in};
use crate::retro::select_retro_sprite;
use crate::species::{Species, SpeciesTable};

/// Rarity-weighted species pick over the egg-capable entries.
///
/// Species without a configured wild weight (the special tier, or no
/// rarity at all) never come up. The walk subtracts weights in table
/// order, with a first-valid fallback should float rounding run off the
/// end. `None` when the table holds nothing rollable.
pub fn roll_wild_species<'a>(rng: &mut impl Rng, table: &'a SpeciesTable) -> Option<&'a Species> {
    let valid: Vec<&Species> = table
        .iter()
        .filter(|s| s.egg_capable && s.rarity.is_some_and(|r| r.wild_weight().is_some()))
        .collect();

    if valid.is_empty() {
        return None;
    }

    let weight_of = |s: &Species| -> f64 {
        // The filter above guarantees a weight.
        s.rarity.and_then(|r| r.wild_weight()).unwrap_or(0) as f64
    };

    let total: f64 = valid.iter().map(|s| weight_of(s)).sum();
    let mut random = rng.gen::<f64>() * total;
    for species in &valid {
        random -= weight_of(species);
        if random <= 0.0 {
            return Some(species);
        }
    }

    Some(valid[0])
}

/// Roll a complete wild egg for a species: base shiny/alpha odds, uniform
/// IVs and nature, species gender rate, parentless retro roll.
pub fn roll_wild_egg(rng: &mut impl Rng, species: &Species) -> Egg {
    Egg {
        species: species.id,
        steps: 0,
        is_shiny: roll_one_in(rng, odds::SHINY),
        is_alpha: roll_one_in(rng, odds::ALPHA),
        ivs: roll_ivs(rng),
        nature: roll_nature(rng).to_string(),
        gender: roll_gender(rng, species.gender_rate),
        retro: select_retro_sprite(rng, species.generation),
    }
}

/// Pick a wild species and roll its egg in one go.
pub fn generate_wild_egg(rng: &mut impl Rng, table: &SpeciesTable) -> Option<Egg> {
    let species = roll_wild_species(rng, table)?;
    Some(roll_wild_egg(rng, species))
}
