//! Incubation engine - egg intake, step ticks, and hatching
//!
//! Eggs accumulate steps each tick and hatch the moment they cross their
//! species' threshold, in the same call. Hatch rewards (counters, candy
//! roll, pokedollar) are granted whether or not the creature survives the
//! keep/release filters.

use rand::Rng;

use fourisland_logic::balance::{incubation, odds};
use fourisland_logic::creature::{Creature, Egg};
use fourisland_logic::filters;
use fourisland_logic::probability::roll_one_in;
use fourisland_logic::species::SpeciesTable;
use fourisland_logic::wild;

use crate::session::{EggSource, GameState, Notifier};

/// What a tick or catch-up pass hatched.
#[derive(Debug, Clone, Copy, Default)]
pub struct HatchReport {
    /// Eggs that hatched.
    pub hatched: u32,
    /// How many of those were shiny.
    pub shiny: u32,
    /// Creatures committed to the PC (kept by filters, slot found).
    pub kept: u32,
}

/// Uniform step roll in the upgrade-shifted range.
fn roll_steps(state: &GameState, rng: &mut impl Rng) -> u32 {
    let (min, max) = state.upgrades.step_range();
    rng.gen_range(min..=max)
}

/// One tick: every egg gets its own fresh step roll. Iterates backwards
/// so hatches can remove eggs without skipping their neighbors.
pub fn run_tick(
    state: &mut GameState,
    table: &SpeciesTable,
    rng: &mut impl Rng,
    notifier: &mut dyn Notifier,
    now_ms: u64,
) -> HatchReport {
    let mut report = HatchReport::default();
    for index in (0..state.incubator.len()).rev() {
        let steps = roll_steps(state, rng);
        add_steps(state, table, rng, notifier, index, steps, now_ms, &mut report);
    }
    report
}

/// Add steps to one egg, hatching it in the same call if it crosses the
/// species threshold. Overshoot beyond the threshold is irrelevant;
/// nothing carries over.
pub fn add_steps(
    state: &mut GameState,
    table: &SpeciesTable,
    rng: &mut impl Rng,
    notifier: &mut dyn Notifier,
    index: usize,
    steps: u32,
    now_ms: u64,
    report: &mut HatchReport,
) {
    let hatch_threshold = {
        let Some(egg) = state.incubator.get_mut(index) else {
            return;
        };
        let Some(species) = table.get(egg.species) else {
            return;
        };
        egg.steps = egg.steps.saturating_add(steps);
        species.egg_steps
    };

    if state.incubator[index].steps >= hatch_threshold {
        hatch(state, table, rng, notifier, index, now_ms, report);
    }
}

/// The hatch ritual: build the creature, bump the counters, filter it
/// into the PC (or not), roll the candy bonus, pay the pokedollar, drop
/// the egg.
fn hatch(
    state: &mut GameState,
    table: &SpeciesTable,
    rng: &mut impl Rng,
    notifier: &mut dyn Notifier,
    index: usize,
    now_ms: u64,
    report: &mut HatchReport,
) {
    let egg = state.incubator.remove(index);
    let creature = hatch_creature(rng, &egg, now_ms);

    state.egg_hatched += 1;
    report.hatched += 1;
    if creature.is_shiny {
        state.shiny_hatched += 1;
        report.shiny += 1;
    }

    let mut committed = false;
    if filters::should_keep(&creature, &state.filters, table) {
        // First empty slot wins; a full PC silently discards the creature
        // while the counters and rewards stand.
        if let Some(slot) = state.pc.iter_mut().find(|slot| slot.is_none()) {
            *slot = Some(creature.clone());
            committed = true;
            report.kept += 1;
        }
    }

    if roll_one_in(rng, incubation::RARE_CANDY_CHANCE) {
        state.rare_candy += 1;
    }
    state.pokedollars += 1;

    notifier.egg_hatched(&creature, committed);
}

/// Build the hatched creature from the egg's stored genetics. Square
/// shiny is decided here: 1 in 16, shiny eggs only.
fn hatch_creature(rng: &mut impl Rng, egg: &Egg, now_ms: u64) -> Creature {
    Creature {
        species: egg.species,
        is_shiny: egg.is_shiny,
        is_square_shiny: egg.is_shiny && roll_one_in(rng, odds::SQUARE_SHINY),
        is_alpha: egg.is_alpha,
        ivs: egg.ivs,
        nature: egg.nature.clone(),
        gender: egg.gender,
        retro: egg.retro.clone(),
        captured_at: now_ms,
    }
}

/// Add one egg from the session's configured source.
pub fn add_egg(state: &mut GameState, table: &SpeciesTable, rng: &mut impl Rng) -> bool {
    match state.egg_source {
        EggSource::Shelter => add_wild_egg(state, table, rng),
        EggSource::Daycare => add_egg_from_daycare(state),
    }
}

/// Roll a wild egg into a free slot. Fails when the incubator is full or
/// no species is eligible for wild generation.
pub fn add_wild_egg(state: &mut GameState, table: &SpeciesTable, rng: &mut impl Rng) -> bool {
    if state.incubator.len() >= incubation::CAPACITY {
        return false;
    }
    let Some(egg) = wild::generate_wild_egg(rng, table) else {
        return false;
    };
    state.incubator.push(egg);
    true
}

/// Move the oldest daycare egg into the incubator. Its genetics travel
/// as rolled at breeding time; only the step count restarts.
pub fn add_egg_from_daycare(state: &mut GameState) -> bool {
    if state.incubator.len() >= incubation::CAPACITY || state.daycare.eggs.is_empty() {
        return false;
    }
    let mut egg = state.daycare.eggs.remove(0);
    egg.steps = 0;
    state.incubator.push(egg);
    true
}

/// Top the incubator back up to capacity. Shelter mode only; daycare
/// mode gets its eggs through the maintenance transfer instead.
pub fn fill_incubator(state: &mut GameState, table: &SpeciesTable, rng: &mut impl Rng) -> u32 {
    if state.egg_source != EggSource::Shelter {
        return 0;
    }
    let mut added = 0;
    while state.incubator.len() < incubation::CAPACITY {
        if !add_wild_egg(state, table, rng) {
            break;
        }
        added += 1;
    }
    added
}

/// Catch up every egg on the whole ticks missed since the last recorded
/// activity. The lump total is `ticks x average step yield` rather than
/// per-tick re-rolls, applied once per egg through the normal hatch path
/// so several eggs can hatch from one call. Skipped entirely while
/// paused; the caller re-stamps last-active to keep repeats idempotent.
pub fn apply_offline_progress(
    state: &mut GameState,
    table: &SpeciesTable,
    rng: &mut impl Rng,
    notifier: &mut dyn Notifier,
    now_ms: u64,
) -> HatchReport {
    let mut report = HatchReport::default();
    if state.paused {
        return report;
    }
    let Some(last_active) = state.last_active else {
        return report;
    };
    let elapsed_ms = now_ms.saturating_sub(last_active);
    if elapsed_ms == 0 {
        return report;
    }
    let ticks = elapsed_ms / state.upgrades.tick_interval_ms();
    if ticks == 0 {
        return report;
    }

    let total = (state.upgrades.average_steps_per_tick() as u64).saturating_mul(ticks);
    let lump = total.min(u32::MAX as u64) as u32;

    for index in (0..state.incubator.len()).rev() {
        add_steps(state, table, rng, notifier, index, lump, now_ms, &mut report);
    }
    report
}
