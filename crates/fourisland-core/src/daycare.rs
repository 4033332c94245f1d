//! Daycare engine - paced breeding behind a pausable timer
//!
//! Breeding is a timer loop separate from incubation: a compatible pair
//! produces one egg per cycle into a bounded queue. The timer is either
//! running toward a deadline, paused with its remainder banked, or frozen
//! at `None` while the queue is full; the one-second maintenance check
//! restarts frozen timers once space and compatibility return.

use rand::Rng;

use fourisland_logic::balance::incubation;
use fourisland_logic::config::GeneticsConfig;
use fourisland_logic::genetics::{self, are_compatible, breeding_duration_ms};
use fourisland_logic::species::SpeciesTable;

use crate::session::{EggSource, GameState, Notifier};

/// Current egg queue capacity, including the upgrade bonus.
pub fn egg_capacity(state: &GameState) -> usize {
    state.upgrades.daycare_capacity()
}

fn has_queue_space(state: &GameState) -> bool {
    state.daycare.eggs.len() < egg_capacity(state)
}

/// Arm the breeding timer for the current pair. Requires both parents
/// present in the PC and compatible with each other.
pub fn start_breeding(state: &mut GameState, table: &SpeciesTable, now_ms: u64) -> bool {
    let Some((first, second)) = state.daycare.breeding_pair() else {
        return false;
    };
    let (Some(parent1), Some(parent2)) = (state.creature_at(first), state.creature_at(second))
    else {
        return false;
    };
    if !are_compatible(parent1, parent2, table) {
        return false;
    }
    let duration = breeding_duration_ms(parent1, parent2, table, state.upgrades.egg_speed_boost);
    state.daycare.arm_timer(now_ms + duration);
    true
}

/// Bank the remaining time and stop the countdown. False when no timer
/// is running.
pub fn pause_breeding(state: &mut GameState, now_ms: u64) -> bool {
    let Some(deadline) = state.daycare.egg_timer else {
        return false;
    };
    state.daycare.egg_timer = None;
    state.daycare.remaining_time = Some(deadline.saturating_sub(now_ms));
    true
}

/// Restart a paused timer from its banked remainder. With nothing banked
/// this is a no-op on a running timer and a fresh start otherwise.
pub fn resume_breeding(state: &mut GameState, table: &SpeciesTable, now_ms: u64) -> bool {
    if let Some(remaining) = state.daycare.remaining_time {
        state.daycare.arm_timer(now_ms + remaining);
        return true;
    }
    if state.daycare.egg_timer.is_some() {
        return true;
    }
    start_breeding(state, table, now_ms)
}

/// Collect a finished egg, at most one per call. The timer rearms for
/// the next cycle, or freezes when the queue has no room. A pair that
/// went missing or incompatible mid-cycle aborts breeding instead of
/// producing an egg. Returns whether daycare state changed, so callers
/// know to persist after aborts and freezes too.
pub fn collect_ready_egg(
    state: &mut GameState,
    table: &SpeciesTable,
    genetics_config: &GeneticsConfig,
    rng: &mut impl Rng,
    notifier: &mut dyn Notifier,
    now_ms: u64,
) -> bool {
    let Some(deadline) = state.daycare.egg_timer else {
        return false;
    };
    if state.daycare.breeders[0].is_none() || now_ms < deadline {
        return false;
    }
    if !has_queue_space(state) {
        // Hold the timer until space frees up; the maintenance check
        // restarts it.
        state.daycare.egg_timer = None;
        return true;
    }
    let Some((first, second)) = state.daycare.breeding_pair() else {
        log::warn!("Breeding aborted: breeder slots emptied mid-cycle");
        state.daycare.clear_breeding();
        notifier.breeding_aborted();
        return true;
    };
    let (parent1, parent2) = match (state.creature_at(first), state.creature_at(second)) {
        (Some(a), Some(b)) => (a, b),
        _ => {
            log::warn!("Breeding aborted: a parent left the PC");
            state.daycare.clear_breeding();
            notifier.breeding_aborted();
            return true;
        }
    };
    if !are_compatible(parent1, parent2, table) {
        log::warn!("Breeding aborted: pair no longer compatible");
        state.daycare.clear_breeding();
        notifier.breeding_aborted();
        return true;
    }

    let duration = breeding_duration_ms(parent1, parent2, table, state.upgrades.egg_speed_boost);
    let iv_level = state.upgrades.iv_inheritance_boost;
    let Some(egg) = genetics::breed(rng, parent1, parent2, table, genetics_config, iv_level)
    else {
        log::warn!("Breeding aborted: egg species did not resolve");
        state.daycare.clear_breeding();
        notifier.breeding_aborted();
        return true;
    };

    notifier.breeding_egg_ready(&egg);
    state.daycare.eggs.push(egg);

    if has_queue_space(state) {
        state.daycare.arm_timer(now_ms + duration);
    } else {
        // Queue just filled; parents stay, the timer waits.
        state.daycare.egg_timer = None;
    }
    true
}

/// Drain queued eggs into the incubator, newest first, until one side
/// runs out of room.
pub fn transfer_eggs_to_incubator(state: &mut GameState) -> u32 {
    let mut moved = 0;
    for index in (0..state.daycare.eggs.len()).rev() {
        if state.incubator.len() >= incubation::CAPACITY {
            break;
        }
        let egg = state.daycare.eggs.remove(index);
        state.incubator.push(egg);
        moved += 1;
    }
    moved
}

/// The one-second daycare check: restart a frozen timer once the pair is
/// whole and space exists, collect a finished egg, and in daycare intake
/// mode move queued eggs to the incubator. Short-circuits entirely while
/// breeding is paused. Returns whether anything changed.
pub fn update(
    state: &mut GameState,
    table: &SpeciesTable,
    genetics_config: &GeneticsConfig,
    rng: &mut impl Rng,
    notifier: &mut dyn Notifier,
    now_ms: u64,
) -> bool {
    if state.daycare.remaining_time.is_some() {
        return false;
    }

    let mut changed = false;

    if state.daycare.egg_timer.is_none()
        && state.daycare.breeding_pair().is_some()
        && has_queue_space(state)
    {
        changed |= start_breeding(state, table, now_ms);
    }

    changed |= collect_ready_egg(state, table, genetics_config, rng, notifier, now_ms);

    if state.egg_source == EggSource::Daycare {
        changed |= transfer_eggs_to_incubator(state) > 0;
    }

    changed
}

/// Offline catch-up: as many whole breeding cycles as fit in the elapsed
/// time, queue capacity permitting, then a rearm with the leftover time
/// credited (or a freeze when the queue filled). Cycles beyond capacity
/// are simply lost. Skipped while the game is paused; a paused breeding
/// timer never runs here because its deadline is already `None`.
pub fn apply_offline_progress(
    state: &mut GameState,
    table: &SpeciesTable,
    genetics_config: &GeneticsConfig,
    rng: &mut impl Rng,
    now_ms: u64,
) -> u32 {
    if state.paused {
        return 0;
    }
    let Some((first, second)) = state.daycare.breeding_pair() else {
        return 0;
    };
    let Some(last_active) = state.last_active else {
        return 0;
    };
    if state.daycare.egg_timer.is_none() {
        return 0;
    }
    let elapsed_ms = now_ms.saturating_sub(last_active);
    if elapsed_ms == 0 {
        return 0;
    }
    let (parent1, parent2) = match (state.creature_at(first), state.creature_at(second)) {
        (Some(a), Some(b)) => (a.clone(), b.clone()),
        _ => return 0,
    };

    let duration = breeding_duration_ms(&parent1, &parent2, table, state.upgrades.egg_speed_boost)
        .max(1);
    let iv_level = state.upgrades.iv_inheritance_boost;

    let mut remaining = elapsed_ms;
    let mut bred = 0;
    while remaining >= duration && has_queue_space(state) {
        let Some(egg) = genetics::breed(rng, &parent1, &parent2, table, genetics_config, iv_level)
        else {
            break;
        };
        state.daycare.eggs.push(egg);
        bred += 1;
        remaining -= duration;
    }

    if has_queue_space(state) {
        state.daycare.arm_timer(now_ms + duration.saturating_sub(remaining));
    } else {
        state.daycare.egg_timer = None;
    }
    bred
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::NullNotifier;
    use fourisland_logic::creature::{Creature, Gender, IvSpread};
    use fourisland_logic::species::{Rarity, Species};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn species(id: u32, name: &str, rarity: Rarity) -> Species {
        Species {
            id,
            name: name.to_string(),
            egg_groups: vec!["field".to_string()],
            gender_rate: 50,
            rarity: Some(rarity),
            generation: 1,
            egg_steps: 3000,
            egg_capable: true,
            evolutions: Vec::new(),
        }
    }

    fn creature(species_id: u32, gender: Gender) -> Creature {
        Creature {
            species: species_id,
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

    fn breeding_state() -> (GameState, SpeciesTable, StdRng) {
        let table = SpeciesTable::new(vec![
            species(1, "Bulbasaur", Rarity::Common),
            species(4, "Charmander", Rarity::Common),
        ]);
        let mut state = GameState::default();
        state.pc[0] = Some(creature(1, Gender::Female));
        state.pc[1] = Some(creature(4, Gender::Male));
        state.daycare.breeders = [Some(0), Some(1)];
        (state, table, StdRng::seed_from_u64(31))
    }

    #[test]
    fn test_start_arms_timer_for_rarity_bucket() {
        let (mut state, table, _) = breeding_state();
        assert!(start_breeding(&mut state, &table, 5_000));
        // Two commons average to the common bucket: 30s.
        assert_eq!(state.daycare.egg_timer, Some(35_000));
        assert_eq!(state.daycare.remaining_time, None);
    }

    #[test]
    fn test_start_requires_compatible_pair() {
        let (mut state, table, _) = breeding_state();
        // Same-gender pairs are refused.
        state.pc[1] = Some(creature(4, Gender::Female));
        assert!(!start_breeding(&mut state, &table, 0));
        assert_eq!(state.daycare.egg_timer, None);
    }

    #[test]
    fn test_pause_banks_exact_remainder() {
        let (mut state, table, _) = breeding_state();
        assert!(start_breeding(&mut state, &table, 0));

        assert!(pause_breeding(&mut state, 12_000));
        assert_eq!(state.daycare.egg_timer, None);
        assert_eq!(state.daycare.remaining_time, Some(18_000));

        assert!(resume_breeding(&mut state, &table, 50_000));
        assert_eq!(state.daycare.egg_timer, Some(68_000));
        assert_eq!(state.daycare.remaining_time, None);
    }

    #[test]
    fn test_repeated_pause_resume_preserves_total_time() {
        let (mut state, table, _) = breeding_state();
        assert!(start_breeding(&mut state, &table, 0));

        let mut now = 0;
        for _ in 0..4 {
            now += 5_000;
            assert!(pause_breeding(&mut state, now));
            assert!(resume_breeding(&mut state, &table, now));
        }
        // 20s of running time consumed, 10s left on the clock.
        assert_eq!(state.daycare.egg_timer, Some(now + 10_000));
    }

    #[test]
    fn test_collect_queues_egg_and_rearms() {
        let (mut state, table, mut rng) = breeding_state();
        assert!(start_breeding(&mut state, &table, 0));

        let mut notifier = NullNotifier;
        let config = GeneticsConfig::default();
        assert!(!collect_ready_egg(
            &mut state, &table, &config, &mut rng, &mut notifier, 29_999,
        ));
        assert!(collect_ready_egg(
            &mut state, &table, &config, &mut rng, &mut notifier, 30_000,
        ));

        assert_eq!(state.daycare.eggs.len(), 1);
        // Female Bulbasaur side decides the egg species.
        assert_eq!(state.daycare.eggs[0].species, 1);
        assert_eq!(state.daycare.egg_timer, Some(60_000));
    }

    #[test]
    fn test_collect_freezes_when_queue_fills() {
        let (mut state, table, mut rng) = breeding_state();
        assert!(start_breeding(&mut state, &table, 0));
        let capacity = egg_capacity(&state);

        let mut notifier = NullNotifier;
        let config = GeneticsConfig::default();
        let mut now = 0;
        for _ in 0..capacity {
            now += 30_000;
            assert!(collect_ready_egg(
                &mut state, &table, &config, &mut rng, &mut notifier, now,
            ));
        }

        assert_eq!(state.daycare.eggs.len(), capacity);
        assert_eq!(state.daycare.egg_timer, None);
        // Parents are still set: breeding waits for space, not a restart.
        assert_eq!(state.daycare.breeders, [Some(0), Some(1)]);
    }

    #[test]
    fn test_mid_cycle_incompatibility_aborts() {
        let (mut state, table, mut rng) = breeding_state();
        assert!(start_breeding(&mut state, &table, 0));
        // The second parent flips to the same gender mid-cycle.
        state.pc[1] = Some(creature(4, Gender::Female));

        let mut notifier = NullNotifier;
        let config = GeneticsConfig::default();
        // The abort mutates state, so it reports a change.
        assert!(collect_ready_egg(
            &mut state, &table, &config, &mut rng, &mut notifier, 30_000,
        ));

        assert!(state.daycare.eggs.is_empty());
        assert_eq!(state.daycare.breeders, [None, None]);
        assert_eq!(state.daycare.egg_timer, None);
    }

    #[test]
    fn test_update_restarts_frozen_timer_when_space_returns() {
        let (mut state, table, mut rng) = breeding_state();
        // Frozen: parents set, no timer, queue has room.
        let mut notifier = NullNotifier;
        let config = GeneticsConfig::default();
        assert!(update(
            &mut state, &table, &config, &mut rng, &mut notifier, 1_000,
        ));
        assert_eq!(state.daycare.egg_timer, Some(31_000));
    }

    #[test]
    fn test_update_is_inert_while_breeding_paused() {
        let (mut state, table, mut rng) = breeding_state();
        state.daycare.remaining_time = Some(9_000);

        let mut notifier = NullNotifier;
        let config = GeneticsConfig::default();
        assert!(!update(
            &mut state, &table, &config, &mut rng, &mut notifier, 1_000,
        ));
        assert_eq!(state.daycare.egg_timer, None);
        assert_eq!(state.daycare.remaining_time, Some(9_000));
    }

    #[test]
    fn test_transfer_moves_newest_first_until_full() {
        let (mut state, table, mut rng) = breeding_state();
        let config = GeneticsConfig::default();
        for _ in 0..8 {
            let p1 = state.pc[0].clone().unwrap();
            let p2 = state.pc[1].clone().unwrap();
            let egg = genetics::breed(&mut rng, &p1, &p2, &table, &config, 0).unwrap();
            state.daycare.eggs.push(egg);
        }

        let moved = transfer_eggs_to_incubator(&mut state);
        assert_eq!(moved, incubation::CAPACITY as u32);
        assert_eq!(state.incubator.len(), incubation::CAPACITY);
        assert_eq!(state.daycare.eggs.len(), 2);
    }

    #[test]
    fn test_offline_progress_credits_remainder() {
        let (mut state, table, mut rng) = breeding_state();
        assert!(start_breeding(&mut state, &table, 0));
        state.last_active = Some(0);

        let config = GeneticsConfig::default();
        // 100s elapsed at a 30s cycle: three eggs, 10s already paid
        // toward the fourth.
        let bred = apply_offline_progress(
            &mut state, &table, &config, &mut rng, 100_000,
        );

        assert_eq!(bred, 3);
        assert_eq!(state.daycare.eggs.len(), 3);
        assert_eq!(state.daycare.egg_timer, Some(100_000 + 20_000));
    }

    #[test]
    fn test_offline_progress_is_lossy_at_capacity() {
        let (mut state, table, mut rng) = breeding_state();
        assert!(start_breeding(&mut state, &table, 0));
        state.last_active = Some(0);

        let config = GeneticsConfig::default();
        // Enough elapsed time for 40 cycles against a 10-egg queue.
        let bred = apply_offline_progress(
            &mut state, &table, &config, &mut rng, 1_200_000,
        );

        assert_eq!(bred as usize, egg_capacity(&state));
        assert_eq!(state.daycare.eggs.len(), egg_capacity(&state));
        assert_eq!(state.daycare.egg_timer, None);
    }
}
