//! Game session - the single owner of live game state
//!
//! `GameSession` holds the full game state, the species table, the RNG and
//! the save store, and exposes every player-facing operation as a method.
//! Engine work (incubation, daycare) is delegated to the system modules;
//! this module decides which keys get persisted after each operation and
//! keeps the hatch counters on a write debounce so bulk hatching does not
//! hammer the store.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use fourisland_logic::balance::storage;
use fourisland_logic::config::GeneticsConfig;
use fourisland_logic::creature::{Creature, Egg};
use fourisland_logic::evolution;
use fourisland_logic::filters::{Criterion, Filter};
use fourisland_logic::species::SpeciesTable;
use fourisland_logic::upgrades::{UpgradeKind, UpgradeLevels};

use crate::daycare;
use crate::incubator;
use crate::persistence::{keys, read_json, write_json, KvStore};
use crate::transfer::{self, TransferError};

/// How long hatch-counter writes may sit in memory before they are
/// flushed to the store.
pub const COUNTER_DEBOUNCE_MS: u64 = 500;

/// Where freshly added incubator eggs come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EggSource {
    /// Random wild eggs, weighted by species rarity.
    #[default]
    Shelter,
    /// Eggs bred in the daycare queue.
    Daycare,
}

/// Daycare breeding state.
///
/// At most one of `egg_timer` and `remaining_time` is ever set: the
/// breeding timer is running, paused with its remainder banked, or absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaycareState {
    /// PC indices of the breeding pair.
    pub breeders: [Option<usize>; 2],
    /// Completion deadline, epoch ms, while the timer runs.
    pub egg_timer: Option<u64>,
    /// Milliseconds left on a manually paused timer. Absent in older
    /// saves, hence the default.
    #[serde(default)]
    pub remaining_time: Option<u64>,
    /// Bred eggs waiting to be moved to the incubator.
    #[serde(default)]
    pub eggs: Vec<Egg>,
}

impl DaycareState {
    /// Both breeder indices, when the pair is complete.
    pub fn breeding_pair(&self) -> Option<(usize, usize)> {
        match self.breeders {
            [Some(first), Some(second)] => Some((first, second)),
            _ => None,
        }
    }

    /// Start the timer toward `deadline_ms`, dropping any banked pause
    /// remainder.
    pub fn arm_timer(&mut self, deadline_ms: u64) {
        self.egg_timer = Some(deadline_ms);
        self.remaining_time = None;
    }

    /// Forget the pair and any timer state.
    pub fn clear_breeding(&mut self) {
        self.breeders = [None, None];
        self.egg_timer = None;
        self.remaining_time = None;
    }
}

/// Everything a save knows about, in one container.
#[derive(Debug, Clone)]
pub struct GameState {
    pub incubator: Vec<Egg>,
    pub pc: Vec<Option<Creature>>,
    pub filters: Vec<Filter>,
    pub egg_hatched: u64,
    pub shiny_hatched: u64,
    pub rare_candy: u64,
    pub pokedollars: u64,
    pub paused: bool,
    pub upgrades: UpgradeLevels,
    pub daycare: DaycareState,
    /// Epoch ms of the last recorded activity, for offline catch-up.
    pub last_active: Option<u64>,
    pub egg_source: EggSource,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            incubator: Vec::new(),
            pc: vec![None; storage::PC_CAPACITY],
            filters: Vec::new(),
            egg_hatched: 0,
            shiny_hatched: 0,
            rare_candy: 0,
            pokedollars: 0,
            paused: false,
            upgrades: UpgradeLevels::default(),
            daycare: DaycareState::default(),
            last_active: None,
            egg_source: EggSource::Shelter,
        }
    }
}

impl GameState {
    /// The creature in a PC slot, if the slot is filled.
    pub fn creature_at(&self, index: usize) -> Option<&Creature> {
        self.pc.get(index).and_then(|slot| slot.as_ref())
    }

    /// Whether a PC index is currently one of the daycare parents.
    pub fn is_daycare_parent(&self, index: usize) -> bool {
        self.daycare.breeders.contains(&Some(index))
    }
}

/// Host notification hooks for events worth surfacing. Every method
/// defaults to a no-op so headless hosts can ignore the lot.
pub trait Notifier {
    fn egg_hatched(&mut self, _creature: &Creature, _kept: bool) {}
    fn breeding_egg_ready(&mut self, _egg: &Egg) {}
    fn breeding_aborted(&mut self) {}
}

/// Notifier that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {}

/// Session tuning knobs.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Fixed RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Which bred-egg genetics features are active and at what odds.
    pub genetics: GeneticsConfig,
    /// Debounce window for hatch-counter writes.
    pub counter_debounce_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: None,
            genetics: GeneticsConfig::default(),
            counter_debounce_ms: COUNTER_DEBOUNCE_MS,
        }
    }
}

/// The live game: state, species data, RNG, store and notifier in one
/// place, with every mutation written through to the save.
pub struct GameSession<S: KvStore> {
    state: GameState,
    species: SpeciesTable,
    store: S,
    rng: StdRng,
    notifier: Box<dyn Notifier>,
    config: SessionConfig,
    /// When the first unflushed counter write happened.
    counters_dirty_since: Option<u64>,
    /// Set while an imported save is being installed. Suppresses every
    /// write-through so stale in-memory state cannot clobber the import;
    /// the host is expected to rebuild the session afterwards.
    import_in_progress: bool,
}

impl<S: KvStore> GameSession<S> {
    /// Build a session from whatever the store holds. Missing or
    /// malformed keys fall back to that key's default; one bad key never
    /// voids the rest of the save.
    pub fn load(store: S, species: SpeciesTable, config: SessionConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let state = load_state(&store);
        Self {
            state,
            species,
            store,
            rng,
            notifier: Box::new(NullNotifier),
            config,
            counters_dirty_since: None,
            import_in_progress: false,
        }
    }

    /// Replace the no-op notifier with a host-provided one.
    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn species(&self) -> &SpeciesTable {
        &self.species
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn incubator(&self) -> &[Egg] {
        &self.state.incubator
    }

    pub fn pc(&self) -> &[Option<Creature>] {
        &self.state.pc
    }

    pub fn filters(&self) -> &[Filter] {
        &self.state.filters
    }

    pub fn daycare(&self) -> &DaycareState {
        &self.state.daycare
    }

    pub fn upgrades(&self) -> UpgradeLevels {
        self.state.upgrades
    }

    pub fn egg_hatched(&self) -> u64 {
        self.state.egg_hatched
    }

    pub fn shiny_hatched(&self) -> u64 {
        self.state.shiny_hatched
    }

    pub fn pokedollars(&self) -> u64 {
        self.state.pokedollars
    }

    pub fn rare_candy(&self) -> u64 {
        self.state.rare_candy
    }

    pub fn is_paused(&self) -> bool {
        self.state.paused
    }

    pub fn egg_source(&self) -> EggSource {
        self.state.egg_source
    }

    /// Current incubation tick interval, after speed upgrades.
    pub fn tick_interval_ms(&self) -> u64 {
        self.state.upgrades.tick_interval_ms()
    }

    // ── Currencies ──────────────────────────────────────────────────────

    pub fn add_pokedollars(&mut self, amount: u64) {
        self.state.pokedollars += amount;
        self.persist_currencies();
    }

    pub fn spend_pokedollars(&mut self, amount: u64) -> bool {
        if self.state.pokedollars < amount {
            return false;
        }
        self.state.pokedollars -= amount;
        self.persist_currencies();
        true
    }

    pub fn add_rare_candy(&mut self, amount: u64) {
        self.state.rare_candy += amount;
        self.persist_currencies();
    }

    pub fn use_rare_candy(&mut self, amount: u64) -> bool {
        if self.state.rare_candy < amount {
            return false;
        }
        self.state.rare_candy -= amount;
        self.persist_currencies();
        true
    }

    // ── Pause and egg source ────────────────────────────────────────────

    /// Global pause. Periodic drivers keep firing but their bodies
    /// short-circuit, and offline catch-up is skipped entirely.
    pub fn set_paused(&mut self, paused: bool) {
        self.state.paused = paused;
        self.persist_paused();
    }

    pub fn set_egg_source(&mut self, source: EggSource) {
        self.state.egg_source = source;
        self.persist_egg_source();
    }

    // ── Hatch counters ──────────────────────────────────────────────────

    /// Note that hatches happened without writing the counters yet; the
    /// first dirty write opens the debounce window.
    fn mark_counters_dirty(&mut self, now_ms: u64) {
        if self.counters_dirty_since.is_none() {
            self.counters_dirty_since = Some(now_ms);
        }
    }

    /// Write the counters if the debounce window has elapsed.
    pub fn flush_counters_if_due(&mut self, now_ms: u64) {
        if let Some(since) = self.counters_dirty_since {
            if now_ms.saturating_sub(since) >= self.config.counter_debounce_ms {
                self.persist_counters();
            }
        }
    }

    /// Write the counters immediately if anything is pending.
    pub fn flush_counters(&mut self) {
        if self.counters_dirty_since.is_some() {
            self.persist_counters();
        }
    }

    // ── Filters ─────────────────────────────────────────────────────────

    /// Author a new filter. Returns its id, or `None` when the criteria
    /// fail authoring validation. Ids are minted from the clock; a
    /// same-millisecond collision bumps until free.
    pub fn add_filter(
        &mut self,
        name: &str,
        criteria: Vec<Criterion>,
        now_ms: u64,
    ) -> Option<u64> {
        let mut id = now_ms;
        while self.state.filters.iter().any(|f| f.id == id) {
            id += 1;
        }
        let filter = Filter {
            id,
            name: name.to_string(),
            criteria,
            active: true,
            created_at: now_ms,
        };
        if !filter.validate() {
            return None;
        }
        self.state.filters.push(filter);
        self.persist_filters();
        Some(id)
    }

    /// Replace a filter's name and criteria, keeping its id, active flag
    /// and creation time.
    pub fn update_filter(&mut self, id: u64, name: &str, criteria: Vec<Criterion>) -> bool {
        let Some(position) = self.state.filters.iter().position(|f| f.id == id) else {
            return false;
        };
        let mut updated = self.state.filters[position].clone();
        updated.name = name.to_string();
        updated.criteria = criteria;
        if !updated.validate() {
            return false;
        }
        self.state.filters[position] = updated;
        self.persist_filters();
        true
    }

    pub fn remove_filter(&mut self, id: u64) -> bool {
        let before = self.state.filters.len();
        self.state.filters.retain(|f| f.id != id);
        if self.state.filters.len() == before {
            return false;
        }
        self.persist_filters();
        true
    }

    pub fn set_filter_active(&mut self, id: u64, active: bool) -> bool {
        let Some(filter) = self.state.filters.iter_mut().find(|f| f.id == id) else {
            return false;
        };
        filter.active = active;
        self.persist_filters();
        true
    }

    // ── PC storage ──────────────────────────────────────────────────────

    /// Swap two PC slots. Daycare parents cannot be moved because the
    /// breeder references are slot indices.
    pub fn swap_pc_slots(&mut self, first: usize, second: usize) -> bool {
        if first >= self.state.pc.len() || second >= self.state.pc.len() {
            return false;
        }
        if self.state.is_daycare_parent(first) || self.state.is_daycare_parent(second) {
            return false;
        }
        self.state.pc.swap(first, second);
        self.persist_pc();
        true
    }

    /// Empty a PC slot for good. Refused for active daycare parents.
    pub fn release_creature(&mut self, index: usize) -> bool {
        if self.state.is_daycare_parent(index) {
            return false;
        }
        let Some(slot) = self.state.pc.get_mut(index) else {
            return false;
        };
        if slot.is_none() {
            return false;
        }
        *slot = None;
        self.persist_pc();
        true
    }

    // ── Daycare ─────────────────────────────────────────────────────────

    /// Put a PC creature into breeder slot 0 or 1. Does not touch a
    /// running timer; collection re-validates the pair anyway.
    pub fn assign_breeder(&mut self, slot: usize, pc_index: usize) -> bool {
        if slot > 1 || self.state.creature_at(pc_index).is_none() {
            return false;
        }
        if self.state.daycare.breeders[1 - slot] == Some(pc_index) {
            return false;
        }
        self.state.daycare.breeders[slot] = Some(pc_index);
        self.persist_daycare();
        true
    }

    /// Take a parent out of the daycare, ending any breeding in flight.
    pub fn remove_breeder(&mut self, slot: usize) -> bool {
        if slot > 1 || self.state.daycare.breeders[slot].is_none() {
            return false;
        }
        self.state.daycare.breeders[slot] = None;
        self.state.daycare.egg_timer = None;
        self.state.daycare.remaining_time = None;
        self.persist_daycare();
        true
    }

    /// Begin breeding with the current pair. Fails when the pair is
    /// incomplete, a slot no longer holds a creature, or the two are not
    /// compatible.
    pub fn start_breeding(&mut self, now_ms: u64) -> bool {
        let started = daycare::start_breeding(&mut self.state, &self.species, now_ms);
        if started {
            self.persist_daycare();
        }
        started
    }

    /// Freeze a running breeding timer, banking the exact remainder.
    pub fn pause_breeding(&mut self, now_ms: u64) {
        if daycare::pause_breeding(&mut self.state, now_ms) {
            self.persist_daycare();
        }
    }

    /// Resume a paused timer from its banked remainder, or start fresh if
    /// nothing was banked.
    pub fn resume_breeding(&mut self, now_ms: u64) -> bool {
        let resumed = daycare::resume_breeding(&mut self.state, &self.species, now_ms);
        if resumed {
            self.persist_daycare();
        }
        resumed
    }

    pub fn is_breeding_paused(&self) -> bool {
        self.state.daycare.remaining_time.is_some()
    }

    // ── Upgrades ────────────────────────────────────────────────────────

    /// Buy the next level of an upgrade if the pokedollars are there.
    pub fn purchase_upgrade(&mut self, kind: UpgradeKind) -> bool {
        let level = self.state.upgrades.level(kind);
        let cost = kind.cost_at(level);
        if !self.spend_pokedollars(cost) {
            return false;
        }
        self.state.upgrades.bump(kind);
        self.persist_upgrades();
        true
    }

    // ── Evolution ───────────────────────────────────────────────────────

    /// Evolve the creature in a PC slot along the named rule: conditions
    /// are re-checked, the candy price is spent, and only the species id
    /// changes, so genetics ride along.
    pub fn evolve_creature(&mut self, pc_index: usize, target_name: &str) -> bool {
        let (cost, target_id) = {
            let Some(creature) = self.state.creature_at(pc_index) else {
                return false;
            };
            let Some(base) = self.species.get(creature.species) else {
                return false;
            };
            let Some(rule) = base.evolutions.iter().find(|r| r.evolves_to == target_name)
            else {
                return false;
            };
            if !evolution::check_conditions(creature, rule, &self.species, self.state.rare_candy)
            {
                return false;
            }
            let Some(target) = self.species.get_by_name(target_name) else {
                return false;
            };
            (rule.candy_cost, target.id)
        };
        if !self.use_rare_candy(cost) {
            return false;
        }
        if let Some(Some(creature)) = self.state.pc.get_mut(pc_index) {
            creature.species = target_id;
        }
        self.persist_pc();
        true
    }

    // ── Engine drivers ──────────────────────────────────────────────────

    /// One incubation tick: every egg gains its own step roll and hatches
    /// are committed. A no-op while paused.
    pub fn incubation_tick(&mut self, now_ms: u64) {
        if self.state.paused {
            return;
        }
        let report = incubator::run_tick(
            &mut self.state,
            &self.species,
            &mut self.rng,
            &mut *self.notifier,
            now_ms,
        );
        self.commit_hatches(&report, now_ms);
    }

    /// The fixed one-second check: daycare collection and timer upkeep,
    /// shelter refill, and the counter-debounce flush.
    pub fn maintenance_tick(&mut self, now_ms: u64) {
        let changed = daycare::update(
            &mut self.state,
            &self.species,
            &self.config.genetics,
            &mut self.rng,
            &mut *self.notifier,
            now_ms,
        );
        if changed {
            self.persist_daycare();
            self.persist_incubator();
        }
        if !self.state.paused {
            let added = incubator::fill_incubator(&mut self.state, &self.species, &mut self.rng);
            if added > 0 {
                self.persist_incubator();
            }
        }
        self.flush_counters_if_due(now_ms);
    }

    /// Add one egg from the configured source. Fails when the incubator
    /// is full, the shelter has no eligible species, or the daycare queue
    /// is empty.
    pub fn add_incubator_egg(&mut self) -> bool {
        let added = incubator::add_egg(&mut self.state, &self.species, &mut self.rng);
        if added {
            self.persist_incubator();
            if self.state.egg_source == EggSource::Daycare {
                self.persist_daycare();
            }
        }
        added
    }

    /// Catch up on everything that would have happened since the last
    /// recorded activity, then re-stamp it so a second call is a no-op.
    pub fn resume(&mut self, now_ms: u64) {
        let bred = daycare::apply_offline_progress(
            &mut self.state,
            &self.species,
            &self.config.genetics,
            &mut self.rng,
            now_ms,
        );
        let report = incubator::apply_offline_progress(
            &mut self.state,
            &self.species,
            &mut self.rng,
            &mut *self.notifier,
            now_ms,
        );
        if bred > 0 || report.hatched > 0 {
            log::info!(
                "Offline catch-up: {} eggs bred, {} hatched",
                bred,
                report.hatched
            );
        }
        self.state.last_active = Some(now_ms);
        self.persist_daycare();
        self.commit_hatches(&report, now_ms);
        self.persist_last_active();
    }

    /// Record activity and flush pending counter writes. Call on the way
    /// out; `resume` uses the stamp to size the next offline catch-up.
    pub fn suspend(&mut self, now_ms: u64) {
        self.state.last_active = Some(now_ms);
        self.persist_last_active();
        self.flush_counters();
    }

    fn commit_hatches(&mut self, report: &incubator::HatchReport, now_ms: u64) {
        if !self.state.incubator.is_empty() || report.hatched > 0 {
            self.persist_incubator();
        }
        if report.hatched > 0 {
            log::debug!(
                "{} hatched ({} shiny, {} kept)",
                report.hatched,
                report.shiny,
                report.kept
            );
            self.mark_counters_dirty(now_ms);
            self.persist_pc();
            self.persist_currencies();
        }
    }

    // ── Export / import ─────────────────────────────────────────────────

    /// The whole save as a base64 transport string.
    pub fn export_save(&self, now_ms: u64) -> String {
        transfer::export_save(&self.store, now_ms)
    }

    /// Replace the store contents with an exported save. On success the
    /// session stops persisting anything; the host must rebuild it from
    /// the store to pick up the imported state.
    pub fn import_save(&mut self, payload: &str) -> Result<(), TransferError> {
        self.import_in_progress = true;
        self.counters_dirty_since = None;
        match transfer::import_save(&mut self.store, payload) {
            Ok(()) => {
                log::info!("Save imported; session writes suspended until rebuild");
                Ok(())
            }
            Err(e) => {
                // Nothing was replaced; normal persistence may continue.
                self.import_in_progress = false;
                Err(e)
            }
        }
    }

    // ── Write-through ───────────────────────────────────────────────────

    fn persist_incubator(&mut self) {
        if self.import_in_progress {
            return;
        }
        write_json(&mut self.store, keys::INCUBATOR, &self.state.incubator);
    }

    fn persist_pc(&mut self) {
        if self.import_in_progress {
            return;
        }
        write_json(&mut self.store, keys::PC, &self.state.pc);
    }

    fn persist_filters(&mut self) {
        if self.import_in_progress {
            return;
        }
        write_json(&mut self.store, keys::FILTERS, &self.state.filters);
    }

    fn persist_currencies(&mut self) {
        if self.import_in_progress {
            return;
        }
        write_json(&mut self.store, keys::RARE_CANDY, &self.state.rare_candy);
        write_json(&mut self.store, keys::POKEDOLLARS, &self.state.pokedollars);
    }

    fn persist_counters(&mut self) {
        self.counters_dirty_since = None;
        if self.import_in_progress {
            return;
        }
        write_json(&mut self.store, keys::EGG_HATCHED, &self.state.egg_hatched);
        write_json(
            &mut self.store,
            keys::SHINY_HATCHED,
            &self.state.shiny_hatched,
        );
    }

    fn persist_paused(&mut self) {
        if self.import_in_progress {
            return;
        }
        write_json(&mut self.store, keys::PAUSED, &self.state.paused);
    }

    fn persist_upgrades(&mut self) {
        if self.import_in_progress {
            return;
        }
        write_json(&mut self.store, keys::UPGRADES, &self.state.upgrades);
    }

    fn persist_daycare(&mut self) {
        if self.import_in_progress {
            return;
        }
        write_json(&mut self.store, keys::DAYCARE, &self.state.daycare);
    }

    fn persist_egg_source(&mut self) {
        if self.import_in_progress {
            return;
        }
        write_json(&mut self.store, keys::EGG_SOURCE, &self.state.egg_source);
    }

    fn persist_last_active(&mut self) {
        if self.import_in_progress {
            return;
        }
        if let Some(stamp) = self.state.last_active {
            write_json(&mut self.store, keys::LAST_ACTIVE, &stamp);
        }
    }
}

impl<S: KvStore> Drop for GameSession<S> {
    fn drop(&mut self) {
        self.flush_counters();
    }
}

/// Decode a full `GameState` from the store, one key at a time.
fn load_state<S: KvStore>(store: &S) -> GameState {
    let mut state = GameState {
        incubator: read_json(store, keys::INCUBATOR).unwrap_or_default(),
        pc: read_json(store, keys::PC).unwrap_or_default(),
        filters: read_json(store, keys::FILTERS).unwrap_or_default(),
        egg_hatched: read_json(store, keys::EGG_HATCHED).unwrap_or(0),
        shiny_hatched: read_json(store, keys::SHINY_HATCHED).unwrap_or(0),
        rare_candy: read_json(store, keys::RARE_CANDY).unwrap_or(0),
        pokedollars: read_json(store, keys::POKEDOLLARS).unwrap_or(0),
        paused: read_json(store, keys::PAUSED).unwrap_or(false),
        upgrades: read_json(store, keys::UPGRADES).unwrap_or_default(),
        daycare: read_json(store, keys::DAYCARE).unwrap_or_default(),
        last_active: read_json(store, keys::LAST_ACTIVE),
        egg_source: load_egg_source(store),
    };
    // The PC is always full capacity; short or missing saves are padded
    // with empty slots.
    if state.pc.len() < storage::PC_CAPACITY {
        state.pc.resize_with(storage::PC_CAPACITY, || None);
    }
    state
}

fn load_egg_source<S: KvStore>(store: &S) -> EggSource {
    let Some(raw) = store.get(keys::EGG_SOURCE) else {
        return EggSource::Shelter;
    };
    if let Ok(source) = serde_json::from_str(&raw) {
        return source;
    }
    // Older saves wrote the mode as a bare word rather than JSON.
    match raw.as_str() {
        "daycare" => EggSource::Daycare,
        _ => EggSource::Shelter,
    }
}
