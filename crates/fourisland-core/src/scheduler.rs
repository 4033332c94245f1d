//! Tick scheduling - the periodic drivers behind an injectable clock
//!
//! The session itself never reads a clock; every operation takes the
//! current time as a parameter. `Scheduler` supplies the cadence: it
//! tracks next-due times for the incubation tick and the fixed
//! one-second maintenance tick, and `run_due` fires whichever has come
//! due. Hosts pass a [`SystemClock`]; tests and the simtest harness pass
//! a [`VirtualClock`] and drive time by hand.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::persistence::KvStore;
use crate::session::GameSession;

/// Millisecond time source.
pub trait Clock {
    /// Current time in milliseconds since the Unix epoch.
    fn now_ms(&self) -> u64;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Hand-driven clock for tests and simulation runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct VirtualClock {
    now_ms: u64,
}

impl VirtualClock {
    pub fn new(now_ms: u64) -> Self {
        Self { now_ms }
    }

    pub fn set(&mut self, now_ms: u64) {
        self.now_ms = now_ms;
    }

    pub fn advance(&mut self, delta_ms: u64) {
        self.now_ms += delta_ms;
    }
}

impl Clock for VirtualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms
    }
}

/// Cadence of the maintenance driver.
pub const MAINTENANCE_INTERVAL_MS: u64 = 1000;

/// Next-due bookkeeping for the two periodic drivers.
///
/// The incubation interval is re-read from the upgrade levels at every
/// rearm, so a tick-speed purchase takes effect from the next cycle
/// without touching the scheduler. Pause does not stop the drivers;
/// their bodies short-circuit instead.
#[derive(Debug, Clone)]
pub struct Scheduler {
    next_incubation: u64,
    next_maintenance: u64,
}

impl Scheduler {
    /// Schedule both drivers one interval out from now.
    pub fn new<S: KvStore>(session: &GameSession<S>, clock: &impl Clock) -> Self {
        let now = clock.now_ms();
        Self {
            next_incubation: now + session.tick_interval_ms(),
            next_maintenance: now + MAINTENANCE_INTERVAL_MS,
        }
    }

    /// When the next incubation tick is due, epoch ms.
    pub fn next_incubation(&self) -> u64 {
        self.next_incubation
    }

    /// When the next maintenance tick is due, epoch ms.
    pub fn next_maintenance(&self) -> u64 {
        self.next_maintenance
    }

    /// Fire every driver whose deadline has passed, each at most once.
    /// Late calls reschedule from the old deadline so the cadence does
    /// not drift; a stall of a full interval or more re-anchors to now
    /// rather than firing a backlog.
    pub fn run_due<S: KvStore>(&mut self, session: &mut GameSession<S>, clock: &impl Clock) {
        let now = clock.now_ms();

        if now >= self.next_incubation {
            session.incubation_tick(now);
            self.next_incubation = rearm(self.next_incubation, session.tick_interval_ms(), now);
        }

        if now >= self.next_maintenance {
            session.maintenance_tick(now);
            self.next_maintenance = rearm(self.next_maintenance, MAINTENANCE_INTERVAL_MS, now);
        }
    }
}

fn rearm(due_ms: u64, interval_ms: u64, now_ms: u64) -> u64 {
    let next = due_ms + interval_ms;
    if next > now_ms {
        next
    } else {
        now_ms + interval_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::session::SessionConfig;
    use fourisland_logic::species::{Rarity, Species, SpeciesTable};
    use fourisland_logic::upgrades::UpgradeKind;

    fn session() -> GameSession<MemoryStore> {
        let table = SpeciesTable::new(vec![Species {
            id: 1,
            name: "Bulbasaur".to_string(),
            egg_groups: vec!["grass".to_string()],
            gender_rate: 50,
            rarity: Some(Rarity::Common),
            generation: 1,
            egg_steps: 5000,
            egg_capable: true,
            evolutions: Vec::new(),
        }]);
        let config = SessionConfig {
            seed: Some(99),
            ..SessionConfig::default()
        };
        GameSession::load(MemoryStore::new(), table, config)
    }

    #[test]
    fn test_virtual_clock_set_and_advance() {
        let mut clock = VirtualClock::new(500);
        assert_eq!(clock.now_ms(), 500);
        clock.advance(250);
        assert_eq!(clock.now_ms(), 750);
        clock.set(10_000);
        assert_eq!(clock.now_ms(), 10_000);
    }

    #[test]
    fn test_nothing_fires_before_due() {
        let mut session = session();
        assert!(session.add_incubator_egg());
        let mut clock = VirtualClock::new(0);
        let mut scheduler = Scheduler::new(&session, &clock);

        clock.advance(999);
        scheduler.run_due(&mut session, &clock);
        assert_eq!(session.incubator()[0].steps, 0);
        assert_eq!(scheduler.next_incubation(), 1000);
    }

    #[test]
    fn test_incubation_fires_on_due_without_drift() {
        let mut session = session();
        assert!(session.add_incubator_egg());
        let mut clock = VirtualClock::new(0);
        let mut scheduler = Scheduler::new(&session, &clock);

        clock.set(1000);
        scheduler.run_due(&mut session, &clock);
        assert!(session.incubator()[0].steps > 0);
        assert_eq!(scheduler.next_incubation(), 2000);

        // A 300ms-late call still reschedules from the old deadline.
        clock.set(2300);
        scheduler.run_due(&mut session, &clock);
        assert_eq!(scheduler.next_incubation(), 3000);
    }

    #[test]
    fn test_stalled_driver_fires_once_and_reanchors() {
        let mut session = session();
        assert!(session.add_incubator_egg());
        let mut clock = VirtualClock::new(0);
        let mut scheduler = Scheduler::new(&session, &clock);

        clock.set(60_000);
        scheduler.run_due(&mut session, &clock);
        // One tick's worth of steps, not sixty; catch-up is resume()'s job.
        let (_, max) = session.upgrades().step_range();
        assert!(session.incubator()[0].steps <= max);
        assert_eq!(scheduler.next_incubation(), 61_000);
        assert_eq!(scheduler.next_maintenance(), 61_000);
    }

    #[test]
    fn test_speed_purchase_shortens_the_next_arm() {
        let mut session = session();
        session.add_pokedollars(200);
        assert!(session.purchase_upgrade(UpgradeKind::TickSpeedBoost));
        assert_eq!(session.tick_interval_ms(), 975);

        let mut clock = VirtualClock::new(0);
        let mut scheduler = Scheduler::new(&session, &clock);
        assert_eq!(scheduler.next_incubation(), 975);

        clock.set(975);
        scheduler.run_due(&mut session, &clock);
        assert_eq!(scheduler.next_incubation(), 1950);
    }

    #[test]
    fn test_maintenance_fills_shelter_on_its_own_cadence() {
        let mut session = session();
        let mut clock = VirtualClock::new(0);
        let mut scheduler = Scheduler::new(&session, &clock);

        clock.set(1000);
        scheduler.run_due(&mut session, &clock);
        assert_eq!(
            session.incubator().len(),
            fourisland_logic::balance::incubation::CAPACITY
        );
    }
}
