//! Four Island Headless Simulation Harness
//!
//! Validates game data and simulation logic without a browser.
//! Runs entirely in-process with no DOM and no persistent storage.
//!
//! Usage:
//!   cargo run -p fourisland-simtest
//!   cargo run -p fourisland-simtest -- --verbose

use fourisland_core::daycare;
use fourisland_core::incubator::{self, HatchReport};
use fourisland_core::persistence::{keys, KvStore, MemoryStore};
use fourisland_core::session::{GameState, NullNotifier};
use fourisland_core::transfer::{self, TransferError};
use fourisland_logic::balance::{self, odds, MAX_IV, NATURES};
use fourisland_logic::config::GeneticsConfig;
use fourisland_logic::creature::{Creature, Egg, Gender, IvSpread, Stat};
use fourisland_logic::filters::{self, Criterion, Filter};
use fourisland_logic::genetics;
use fourisland_logic::probability::roll_odds;
use fourisland_logic::retro;
use fourisland_logic::species::{Rarity, Species, SpeciesTable};
use fourisland_logic::wild;
use rand::rngs::StdRng;
use rand::SeedableRng;

// ── Species catalog (same JSON the game ships) ──────────────────────────
const SPECIES_JSON: &str = include_str!("../../../data/species.json");

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== Four Island Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Species catalog validation
    results.extend(validate_species_catalog(verbose));

    // 2. Trait odds convergence
    results.extend(validate_trait_odds(verbose));

    // 3. Breeding rules on live data
    results.extend(validate_breeding_rules(verbose));

    // 4. Filter engine semantics
    results.extend(validate_filter_engine(verbose));

    // 5. Daycare timer cycle
    results.extend(validate_daycare_timers(verbose));

    // 6. Bred egg distribution
    results.extend(validate_breeding_distribution(verbose));

    // 7. Incubation & the shelter
    results.extend(validate_incubation(verbose));

    // 8. Save transfer codes
    results.extend(validate_save_transfer(verbose));

    // 9. Retro sprite rolls
    results.extend(validate_retro_sprites(verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── Shared fixtures ─────────────────────────────────────────────────────

/// Parse the embedded catalog. Suite 1 reports parse failures gracefully;
/// everything after it is entitled to assume the data loads.
fn load_catalog() -> SpeciesTable {
    let catalog: Vec<Species> =
        serde_json::from_str(SPECIES_JSON).expect("species.json is invalid");
    SpeciesTable::new(catalog)
}

/// A plain creature of a cataloged species: no traits, zeroed IVs.
fn catalog_creature(table: &SpeciesTable, name: &str, gender: Gender) -> Creature {
    let species = table.get_by_name(name).expect("species not in catalog");
    Creature {
        species: species.id,
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

fn plain_egg(species: u32, steps: u32) -> Egg {
    Egg {
        species,
        steps,
        is_shiny: false,
        is_alpha: false,
        ivs: IvSpread::default(),
        nature: "Hardy".to_string(),
        gender: Gender::Male,
        retro: "base".to_string(),
    }
}

fn keep_filter(id: u64, criteria: Vec<Criterion>) -> Filter {
    Filter {
        id,
        name: format!("filter-{}", id),
        criteria,
        active: true,
        created_at: 0,
    }
}

// ── 1. Species Catalog ──────────────────────────────────────────────────

fn validate_species_catalog(verbose: bool) -> Vec<TestResult> {
    println!("--- Species Catalog ---");
    let mut results = Vec::new();

    let catalog: Vec<Species> = match serde_json::from_str(SPECIES_JSON) {
        Ok(c) => c,
        Err(e) => {
            results.push(TestResult {
                name: "catalog_parse".into(),
                passed: false,
                detail: format!("JSON parse error: {}", e),
            });
            return results;
        }
    };

    results.push(TestResult {
        name: "catalog_not_empty".into(),
        passed: catalog.len() >= 15,
        detail: format!("{} species loaded", catalog.len()),
    });

    // ids and names are lookup keys, so collisions corrupt lookups
    let mut ids: Vec<u32> = catalog.iter().map(|s| s.id).collect();
    ids.sort_unstable();
    ids.dedup();
    results.push(TestResult {
        name: "catalog_unique_ids".into(),
        passed: ids.len() == catalog.len(),
        detail: format!("{} unique ids across {} species", ids.len(), catalog.len()),
    });

    let mut names: Vec<&str> = catalog.iter().map(|s| s.name.as_str()).collect();
    names.sort_unstable();
    names.dedup();
    results.push(TestResult {
        name: "catalog_unique_names".into(),
        passed: names.len() == catalog.len(),
        detail: format!(
            "{} unique names across {} species",
            names.len(),
            catalog.len()
        ),
    });

    let bad_steps = catalog.iter().filter(|s| s.egg_steps == 0).count();
    results.push(TestResult {
        name: "catalog_positive_egg_steps".into(),
        passed: bad_steps == 0,
        detail: if bad_steps == 0 {
            "all species have positive egg steps".into()
        } else {
            format!("{} species with zero egg steps", bad_steps)
        },
    });

    let bad_gender = catalog
        .iter()
        .filter(|s| !(-1..=100).contains(&s.gender_rate))
        .count();
    results.push(TestResult {
        name: "catalog_gender_rates".into(),
        passed: bad_gender == 0,
        detail: if bad_gender == 0 {
            "all gender rates within -1..=100".into()
        } else {
            format!("{} species with out-of-range gender rate", bad_gender)
        },
    });

    // Every evolution target must resolve by name
    let unresolved: Vec<&str> = catalog
        .iter()
        .flat_map(|s| s.evolutions.iter())
        .filter(|e| !catalog.iter().any(|s| s.name == e.evolves_to))
        .map(|e| e.evolves_to.as_str())
        .collect();
    results.push(TestResult {
        name: "catalog_evolution_targets".into(),
        passed: unresolved.is_empty(),
        detail: if unresolved.is_empty() {
            "all evolution targets resolve".into()
        } else {
            format!("unresolved targets: {}", unresolved.join(", "))
        },
    });

    // Key species: a starter line, the universal breeder, a special tier
    let has_starter = catalog.iter().any(|s| s.name == "Bulbasaur");
    let has_ditto = catalog.iter().any(|s| s.name == genetics::DITTO);
    let has_special = catalog.iter().any(|s| s.rarity == Some(Rarity::Special));
    results.push(TestResult {
        name: "catalog_key_species".into(),
        passed: has_starter && has_ditto && has_special,
        detail: format!(
            "starter={} ditto={} special={}",
            has_starter, has_ditto, has_special
        ),
    });

    // Ditto must share a group with every gendered egg-capable species,
    // or its genderless pairing rule is dead data
    let ditto_universal = catalog
        .iter()
        .find(|s| s.name == genetics::DITTO)
        .is_some_and(|ditto| {
            catalog
                .iter()
                .filter(|s| s.egg_capable && s.gender_rate >= 0)
                .all(|s| s.egg_groups.iter().any(|g| ditto.egg_groups.contains(g)))
        });
    results.push(TestResult {
        name: "catalog_ditto_universal".into(),
        passed: ditto_universal,
        detail: "Ditto shares an egg group with every gendered breeder".into(),
    });

    // Species the shelter can actually roll
    let wild_pool = catalog
        .iter()
        .filter(|s| s.egg_capable && s.rarity.is_some_and(|r| r.wild_weight().is_some()))
        .count();
    results.push(TestResult {
        name: "catalog_wild_pool".into(),
        passed: wild_pool >= 10,
        detail: format!("{} species in the shelter pool", wild_pool),
    });

    if verbose {
        let mut by_rarity = [0u32; 4];
        for s in &catalog {
            if let Some(r) = s.rarity {
                by_rarity[(r.rank() - 1) as usize] += 1;
            }
        }
        println!("  Species by rarity:");
        for (label, count) in ["common", "uncommon", "rare", "special"]
            .iter()
            .zip(by_rarity)
        {
            println!("    {:8}: {}", label, count);
        }
    }

    results
}

// ── 2. Trait Odds Convergence ───────────────────────────────────────────

fn validate_trait_odds(verbose: bool) -> Vec<TestResult> {
    println!("--- Trait Odds Convergence ---");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(0xD1CE);
    let config = GeneticsConfig::default();

    const TRIALS: u32 = 1_000_000;

    let shiny_hits = (0..TRIALS)
        .filter(|_| genetics::inherit_flag(&mut rng, false, false, odds::SHINY, &config.shiny))
        .count();
    results.push(TestResult {
        name: "odds_shiny_base_rate".into(),
        passed: (60..=200).contains(&shiny_hits),
        detail: format!("1M plain rolls → {} shinies (expect ≈122)", shiny_hits),
    });

    let alpha_hits = (0..TRIALS)
        .filter(|_| genetics::inherit_flag(&mut rng, false, false, odds::ALPHA, &config.alpha))
        .count();
    results.push(TestResult {
        name: "odds_alpha_base_rate".into(),
        passed: (800..=1200).contains(&alpha_hits),
        detail: format!("1M plain rolls → {} alphas (expect ≈1000)", alpha_hits),
    });

    let boosted_hits = (0..TRIALS)
        .filter(|_| genetics::inherit_flag(&mut rng, true, false, odds::SHINY, &config.shiny))
        .count();
    results.push(TestResult {
        name: "odds_one_parent_boost".into(),
        passed: (160..=340).contains(&boosted_hits) && boosted_hits > shiny_hits,
        detail: format!("one shiny parent → {} shinies (expect ≈244)", boosted_hits),
    });

    let clamped = (0..1_000).all(|_| roll_odds(&mut rng, odds::SHINY, 1e9));
    results.push(TestResult {
        name: "odds_multiplier_clamps".into(),
        passed: clamped,
        detail: "overscaled multiplier clamps to certainty".into(),
    });

    if verbose {
        println!("  Observed rates over 1M trials:");
        println!("    shiny base : {} (expect ≈122)", shiny_hits);
        println!("    alpha base : {} (expect ≈1000)", alpha_hits);
        println!("    shiny boost: {} (expect ≈244)", boosted_hits);
    }

    results
}

// ── 3. Breeding Rules ───────────────────────────────────────────────────

fn validate_breeding_rules(_verbose: bool) -> Vec<TestResult> {
    println!("--- Breeding Rules ---");
    let mut results = Vec::new();
    let table = load_catalog();

    let male = |name: &str| catalog_creature(&table, name, Gender::Male);
    let female = |name: &str| catalog_creature(&table, name, Gender::Female);

    // Shared egg group is the gate
    let monster_pair = genetics::are_compatible(&male("Bulbasaur"), &female("Charmander"), &table);
    let no_group = genetics::are_compatible(&male("Pidgey"), &female("Rattata"), &table);
    results.push(TestResult {
        name: "breed_shared_group_gate".into(),
        passed: monster_pair && !no_group,
        detail: format!("monster pair={} flying x field={}", monster_pair, no_group),
    });

    // Gendered pairs must be opposite
    let same_gender = genetics::are_compatible(&male("Bulbasaur"), &male("Charmander"), &table);
    results.push(TestResult {
        name: "breed_opposite_genders".into(),
        passed: !same_gender,
        detail: "male x male rejected".into(),
    });

    // Ditto pairs with gendered partners in either slot
    let ditto = catalog_creature(&table, "Ditto", Gender::Genderless);
    let slot_one = genetics::are_compatible(&ditto, &male("Bulbasaur"), &table);
    let slot_two = genetics::are_compatible(&male("Bulbasaur"), &ditto, &table);
    results.push(TestResult {
        name: "breed_ditto_either_slot".into(),
        passed: slot_one && slot_two,
        detail: format!("slot1={} slot2={}", slot_one, slot_two),
    });

    // Two genderless creatures never pair, even through Ditto
    let magnemite = catalog_creature(&table, "Magnemite", Gender::Genderless);
    let magneton = catalog_creature(&table, "Magneton", Gender::Genderless);
    let metal_pair = genetics::are_compatible(&magnemite, &magneton, &table);
    let ditto_metal = genetics::are_compatible(&ditto, &magnemite, &table);
    results.push(TestResult {
        name: "breed_genderless_never_pairs".into(),
        passed: !metal_pair && !ditto_metal,
        detail: format!("magnet pair={} ditto x magnemite={}", metal_pair, ditto_metal),
    });

    // Egg species follows the female side; Ditto defers to the partner
    let from_female = genetics::resolve_egg_species(&male("Charmander"), &female("Bulbasaur"), &table)
        .map(|s| s.name.as_str());
    let from_ditto_a = genetics::resolve_egg_species(&ditto, &male("Charmander"), &table)
        .map(|s| s.name.as_str());
    let from_ditto_b = genetics::resolve_egg_species(&male("Charmander"), &ditto, &table)
        .map(|s| s.name.as_str());
    results.push(TestResult {
        name: "breed_egg_follows_female".into(),
        passed: from_female == Some("Bulbasaur")
            && from_ditto_a == Some("Charmander")
            && from_ditto_b == Some("Charmander"),
        detail: format!(
            "female={:?} ditto slot1={:?} slot2={:?}",
            from_female, from_ditto_a, from_ditto_b
        ),
    });

    // Timer buckets follow the rounded-up average parent rarity
    let common_pair =
        genetics::breeding_duration_ms(&male("Pidgey"), &female("Pidgey"), &table, 0);
    let uncommon_pair =
        genetics::breeding_duration_ms(&male("Bulbasaur"), &female("Charmander"), &table, 0);
    let rare_pair = genetics::breeding_duration_ms(&ditto, &female("Chansey"), &table, 0);
    results.push(TestResult {
        name: "breed_timer_buckets".into(),
        passed: common_pair == balance::daycare::EGG_TIMER_COMMON_MS
            && uncommon_pair == balance::daycare::EGG_TIMER_UNCOMMON_MS
            && rare_pair == balance::daycare::EGG_TIMER_RARE_MS,
        detail: format!(
            "common={}ms uncommon={}ms rare={}ms",
            common_pair, uncommon_pair, rare_pair
        ),
    });

    // Egg speed upgrade shaves 10% per level, floored
    let sped = genetics::breeding_duration_ms(&male("Bulbasaur"), &female("Charmander"), &table, 1);
    results.push(TestResult {
        name: "breed_speed_upgrade".into(),
        passed: sped == 40_500,
        detail: format!("uncommon pair at speed 1 → {}ms", sped),
    });

    results
}

// ── 4. Filter Engine ────────────────────────────────────────────────────

fn validate_filter_engine(_verbose: bool) -> Vec<TestResult> {
    println!("--- Filter Engine ---");
    let mut results = Vec::new();
    let table = load_catalog();

    let plain = catalog_creature(&table, "Rattata", Gender::Male);
    let mut shiny = catalog_creature(&table, "Rattata", Gender::Female);
    shiny.is_shiny = true;

    let shiny_only = keep_filter(1, vec![Criterion::Shiny { value: true }]);

    // No filters at all keeps everything
    results.push(TestResult {
        name: "filter_fail_open".into(),
        passed: filters::should_keep(&plain, &[], &table),
        detail: "no filters → every hatch kept".into(),
    });

    // Inactive filters do not reject
    let inactive = Filter {
        active: false,
        ..shiny_only.clone()
    };
    results.push(TestResult {
        name: "filter_inactive_ignored".into(),
        passed: filters::should_keep(&plain, &[inactive], &table),
        detail: "only inactive filters → kept".into(),
    });

    // An active filter keeps matches and rejects the rest
    let kept_plain = filters::should_keep(&plain, &[shiny_only.clone()], &table);
    let kept_shiny = filters::should_keep(&shiny, &[shiny_only.clone()], &table);
    results.push(TestResult {
        name: "filter_active_rejects".into(),
        passed: !kept_plain && kept_shiny,
        detail: format!("plain kept={} shiny kept={}", kept_plain, kept_shiny),
    });

    // IV bounds are inclusive at both ends
    let band = keep_filter(
        2,
        vec![Criterion::IvStat {
            stat: Stat::Atk,
            min: 10,
            max: 20,
        }],
    );
    let at_atk = |value: u8| {
        let mut c = plain.clone();
        c.ivs.set(Stat::Atk, value);
        filters::should_keep(&c, &[band.clone()], &table)
    };
    results.push(TestResult {
        name: "filter_iv_bounds_inclusive".into(),
        passed: at_atk(10) && at_atk(20) && !at_atk(9) && !at_atk(21),
        detail: format!(
            "10..=20 band: 9={} 10={} 20={} 21={}",
            at_atk(9),
            at_atk(10),
            at_atk(20),
            at_atk(21)
        ),
    });

    // Any matching filter keeps
    let alpha_only = keep_filter(3, vec![Criterion::Alpha { value: true }]);
    let mut alpha = plain.clone();
    alpha.is_alpha = true;
    results.push(TestResult {
        name: "filter_any_filter_keeps".into(),
        passed: filters::should_keep(&alpha, &[shiny_only.clone(), alpha_only], &table),
        detail: "alpha fails the shiny filter, passes its own".into(),
    });

    // All criteria within a filter must match together
    let shiny_and_alpha = keep_filter(
        4,
        vec![
            Criterion::Shiny { value: true },
            Criterion::Alpha { value: true },
        ],
    );
    results.push(TestResult {
        name: "filter_criteria_all_required".into(),
        passed: !filters::should_keep(&shiny, &[shiny_and_alpha], &table),
        detail: "shiny-but-not-alpha fails the combined filter".into(),
    });

    results
}

// ── 5. Daycare Timers ───────────────────────────────────────────────────

fn validate_daycare_timers(_verbose: bool) -> Vec<TestResult> {
    println!("--- Daycare Timers ---");
    let mut results = Vec::new();
    let table = load_catalog();
    let config = GeneticsConfig::default();
    let mut rng = StdRng::seed_from_u64(0xE99);
    let mut notifier = NullNotifier;

    let mut state = GameState::default();
    state.pc[0] = Some(catalog_creature(&table, "Bulbasaur", Gender::Female));
    state.pc[1] = Some(catalog_creature(&table, "Charmander", Gender::Male));
    state.daycare.breeders = [Some(0), Some(1)];

    // Uncommon pair arms the uncommon timer
    let started = daycare::start_breeding(&mut state, &table, 0);
    results.push(TestResult {
        name: "daycare_start_arms_timer".into(),
        passed: started
            && state.daycare.egg_timer == Some(balance::daycare::EGG_TIMER_UNCOMMON_MS),
        detail: format!("uncommon pair → deadline {:?}", state.daycare.egg_timer),
    });

    // Four pause/resume cycles, each burning exactly one second
    for cycle in 0..4u64 {
        let base = cycle * 100_000;
        daycare::pause_breeding(&mut state, base + 1_000);
        daycare::resume_breeding(&mut state, &table, base + 100_000);
    }
    let deadline = 400_000 + balance::daycare::EGG_TIMER_UNCOMMON_MS - 4_000;
    results.push(TestResult {
        name: "daycare_pause_banks_exactly".into(),
        passed: state.daycare.egg_timer == Some(deadline),
        detail: format!(
            "4 cycles burning 1s each → deadline {:?} (expect {})",
            state.daycare.egg_timer, deadline
        ),
    });

    // Nothing collects before the deadline; one egg lands on it
    let early =
        daycare::collect_ready_egg(&mut state, &table, &config, &mut rng, &mut notifier, deadline - 1);
    let on_time =
        daycare::collect_ready_egg(&mut state, &table, &config, &mut rng, &mut notifier, deadline);
    let egg_species = state.daycare.eggs.first().map(|e| e.species);
    results.push(TestResult {
        name: "daycare_collect_on_deadline".into(),
        passed: !early && on_time && egg_species == Some(1),
        detail: format!(
            "early={} on_time={} species={:?}",
            early, on_time, egg_species
        ),
    });

    // Collection rearms for the next cycle
    results.push(TestResult {
        name: "daycare_collect_rearms".into(),
        passed: state.daycare.egg_timer
            == Some(deadline + balance::daycare::EGG_TIMER_UNCOMMON_MS),
        detail: format!("next deadline {:?}", state.daycare.egg_timer),
    });

    // A full queue freezes the timer instead of producing
    let capacity = daycare::egg_capacity(&state);
    while state.daycare.eggs.len() < capacity {
        state.daycare.eggs.push(plain_egg(1, 0));
    }
    let frozen_at = state.daycare.egg_timer.unwrap();
    let froze =
        daycare::collect_ready_egg(&mut state, &table, &config, &mut rng, &mut notifier, frozen_at);
    results.push(TestResult {
        name: "daycare_full_queue_freezes".into(),
        passed: froze && state.daycare.egg_timer.is_none() && state.daycare.eggs.len() == capacity,
        detail: format!(
            "{} queued, timer {:?}",
            state.daycare.eggs.len(),
            state.daycare.egg_timer
        ),
    });

    results
}

// ── 6. Bred Egg Distribution ────────────────────────────────────────────

fn validate_breeding_distribution(verbose: bool) -> Vec<TestResult> {
    println!("--- Breeding Distribution ---");
    let mut results = Vec::new();
    let table = load_catalog();
    let config = GeneticsConfig::default();
    let mut rng = StdRng::seed_from_u64(0xB4ED);

    let mut mother = catalog_creature(&table, "Bulbasaur", Gender::Female);
    mother.nature = "Adamant".to_string();
    let mut father = catalog_creature(&table, "Charmander", Gender::Male);
    father.nature = "Modest".to_string();

    const BREEDS: u32 = 200_000;
    let mut shinies = 0u32;
    let mut alphas = 0u32;
    let mut males = 0u32;
    let mut malformed = 0u32;
    let mut domain_errors = 0u32;

    for i in 0..BREEDS {
        let Some(egg) = genetics::breed(&mut rng, &mother, &father, &table, &config, 0) else {
            malformed += 1;
            continue;
        };
        if egg.species != 1 || egg.steps != 0 {
            malformed += 1;
        }
        if egg.is_shiny {
            shinies += 1;
        }
        if egg.is_alpha {
            alphas += 1;
        }
        match egg.gender {
            Gender::Male => males += 1,
            Gender::Female => {}
            Gender::Genderless => malformed += 1,
        }
        if i < 1_000 {
            let ivs_ok = Stat::ALL.iter().all(|&s| egg.ivs.get(s) <= MAX_IV);
            let nature_ok = NATURES.contains(&egg.nature.as_str());
            if !ivs_ok || !nature_ok {
                domain_errors += 1;
            }
        }
    }

    results.push(TestResult {
        name: "dist_eggs_well_formed".into(),
        passed: malformed == 0,
        detail: format!("{} eggs, {} malformed", BREEDS, malformed),
    });

    results.push(TestResult {
        name: "dist_shiny_rate".into(),
        passed: (5..=60).contains(&shinies),
        detail: format!("{} shinies in 200k (expect ≈24)", shinies),
    });

    results.push(TestResult {
        name: "dist_alpha_rate".into(),
        passed: (130..=270).contains(&alphas),
        detail: format!("{} alphas in 200k (expect ≈200)", alphas),
    });

    results.push(TestResult {
        name: "dist_gender_rate".into(),
        passed: (172_000..=180_000).contains(&males),
        detail: format!("{} males in 200k (expect ≈176k at 88%)", males),
    });

    results.push(TestResult {
        name: "dist_iv_nature_domain".into(),
        passed: domain_errors == 0,
        detail: format!("{} domain violations in 1k sample", domain_errors),
    });

    if verbose {
        println!("  200k bred eggs from female Bulbasaur x male Charmander:");
        println!("    shiny: {}", shinies);
        println!("    alpha: {}", alphas);
        println!(
            "    male : {} ({:.1}%)",
            males,
            f64::from(males) / f64::from(BREEDS) * 100.0
        );
    }

    results
}

// ── 7. Incubation & the Shelter ─────────────────────────────────────────

fn validate_incubation(verbose: bool) -> Vec<TestResult> {
    println!("--- Incubation & Shelter ---");
    let mut results = Vec::new();
    let table = load_catalog();
    let mut rng = StdRng::seed_from_u64(0xA11);
    let mut notifier = NullNotifier;

    // Pidgey needs 3840 steps: 3839 must hold, 3840 must hatch
    let mut state = GameState::default();
    state.incubator.push(plain_egg(16, 3_830));
    let mut report = HatchReport::default();
    incubator::add_steps(&mut state, &table, &mut rng, &mut notifier, 0, 9, 0, &mut report);
    let held = report.hatched == 0 && state.incubator.len() == 1;
    incubator::add_steps(&mut state, &table, &mut rng, &mut notifier, 0, 1, 0, &mut report);
    let hatched = report.hatched == 1 && state.incubator.is_empty();
    results.push(TestResult {
        name: "incubate_exact_threshold".into(),
        passed: held && hatched,
        detail: format!("held at 3839: {}, hatched at 3840: {}", held, hatched),
    });

    // Overshoot hatches once and carries nothing over
    state.incubator.push(plain_egg(16, 0));
    let mut report = HatchReport::default();
    incubator::add_steps(
        &mut state,
        &table,
        &mut rng,
        &mut notifier,
        0,
        1_000_000,
        0,
        &mut report,
    );
    results.push(TestResult {
        name: "incubate_overshoot_no_carry".into(),
        passed: report.hatched == 1 && state.incubator.is_empty(),
        detail: "1M-step lump → exactly one hatch".into(),
    });

    // Every hatch pays out: counter and pokedollar
    results.push(TestResult {
        name: "incubate_hatch_rewards".into(),
        passed: state.egg_hatched == 2 && state.pokedollars == 2,
        detail: format!(
            "2 hatches → counter {} purse {}",
            state.egg_hatched, state.pokedollars
        ),
    });

    // Shelter fill tops up to capacity exactly once
    let mut state = GameState::default();
    let filled = incubator::fill_incubator(&mut state, &table, &mut rng);
    let refill = incubator::fill_incubator(&mut state, &table, &mut rng);
    results.push(TestResult {
        name: "incubate_fill_capacity".into(),
        passed: filled as usize == balance::incubation::CAPACITY && refill == 0,
        detail: format!("filled {} then {}", filled, refill),
    });

    // The wild pool never rolls specials or egg-incapable species
    let mut off_pool = 0u32;
    let mut by_rarity = [0u32; 4];
    for _ in 0..2_000 {
        if let Some(species) = wild::roll_wild_species(&mut rng, &table) {
            if species.rarity == Some(Rarity::Special) || !species.egg_capable {
                off_pool += 1;
            }
            if let Some(r) = species.rarity {
                by_rarity[(r.rank() - 1) as usize] += 1;
            }
        }
    }
    results.push(TestResult {
        name: "incubate_wild_skips_specials".into(),
        passed: off_pool == 0,
        detail: "2000 shelter rolls, no special-tier species".into(),
    });

    if verbose {
        println!("  Shelter rolls by rarity (2000 draws):");
        for (label, count) in ["common", "uncommon", "rare", "special"]
            .iter()
            .zip(by_rarity)
        {
            println!("    {:8}: {}", label, count);
        }
    }

    results
}

// ── 8. Save Transfer ────────────────────────────────────────────────────

fn validate_save_transfer(_verbose: bool) -> Vec<TestResult> {
    println!("--- Save Transfer ---");
    let mut results = Vec::new();

    let mut store = MemoryStore::new();
    store.set(keys::POKEDOLLARS, "4200");
    store.set(keys::EGG_HATCHED, "913");
    store.set(keys::EGG_SOURCE, "\"daycare\"");
    store.set(keys::PAUSED, "true");
    store.set(keys::INCUBATOR, "[]");

    let code = transfer::export_save(&store, 1_700_000_000_000);

    // Import replaces the target store wholesale
    let mut restored = MemoryStore::new();
    restored.set("stale", "value");
    let imported = transfer::import_save(&mut restored, &code);
    let round_trip = imported.is_ok()
        && restored.keys().len() == store.keys().len()
        && store
            .keys()
            .iter()
            .all(|k| restored.get(k) == store.get(k));
    results.push(TestResult {
        name: "transfer_round_trip".into(),
        passed: round_trip,
        detail: format!("{} keys preserved, stale keys dropped", store.keys().len()),
    });

    // Garbage is rejected and the target left untouched
    let mut target = MemoryStore::new();
    target.set(keys::POKEDOLLARS, "77");
    let garbage = transfer::import_save(&mut target, "!!!not a save!!!");
    results.push(TestResult {
        name: "transfer_rejects_garbage".into(),
        passed: matches!(garbage, Err(TransferError::Base64(_)))
            && target.get(keys::POKEDOLLARS).as_deref() == Some("77"),
        detail: "bad base64 rejected, store intact".into(),
    });

    // Valid base64 wrapping a non-JSON payload
    let not_json = transfer::import_save(&mut target, "AAAA");
    results.push(TestResult {
        name: "transfer_rejects_non_json".into(),
        passed: matches!(not_json, Err(TransferError::Json(_))),
        detail: "non-JSON payload rejected".into(),
    });

    // "e30=" decodes to {}: parses, but the envelope names what's missing
    let missing = transfer::import_save(&mut target, "e30=");
    results.push(TestResult {
        name: "transfer_names_missing_field".into(),
        passed: matches!(missing, Err(TransferError::MissingField("version"))),
        detail: "empty envelope reports the missing version".into(),
    });

    // An empty store still exports a valid, importable save
    let empty = MemoryStore::new();
    let empty_code = transfer::export_save(&empty, 0);
    let mut wiped = MemoryStore::new();
    wiped.set("leftover", "1");
    let wiped_ok = transfer::import_save(&mut wiped, &empty_code).is_ok() && wiped.keys().is_empty();
    results.push(TestResult {
        name: "transfer_empty_save".into(),
        passed: wiped_ok,
        detail: "empty save imports and clears the store".into(),
    });

    results
}

// ── 9. Retro Sprite Rolls ───────────────────────────────────────────────

fn validate_retro_sprites(verbose: bool) -> Vec<TestResult> {
    println!("--- Retro Sprites ---");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(0x9E77);

    // Gen-5 rolls only produce tags whose art reaches gen 5
    let mut uncovered = 0u32;
    for _ in 0..10_000 {
        let tag = retro::select_retro_sprite(&mut rng, 5);
        if !retro::covers_generation(&tag, 5) {
            uncovered += 1;
        }
    }
    results.push(TestResult {
        name: "retro_respects_generation".into(),
        passed: uncovered == 0,
        detail: "10k gen-5 rolls, every tag covers gen 5".into(),
    });

    // Beyond the newest catalog art everything is base
    let all_base = (0..1_000).all(|_| retro::select_retro_sprite(&mut rng, 6) == retro::BASE);
    results.push(TestResult {
        name: "retro_past_catalog_is_base".into(),
        passed: all_base,
        detail: "gen 6 always rolls the modern sprite".into(),
    });

    // Base stays the overwhelmingly common outcome at gen 1
    let mut base_count = 0u32;
    let mut rb_plain = 0u32;
    for _ in 0..100_000 {
        let tag = retro::select_retro_sprite(&mut rng, 1);
        if tag == retro::BASE {
            base_count += 1;
        }
        if tag == "rb" {
            rb_plain += 1;
        }
    }
    results.push(TestResult {
        name: "retro_base_dominates".into(),
        passed: base_count > 85_000,
        detail: format!("{} of 100k gen-1 rolls are base (expect ≈90k)", base_count),
    });

    // Two parents carrying a tag lift exactly that tag
    let boost = GeneticsConfig::default().retro;
    let mut rb_boosted = 0u32;
    for _ in 0..100_000 {
        let tag = retro::roll_retro_sprite(&mut rng, 1, Some("rb"), Some("rb"), &boost);
        if tag == "rb" {
            rb_boosted += 1;
        }
    }
    results.push(TestResult {
        name: "retro_parent_boost".into(),
        passed: (5..=60).contains(&rb_plain)
            && (70..=200).contains(&rb_boosted)
            && rb_boosted > rb_plain * 2,
        detail: format!(
            "rb: {} unboosted vs {} with two carriers",
            rb_plain, rb_boosted
        ),
    });

    if verbose {
        println!(
            "  rb rate per 100k: {} plain, {} with two carrier parents",
            rb_plain, rb_boosted
        );
    }

    results
}
