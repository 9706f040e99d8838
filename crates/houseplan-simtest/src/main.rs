//! Houseplan Headless Generation Harness
//!
//! Validates the bundled room catalog and the layout generator across a
//! sweep of seeds. Runs entirely in-process, no rendering.
//!
//! Usage:
//!   cargo run -p houseplan-simtest
//!   cargo run -p houseplan-simtest -- --verbose
//!   cargo run -p houseplan-simtest -- --seed 7 --json

use std::collections::{BTreeMap, BTreeSet};

use houseplan_logic::catalog::{Catalog, RoomPrefab, RoomType};
use houseplan_logic::config::{validate_config, GeneratorConfig};
use houseplan_logic::engine::{AttemptFailure, LayoutEngine, LayoutObserver};
use houseplan_logic::grid::{CellKind, Grid};
use houseplan_logic::layout::{PlacedLayout, PlacedRoom};
use houseplan_logic::request::{
    resolve_counts, total_rooms, validate_request, CountRange, RequiredCounts,
};
use houseplan_logic::validation::{validate_all, Severity};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;

// ── Catalog data (bundled sample house) ─────────────────────────────────
const ROOM_TYPES_JSON: &str = include_str!("../../../data/room_types.json");
const ROOM_POOL_JSON: &str = include_str!("../../../data/room_pool.json");

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoomTypesFile {
    room_types: Vec<RoomType>,
}

#[derive(Debug, Deserialize)]
struct RoomPoolFile {
    rooms: Vec<RoomPrefab>,
}

const SWEEP_SEEDS: u64 = 100;
/// Fraction of sweep seeds that must produce a layout.
const MIN_SUCCESS_RATE: f64 = 0.9;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

struct Options {
    verbose: bool,
    json: bool,
    seed: u64,
}

fn parse_args() -> Options {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let seed = args
        .iter()
        .position(|a| a == "--seed")
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);
    Options {
        verbose: args.iter().any(|a| a == "--verbose"),
        json: args.iter().any(|a| a == "--json"),
        seed,
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let opts = parse_args();

    let catalog = match load_catalog() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load catalog: {}", e);
            std::process::exit(1);
        }
    };

    log::info!(
        "Loaded {} room types, {} prefabs",
        catalog.list_types().len(),
        catalog.prefabs().len()
    );

    if opts.json {
        print_layout_json(&catalog, opts.seed);
        return;
    }

    println!("=== Houseplan Generation Harness ===\n");

    let mut results = Vec::new();

    // 1. Catalog data validation
    results.extend(validate_catalog(&catalog, opts.verbose));

    // 2. Generation sweep across seeds
    results.extend(validate_generation_sweep(&catalog, opts.seed, opts.verbose));

    // 3. Determinism under a fixed seed
    results.extend(validate_determinism(&catalog, opts.seed));

    // 4. Observer hook
    results.extend(validate_observer(&catalog, opts.seed));

    // 5. Failure modes
    results.extend(validate_failure_modes(&catalog));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || opts.verbose {
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

fn load_catalog() -> Result<Catalog, serde_json::Error> {
    let types: RoomTypesFile = serde_json::from_str(ROOM_TYPES_JSON)?;
    let pool: RoomPoolFile = serde_json::from_str(ROOM_POOL_JSON)?;
    Ok(Catalog::new(types.room_types, pool.rooms))
}

/// Default request: one to two rooms of every catalog type.
fn default_ranges(catalog: &Catalog) -> BTreeMap<String, CountRange> {
    catalog
        .list_types()
        .iter()
        .map(|t| (t.type_id.clone(), CountRange::new(1, 2)))
        .collect()
}

fn print_layout_json(catalog: &Catalog, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let required = match resolve_counts(catalog, &default_ranges(catalog), &mut rng) {
        Ok(r) => r,
        Err(errors) => {
            eprintln!("Invalid count ranges: {:?}", errors);
            std::process::exit(1);
        }
    };
    let engine = LayoutEngine::new(catalog, GeneratorConfig::default());
    match engine.generate(&required, &mut rng) {
        Ok(layout) => match serde_json::to_string_pretty(&layout) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to serialize layout: {}", e);
                std::process::exit(1);
            }
        },
        Err(e) => {
            eprintln!("[{}] {}", e.kind(), e);
            std::process::exit(1);
        }
    }
}

// ── 1. Catalog ──────────────────────────────────────────────────────────

fn validate_catalog(catalog: &Catalog, verbose: bool) -> Vec<TestResult> {
    println!("--- Catalog ---");
    let mut results = Vec::new();
    let types = catalog.list_types();

    results.push(TestResult {
        name: "catalog_not_empty".into(),
        passed: !types.is_empty() && !catalog.prefabs().is_empty(),
        detail: format!(
            "{} room types, {} prefabs",
            types.len(),
            catalog.prefabs().len()
        ),
    });

    // Unique type IDs
    let ids: BTreeSet<&str> = types.iter().map(|t| t.type_id.as_str()).collect();
    results.push(TestResult {
        name: "catalog_unique_type_ids".into(),
        passed: ids.len() == types.len(),
        detail: format!("{} distinct of {}", ids.len(), types.len()),
    });

    // Every type declares neighbours
    let missing: Vec<&str> = types
        .iter()
        .filter(|t| t.allowed_neighbor_type_ids.is_none())
        .map(|t| t.type_id.as_str())
        .collect();
    results.push(TestResult {
        name: "catalog_neighbor_lists".into(),
        passed: missing.is_empty(),
        detail: if missing.is_empty() {
            "all types declare allowed neighbours".into()
        } else {
            format!("missing neighbour lists: {}", missing.join(", "))
        },
    });

    // Neighbour lists only name known types
    let mut unknown: Vec<String> = Vec::new();
    for t in types {
        for n in t.neighbors() {
            if !ids.contains(n.as_str()) {
                unknown.push(format!("{}→{}", t.type_id, n));
            }
        }
    }
    results.push(TestResult {
        name: "catalog_known_neighbors".into(),
        passed: unknown.is_empty(),
        detail: if unknown.is_empty() {
            "all neighbour IDs resolve".into()
        } else {
            format!("unknown neighbours: {}", unknown.join(", "))
        },
    });

    // Every type reachable: some mutual neighbour exists
    let isolated: Vec<&str> = types
        .iter()
        .filter(|t| {
            !types
                .iter()
                .any(|o| catalog.allows_connection(&t.type_id, &o.type_id))
        })
        .map(|t| t.type_id.as_str())
        .collect();
    results.push(TestResult {
        name: "catalog_mutual_adjacency".into(),
        passed: isolated.is_empty(),
        detail: if isolated.is_empty() {
            "every type has a mutual neighbour".into()
        } else {
            format!("no mutual neighbour: {}", isolated.join(", "))
        },
    });

    // Prefab coverage
    let without_prefabs: Vec<&str> = types
        .iter()
        .filter(|t| catalog.prefabs_for_type(&t.type_id).next().is_none())
        .map(|t| t.type_id.as_str())
        .collect();
    results.push(TestResult {
        name: "catalog_prefab_coverage".into(),
        passed: without_prefabs.is_empty(),
        detail: if without_prefabs.is_empty() {
            "every type has at least one prefab".into()
        } else {
            format!("no prefabs: {}", without_prefabs.join(", "))
        },
    });

    // Prefab geometry
    let bad_size: Vec<_> = catalog
        .prefabs()
        .iter()
        .filter(|p| p.width <= 0 || p.height <= 0)
        .collect();
    let misplaced: usize = catalog
        .prefabs()
        .iter()
        .map(|p| p.misplaced_sockets().len())
        .sum();
    let orphan_prefabs = catalog
        .prefabs()
        .iter()
        .filter(|p| !ids.contains(p.type_id.as_str()))
        .count();
    results.push(TestResult {
        name: "catalog_prefab_geometry".into(),
        passed: bad_size.is_empty() && misplaced == 0 && orphan_prefabs == 0,
        detail: format!(
            "{} non-positive sizes, {} off-edge sockets, {} prefabs of unknown type",
            bad_size.len(),
            misplaced,
            orphan_prefabs
        ),
    });

    // Request validation over the default ranges
    let upper: RequiredCounts = default_ranges(catalog)
        .into_iter()
        .map(|(t, r)| (t, r.max))
        .collect();
    let errors = validate_request(catalog, &upper);
    results.push(TestResult {
        name: "catalog_request_feasible".into(),
        passed: errors.is_empty(),
        detail: if errors.is_empty() {
            format!("{} rooms at the upper bound", total_rooms(&upper))
        } else {
            errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ")
        },
    });

    if verbose {
        for t in types {
            println!(
                "    {:<12} order={} prefabs={} neighbours=[{}]",
                t.type_id,
                t.order,
                catalog.prefabs_for_type(&t.type_id).count(),
                t.neighbors().join(", ")
            );
        }
    }

    results
}

// ── 2. Generation sweep ─────────────────────────────────────────────────

fn validate_generation_sweep(catalog: &Catalog, base_seed: u64, verbose: bool) -> Vec<TestResult> {
    println!("--- Generation Sweep ({} seeds) ---", SWEEP_SEEDS);
    let mut results = Vec::new();
    let config = GeneratorConfig::default();

    let config_errors = validate_config(&config);
    results.push(TestResult {
        name: "config_default_valid".into(),
        passed: config_errors.is_empty(),
        detail: format!(
            "{}x{} grid, {} attempts",
            config.grid_width, config.grid_height, config.max_attempts
        ),
    });

    let engine = LayoutEngine::new(catalog, config);
    let ranges = default_ranges(catalog);

    let mut successes = 0u64;
    let mut attempts_used: BTreeMap<u32, u32> = BTreeMap::new();
    let mut failure_kinds: BTreeMap<&'static str, u32> = BTreeMap::new();
    let mut invalid: Vec<String> = Vec::new();
    let mut count_mismatches = 0u32;
    let mut warnings = 0usize;
    let mut first_layout: Option<PlacedLayout> = None;

    for seed in base_seed..base_seed + SWEEP_SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let required = match resolve_counts(catalog, &ranges, &mut rng) {
            Ok(r) => r,
            Err(errors) => {
                invalid.push(format!("seed {}: bad ranges {:?}", seed, errors));
                continue;
            }
        };
        match engine.generate(&required, &mut rng) {
            Ok(layout) => {
                successes += 1;
                *attempts_used.entry(layout.attempts).or_insert(0) += 1;
                if layout.count_by_type() != required {
                    count_mismatches += 1;
                }
                let (errors, warned): (Vec<_>, Vec<_>) = validate_all(&layout, &required)
                    .into_iter()
                    .partition(|e| e.severity == Severity::Error);
                warnings += warned.len();
                if let Some(e) = errors.first() {
                    invalid.push(format!(
                        "seed {}: [{}] {} (+{} more)",
                        seed,
                        e.category,
                        e.message,
                        errors.len() - 1
                    ));
                }
                if first_layout.is_none() {
                    first_layout = Some(layout);
                }
            }
            Err(e) => {
                *failure_kinds.entry(e.kind()).or_insert(0) += 1;
            }
        }
    }

    let rate = successes as f64 / SWEEP_SEEDS as f64;
    results.push(TestResult {
        name: "sweep_success_rate".into(),
        passed: rate >= MIN_SUCCESS_RATE,
        detail: format!(
            "{}/{} seeds produced a layout, failures: {:?}",
            successes, SWEEP_SEEDS, failure_kinds
        ),
    });

    results.push(TestResult {
        name: "sweep_layouts_valid".into(),
        passed: invalid.is_empty(),
        detail: if invalid.is_empty() {
            format!(
                "no overlaps, all doors matched, walls closed, all rooms connected ({} warnings)",
                warnings
            )
        } else {
            format!("{} invalid: {}", invalid.len(), invalid.join(" | "))
        },
    });

    results.push(TestResult {
        name: "sweep_exact_counts".into(),
        passed: count_mismatches == 0,
        detail: format!("{} layouts with count mismatches", count_mismatches),
    });

    results.push(TestResult {
        name: "sweep_attempts_used".into(),
        passed: attempts_used
            .keys()
            .all(|a| (1..=engine.config().max_attempts).contains(a)),
        detail: format!("attempt → layouts: {:?}", attempts_used),
    });

    if verbose {
        if let Some(layout) = &first_layout {
            println!("{}", layout.ascii_dump());
            for s in layout.summaries() {
                println!(
                    "    #{:<3} {:<12} at ({:>3},{:>3}) {}x{}",
                    s.room_id, s.type_id, s.origin.x, s.origin.y, s.width, s.height
                );
            }
        }
    }

    results
}

// ── 3. Determinism ──────────────────────────────────────────────────────

fn validate_determinism(catalog: &Catalog, seed: u64) -> Vec<TestResult> {
    println!("--- Determinism ---");
    let engine = LayoutEngine::new(catalog, GeneratorConfig::default());
    let run = || {
        let mut rng = StdRng::seed_from_u64(seed);
        resolve_counts(catalog, &default_ranges(catalog), &mut rng)
            .ok()
            .and_then(|required| engine.generate(&required, &mut rng).ok())
    };

    let first = run();
    let second = run();
    vec![TestResult {
        name: "same_seed_same_layout".into(),
        passed: first.is_some() && first == second,
        detail: match &first {
            Some(layout) => format!(
                "seed {}: {} rooms on attempt {}",
                seed,
                layout.room_count(),
                layout.attempts
            ),
            None => format!("seed {} did not produce a layout", seed),
        },
    }]
}

// ── 4. Observer ─────────────────────────────────────────────────────────

#[derive(Default)]
struct CountingObserver {
    attempts: u32,
    placed_in_attempt: usize,
    failures: Vec<&'static str>,
    frontier_doors: usize,
}

impl LayoutObserver for CountingObserver {
    fn on_attempt_started(&mut self, attempt: u32) {
        self.attempts = attempt;
        self.placed_in_attempt = 0;
    }

    fn on_room_placed(&mut self, _room: &PlacedRoom, grid: &Grid) {
        self.placed_in_attempt += 1;
        self.frontier_doors = grid.count(CellKind::Door);
    }

    fn on_attempt_failed(&mut self, _attempt: u32, failure: &AttemptFailure) {
        self.failures.push(failure.kind());
    }
}

fn validate_observer(catalog: &Catalog, seed: u64) -> Vec<TestResult> {
    println!("--- Observer ---");
    let engine = LayoutEngine::new(catalog, GeneratorConfig::default());
    let mut rng = StdRng::seed_from_u64(seed);
    let mut observer = CountingObserver::default();
    let outcome = resolve_counts(catalog, &default_ranges(catalog), &mut rng)
        .ok()
        .map(|required| engine.generate_with_observer(&required, &mut rng, &mut observer));

    let (passed, detail) = match outcome {
        Some(Ok(layout)) => (
            observer.attempts == layout.attempts
                && observer.placed_in_attempt == layout.room_count()
                && observer.failures.len() as u32 == layout.attempts - 1,
            format!(
                "{} placements seen in attempt {}, {} open door cells before finalizing",
                observer.placed_in_attempt, observer.attempts, observer.frontier_doors
            ),
        ),
        Some(Err(e)) => (false, format!("generation failed: {}", e)),
        None => (false, "count ranges did not resolve".into()),
    };
    vec![TestResult {
        name: "observer_sees_placements".into(),
        passed,
        detail,
    }]
}

// ── 5. Failure modes ────────────────────────────────────────────────────

fn validate_failure_modes(catalog: &Catalog) -> Vec<TestResult> {
    println!("--- Failure Modes ---");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(0);

    // Unknown type in the request
    let mut unknown = RequiredCounts::new();
    unknown.insert("Observatory".into(), 1);
    let engine = LayoutEngine::new(catalog, GeneratorConfig::default());
    let err = engine.generate(&unknown, &mut rng).err();
    results.push(TestResult {
        name: "unknown_type_rejected".into(),
        passed: err.as_ref().map(|e| e.kind()) == Some("validation-failed"),
        detail: err.map(|e| e.to_string()).unwrap_or_else(|| "accepted".into()),
    });

    // Inverted count range
    let mut ranges = default_ranges(catalog);
    if let Some(first) = catalog.list_types().first() {
        ranges.insert(first.type_id.clone(), CountRange::new(3, 1));
    }
    let inverted = resolve_counts(catalog, &ranges, &mut rng);
    results.push(TestResult {
        name: "inverted_range_rejected".into(),
        passed: inverted.is_err(),
        detail: match inverted {
            Ok(_) => "accepted".into(),
            Err(errors) => format!("{} errors", errors.len()),
        },
    });

    // Grid too small for the request
    let tiny = LayoutEngine::new(catalog, GeneratorConfig::with_grid(10, 10));
    let mut crowded = RequiredCounts::new();
    for t in catalog.list_types() {
        crowded.insert(t.type_id.clone(), 4);
    }
    let err = tiny.generate(&crowded, &mut rng).err();
    results.push(TestResult {
        name: "crowded_grid_exhausts_retries".into(),
        passed: err.as_ref().map(|e| e.kind()) == Some("exhausted-retries"),
        detail: err.map(|e| e.to_string()).unwrap_or_else(|| "succeeded".into()),
    });

    // Invalid config
    let mut config = GeneratorConfig::default();
    config.grid_width = 0;
    let broken = LayoutEngine::new(catalog, config);
    let mut one = RequiredCounts::new();
    if let Some(first) = catalog.list_types().first() {
        one.insert(first.type_id.clone(), 1);
    }
    let err = broken.generate(&one, &mut rng).err();
    results.push(TestResult {
        name: "invalid_config_rejected".into(),
        passed: err.as_ref().map(|e| e.kind()) == Some("validation-failed"),
        detail: err.map(|e| e.to_string()).unwrap_or_else(|| "accepted".into()),
    });

    results
}
