//! Headless settlement economy run
//!
//! Seeds a small map, staffs a few facilities, hands out tasks, and runs
//! the tick loop for a fixed span, printing event tallies at the end.

use std::collections::HashMap;
use std::time::Instant;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use hearthstead::agent::profession::Profession;
use hearthstead::core::types::GridPos;
use hearthstead::economy::facility::FacilityKind;
use hearthstead::economy::recipe::{FoodRule, RecipeCatalog};
use hearthstead::economy::resources::ResourceKind;
use hearthstead::map::terrain::{Terrain, TerrainMap};
use hearthstead::simulation::tick::{run_simulation_tick, SimulationEvent};
use hearthstead::simulation::world::World;
use hearthstead::task::{self, TaskKind, TaskPriority};

const MAP_SIZE: i32 = 24;
const SEED: u64 = 42;
const TICKS: u64 = 120_000;
const DT: f32 = 1.0;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    println!("╔══════════════════════════════════════════════════╗");
    println!("║        HEARTHSTEAD: SETTLEMENT ECONOMY RUN       ║");
    println!("╚══════════════════════════════════════════════════╝\n");

    let mut rng = ChaCha8Rng::seed_from_u64(SEED);
    let map = generate_map(&mut rng);
    let mut world = World::new(map, GridPos::new(1, 1));

    // Scatter resource nodes on walkable tiles
    let mut wood_nodes = 0;
    let mut stone_nodes = 0;
    for _ in 0..18 {
        let pos = random_walkable(&world.map, &mut rng);
        if rng.gen_bool(0.6) {
            world.spawn_node(pos, ResourceKind::Wood, rng.gen_range(6..14));
            wood_nodes += 1;
        } else {
            world.spawn_node(pos, ResourceKind::Stone, rng.gen_range(4..10));
            stone_nodes += 1;
        }
    }
    println!("Map {}x{}, {} wood nodes, {} stone nodes", MAP_SIZE, MAP_SIZE, wood_nodes, stone_nodes);

    // A working sawmill fed by gatherers, and a bakery chain on upkeep
    let catalog = RecipeCatalog::with_defaults();
    let sawmill = world.spawn_facility_built(FacilityKind::Sawmill, GridPos::new(5, 5));
    if let (Some(recipe), Some(f)) = (catalog.get("saw_planks"), world.facility_mut(sawmill)) {
        f.processing = Some(hearthstead::economy::facility::RecipeProcessing {
            recipe: recipe.clone(),
            progress: 0.0,
        });
    }

    let bakery = world.spawn_facility_built(FacilityKind::Bakery, GridPos::new(10, 5));
    if let (Some(recipe), Some(f)) = (catalog.get("bake_bread"), world.facility_mut(bakery)) {
        f.processing = Some(hearthstead::economy::facility::RecipeProcessing {
            recipe: recipe.clone(),
            progress: 0.0,
        });
        f.food = Some(hearthstead::economy::facility::FoodUpkeep {
            rule: FoodRule {
                accepted: vec![ResourceKind::Fish, ResourceKind::Grain],
                rate_per_worker: 1,
                check_interval: 10_000.0,
            },
            halted: false,
            since_check: 0.0,
        });
        f.add_resource(ResourceKind::Flour, 5);
        f.add_resource(ResourceKind::CoalOre, 5);
    }
    world.stockpile.add(ResourceKind::Fish, 40);

    // A quarry construction site for the builder
    let quarry = world.spawn_facility(FacilityKind::Quarry, GridPos::new(15, 15));

    // Population
    let builder = world.spawn_serf(Profession::Builder, GridPos::new(1, 1));
    let woodcutter = world.spawn_serf(Profession::Woodcutter, GridPos::new(2, 1));
    let mason = world.spawn_serf(Profession::Stonemason, GridPos::new(1, 2));
    let carrier = world.spawn_serf(Profession::Carrier, GridPos::new(2, 2));
    let baker = world.spawn_serf(Profession::Baker, GridPos::new(3, 1));
    let forester = world.spawn_serf(Profession::Forester, GridPos::new(3, 2));
    println!("Spawned 6 serfs\n");

    // Initial orders
    let t_build = world.add_task(TaskKind::ConstructBuilding { facility: quarry }, TaskPriority::High);
    task::assign(&mut world, t_build, builder);

    let t_wood = world.add_task(
        TaskKind::GatherFromNode { resource: ResourceKind::Wood, deposit: Some(sawmill) },
        TaskPriority::Normal,
    );
    task::assign(&mut world, t_wood, woodcutter);

    let t_stone = world.add_task(
        TaskKind::GatherFromNode { resource: ResourceKind::Stone, deposit: None },
        TaskPriority::Normal,
    );
    task::assign(&mut world, t_stone, mason);

    let t_haul = world.add_task(
        TaskKind::Transport { from: sawmill, to: bakery, resource: ResourceKind::Plank, amount: 4 },
        TaskPriority::Low,
    );

    let t_bake = world.add_task(TaskKind::WorkAtBuilding { facility: bakery }, TaskPriority::Normal);
    task::assign(&mut world, t_bake, baker);

    let plant_at = random_walkable(&world.map, &mut rng);
    let t_plant = world.add_task(TaskKind::PlantSapling { position: plant_at }, TaskPriority::Low);
    task::assign(&mut world, t_plant, forester);

    // Run
    let start = Instant::now();
    let mut tallies: HashMap<&'static str, u64> = HashMap::new();
    let mut haul_dispatched = false;
    for _ in 0..TICKS {
        let events = run_simulation_tick(&mut world, DT);
        for event in &events {
            *tallies.entry(event_label(event)).or_insert(0) += 1;
        }
        // Once the sawmill has planks, send the carrier hauling
        if !haul_dispatched
            && world
                .facility(sawmill)
                .is_some_and(|f| f.inventory().count(ResourceKind::Plank) >= 4)
        {
            haul_dispatched = task::assign(&mut world, t_haul, carrier);
        }
    }
    let elapsed = start.elapsed();

    // Summary
    println!("Ran {} ticks in {:.2?}\n", TICKS, elapsed);
    println!("Event tallies:");
    let mut rows: Vec<_> = tallies.into_iter().collect();
    rows.sort();
    for (label, count) in rows {
        println!("  {:<24} {}", label, count);
    }

    println!("\nStockpile:");
    let mut contents: Vec<_> = world.stockpile.snapshot().into_iter().collect();
    contents.sort_by_key(|(k, _)| format!("{:?}", k));
    for (kind, count) in contents {
        println!("  {:?}: {}", kind, count);
    }

    for (label, id) in [("sawmill", sawmill), ("bakery", bakery), ("quarry", quarry)] {
        if let Some(f) = world.facility(id) {
            println!(
                "\n{} constructed={} halted={} planks={} bread={}",
                label,
                f.is_constructed,
                f.is_halted(),
                f.inventory().count(ResourceKind::Plank),
                f.inventory().count(ResourceKind::Bread),
            );
        }
    }
}

fn event_label(event: &SimulationEvent) -> &'static str {
    match event {
        SimulationEvent::ConstructionComplete { .. } => "construction_complete",
        SimulationEvent::ProductionComplete { .. } => "production_complete",
        SimulationEvent::RecipeCycleComplete { .. } => "recipe_cycle_complete",
        SimulationEvent::FoodHalted { .. } => "food_halted",
        SimulationEvent::FoodRestored { .. } => "food_restored",
        SimulationEvent::TaskCompleted { .. } => "task_completed",
        SimulationEvent::TaskFailed { .. } => "task_failed",
        SimulationEvent::ResourceDeposited { .. } => "resource_deposited",
        SimulationEvent::StockpileDeposit { .. } => "stockpile_deposit",
        SimulationEvent::NodeDepleted { .. } => "node_depleted",
        SimulationEvent::SaplingPlanted { .. } => "sapling_planted",
        SimulationEvent::ConstructionAttended { .. } => "construction_attended",
    }
}

fn generate_map(rng: &mut ChaCha8Rng) -> TerrainMap {
    let mut map = TerrainMap::filled(MAP_SIZE as u32, MAP_SIZE as u32, Terrain::Grass)
        .unwrap_or_else(|e| panic!("map generation failed: {e}"));
    // A few lakes and rock outcrops away from the settlement corner
    for _ in 0..10 {
        let x = rng.gen_range(6..MAP_SIZE);
        let y = rng.gen_range(6..MAP_SIZE);
        let terrain = if rng.gen_bool(0.5) { Terrain::Water } else { Terrain::Mountain };
        map.set_tile(GridPos::new(x, y), terrain);
    }
    map
}

fn random_walkable(map: &TerrainMap, rng: &mut ChaCha8Rng) -> GridPos {
    loop {
        let pos = GridPos::new(rng.gen_range(0..MAP_SIZE), rng.gen_range(0..MAP_SIZE));
        if map.is_walkable(pos) {
            return pos;
        }
    }
}
