//! Performance benchmarks for CROWDSIM

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use crowdsim::agent::Agent;
use crowdsim::grid::Grid;
use crowdsim::metrics::Metrics;
use crowdsim::{Config, Position, World};

fn crowd_config(agents: usize, side: usize) -> Config {
    let mut config = Config::default();
    config.agents.count = agents;
    config.world.width = side;
    config.world.height = side;
    config.spawn.probability = 0.0;
    config
}

fn benchmark_world_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("world_step");

    for agents in [50, 200, 800].iter() {
        let mut world = World::new_with_seed(crowd_config(*agents, 80), 42).unwrap();

        // Warm up
        world.run(10);

        group.bench_with_input(BenchmarkId::new("agents", agents), agents, |b, _| {
            b.iter(|| {
                world.step();
            });
        });
    }

    group.finish();
}

fn benchmark_candidate_scoring(c: &mut Criterion) {
    let grid = Grid::new(40, 40);
    let agent = Agent::new(0, Position::new(20, 20), 0, 2.0, 4);
    let intruders = [
        Position::new(21, 20),
        Position::new(19, 21),
        Position::new(20, 22),
        Position::new(18, 19),
    ];

    c.bench_function("score_candidates", |b| {
        b.iter(|| agent.score_candidates(black_box(&intruders), Position::new(35, 5), &grid));
    });
}

fn benchmark_intruder_scan(c: &mut Criterion) {
    let world = World::new_with_seed(crowd_config(500, 80), 7).unwrap();
    let positions = world.population.positions();

    c.bench_function("count_intruders_500", |b| {
        let mut metrics = Metrics::new();
        b.iter(|| metrics.count_intruders(black_box(&positions)));
    });
}

criterion_group!(
    benches,
    benchmark_world_step,
    benchmark_candidate_scoring,
    benchmark_intruder_scan,
);

criterion_main!(benches);
