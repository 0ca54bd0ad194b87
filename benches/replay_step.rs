use criterion::{black_box, criterion_group, criterion_main, Criterion};
use minidqn::{agent::DqnAgent, config::AgentConfig, session::Session};
use ndarray::Array1;

fn bench_experience_replay(c: &mut Criterion) {
    let config = AgentConfig::builder().seed(0).build().unwrap();
    let mut agent = DqnAgent::with_default_network(config, vec![0, 1, 2], "bench", Session::open("bench")).unwrap();

    for i in 0..1000 {
        let state = Array1::from_elem(64, (i % 8) as f32 / 8.0);
        let next_state = Array1::from_elem(64, ((i + 1) % 8) as f32 / 8.0);
        agent
            .store_experience(state, i % 3, (i % 5) as f32 - 2.0, next_state, i % 8 == 7)
            .unwrap();
    }

    c.bench_function("experience_replay_32", |b| {
        b.iter(|| black_box(agent.experience_replay().unwrap()))
    });

    let state = Array1::from_elem(64, 0.5);
    c.bench_function("select_action_greedy", |b| {
        b.iter(|| black_box(agent.select_action(state.view(), 0.0).unwrap()))
    });
}

criterion_group!(benches, bench_experience_replay);
criterion_main!(benches);
