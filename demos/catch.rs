//! Train an agent on an 8x8 "catch" game: a ball falls one row per step and
//! the player moves a one-cell paddle along the bottom row to catch it.
//!
//! Run with `RUST_LOG=info cargo run --release --example catch`.

use log::info;
use minidqn::{
    agent::DqnAgent,
    config::AgentConfig,
    error::Result,
    persistence::ModelStore,
    session::Session,
};
use ndarray::{Array1, Array2};
use rand::Rng;

const SIZE: usize = 8;
const ENABLED_ACTIONS: [i32; 3] = [0, -1, 1];
const N_EPOCHS: usize = 1000;

struct CatchBall {
    ball_row: usize,
    ball_col: usize,
    player_col: usize,
}

impl CatchBall {
    fn new() -> Self {
        CatchBall {
            ball_row: 0,
            ball_col: 0,
            player_col: SIZE / 2,
        }
    }

    fn reset<R: Rng>(&mut self, rng: &mut R) {
        self.ball_row = 0;
        self.ball_col = rng.gen_range(0..SIZE);
        self.player_col = SIZE / 2;
    }

    fn observe(&self) -> Result<Array1<f32>> {
        let mut screen = Array2::<f32>::zeros((SIZE, SIZE));
        screen[[self.ball_row, self.ball_col]] = 1.0;
        screen[[SIZE - 1, self.player_col]] = 1.0;
        Ok(screen.into_shape(SIZE * SIZE)?)
    }

    /// Returns `(reward, terminal)`.
    fn step(&mut self, action: i32) -> (f32, bool) {
        let col = self.player_col as i32 + action;
        self.player_col = col.clamp(0, SIZE as i32 - 1) as usize;
        self.ball_row += 1;

        if self.ball_row == SIZE - 1 {
            let reward = if self.ball_col == self.player_col { 1.0 } else { -1.0 };
            (reward, true)
        } else {
            (0.0, false)
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let config = AgentConfig::default();
    let session = Session::open("catch_ball");
    let mut agent = DqnAgent::with_default_network(config, ENABLED_ACTIONS.to_vec(), "catch_ball", session)?;
    let mut env = CatchBall::new();
    let mut rng = rand::thread_rng();
    let mut wins = 0;

    for epoch in 0..N_EPOCHS {
        env.reset(&mut rng);
        let mut state = env.observe()?;
        let mut q_max = 0.0f32;

        loop {
            let action = agent.act(state.view())?;
            let (reward, terminal) = env.step(action);
            let next_state = env.observe()?;

            agent.store_experience(state, action, reward, next_state.clone(), terminal)?;
            agent.experience_replay()?;

            q_max = q_max.max(agent.q_values(next_state.view())?.fold(f32::NEG_INFINITY, |m, &v| m.max(v)));
            state = next_state;

            if terminal {
                if reward > 0.0 {
                    wins += 1;
                }
                break;
            }
        }

        info!(
            "EPOCH: {:03}/{:03} | WIN: {:03} | LOSS: {:.4} | Q_MAX: {:.4}",
            epoch,
            N_EPOCHS - 1,
            wins,
            agent.current_loss(),
            q_max
        );
    }

    let store = ModelStore::default();
    agent.save_model(&store)?;
    info!("Saved {} into {}", agent.checkpoint_name(), store.dir().display());

    agent.end_session();
    Ok(())
}
