use ndarray::{array, Array1};

use super::ScriptedModel;
use crate::agent::{argmax, DqnAgent, DqnAgentBuilder};
use crate::config::AgentConfig;
use crate::error::DqnError;
use crate::replay_buffer::Transition;
use crate::session::Session;

fn config(minibatch_size: usize, capacity: usize) -> AgentConfig {
    AgentConfig::builder()
        .minibatch_size(minibatch_size)
        .replay_memory_size(capacity)
        .discount_factor(0.9)
        .seed(1234)
        .build()
        .unwrap()
}

fn agent_with(model: ScriptedModel, actions: Vec<i32>, config: AgentConfig) -> DqnAgent<i32, ScriptedModel> {
    DqnAgent::new(config, actions, "test_env", model, Session::open("test")).unwrap()
}

#[test]
fn test_argmax_prefers_lowest_index_on_ties() {
    assert_eq!(argmax(array![1.0, 3.0, 3.0].view()), Some(1));
    assert_eq!(argmax(array![2.0, 2.0, 2.0].view()), Some(0));
    assert_eq!(argmax(array![-5.0, -1.0, -3.0].view()), Some(1));
}

#[test]
fn test_argmax_skips_nan() {
    assert_eq!(argmax(array![f32::NAN, 2.0, 2.0].view()), Some(1));
    assert_eq!(argmax(array![f32::NAN, f32::NAN].view()), None);
    assert_eq!(argmax(Array1::<f32>::zeros(0).view()), None);
}

#[test]
fn test_new_rejects_bad_action_sets() {
    let empty = DqnAgent::new(
        AgentConfig::default(),
        Vec::<i32>::new(),
        "env",
        ScriptedModel::new(0),
        Session::open("s"),
    );
    assert!(matches!(empty, Err(DqnError::InvalidParameter { .. })));

    let duplicate = DqnAgent::new(
        AgentConfig::default(),
        vec![1, 2, 1],
        "env",
        ScriptedModel::new(3),
        Session::open("s"),
    );
    assert!(matches!(duplicate, Err(DqnError::InvalidParameter { .. })));

    let wrong_width = DqnAgent::new(
        AgentConfig::default(),
        vec![1, 2],
        "env",
        ScriptedModel::new(3),
        Session::open("s"),
    );
    assert!(matches!(wrong_width, Err(DqnError::DimensionMismatch { .. })));
}

#[test]
fn test_greedy_selection_with_zero_epsilon() {
    let state = array![0.5, -0.5];
    let model = ScriptedModel::new(3).with_q(state.clone(), array![0.1, 0.9, 0.9]);
    let mut agent = agent_with(model, vec![10, 20, 30], config(32, 100));

    for _ in 0..50 {
        assert_eq!(agent.select_action(state.view(), 0.0).unwrap(), 20);
    }
}

#[test]
fn test_full_exploration_ignores_model() {
    let state = array![0.5, -0.5];
    let model = ScriptedModel::new(3).with_q(state.clone(), array![0.0, 0.0, 100.0]);
    let mut agent = agent_with(model, vec![10, 20, 30], config(32, 100));

    let mut counts = [0usize; 3];
    let trials = 3000;
    for _ in 0..trials {
        let action = agent.select_action(state.view(), 1.0).unwrap();
        let index = agent.action_index(&action).unwrap();
        counts[index] += 1;
    }

    assert_eq!(agent.model().predict_calls, 0);
    for count in counts {
        // Expected 1000 each
        assert!(count > 850 && count < 1150, "counts {:?}", counts);
    }
}

#[test]
fn test_act_uses_configured_exploration() {
    let state = array![1.0];
    let model = ScriptedModel::new(2).with_q(state.clone(), array![0.0, 1.0]);
    let config = AgentConfig::builder().exploration(0.0).build().unwrap();
    let mut agent = agent_with(model, vec![0, 1], config);

    assert_eq!(agent.act(state.view()).unwrap(), 1);
}

#[test]
fn test_select_action_rejects_bad_epsilon() {
    let mut agent = agent_with(ScriptedModel::new(2), vec![0, 1], config(32, 100));
    let state = array![0.0];
    assert!(agent.select_action(state.view(), 1.5).is_err());
    assert!(agent.select_action(state.view(), f32::NAN).is_err());
}

#[test]
fn test_store_experience_rejects_unknown_action() {
    let mut agent = agent_with(ScriptedModel::new(2), vec![0, 1], config(32, 100));
    let result = agent.store_experience(array![0.0], 7, 1.0, array![1.0], false);

    assert!(matches!(result, Err(DqnError::UnknownAction(_))));
    assert!(agent.buffer().is_empty());
}

#[test]
fn test_terminal_target_is_reward() {
    let s = array![1.0];
    let s_next = array![2.0];
    let model = ScriptedModel::new(2)
        .with_q(s.clone(), array![1.0, 2.0])
        .with_q(s_next.clone(), array![100.0, 100.0]);
    let mut agent = agent_with(model, vec![0, 1], config(32, 100));

    let target = agent
        .build_target(&Transition {
            state: s,
            action: 0,
            reward: 5.0,
            next_state: s_next,
            terminal: true,
        })
        .unwrap();

    assert_eq!(target, array![5.0, 2.0]);
}

#[test]
fn test_non_terminal_target_bootstraps_max() {
    let s = array![1.0];
    let s_next = array![2.0];
    let model = ScriptedModel::new(2)
        .with_q(s.clone(), array![1.0, 2.0])
        .with_q(s_next.clone(), array![3.0, 7.0]);
    let mut agent = agent_with(model, vec![0, 1], config(32, 100));

    let target = agent
        .build_target(&Transition {
            state: s,
            action: 0,
            reward: 1.0,
            next_state: s_next,
            terminal: false,
        })
        .unwrap();

    assert!((target[0] - (1.0 + 0.9 * 7.0)).abs() < 1e-6);
    assert_eq!(target[1], 2.0);
}

#[test]
fn test_target_slot_follows_action_position() {
    let s = array![1.0];
    let model = ScriptedModel::new(2).with_q(s.clone(), array![4.0, 4.0]);
    // Labels deliberately differ from their positions
    let mut agent = agent_with(model, vec![7, 3], config(32, 100));

    let target = agent
        .build_target(&Transition {
            state: s.clone(),
            action: 3,
            reward: -1.0,
            next_state: s,
            terminal: true,
        })
        .unwrap();

    assert_eq!(agent.action_index(&3).unwrap(), 1);
    assert_eq!(target, array![4.0, -1.0]);
}

#[test]
fn test_end_to_end_replay_step() {
    let mut model = ScriptedModel::new(2);
    for i in 1..=6 {
        model = model.with_q(array![i as f32], array![i as f32, -(i as f32)]);
    }
    let mut agent = agent_with(model, vec![0, 1], config(2, 4));

    for i in 1..=5 {
        let terminal = i == 5;
        agent
            .store_experience(array![i as f32], (i % 2) as i32, i as f32, array![(i + 1) as f32], terminal)
            .unwrap();
    }

    let stored: Vec<f32> = agent.buffer().iter().map(|t| t.state[0]).collect();
    assert_eq!(stored, vec![2.0, 3.0, 4.0, 5.0]);

    let loss = agent.experience_replay().unwrap();
    assert_eq!(loss, 0.5);
    assert_eq!(agent.current_loss(), 0.5);

    let fits = &agent.model().fits;
    assert_eq!(fits.len(), 1);
    let (states, targets) = &fits[0];
    assert_eq!(states.nrows(), 2);
    assert_eq!(targets.nrows(), 2);

    for (state, target) in states.rows().into_iter().zip(targets.rows()) {
        let prediction = agent.model().lookup(state);
        let changed = prediction
            .iter()
            .zip(target.iter())
            .filter(|(p, t)| p != t)
            .count();
        assert!(changed <= 1);
    }
}

#[test]
fn test_replay_on_empty_buffer_fails_without_training() {
    let mut agent = agent_with(ScriptedModel::new(2), vec![0, 1], config(32, 100));

    assert!(matches!(agent.experience_replay(), Err(DqnError::EmptyBuffer(_))));
    assert!(agent.model().fits.is_empty());
    assert_eq!(agent.current_loss(), 0.0);
}

#[test]
fn test_replay_clamps_batch_to_buffer_size() {
    let mut agent = agent_with(ScriptedModel::new(2), vec![0, 1], config(32, 100));
    for i in 0..3 {
        agent.store_experience(array![i as f32], 1, 0.0, array![i as f32], false).unwrap();
    }

    agent.experience_replay().unwrap();
    assert_eq!(agent.model().fits[0].0.nrows(), 3);
}

#[test]
fn test_session_released_with_agent() {
    let session = Session::open("scoped");
    let handle = session.handle();
    let agent = agent_with_session(session);
    assert!(handle.is_active());

    let model = agent.end_session();
    assert!(!handle.is_active());
    assert_eq!(model.n_actions, 2);

    let session = Session::open("dropped");
    let handle = session.handle();
    {
        let _agent = agent_with_session(session);
        assert!(handle.is_active());
    }
    assert!(!handle.is_active());

    let session = Session::open("closed");
    let handle = session.handle();
    assert_eq!(handle.name(), "closed");
    assert!(handle.is_active());
    session.close();
    assert!(!handle.is_active());
}

#[test]
fn test_agent_with_huge_replay_capacity() {
    let config = AgentConfig::builder()
        .replay_memory_size(usize::MAX / 2)
        .minibatch_size(2)
        .build()
        .unwrap();
    let mut agent = agent_with(ScriptedModel::new(2), vec![0, 1], config);
    assert_eq!(agent.buffer().capacity(), usize::MAX / 2);

    let state = array![1.0, 0.0];
    agent.store_experience(state.clone(), 1, 1.0, state, true).unwrap();
    assert_eq!(agent.buffer().len(), 1);
    assert_eq!(agent.experience_replay().unwrap(), 0.5);
}

#[test]
fn test_model_mut_changes_greedy_choice() {
    let state = array![0.5, -0.5];
    let model = ScriptedModel::new(2).with_q(state.clone(), array![1.0, 0.0]);
    let mut agent = agent_with(model, vec![0, 1], config(32, 100));
    assert_eq!(agent.select_action(state.view(), 0.0).unwrap(), 0);

    agent.model_mut().table[0].1 = array![0.0, 1.0];
    assert_eq!(agent.select_action(state.view(), 0.0).unwrap(), 1);
}

fn agent_with_session(session: Session) -> DqnAgent<i32, ScriptedModel> {
    DqnAgent::new(AgentConfig::default(), vec![0, 1], "env", ScriptedModel::new(2), session).unwrap()
}

#[test]
fn test_checkpoint_name() {
    let agent = agent_with(ScriptedModel::new(2), vec![0, 1], config(32, 100));
    assert_eq!(agent.environment_name(), "test_env");
    assert_eq!(agent.checkpoint_name(), "test_env.ckpt");
}

#[test]
fn test_builder() {
    let agent = DqnAgentBuilder::new()
        .enabled_actions(&[0, 1, 2])
        .environment_name("grid")
        .config(config(8, 50))
        .model(ScriptedModel::new(3))
        .build()
        .unwrap();

    assert_eq!(agent.enabled_actions(), &[0, 1, 2]);
    assert_eq!(agent.config().minibatch_size(), 8);
    assert_eq!(agent.buffer().capacity(), 50);
    assert_eq!(agent.session().name(), "grid");
}

#[test]
fn test_builder_error_handling() {
    let missing_model = DqnAgentBuilder::<i32, ScriptedModel>::new()
        .enabled_actions(&[0, 1])
        .build();
    assert!(missing_model.is_err());

    let missing_actions = DqnAgentBuilder::<i32, ScriptedModel>::new()
        .model(ScriptedModel::new(2))
        .build();
    assert!(missing_actions.is_err());
}
