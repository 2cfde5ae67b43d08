//! Drives a scripted environment through the `BaseEnv` lifecycle the way
//! a training loop would.

use mlagents_core::{ActionError, ActionSpec, ActionTuple, AgentId, BehaviorName, StepsError};
use mlagents_steps::{BaseEnv, BehaviorMapping, EnvError};
use mlagents_test_utils::fixtures::{mixed_behavior, vector_behavior};
use mlagents_test_utils::{ScriptedEnv, ScriptedEnvConfig};
use ndarray::{array, Array2};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

fn walker() -> BehaviorName {
    BehaviorName::from("Walker")
}

fn walker_env(config: ScriptedEnvConfig) -> ScriptedEnv {
    ScriptedEnv::single("Walker", vector_behavior(5, ActionSpec::continuous(2)), config)
}

#[test]
fn steps_before_reset_are_empty() {
    let env = walker_env(ScriptedEnvConfig::default());
    let (decision, terminal) = env.get_steps(&walker()).unwrap();
    assert!(decision.is_empty());
    assert!(terminal.is_empty());
    assert_eq!(decision.obs()[0].shape(), &[0, 5]);
}

#[test]
fn reset_spawns_agents_requesting_decisions() {
    init_tracing();
    let mut env = walker_env(ScriptedEnvConfig {
        agents_per_behavior: 4,
        ..Default::default()
    });
    env.reset().unwrap();
    let (decision, terminal) = env.get_steps(&walker()).unwrap();
    assert_eq!(decision.len(), 4);
    assert!(terminal.is_empty());
    let spec = env.behavior_spec(&walker()).unwrap();
    assert!(decision.check_spec(spec).is_ok());
    for id in decision.iter() {
        let step = decision.get(id).unwrap();
        assert_eq!(step.obs[0].shape(), &[5]);
        assert_eq!(step.reward, 0.0);
    }
}

#[test]
fn rewards_follow_applied_actions() {
    let mut env = walker_env(ScriptedEnvConfig {
        agents_per_behavior: 2,
        episode_length: 10,
        seed: 1,
    });
    env.reset().unwrap();
    env.set_actions(&walker(), ActionTuple::from_continuous(array![[0.5, 0.25], [-1.0, 0.0]]))
        .unwrap();
    env.step().unwrap();

    let (decision, _) = env.get_steps(&walker()).unwrap();
    assert_eq!(decision.reward(), &array![0.75f32, -1.0]);
    assert_eq!(
        env.last_applied(&walker()).unwrap().continuous(),
        &array![[0.5f32, 0.25], [-1.0, 0.0]]
    );
}

#[test]
fn missing_actions_default_to_zero() {
    let mut env = walker_env(ScriptedEnvConfig::default());
    env.reset().unwrap();
    env.step().unwrap();
    let applied = env.last_applied(&walker()).unwrap();
    assert!(applied.continuous().iter().all(|&v| v == 0.0));
    assert_eq!(applied.n_agents(), 3);
}

#[test]
fn per_agent_action_lands_in_its_row() {
    let mut env = walker_env(ScriptedEnvConfig::default());
    env.reset().unwrap();
    let (decision, _) = env.get_steps(&walker()).unwrap();
    let target = decision.agent_id()[1];

    env.set_action_for_agent(&walker(), target, ActionTuple::from_continuous(array![[2.0, 3.0]]))
        .unwrap();
    env.step().unwrap();

    let applied = env.last_applied(&walker()).unwrap().continuous();
    assert_eq!(applied.row(1), array![2.0f32, 3.0]);
    assert_eq!(applied.row(0), array![0.0f32, 0.0]);
    let (decision, _) = env.get_steps(&walker()).unwrap();
    assert_eq!(decision.get(target).unwrap().reward, 5.0);
}

#[test]
fn episode_end_moves_agents_to_terminal() {
    let mut env = walker_env(ScriptedEnvConfig {
        agents_per_behavior: 3,
        episode_length: 2,
        seed: 7,
    });
    env.reset().unwrap();
    let (first, _) = env.get_steps(&walker()).unwrap();
    let original: Vec<AgentId> = first.iter().collect();

    env.step().unwrap();
    let (decision, terminal) = env.get_steps(&walker()).unwrap();
    assert!(terminal.is_empty());
    assert_eq!(decision.iter().collect::<Vec<_>>(), original);

    env.step().unwrap();
    let (decision, terminal) = env.get_steps(&walker()).unwrap();
    assert_eq!(terminal.iter().collect::<Vec<_>>(), original);
    assert!(terminal.interrupted().iter().all(|&i| i));
    for id in &original {
        assert!(!decision.contains(*id));
        assert!(terminal.get(*id).unwrap().interrupted);
    }
    assert_eq!(decision.len(), 3);
    assert_eq!(env.steps_taken(), 2);
}

#[test]
fn discrete_behavior_gets_action_mask() {
    let mut env = ScriptedEnv::single("Crawler", mixed_behavior(), ScriptedEnvConfig::default());
    let crawler = BehaviorName::from("Crawler");
    env.reset().unwrap();
    let (decision, _) = env.get_steps(&crawler).unwrap();
    let id = decision.agent_id()[0];
    let mask = decision.get(id).unwrap().action_mask.unwrap();
    assert_eq!(mask.len(), 2);
    assert_eq!(mask[0].len(), 2);
    assert_eq!(mask[1].len(), 3);

    let spec = env.behavior_spec(&crawler).unwrap().action_spec().clone();
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let action = spec.random_action(decision.len(), &mut rng);
    env.set_actions(&crawler, action).unwrap();
    env.step().unwrap();
}

#[test]
fn invalid_actions_are_rejected() {
    let mut env = walker_env(ScriptedEnvConfig::default());
    env.reset().unwrap();
    let err = env
        .set_actions(&walker(), ActionTuple::from_continuous(Array2::zeros((2, 2))))
        .unwrap_err();
    assert_eq!(
        err,
        EnvError::Action(ActionError::ContinuousShape {
            expected: (3, 2),
            actual: (2, 2)
        })
    );

    let err = env
        .set_action_for_agent(
            &walker(),
            AgentId(999),
            ActionTuple::from_continuous(Array2::zeros((1, 2))),
        )
        .unwrap_err();
    assert_eq!(
        err,
        EnvError::Steps(StepsError::AgentNotFound {
            agent_id: AgentId(999)
        })
    );
}

#[test]
fn unknown_behavior_and_closed_env() {
    let mut env = walker_env(ScriptedEnvConfig::default());
    let hopper = BehaviorName::from("Hopper");
    assert_eq!(
        env.get_steps(&hopper).unwrap_err(),
        EnvError::UnknownBehavior { name: hopper.clone() }
    );
    assert!(env.behavior_spec(&hopper).is_err());

    env.close().unwrap();
    assert_eq!(env.reset().unwrap_err(), EnvError::Closed);
    assert_eq!(env.get_steps(&walker()).unwrap_err(), EnvError::Closed);
    assert_eq!(env.close().unwrap_err(), EnvError::Closed);
}

#[test]
fn behaviors_keep_registration_order() {
    let mut specs = BehaviorMapping::new();
    specs.insert(BehaviorName::from("Striker"), mixed_behavior());
    specs.insert(BehaviorName::from("Goalie"), vector_behavior(3, ActionSpec::continuous(1)));
    let mut env = ScriptedEnv::new(specs, ScriptedEnvConfig::default());
    env.reset().unwrap();

    let names: Vec<&str> = env.behavior_specs().keys().map(|n| n.as_str()).collect();
    assert_eq!(names, ["Striker", "Goalie"]);

    let (striker, _) = env.get_steps(&BehaviorName::from("Striker")).unwrap();
    let (goalie, _) = env.get_steps(&BehaviorName::from("Goalie")).unwrap();
    for id in striker.iter() {
        assert!(!goalie.contains(id));
    }
}
