//! End-to-end decision loop example.
//!
//! Demonstrates: reset → read decision/terminal steps → act per agent →
//! step → repeat, against a scripted two-behavior environment.

use mlagents_core::{ActionSpec, BehaviorName};
use mlagents_steps::{BaseEnv, BehaviorMapping};
use mlagents_test_utils::fixtures::{mixed_behavior, vector_behavior};
use mlagents_test_utils::{ScriptedEnv, ScriptedEnvConfig};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    println!("=== ML-Agents Decision Loop Example ===\n");

    let mut specs = BehaviorMapping::new();
    specs.insert(BehaviorName::from("Striker"), mixed_behavior());
    specs.insert(
        BehaviorName::from("Goalie"),
        vector_behavior(8, ActionSpec::continuous(2)),
    );
    let mut env = ScriptedEnv::new(
        specs,
        ScriptedEnvConfig {
            agents_per_behavior: 4,
            episode_length: 5,
            seed: 42,
        },
    );
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    env.reset().unwrap();
    let names: Vec<BehaviorName> = env.behavior_specs().keys().cloned().collect();

    for step in 0..12 {
        for name in &names {
            let (decision, terminal) = env.get_steps(name).unwrap();

            for ended in terminal.steps() {
                println!(
                    "  step {:>2} {:<8} agent {:>3} ended: reward={:>7.3} interrupted={}",
                    step, name, ended.agent_id, ended.reward, ended.interrupted,
                );
            }

            let total: f32 = decision.reward().sum();
            println!(
                "  step {:>2} {:<8} {} agents deciding, total_reward={:>7.3}",
                step,
                name,
                decision.len(),
                total,
            );

            let action_spec = env.behavior_spec(name).unwrap().action_spec().clone();
            for agent_id in decision.iter() {
                let action = action_spec.random_action(1, &mut rng);
                env.set_action_for_agent(name, agent_id, action).unwrap();
            }
        }
        env.step().unwrap();
    }

    env.close().unwrap();
    println!("\nDone after {} steps.", env.steps_taken());
}
