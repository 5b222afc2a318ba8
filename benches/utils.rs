use std::collections::BTreeMap;

use rand::{Rng, SeedableRng, rngs::StdRng};
use tinyvel::{MapProvider, PrimitiveArray, Value};

const STATES: [&str; 3] = ["open", "blocked", "done"];

/// Builds `n` seeded providers shaped for `template_profile.tmpl`: typed
/// arrays, lists of maps nested two loops deep, null list items and a
/// numeric `#if` target.
pub fn generate_random_providers(n: usize) -> Vec<MapProvider> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..n).map(|_| random_provider(&mut rng)).collect()
}

fn random_provider(rng: &mut StdRng) -> MapProvider {
    let members: Vec<Value> = (0..rng.random_range(2..6))
        .map(|_| random_member(rng))
        .collect();

    let mut team = BTreeMap::new();
    team.insert("name".to_string(), Value::from(random_string(rng, 4, 10)));
    team.insert("region".to_string(), Value::from(random_string(rng, 2, 4)));
    team.insert("active".to_string(), Value::Bool(rng.random_bool(0.7)));
    team.insert("budget".to_string(), Value::Int(rng.random_range(1_000..50_000)));
    team.insert("members".to_string(), Value::List(members));

    let scores: Vec<i32> = (0..rng.random_range(5..20))
        .map(|_| rng.random_range(0..100))
        .collect();
    let ratios: Vec<f64> = (0..rng.random_range(3..10))
        .map(|_| f64::from(rng.random_range(0_u8..=20)) / 4.0)
        .collect();
    let notes: Vec<Value> = (0..rng.random_range(3..8))
        .map(|_| {
            if rng.random_bool(0.3) {
                Value::Null
            } else {
                Value::from(random_string(rng, 5, 15))
            }
        })
        .collect();

    MapProvider::new()
        .with("team", Value::Map(team))
        .with("scores", PrimitiveArray::from(scores))
        .with("ratios", PrimitiveArray::from(ratios))
        .with("notes", Value::List(notes))
}

fn random_member(rng: &mut StdRng) -> Value {
    let tasks: Vec<Value> = (0..rng.random_range(0..5))
        .map(|_| {
            let mut task = BTreeMap::new();
            task.insert("title".to_string(), Value::from(random_string(rng, 5, 12)));
            let state = STATES[rng.random_range(0..STATES.len())];
            task.insert("state".to_string(), Value::from(state));
            Value::Map(task)
        })
        .collect();

    let mut member = BTreeMap::new();
    member.insert("name".to_string(), Value::from(random_string(rng, 3, 8)));
    member.insert("lead".to_string(), Value::Bool(rng.random_bool(0.2)));
    member.insert("tasks".to_string(), Value::List(tasks));
    Value::Map(member)
}

/// A lowercase ASCII string with a length in `min_len..=max_len`.
fn random_string(rng: &mut StdRng, min_len: usize, max_len: usize) -> String {
    let len = rng.random_range(min_len..=max_len);
    (0..len)
        .map(|_| char::from(rng.random_range(b'a'..=b'z')))
        .collect()
}
