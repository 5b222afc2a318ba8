use rand::Rng;
use tinyvel::{Engine, MapProvider, TemplateEngine, Value};

pub fn get_engine() -> impl TemplateEngine {
    Engine::new()
}

pub fn list<T: Into<Value>>(items: Vec<T>) -> Value {
    Value::from(items)
}

/// A provider holding the `truefact`/`falsefact` flags used by the
/// conditional tests.
pub fn facts() -> MapProvider {
    MapProvider::new()
        .with("truefact", true)
        .with("falsefact", false)
}

pub fn generate_random_whitespace() -> String {
    let mut rng = rand::rng();
    let length = rng.random_range(0..10);
    (0..length).map(|_| ' ').collect()
}

pub fn generate_random_whitespace_at_least_one() -> String {
    let mut rng = rand::rng();
    let length = rng.random_range(1..10);
    (0..length).map(|_| ' ').collect()
}
