use sigma_rs::Engine;
use std::collections::HashMap;

fn main() {
    pretty_env_logger::init();

    let engine = Engine::new();
    let ast = engine
        .parse("principal * (1 + rate/n)^(n*years)")
        .expect("Failed to parse");

    let contexts: Vec<HashMap<String, f64>> = [1.0, 4.0, 12.0, 365.0]
        .iter()
        .map(|n| {
            HashMap::from([
                ("principal".to_string(), 1000.0),
                ("rate".to_string(), 0.05),
                ("n".to_string(), *n),
                ("years".to_string(), 10.0),
            ])
        })
        .collect();

    for (i, result) in engine.evaluate_batch(&ast, &contexts).iter().enumerate() {
        match result {
            Ok(value) => println!("Result {}: {}", i, value.to_decimal_string(20)),
            Err(err) => println!("Result {}: {}", i, err),
        }
    }
}
