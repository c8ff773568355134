use log::info;
use sigma_rs::config::set_default_precision;
use sigma_rs::{Engine, EngineConfig};
use std::time::Instant;

const CHUDNOVSKY: &str = "426880*sqrt(10005) / (sum of ((6k)! * (13591409 + 545140134k)) / \
                          ((3k)! * (k!)^3 * (-262537412640768000)^k) from k=0 to 20)";

fn main() {
    pretty_env_logger::init();

    set_default_precision(1024).expect("Default precision already fixed");
    let engine = Engine::with_config(EngineConfig::default().with_max_series_terms(10_000))
        .expect("Invalid configuration");

    let started = Instant::now();
    match engine.parse_and_evaluate(CHUDNOVSKY) {
        Ok(pi) => {
            info!("Evaluated in {:?}", started.elapsed());
            println!("pi = {}", pi);
        }
        Err(err) => println!("Error: {}", err),
    }

    match engine.parse_and_evaluate("sum of 1/k! from k=0 to infinity") {
        Ok(e) => println!("e  = {}", e),
        Err(err) => println!("Error: {}", err),
    }
}
