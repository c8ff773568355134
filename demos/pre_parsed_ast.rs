use sigma_rs::Engine;

fn main() {
    pretty_env_logger::init();

    let engine = Engine::new();

    let expression = "sum of x^k/k! from k=0 to infinity";
    let ast = engine.parse(expression).expect("Failed to parse");
    println!("Parsed: {}", ast);

    let mut scope = engine.new_scope();
    for x in [-1, 1, 2] {
        scope.set("x", sigma_rs::Number::from_i64(x, engine.precision()));
        match engine.evaluate(&ast, &mut scope) {
            Ok(result) => println!("exp({}) = {}", x, result),
            Err(err) => println!("Error: {}", err),
        }
    }

    let samples: Vec<sigma_rs::Number> = [3.5, -1.25, 2.0]
        .iter()
        .filter_map(|value| sigma_rs::Number::from_f64(*value, engine.precision()))
        .collect();
    match engine.invoke("sort", &samples) {
        Ok(sorted) => {
            let values: Vec<f64> = sorted
                .as_list()
                .unwrap_or_default()
                .iter()
                .map(|value| value.to_f64())
                .collect();
            println!("sort: {:?}", values);
        }
        Err(err) => println!("Error: {}", err),
    }
}
