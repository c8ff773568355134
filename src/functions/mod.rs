pub mod elementary;
pub mod number_theory;
pub mod registry;
pub mod series;
pub mod sorting;
pub mod special;
pub mod statistics;

pub use registry::{MultiFunction, NativeFunction, Registry, ScalarFunction};

pub fn register_functions(registry: &mut Registry) {
    elementary::register(registry);
    statistics::register(registry);
    number_theory::register(registry);
    sorting::register(registry);
    series::register(registry);
    special::register(registry);
}
