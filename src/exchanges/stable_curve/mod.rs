pub mod adapter;
pub mod math;
pub mod parser;
pub mod provider;

pub use adapter::StableCurvePool;
pub use parser::{StableCurveParser, StableCurveSnapshot};
pub use provider::StableCurvePoolProvider;
