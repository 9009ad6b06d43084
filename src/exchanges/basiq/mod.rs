pub mod adapter;
pub mod math;
pub mod parser;
pub mod provider;

pub use adapter::BasiqPool;
pub use parser::{BasiqParser, BasiqSnapshot};
pub use provider::BasiqPoolProvider;
