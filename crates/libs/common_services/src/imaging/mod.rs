mod error;
mod normalize;

pub use error::*;
pub use normalize::*;
