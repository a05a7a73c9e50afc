mod error;
mod person;
mod person_store;
mod utils;

pub use error::*;
pub use person::*;
pub use person_store::*;
pub use utils::*;
