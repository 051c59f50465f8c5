pub mod model;
pub mod repo;
pub mod rest;

pub use model::*;
pub use repo::*;
pub use rest::RestStore;
