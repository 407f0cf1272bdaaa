pub mod delivery;
pub mod github;

pub use github::routes;
