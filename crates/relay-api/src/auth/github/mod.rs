pub mod client;
pub mod models;
pub mod routes;

pub use client::{GithubClient, create_github_client};
pub use models::PROVIDER;
pub use routes::routes;
