pub mod archive;
pub mod cli;
pub mod config;
pub mod fetch;
pub mod flock;
pub mod materialize;
pub mod model;
pub mod repository;
pub mod resolver;

mod api;

pub use api::{Artifetch, ArtifetchBuilder};
pub use fetch::FetchRequest;
