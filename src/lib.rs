pub mod canvas;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod last_dir;
pub mod processing;
pub mod scan;
pub mod tasks {
    pub mod loader;
    pub mod viewer;
}
