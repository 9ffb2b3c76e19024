pub mod app;
pub mod data;
pub mod generator;
pub mod renderer;
pub mod scene_system;
