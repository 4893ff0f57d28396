#[path = "engine/properties.rs"]
mod properties;
#[path = "engine/reconstruction.rs"]
mod reconstruction;
#[path = "engine/programs.rs"]
mod programs;
