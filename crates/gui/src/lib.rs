// Library crate: the part tree, meshes, render loop and session, usable headless.
// The egui window (app, ui, viewport drawing) stays in the binary crate.

pub mod command;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod mesh;
pub mod render;
pub mod session;
pub mod tree;
