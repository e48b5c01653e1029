pub mod app;
pub mod audio;
pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod game;
pub mod geometry;
pub mod scores;
pub mod ui;
