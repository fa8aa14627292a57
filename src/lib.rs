pub mod capture;
pub mod composite;
pub mod config;
pub mod context;
pub mod geometry;
pub mod layer;
pub mod ledger;
pub mod logging;
pub mod model;
pub mod pixelate;
pub mod render;
pub mod save;
pub mod session;
pub mod tools;
