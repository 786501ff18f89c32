//! kinradar library crate.
//!
//! Turns depth sensor frames into overhead and side occupancy grids drawn
//! in the terminal. The binary wires these modules to a sensor; they are
//! exposed here for integration testing.

pub mod cli;
pub mod config;
pub mod depth;
pub mod event_loop;
pub mod radar;
pub mod renderer;
pub mod sensor;
