//! Bike rental demand prediction service.
//!
//! Turns form inputs (hour, temperature, season, working day, weather and a
//! calendar date) into the feature row a pre-trained regressor expects, runs
//! the model, and returns the estimated rental count along with chart data
//! describing what the model was given.

pub mod config;
pub mod date;
pub mod features;
pub mod inference;
pub mod model;
pub mod pipeline;
pub mod present;
pub mod server;
pub mod types;
