//! Request handlers, one module per resource

pub mod catalog;
pub mod dashboard;
pub mod drivers;
pub mod health;
pub mod locations;
pub mod policies;
pub mod semi_trailers;
pub mod stages;
pub mod trips;
pub mod vehicles;
