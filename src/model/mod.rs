//! Domain model for the game entities the agent tracks
//!
//! - `Line`: a route, the unit of reconciliation
//! - `Airport`: origin/destination of a line, stored by code
//! - `CategorizedValue`: the economic/executive/first/cargo quadruple used
//!   for demand, prices and turnover

mod airport;
mod categorized;
mod line;

pub use airport::Airport;
pub use categorized::CategorizedValue;
pub use line::Line;
