//! Domain models shared across the sampler.

pub mod tick;
pub mod ticker;

pub use tick::{NewPriceTick, PriceTick};
pub use ticker::TickerSet;
