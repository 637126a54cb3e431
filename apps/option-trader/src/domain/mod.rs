//! Domain value types: OCC symbols, orders, quotes, strike selection.

pub mod occ;
pub mod order;
pub mod quote;
pub mod strike;

pub use occ::{OccError, OptionRight, OptionSymbol, encode_occ};
pub use order::{
    OrderOutcome, OrderSide, OrderStatus, PositionIntent, TrackedOrder, classify_intent,
};
pub use quote::Quote;
pub use strike::{nearest_strike, strike_window};
