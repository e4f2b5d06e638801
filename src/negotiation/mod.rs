//! Pure negotiation domain logic: display-phase derivation and offer-term
//! validation. Nothing in here touches the database. Everything is a
//! function of persisted facts, so clients can re-derive their state from a
//! fresh fetch after a disconnect.

pub mod state;
