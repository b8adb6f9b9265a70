//! Domain modules organized as vertical slices.
//!
//! Each sub-module contains:
//! - `mod.rs`: Rich domain types (validated, business-logic-ready)
//! - `wire.rs`: Raw serde structs matching backend requests and responses
//! - `convert.rs`: `From` conversions between wire and domain types
//! - `state.rs`: Pure update logic applied to the store's records
//! - `client.rs`: Sub-client: auth gate, optimistic mutations, HTTP calls

pub mod address;
pub mod cart;
pub mod order;
pub mod product;
pub mod wishlist;
