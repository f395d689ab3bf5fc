//! Document schemas for the bridgebook data root
//!
//! Each type mirrors one flat JSON file under the data root. Records carry
//! an `extra` flatten map so fields written by newer versions (or preserved
//! from unrecognized CSV columns during migration) survive every
//! read-modify-write cycle untouched.

mod bridge_group;
mod contact;
mod oncall;
mod server;

pub use bridge_group::{BridgeEvent, BridgeGroup};
pub use contact::Contact;
pub use oncall::OncallEntry;
pub use server::Server;
