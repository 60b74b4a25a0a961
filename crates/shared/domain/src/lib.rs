//! # Domain Types
//!
//! Plain configuration types shared by the keel crates. Only `serde` is allowed here:
//! no I/O and no behaviour beyond defaults and small accessors.

pub mod config;
