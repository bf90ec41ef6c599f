//! Devices: one operating system plus an online/failed flag.
//!
//! # Module structure
//!
//! | Sub-module | Contents |
//! |---|---|
//! | [`id`] | [`DeviceId`] newtype |
//! | [`traits`] | [`Device`] trait, [`DeviceState`] |
//! | [`simple`] | [`SimpleDevice`] |

pub mod id;
pub mod simple;
pub mod traits;

pub use id::DeviceId;
pub use simple::SimpleDevice;
pub use traits::{Device, DeviceState};

#[cfg(test)]
mod tests;
