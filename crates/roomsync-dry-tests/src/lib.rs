// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared test doubles and fixtures for RoomSync crates.
#![forbid(unsafe_code)]
//!
//! # Modules
//!
//! - [`config`] - In-memory config store fake for testing without filesystem
//! - [`object`] - Ergonomic placed-object construction via builder pattern
//! - [`rooms`] - Canned rooms and layouts used across the suites

pub mod config;
pub mod object;
pub mod rooms;

pub use config::InMemoryConfigStore;
pub use object::ObjectBuilder;
pub use rooms::{boundless_room, furnished_layout, standard_room, STANDARD_ROOM};
