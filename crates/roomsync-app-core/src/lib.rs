// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared application services for RoomSync editors (config, prefs, toasts).
//! Keeps the layout core free of storage and UI concerns.

pub mod config;
pub mod prefs;
pub mod toast;
