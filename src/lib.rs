// Copyright 2026 Partfetch Contributors
// SPDX-License-Identifier: Apache-2.0

//! Partfetch library — part-number extraction and browser-driven fetching.
//!
//! This library crate exposes the core modules for integration testing.

pub mod audit;
pub mod cli;
pub mod details;
pub mod harvest;
pub mod parts;
pub mod renderer;
pub mod stealth;
