// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Common test utilities for integration tests.
//!
//! This module provides shared test infrastructure including:
//! - An in-memory remote collection that records every request
//! - Test data factories (fixtures)

mod fakes;
mod fixtures;

#[allow(unused_imports)]
pub use fakes::{Call, FakeRemote, NoAssets};
#[allow(unused_imports)]
pub use fixtures::{card, setup_store, synced_contact};
