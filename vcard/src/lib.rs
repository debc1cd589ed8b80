// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Parse and format vCard 3.0 (RFC 2426) and 4.0 (RFC 6350) contacts.
//!
//! Only the properties a contact synchronizer needs are modelled; every other
//! content line is kept verbatim in [`Contact::unknown_properties`] and written
//! back unchanged.

#![warn(
    trivial_casts,
    trivial_numeric_casts,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    clippy::dbg_macro,
    clippy::indexing_slicing,
    clippy::pedantic
)]
// Allow certain clippy lints that are too restrictive for this crate
#![allow(
    clippy::option_option,
    clippy::similar_names,
    clippy::single_match_else,
    clippy::match_bool
)]

mod contact;
mod error;
pub mod formatter;
mod parser;

pub use crate::contact::{Contact, Photo, StructuredName, TypedValue, Version};
pub use crate::error::VCardError;
pub use crate::formatter::format;
pub use crate::parser::parse;
