// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

/// vCard parsing errors.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum VCardError {
    /// A content line has no `:` separating name and value.
    #[error("line {line}: missing ':' in content line")]
    MissingColon {
        /// 1-based line number after unfolding.
        line: usize,
    },

    /// A content line appeared outside of `BEGIN:VCARD` / `END:VCARD`.
    #[error("line {line}: content outside of a vCard")]
    OutsideCard {
        /// 1-based line number after unfolding.
        line: usize,
    },

    /// `BEGIN:VCARD` without a matching `END:VCARD`.
    #[error("unterminated vCard: missing END:VCARD")]
    Unterminated,

    /// Inline binary data could not be decoded.
    #[error("invalid base64 data in {property}: {source}")]
    Base64 {
        /// Property name, e.g. `PHOTO`.
        property: String,
        /// Underlying decoder error.
        #[source]
        source: base64::DecodeError,
    },
}
