// src/constants.rs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Default retry budget for one build-function invocation
/// Large enough that only a genuinely saturated key space exhausts it
pub const DEFAULT_MAX_RETRIES: usize = 5000;

/// Key emitted for a single attribute the record does not carry
/// Distinct from `"null"`, the key of an explicit null value
pub const MISSING_ATTRIBUTE_KEY: &str = "undefined";
