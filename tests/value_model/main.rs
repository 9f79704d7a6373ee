//! Value Model Test Suite
//!
//! Cross-module guarantees of the value model, exercised through the
//! public `docmodel` facade.
//!
//! ## Test Groups
//!
//! - **Scenarios**: fixed inputs with known answers (sorting, diff, set,
//!   cast, containment)
//! - **Comparator**: totality, symmetry and predicate consistency
//! - **Cast**: idempotence and the error kinds of lossy conversions
//! - **Diff**: applying a diff reproduces the target document
//! - **Path**: set/get inverse and copy-on-write
//! - **Codecs**: round trips and key ordering through the facade
//! - **JSON**: literal typing and the lossy mappings
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test value_model
//! cargo test --test value_model prop_
//! ```

mod common;

mod scenarios;

mod cast_properties;
mod codec_properties;
mod comparator_properties;
mod diff_properties;
mod json_boundary;
mod path_properties;
