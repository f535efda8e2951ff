//! Transform engine: one pass from simple-mode rows to the two output tables.
//!
//! ```text
//! rows → classify_rows (forward-fill + level) → transform_row → assemble
//!                  │                                  │
//!                  └──── ErrorRecord ─────────────────┴──→ ErrorTable
//! ```
//!
//! Pure and synchronous: the same input always yields the same tables.

use super::assembler::{assemble, TransformOutput};
use super::inherit::classify_rows;
use super::profile::MappingProfile;
use super::rows::transform_row;
use crate::models::InputRow;

/// Transform rows with the given profile.
pub fn transform(rows: &[InputRow], profile: &MappingProfile) -> TransformOutput {
    let mut records = Vec::with_capacity(rows.len());
    let mut errors = Vec::new();

    for classified in classify_rows(rows) {
        match classified.and_then(|c| transform_row(&c, profile)) {
            Ok(record) => records.push(record),
            Err(error) => errors.push(error),
        }
    }

    assemble(&records, errors)
}
