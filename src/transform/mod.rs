//! Transform stage: normalize persisted payloads into one table per dataset kind.

pub mod assembler;
pub mod error;
pub mod json;
pub mod normalizer;
pub mod table;
pub mod transformer;
