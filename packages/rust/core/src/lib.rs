//! Core orchestration and domain logic for brdgen.
//!
//! This crate ties together input decoding, content generation, CSV table
//! conversion, and document assembly into the end-to-end `generate_brd`
//! workflow.

pub mod assembler;
pub mod generation;
pub mod pipeline;
pub mod tables;
