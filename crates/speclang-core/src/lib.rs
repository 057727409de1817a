//! Speclang Core Types
//!
//! This crate provides the document model produced by the speclang
//! compiler and consumed by execution engines and formatting tools:
//!
//! - **Tables**: column-ordered tables with typed cells ([`table::Table`])
//! - **Arguments**: classified step arguments ([`arg::StepArg`])
//! - **Lookups**: parameter bindings and scope chains ([`lookup`] module)
//! - **Steps**: canonical steps and concept expansions ([`step::Step`])
//! - **Specifications**: headings, scenarios and items ([`spec`] module)
//! - **Concepts**: reusable parameterized step sequences ([`concept::Concept`])

pub mod arg;
pub mod concept;
pub mod lookup;
pub mod spec;
pub mod step;
pub mod table;
