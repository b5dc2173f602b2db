#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures shared by the iso literal compiler.
//!
//! Type and field names in the schema graph are interned once per compilation run and
//! compared as integer handles afterwards.

mod interner;


pub use interner::{Interner, Symbol};
