//! Grammar productions for iso literals.
//!
//! All `parse_*` methods are implemented as extensions of `Parser`. The parser never needs schema
//! knowledge: directives are accepted on every declaration kind and checked during resolution.

mod declarations;
mod selections;
mod values;
