//! The four cleaning stages, each a pure transformation over an owned
//! [`Table`](crate::table::Table). The orchestrator composes them in fixed
//! order: normalize, prune, impute, validate.

pub mod impute;
pub mod normalize;
pub mod prune;
pub mod validate;
