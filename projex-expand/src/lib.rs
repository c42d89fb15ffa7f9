//! Projection expansion.
//!
//! [`ProjectionExpander`] turns a tree containing projection marker calls
//! into one a translator can consume: each marker is replaced by the body of
//! the lambda its reference resolves to ([`resolve`]), with the lambda's
//! parameters rebound to the call-site arguments ([`rebind`]).

pub mod config;
pub mod expander;
pub mod rebind;
pub mod resolve;

pub use config::{ExpandConfig, DEFAULT_MAX_PROJECTION_DEPTH};
pub use expander::{expand, expand_with, ProjectionExpander};
pub use rebind::{rebind, ParameterRebinder, Substitution};
pub use resolve::{resolve, ProjectionRef};
