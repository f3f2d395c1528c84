//! Infrastructure layer: the resolution cache, the executor factory, and the
//! response validator.

pub mod executor;
pub mod resolver;
pub mod validator;
