//! Resume building: reducer-driven form state, styled templates, and the
//! draft persistence endpoints.

pub mod builder;
pub mod handlers;
pub mod template;
