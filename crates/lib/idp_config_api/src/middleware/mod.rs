//! Request middleware.

pub mod author;
