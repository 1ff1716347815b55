//! Portfolio records exposed over HTTP: admin creation, public listings and
//! page contexts.

pub mod create;
pub mod handlers;
pub mod pages;
pub mod payload;
pub mod views;

