#![forbid(unsafe_code)]

pub mod json;
pub mod questions;
pub mod repository;
pub mod sqlite;
