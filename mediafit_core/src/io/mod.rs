//! Module for reading and writing Models and experimental media tables
pub mod json;
pub mod media_table;
