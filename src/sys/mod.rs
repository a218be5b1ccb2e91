//! Definições de Sistema
//!
//! Códigos de erro retornados pelas APIs de registro do crate.

pub mod error;
