//! Core Module
//!
//! Contém a infraestrutura transversal do crate: saída de log,
//! contadores estatísticos e o runner de self-test freestanding.

pub mod logging;
pub mod sink;
pub mod stats;

#[cfg(feature = "self_test")]
pub mod selftest;
