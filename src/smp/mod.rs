//! SMP Module
//!
//! Modelo de máquina do crate: identidade de CPUs (simuladas ou reais,
//! a cargo do embedder), contexto de interrupção por CPU e variáveis
//! replicadas Per-CPU.

pub mod cpu;
pub mod percpu;
