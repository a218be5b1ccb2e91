//! Cinder — Núcleo de Execução Diferida.
//!
//! Ponto central de exportação dos módulos do crate.
//! Implementa o despacho de trabalho diferido por-CPU (classes SoftIRQ),
//! tasklets (mini-tarefas atômicas one-shot) e o shim legado de bottom halves.
//!
//! O crate é freestanding (`no_std` + `alloc`): o "hardware" vira um modelo
//! explícito — interrupções desabilitadas viram atômicos/spinlocks, e a CPU
//! corrente vira um parâmetro `CpuId` passado pelo embedder.

#![cfg_attr(not(test), no_std)]

// Habilitar alocação dinâmica (necessário para Vec/Box/Arc)
extern crate alloc;

// --- Módulos de Baixo Nível (Modelo de Máquina) ---
pub mod smp; // CPUs simuladas, contexto de interrupção, variáveis Per-CPU

// --- Módulos Centrais (Lógica do Dispatcher) ---
pub mod core; // Logging, Sink, Estatísticas, Self-test
pub mod softirq; // Classes de despacho, máscaras pendentes, loop de dispatch
pub mod sys; // Definições de Sistema (Erros)
pub mod tasklet; // Trabalho diferido one-shot sobre as classes reservadas

// --- Compatibilidade ---
pub mod legacy; // Shim de bottom halves serializados

// Re-exportar os tipos de uso constante para acesso fácil no embedder
pub use crate::smp::cpu::CpuId;
pub use crate::sys::error::Errno;
