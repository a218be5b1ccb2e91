//! Arquivo: smp/cpu.rs
//!
//! Propósito: Identidade de CPU e rastreamento de contexto de interrupção.
//! O crate não enxerga hardware: quem decide "em qual CPU estou" é o
//! embedder, passando um `CpuId` explícito para cada operação local.
//!
//! Detalhes de Implementação:
//! - `CpuContext` guarda profundidades de hardirq e softirq em atômicos.
//! - "Estar em interrupção" = qualquer das duas profundidades > 0.
//! - As profundidades de uma CPU só são alteradas pelo contexto de execução
//!   dono daquela CPU (contrato do chamador).

//! Contexto de CPU

use core::sync::atomic::{AtomicU32, Ordering};

use crate::smp::percpu::{PerCpu, MAX_CPUS};

/// Identificador de uma CPU (`0..MAX_CPUS`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuId(usize);

impl CpuId {
    /// Cria um identificador de CPU.
    ///
    /// Índice inválido é bug de topologia do embedder; em release o acesso
    /// Per-CPU degrada para o slot 0 em vez de derrubar o sistema.
    pub const fn new(index: usize) -> Self {
        debug_assert!(index < MAX_CPUS);
        Self(index)
    }

    /// Índice numérico da CPU.
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Profundidades de contexto de uma CPU.
pub struct CpuContext {
    hardirq: AtomicU32,
    softirq: AtomicU32,
}

impl CpuContext {
    const fn new() -> Self {
        Self {
            hardirq: AtomicU32::new(0),
            softirq: AtomicU32::new(0),
        }
    }

    /// CPU está dentro de um handler de interrupção de hardware?
    #[inline]
    pub fn in_hardirq(&self) -> bool {
        self.hardirq.load(Ordering::Acquire) != 0
    }

    /// CPU está dentro do loop de dispatch de trabalho diferido?
    #[inline]
    pub fn in_softirq(&self) -> bool {
        self.softirq.load(Ordering::Acquire) != 0
    }

    /// CPU está em qualquer contexto de interrupção (hard ou soft)?
    #[inline]
    pub fn in_interrupt(&self) -> bool {
        self.in_hardirq() || self.in_softirq()
    }

    #[inline]
    pub(crate) fn hardirq_enter(&self) {
        self.hardirq.fetch_add(1, Ordering::AcqRel);
    }

    #[inline]
    pub(crate) fn hardirq_exit(&self) {
        let prev = self.hardirq.fetch_sub(1, Ordering::AcqRel);
        if prev == 0 {
            // Saída sem entrada correspondente: desfaz e avisa
            self.hardirq.fetch_add(1, Ordering::AcqRel);
            crate::kwarn!("(CPU) irq_exit sem irq_enter correspondente");
        }
    }

    #[inline]
    pub(crate) fn softirq_enter(&self) {
        self.softirq.fetch_add(1, Ordering::AcqRel);
    }

    #[inline]
    pub(crate) fn softirq_exit(&self) {
        self.softirq.fetch_sub(1, Ordering::AcqRel);
    }
}

// Contextos globais, um por CPU
static CONTEXTS: PerCpu<CpuContext> =
    PerCpu::from_array([const { CpuContext::new() }; MAX_CPUS]);

/// Acessa o contexto da CPU indicada.
pub fn cpu_context(cpu: CpuId) -> &'static CpuContext {
    CONTEXTS.get(cpu)
}
