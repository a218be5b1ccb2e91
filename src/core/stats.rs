//! Arquivo: core/stats.rs
//!
//! Propósito: Contadores estatísticos globais do dispatcher.
//! Usado para monitoramento de performance e diagnóstico de comportamento.
//!
//! Detalhes de Implementação:
//! - Usa atômicos (AtomicU64) para permitir atualizações concorrentes sem locks (baixo overhead).
//! - Contadores monotônicos crescentes.

use core::sync::atomic::{AtomicU64, Ordering};

pub struct DeferStats {
    pub raises: AtomicU64,
    pub cross_cpu_raises: AtomicU64,
    pub dispatch_passes: AtomicU64,
    pub handlers_run: AtomicU64,
    pub restart_overflows: AtomicU64,
    pub tasklets_run: AtomicU64,
    pub tasklets_deferred: AtomicU64,
}

impl DeferStats {
    const fn new() -> Self {
        Self {
            raises: AtomicU64::new(0),
            cross_cpu_raises: AtomicU64::new(0),
            dispatch_passes: AtomicU64::new(0),
            handlers_run: AtomicU64::new(0),
            restart_overflows: AtomicU64::new(0),
            tasklets_run: AtomicU64::new(0),
            tasklets_deferred: AtomicU64::new(0),
        }
    }

    /// Incrementa contador de raises locais
    #[inline]
    pub fn inc_raises(&self) {
        self.raises.fetch_add(1, Ordering::Relaxed);
    }

    /// Incrementa contador de raises cross-CPU
    #[inline]
    pub fn inc_cross_cpu_raises(&self) {
        self.cross_cpu_raises.fetch_add(1, Ordering::Relaxed);
    }

    /// Incrementa contador de passes do loop de dispatch
    #[inline]
    pub fn inc_dispatch_passes(&self) {
        self.dispatch_passes.fetch_add(1, Ordering::Relaxed);
    }

    /// Incrementa contador de handlers executados
    #[inline]
    pub fn inc_handlers_run(&self) {
        self.handlers_run.fetch_add(1, Ordering::Relaxed);
    }

    /// Incrementa contador de estouros do limite de restart
    #[inline]
    pub fn inc_restart_overflows(&self) {
        self.restart_overflows.fetch_add(1, Ordering::Relaxed);
    }

    /// Incrementa contador de tasklets executados
    #[inline]
    pub fn inc_tasklets_run(&self) {
        self.tasklets_run.fetch_add(1, Ordering::Relaxed);
    }

    /// Incrementa contador de tasklets re-enfileirados (lock/disable)
    #[inline]
    pub fn inc_tasklets_deferred(&self) {
        self.tasklets_deferred.fetch_add(1, Ordering::Relaxed);
    }

    /// Imprime estatísticas no log
    pub fn dump(&self) {
        crate::kinfo!("--- Estatísticas do Dispatcher ---");
        crate::kinfo!("Raises locais:    ", self.raises.load(Ordering::Relaxed));
        crate::kinfo!(
            "Raises cross-CPU: ",
            self.cross_cpu_raises.load(Ordering::Relaxed)
        );
        crate::kinfo!(
            "Passes dispatch:  ",
            self.dispatch_passes.load(Ordering::Relaxed)
        );
        crate::kinfo!(
            "Handlers rodados: ",
            self.handlers_run.load(Ordering::Relaxed)
        );
        crate::kinfo!(
            "Estouros restart: ",
            self.restart_overflows.load(Ordering::Relaxed)
        );
        crate::kinfo!(
            "Tasklets rodados: ",
            self.tasklets_run.load(Ordering::Relaxed)
        );
        crate::kinfo!(
            "Tasklets adiados: ",
            self.tasklets_deferred.load(Ordering::Relaxed)
        );
    }
}

/// Instância global de estatísticas
pub static STATS: DeferStats = DeferStats::new();
