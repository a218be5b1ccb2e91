//! Arquivo: smp/percpu.rs
//!
//! Propósito: Gerenciamento de variáveis Por-CPU (Per-CPU variables).
//! Permite definir dados que possuem uma instância separada para cada núcleo,
//! evitando contenda de locks (cache contention) e melhorando escalabilidade.
//!
//! Detalhes de Implementação:
//! - Abordagem baseada em Array: `PerCpu<T>` mantém um array `[T; MAX_CPUS]`.
//! - O acesso é indexado por `CpuId` explícito — não existe camada de
//!   arquitetura para perguntar qual é a CPU corrente.
//! - Os payloads replicados aqui são todos `Sync` (atômicos, spinlocks),
//!   então referências compartilhadas seguras bastam.

//! Variáveis Per-CPU

use crate::smp::cpu::CpuId;

/// Número máximo de CPUs suportadas.
/// TODO: Tornar configurável via cfg
pub const MAX_CPUS: usize = 32;

/// Wrapper para dados que são replicados por CPU.
///
/// # Exemplo
///
/// ```ignore
/// static COUNTERS: PerCpu<AtomicU32> =
///     PerCpu::from_array([const { AtomicU32::new(0) }; MAX_CPUS]);
///
/// fn inc(cpu: CpuId) {
///     COUNTERS.get(cpu).fetch_add(1, Ordering::Relaxed);
/// }
/// ```
pub struct PerCpu<T> {
    data: [T; MAX_CPUS],
}

impl<T> PerCpu<T> {
    /// Cria uma nova variável PerCpu a partir de um array de slots.
    pub const fn from_array(data: [T; MAX_CPUS]) -> Self {
        Self { data }
    }

    /// Obtém uma referência para o slot da CPU indicada.
    ///
    /// Índice fora do intervalo cai no slot do core 0 — erro catastrófico
    /// de topologia não deve derrubar o caminho crítico.
    pub fn get(&self, cpu: CpuId) -> &T {
        let id = cpu.index();
        if id >= MAX_CPUS {
            &self.data[0]
        } else {
            &self.data[id]
        }
    }

    /// Itera sobre todos os slots (útil para inicialização/estatísticas).
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }
}
