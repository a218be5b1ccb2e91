//! Arquivo: softirq/mod.rs
//!
//! Propósito: Despacho de trabalho diferido por classes (SoftIRQ).
//! Cada CPU tem uma máscara de classes pendentes; o loop de dispatch drena
//! as classes habilitadas em ordem crescente de índice, reexecutando passes
//! enquanto novo trabalho for levantado durante o próprio dispatch.
//!
//! Regras:
//! 1. O loop nunca roda dentro de interrupção de hardware (simulada).
//! 2. Re-entrada na mesma CPU é no-op — a profundidade softirq protege.
//! 3. Os bits pendentes reivindicados são limpos ANTES de qualquer handler
//!    rodar, permitindo que um handler re-levante a própria classe.
//! 4. Após MAX_SOFTIRQ_RESTART passes com trabalho ainda pendente, o resíduo
//!    fica na máscara e o wake handler da CPU é acionado — trabalho que se
//!    re-levanta continuamente passa a faminar o contexto de drain acordado,
//!    não o chamador do dispatch.

//! Classes de despacho diferido

use alloc::sync::Arc;
use core::mem;
use core::sync::atomic::{AtomicPtr, AtomicU32, Ordering};

use spin::{Mutex, RwLock};

use crate::core::stats::STATS;
use crate::smp::cpu::{cpu_context, CpuId};
use crate::smp::percpu::{PerCpu, MAX_CPUS};
use crate::sys::error::Errno;

/// Número de classes de despacho.
pub const NR_SOFTIRQS: usize = 32;

/// Classe reservada: tasklets de alta prioridade.
pub const HI_SOFTIRQ: u32 = 0;

/// Classe reservada: tasklets normais.
pub const TASKLET_SOFTIRQ: u32 = 1;

/// Primeira classe livre para o embedder.
pub const FIRST_FREE_SOFTIRQ: u32 = 2;

/// Máximo de passes do loop antes de entregar o resíduo ao drain.
pub const MAX_SOFTIRQ_RESTART: u32 = 10;

/// Handler de uma classe de despacho.
///
/// Roda fora de qualquer lock do dispatcher, mas ainda em contexto atômico:
/// NÃO PODE DORMIR. Dados opacos do handler vivem capturados no próprio Arc.
pub trait SoftirqAction: Send + Sync {
    fn run(&self, cpu: CpuId);
}

/// Hook de wake por CPU (a costura onde um kernel estacionaria a thread de
/// drain daquela CPU).
pub type WakeFn = fn(CpuId);

/// Estado de despacho de uma CPU.
struct SoftirqCpu {
    /// Classes levantadas e ainda não drenadas.
    pending: AtomicU32,
    /// Classes registradas (interseccionada com pending no dispatch).
    enabled: AtomicU32,
    /// Ponteiro de função `WakeFn` (null = sem hook).
    wake: AtomicPtr<()>,
}

impl SoftirqCpu {
    const fn new() -> Self {
        Self {
            pending: AtomicU32::new(0),
            enabled: AtomicU32::new(0),
            wake: AtomicPtr::new(core::ptr::null_mut()),
        }
    }
}

/// O dispatcher de trabalho diferido.
pub struct Softirq {
    /// Tabela de handlers, escrita uma vez por classe na inicialização.
    table: RwLock<[Option<Arc<dyn SoftirqAction>>; NR_SOFTIRQS]>,
    /// Estado por CPU.
    cpus: PerCpu<SoftirqCpu>,
    /// Serializa TODO raise/append vindo de outra CPU.
    /// Gargalo de escalabilidade conhecido, mantido por desenho.
    xraise: Mutex<()>,
}

impl Softirq {
    const fn new() -> Self {
        Self {
            table: RwLock::new([const { None }; NR_SOFTIRQS]),
            cpus: PerCpu::from_array([const { SoftirqCpu::new() }; MAX_CPUS]),
            xraise: Mutex::new(()),
        }
    }

    /// Registra o handler de uma classe.
    ///
    /// Process-wide, uma única vez por classe. Habilita a classe em todas
    /// as CPUs.
    pub fn open_softirq(&self, nr: u32, action: Arc<dyn SoftirqAction>) -> Result<(), Errno> {
        let idx = nr as usize;
        if idx >= NR_SOFTIRQS {
            return Err(Errno::EINVAL);
        }

        {
            let mut table = self.table.write();
            if table[idx].is_some() {
                return Err(Errno::EBUSY);
            }
            table[idx] = Some(action);
        }

        let bit = 1u32 << nr;
        for slot in self.cpus.iter() {
            slot.enabled.fetch_or(bit, Ordering::Release);
        }

        crate::kinfo!("(SoftIRQ) Classe registrada=", nr);
        Ok(())
    }

    /// Levanta uma classe na CPU local.
    ///
    /// Deve ser chamado pelo contexto de execução dono de `cpu`; de outra
    /// CPU use [`Softirq::raise_softirq_on`]. Se a CPU não está em contexto
    /// de interrupção (quem está vai drenar ao sair), aciona o wake handler.
    pub fn raise_softirq(&self, cpu: CpuId, nr: u32) {
        if nr as usize >= NR_SOFTIRQS {
            crate::kwarn!("(SoftIRQ) raise com classe inválida=", nr);
            return;
        }

        self.cpus
            .get(cpu)
            .pending
            .fetch_or(1u32 << nr, Ordering::AcqRel);
        STATS.inc_raises();
        crate::ktrace!("(SoftIRQ) raise classe=", nr);

        if !cpu_context(cpu).in_interrupt() {
            self.wake(cpu);
        }
    }

    /// Levanta uma classe em outra CPU.
    ///
    /// Serializado pelo lock global de raise. O contexto remoto é
    /// incognoscível daqui, então o wake é incondicional — um wake espúrio
    /// é inofensivo, um perdido estranda trabalho.
    pub fn raise_softirq_on(&self, cpu: CpuId, nr: u32) {
        if nr as usize >= NR_SOFTIRQS {
            crate::kwarn!("(SoftIRQ) raise remoto com classe inválida=", nr);
            return;
        }

        {
            let _guard = self.xraise.lock();
            self.cpus
                .get(cpu)
                .pending
                .fetch_or(1u32 << nr, Ordering::AcqRel);
        }
        STATS.inc_cross_cpu_raises();
        self.wake(cpu);
    }

    /// Lock global de mutação cross-CPU — também serializa o append de
    /// tasklets vindo de outra CPU.
    pub(crate) fn cross_lock(&self) -> spin::MutexGuard<'_, ()> {
        self.xraise.lock()
    }

    /// Máscara de classes pendentes da CPU.
    pub fn pending(&self, cpu: CpuId) -> u32 {
        self.cpus.get(cpu).pending.load(Ordering::Acquire)
    }

    /// Pendentes ∩ habilitadas — o que o dispatch realmente drenaria.
    pub fn runnable(&self, cpu: CpuId) -> u32 {
        let slot = self.cpus.get(cpu);
        slot.pending.load(Ordering::Acquire) & slot.enabled.load(Ordering::Acquire)
    }

    /// Instala o wake handler da CPU.
    pub fn set_wake_handler(&self, cpu: CpuId, f: WakeFn) {
        self.cpus.get(cpu).wake.store(f as *mut (), Ordering::Release);
    }

    fn wake(&self, cpu: CpuId) {
        let ptr = self.cpus.get(cpu).wake.load(Ordering::Acquire);
        if !ptr.is_null() {
            // SAFETY: só gravamos ponteiros vindos de `WakeFn` no slot
            let f: WakeFn = unsafe { mem::transmute(ptr) };
            f(cpu);
        }
    }

    /// Loop de dispatch da CPU.
    ///
    /// No-op se a CPU está em interrupção de hardware ou já dentro de um
    /// dispatch (re-entrada). Cada pass reivindica pendentes ∩ habilitadas,
    /// limpa esses bits e invoca os handlers em ordem crescente de classe.
    pub fn do_softirq(&self, cpu: CpuId) {
        let ctx = cpu_context(cpu);
        if ctx.in_interrupt() {
            return;
        }

        let slot = self.cpus.get(cpu);
        ctx.softirq_enter();

        let mut restart = MAX_SOFTIRQ_RESTART;
        loop {
            let mask = slot.enabled.load(Ordering::Acquire);
            // Reivindica e limpa antes de rodar qualquer handler
            let active = slot.pending.fetch_and(!mask, Ordering::AcqRel) & mask;
            if active == 0 {
                break;
            }

            STATS.inc_dispatch_passes();
            self.run_pass(cpu, active);

            restart -= 1;
            if restart == 0 {
                if self.runnable(cpu) != 0 {
                    STATS.inc_restart_overflows();
                    crate::kdebug!(
                        "(SoftIRQ) limite de restart atingido, cpu=",
                        cpu.index()
                    );
                    self.wake(cpu);
                }
                break;
            }
        }

        ctx.softirq_exit();
    }

    fn run_pass(&self, cpu: CpuId, mut active: u32) {
        while active != 0 {
            let nr = active.trailing_zeros();
            active &= !(1u32 << nr);

            // Clona o handler fora do lock: nada fica preso enquanto roda
            let action = self.table.read()[nr as usize].clone();
            match action {
                Some(action) => {
                    STATS.inc_handlers_run();
                    action.run(cpu);
                }
                // enabled só é setado junto com a tabela; chegar aqui é
                // inconsistência de estado interno
                None => crate::kerror!("(SoftIRQ) bit pendente sem handler, classe=", nr),
            }
        }
    }
}

// Dispatcher global
static SOFTIRQ_VECTORS: Softirq = Softirq::new();

/// Acessa o dispatcher global.
pub fn softirq_vectors() -> &'static Softirq {
    &SOFTIRQ_VECTORS
}

/// Marca a entrada em um handler de interrupção de hardware (simulada).
pub fn irq_enter(cpu: CpuId) {
    cpu_context(cpu).hardirq_enter();
}

/// Marca a saída de um handler de interrupção de hardware.
///
/// Ao desaninhar a última interrupção, drena o trabalho diferido pendente —
/// é este o ponto onde o trabalho levantado dentro do handler roda.
pub fn irq_exit(cpu: CpuId) {
    let ctx = cpu_context(cpu);
    ctx.hardirq_exit();

    let vectors = softirq_vectors();
    if !ctx.in_interrupt() && vectors.runnable(cpu) != 0 {
        vectors.do_softirq(cpu);
    }
}
