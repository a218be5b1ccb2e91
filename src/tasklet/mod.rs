//! Arquivo: tasklet/mod.rs
//!
//! Propósito: Implementação de Tasklets (Mini-tarefas atômicas one-shot).
//! Tasklets rodam em contexto atômico (dispatch de SoftIRQ) e NÃO PODEM
//! DORMIR. São usados para processamento diferido de alta prioridade e
//! baixa latência (ex: processamento de pacotes de rede).
//!
//! Regras:
//! 1. Tasklets são serializados (o mesmo item não roda em 2 CPUs ao mesmo tempo).
//! 2. Tasklets rodam na CPU que os agendou (cache locality); agendar de outra
//!    CPU exige a variante `_on`, serializada pelo lock global de raise.
//! 3. Tasklets de alta prioridade (classe HI) rodam antes dos normais dentro
//!    de um mesmo pass de dispatch.
//! 4. Dentro de uma classe a ordem de execução é reversa à de agendamento
//!    (inserção e drenagem pelo topo da fila).

//! Tasklets (execução atômica diferida)

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::mem;
use core::sync::atomic::{AtomicU32, Ordering};

use spin::{Mutex, Once};

use crate::core::stats::STATS;
use crate::smp::cpu::{cpu_context, CpuId};
use crate::smp::percpu::{PerCpu, MAX_CPUS};
use crate::softirq::{softirq_vectors, SoftirqAction, HI_SOFTIRQ, TASKLET_SOFTIRQ};
use crate::sys::error::Errno;

// Estados do Tasklet
const TASKLET_STATE_SCHED: u32 = 1 << 0; // Agendado para execução
const TASKLET_STATE_RUN: u32 = 1 << 1; // Executando no momento

/// Callback de um tasklet: recebe a CPU onde está rodando e a palavra de
/// dados opaca do item.
pub type TaskletFn = fn(CpuId, usize);

/// Estrutura de Tasklet
pub struct Tasklet {
    state: AtomicU32,
    count: AtomicU32,
    func: TaskletFn,
    data: usize,
}

impl Tasklet {
    /// Cria um tasklet habilitado.
    pub fn new(func: TaskletFn, data: usize) -> Arc<Self> {
        Arc::new(Self {
            state: AtomicU32::new(0),
            count: AtomicU32::new(0),
            func,
            data,
        })
    }

    /// Cria um tasklet desabilitado (use-count = 1).
    ///
    /// Precisa de um `enable` antes de executar; agendamentos feitos
    /// enquanto desabilitado ficam re-enfileirando até lá.
    pub fn new_disabled(func: TaskletFn, data: usize) -> Arc<Self> {
        Arc::new(Self {
            state: AtomicU32::new(0),
            count: AtomicU32::new(1),
            func,
            data,
        })
    }

    /// Item está agendado (presente em alguma fila por-CPU)?
    #[inline]
    pub fn is_scheduled(&self) -> bool {
        self.state.load(Ordering::Acquire) & TASKLET_STATE_SCHED != 0
    }

    /// Callback do item está executando agora em alguma CPU?
    #[inline]
    pub fn is_running(&self) -> bool {
        self.state.load(Ordering::Acquire) & TASKLET_STATE_RUN != 0
    }

    /// Incrementa o use-count sem esperar execução em andamento.
    pub fn disable_nosync(&self) {
        self.count.fetch_add(1, Ordering::AcqRel);
    }

    /// Desabilita o tasklet e espera o callback em andamento terminar.
    pub fn disable(&self) {
        self.disable_nosync();
        self.unlock_wait();
    }

    /// Decrementa o use-count; em zero o item volta a ser executável.
    pub fn enable(&self) {
        self.count.fetch_sub(1, Ordering::AcqRel);
    }

    /// Espera (busy-wait) o lock de execução ser liberado.
    pub fn unlock_wait(&self) {
        while self.is_running() {
            core::hint::spin_loop();
        }
    }

    // Lock de execução: garante no máximo uma CPU rodando o callback
    fn trylock(&self) -> bool {
        self.state.fetch_or(TASKLET_STATE_RUN, Ordering::AcqRel) & TASKLET_STATE_RUN == 0
    }

    fn unlock(&self) {
        self.state.fetch_and(!TASKLET_STATE_RUN, Ordering::Release);
    }
}

// Filas por-CPU: normal e alta prioridade.
// O spinlock da fila substitui o "desabilitar interrupções locais" do
// desenho original.
static TASKLET_VEC: PerCpu<Mutex<Vec<Arc<Tasklet>>>> =
    PerCpu::from_array([const { Mutex::new(Vec::new()) }; MAX_CPUS]);

static TASKLET_HI_VEC: PerCpu<Mutex<Vec<Arc<Tasklet>>>> =
    PerCpu::from_array([const { Mutex::new(Vec::new()) }; MAX_CPUS]);

/// Agenda o tasklet na fila normal da CPU local.
///
/// Idempotente: agendar um item já agendado não cria segunda entrada.
pub fn tasklet_schedule(t: &Arc<Tasklet>, cpu: CpuId) {
    schedule_local(t, cpu, &TASKLET_VEC, TASKLET_SOFTIRQ);
}

/// Agenda o tasklet na fila de alta prioridade da CPU local.
pub fn tasklet_hi_schedule(t: &Arc<Tasklet>, cpu: CpuId) {
    schedule_local(t, cpu, &TASKLET_HI_VEC, HI_SOFTIRQ);
}

/// Agenda o tasklet na fila normal de OUTRA CPU.
pub fn tasklet_schedule_on(t: &Arc<Tasklet>, cpu: CpuId) {
    schedule_remote(t, cpu, &TASKLET_VEC, TASKLET_SOFTIRQ);
}

/// Agenda o tasklet na fila de alta prioridade de OUTRA CPU.
pub fn tasklet_hi_schedule_on(t: &Arc<Tasklet>, cpu: CpuId) {
    schedule_remote(t, cpu, &TASKLET_HI_VEC, HI_SOFTIRQ);
}

fn schedule_local(t: &Arc<Tasklet>, cpu: CpuId, vec: &PerCpu<Mutex<Vec<Arc<Tasklet>>>>, nr: u32) {
    // Bit SCHED é o guarda de entrada única nas filas
    if t.state.fetch_or(TASKLET_STATE_SCHED, Ordering::AcqRel) & TASKLET_STATE_SCHED != 0 {
        return;
    }

    vec.get(cpu).lock().push(t.clone());
    softirq_vectors().raise_softirq(cpu, nr);
}

fn schedule_remote(t: &Arc<Tasklet>, cpu: CpuId, vec: &PerCpu<Mutex<Vec<Arc<Tasklet>>>>, nr: u32) {
    if t.state.fetch_or(TASKLET_STATE_SCHED, Ordering::AcqRel) & TASKLET_STATE_SCHED != 0 {
        return;
    }

    {
        let _guard = softirq_vectors().cross_lock();
        vec.get(cpu).lock().push(t.clone());
    }
    softirq_vectors().raise_softirq_on(cpu, nr);
}

/// Espera o tasklet terminar e impede novos agendamentos até retornar.
///
/// NÃO pode ser chamado de contexto de interrupção — a espera é um
/// busy-wait que depende de outra CPU drenar a fila. Misuse rende um
/// diagnóstico e continuação best-effort, não um erro.
pub fn tasklet_kill(t: &Arc<Tasklet>, cpu: CpuId) {
    if cpu_context(cpu).in_interrupt() {
        crate::kwarn!("(Tasklet) kill chamado em contexto de interrupção");
    }

    // Ocupa o bit SCHED para bloquear reagendamento; se já estava agendado,
    // espera o dono drenar antes de tentar de novo.
    while t.state.fetch_or(TASKLET_STATE_SCHED, Ordering::Acquire) & TASKLET_STATE_SCHED != 0 {
        while t.is_scheduled() {
            core::hint::spin_loop();
        }
    }

    t.unlock_wait();
    t.state.fetch_and(!TASKLET_STATE_SCHED, Ordering::Release);
}

// Ação de drenagem de uma fila (registrada nas duas classes reservadas)
struct TaskletAction {
    hi: bool,
}

impl SoftirqAction for TaskletAction {
    fn run(&self, cpu: CpuId) {
        if self.hi {
            drain(&TASKLET_HI_VEC, HI_SOFTIRQ, cpu);
        } else {
            drain(&TASKLET_VEC, TASKLET_SOFTIRQ, cpu);
        }
    }
}

fn drain(vec: &PerCpu<Mutex<Vec<Arc<Tasklet>>>>, nr: u32, cpu: CpuId) {
    // Destaca a fila inteira, encurtando a janela do lock
    let mut list = {
        let mut queue = vec.get(cpu).lock();
        mem::take(&mut *queue)
    };

    while let Some(t) = list.pop() {
        if t.trylock() {
            if t.count.load(Ordering::Acquire) == 0 {
                // Limpa SCHED antes do callback: o próprio callback pode
                // reagendar o item
                if t.state.fetch_and(!TASKLET_STATE_SCHED, Ordering::AcqRel) & TASKLET_STATE_SCHED
                    == 0
                {
                    crate::kerror!("(Tasklet) SCHED ausente ao executar");
                }
                STATS.inc_tasklets_run();
                (t.func)(cpu, t.data);
                t.unlock();
                continue;
            }
            t.unlock();
        }

        // Rodando em outra CPU ou desabilitado: devolve à fila e re-levanta
        // a classe — nunca descarta
        STATS.inc_tasklets_deferred();
        vec.get(cpu).lock().push(t);
        softirq_vectors().raise_softirq(cpu, nr);
    }
}

static TASKLET_INIT: Once = Once::new();

/// Inicializa o subsistema: registra as ações de drenagem nas duas classes
/// reservadas. Idempotente — chamadas repetidas são no-op.
pub fn tasklet_init() -> Result<(), Errno> {
    let mut result = Ok(());
    let mut first = false;

    TASKLET_INIT.call_once(|| {
        first = true;
        result = (|| {
            softirq_vectors().open_softirq(HI_SOFTIRQ, Arc::new(TaskletAction { hi: true }))?;
            softirq_vectors().open_softirq(TASKLET_SOFTIRQ, Arc::new(TaskletAction { hi: false }))?;
            crate::kok!("(Tasklet) subsistema inicializado");
            Ok(())
        })();
    });

    if !first {
        crate::ktrace!("(Tasklet) init repetido (no-op)");
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::AtomicUsize;

    static DOUBLE_HITS: AtomicUsize = AtomicUsize::new(0);

    fn count_double(_cpu: CpuId, _data: usize) {
        DOUBLE_HITS.fetch_add(1, Ordering::SeqCst);
    }

    #[test]
    fn test_double_schedule_runs_once() {
        tasklet_init().unwrap();
        let cpu = CpuId::new(15);
        let t = Tasklet::new(count_double, 0);

        tasklet_schedule(&t, cpu);
        tasklet_schedule(&t, cpu);
        assert!(t.is_scheduled());

        softirq_vectors().do_softirq(cpu);
        assert_eq!(DOUBLE_HITS.load(Ordering::SeqCst), 1);
        assert!(!t.is_scheduled());
    }

    static DISABLED_HITS: AtomicUsize = AtomicUsize::new(0);

    fn count_disabled(_cpu: CpuId, _data: usize) {
        DISABLED_HITS.fetch_add(1, Ordering::SeqCst);
    }

    #[test]
    fn test_disabled_tasklet_is_requeued_not_run() {
        tasklet_init().unwrap();
        let cpu = CpuId::new(16);
        let t = Tasklet::new_disabled(count_disabled, 0);

        tasklet_schedule(&t, cpu);
        softirq_vectors().do_softirq(cpu);

        // Nunca invocado, continua agendado à espera do enable
        assert_eq!(DISABLED_HITS.load(Ordering::SeqCst), 0);
        assert!(t.is_scheduled());

        t.enable();
        softirq_vectors().do_softirq(cpu);
        assert_eq!(DISABLED_HITS.load(Ordering::SeqCst), 1);
        assert!(!t.is_scheduled());
    }

    static LIFO_ORDER: Mutex<Vec<usize>> = Mutex::new(Vec::new());

    fn record_order(_cpu: CpuId, data: usize) {
        LIFO_ORDER.lock().push(data);
    }

    #[test]
    fn test_same_class_runs_in_reverse_schedule_order() {
        tasklet_init().unwrap();
        let cpu = CpuId::new(17);
        let first = Tasklet::new(record_order, 1);
        let second = Tasklet::new(record_order, 2);

        tasklet_schedule(&first, cpu);
        tasklet_schedule(&second, cpu);
        softirq_vectors().do_softirq(cpu);

        assert_eq!(*LIFO_ORDER.lock(), vec![2, 1]);
    }

    static PAUSED_HITS: AtomicUsize = AtomicUsize::new(0);

    fn count_paused(_cpu: CpuId, _data: usize) {
        PAUSED_HITS.fetch_add(1, Ordering::SeqCst);
    }

    #[test]
    fn test_disable_enable_cycle() {
        tasklet_init().unwrap();
        let cpu = CpuId::new(24);
        let t = Tasklet::new(count_paused, 0);

        t.disable();
        tasklet_schedule(&t, cpu);
        softirq_vectors().do_softirq(cpu);
        assert_eq!(PAUSED_HITS.load(Ordering::SeqCst), 0);

        // Dois disables exigem dois enables
        t.disable_nosync();
        t.enable();
        softirq_vectors().do_softirq(cpu);
        assert_eq!(PAUSED_HITS.load(Ordering::SeqCst), 0);

        t.enable();
        softirq_vectors().do_softirq(cpu);
        assert_eq!(PAUSED_HITS.load(Ordering::SeqCst), 1);
    }

    static KILL_HITS: AtomicUsize = AtomicUsize::new(0);

    fn count_kill(_cpu: CpuId, _data: usize) {
        KILL_HITS.fetch_add(1, Ordering::SeqCst);
    }

    #[test]
    fn test_kill_then_reschedule_lifecycle() {
        tasklet_init().unwrap();
        let cpu = CpuId::new(18);
        let t = Tasklet::new(count_kill, 0);

        // Kill de item nunca agendado retorna limpo
        tasklet_kill(&t, cpu);
        assert!(!t.is_scheduled());

        // O item continua utilizável depois do kill
        tasklet_schedule(&t, cpu);
        softirq_vectors().do_softirq(cpu);
        assert_eq!(KILL_HITS.load(Ordering::SeqCst), 1);
    }
}
