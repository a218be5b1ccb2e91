//! Framework de self-test freestanding
//!
//! Permite a um embedder sem `std` validar o dispatcher in-situ: os casos
//! rodam single-CPU, em CPUs dedicadas, e reportam pelo sink de log.

use core::sync::atomic::{AtomicUsize, Ordering};

use alloc::sync::Arc;

use crate::smp::cpu::CpuId;
use crate::softirq::{softirq_vectors, SoftirqAction};
use crate::tasklet::{tasklet_init, tasklet_kill, tasklet_schedule, Tasklet};

/// Resultado de teste
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TestResult {
    Passed,
    Failed,
    Skipped,
}

/// Um caso de teste
pub struct TestCase {
    pub name: &'static str,
    pub func: fn() -> TestResult,
}

impl TestCase {
    pub const fn new(name: &'static str, func: fn() -> TestResult) -> Self {
        Self { name, func }
    }
}

/// Executa suite de testes
pub fn run_test_suite(name: &str, tests: &[TestCase]) -> (usize, usize, usize) {
    crate::klog!("=== Executando suite: ");
    crate::core::sink::emit_str(name);
    crate::knl!();

    let mut passed = 0;
    let mut failed = 0;
    let mut skipped = 0;

    for test in tests {
        let result = (test.func)();
        match result {
            TestResult::Passed => {
                crate::kok!(test.name);
                passed += 1;
            }
            TestResult::Failed => {
                crate::kfail!(test.name);
                failed += 1;
            }
            TestResult::Skipped => {
                crate::kwarn!(test.name);
                skipped += 1;
            }
        }
    }

    crate::klog!("Resultados: passed=");
    crate::core::sink::emit_dec(passed);
    crate::klog!(" failed=");
    crate::core::sink::emit_dec(failed);
    crate::knl!();
    (passed, failed, skipped)
}

// =============================================================================
// SUITE EMBUTIDA — propriedades observáveis do dispatcher (single-CPU)
// =============================================================================
//
// Os casos são idempotentes (asserções por delta) e usam CPUs 26..=29,
// reservadas para o self-test.

const SELFTEST_CASES: &[TestCase] = &[
    TestCase::new("softirq_dispatch_runs_raised_class", st_dispatch_runs_class),
    TestCase::new("tasklet_double_schedule_runs_once", st_double_schedule),
    TestCase::new("tasklet_disabled_is_deferred", st_disabled_deferred),
    TestCase::new("tasklet_kill_clears_schedule", st_kill_clears),
];

/// Roda a suite embutida. Retorna (passed, failed, skipped).
pub fn run_selftests() -> (usize, usize, usize) {
    let totals = run_test_suite("Cinder", SELFTEST_CASES);
    crate::core::stats::STATS.dump();
    totals
}

static ST_CLASS_HITS: AtomicUsize = AtomicUsize::new(0);

struct StCountAction;

impl SoftirqAction for StCountAction {
    fn run(&self, _cpu: CpuId) {
        ST_CLASS_HITS.fetch_add(1, Ordering::SeqCst);
    }
}

fn st_dispatch_runs_class() -> TestResult {
    const ST_CLASS: u32 = 26;
    let cpu = CpuId::new(26);

    // EBUSY em re-execução da suite é esperado: a classe já está aberta
    let _ = softirq_vectors().open_softirq(ST_CLASS, Arc::new(StCountAction));

    let before = ST_CLASS_HITS.load(Ordering::SeqCst);
    softirq_vectors().raise_softirq(cpu, ST_CLASS);
    softirq_vectors().do_softirq(cpu);

    if ST_CLASS_HITS.load(Ordering::SeqCst) == before + 1 {
        TestResult::Passed
    } else {
        TestResult::Failed
    }
}

static ST_TASKLET_HITS: AtomicUsize = AtomicUsize::new(0);

fn st_hit(_cpu: CpuId, _data: usize) {
    ST_TASKLET_HITS.fetch_add(1, Ordering::SeqCst);
}

fn st_double_schedule() -> TestResult {
    if tasklet_init().is_err() {
        return TestResult::Skipped;
    }
    let cpu = CpuId::new(27);
    let t = Tasklet::new(st_hit, 0);

    let before = ST_TASKLET_HITS.load(Ordering::SeqCst);
    tasklet_schedule(&t, cpu);
    tasklet_schedule(&t, cpu);
    softirq_vectors().do_softirq(cpu);

    if ST_TASKLET_HITS.load(Ordering::SeqCst) == before + 1 {
        TestResult::Passed
    } else {
        TestResult::Failed
    }
}

fn st_disabled_deferred() -> TestResult {
    if tasklet_init().is_err() {
        return TestResult::Skipped;
    }
    let cpu = CpuId::new(28);
    let t = Tasklet::new_disabled(st_hit, 0);

    let before = ST_TASKLET_HITS.load(Ordering::SeqCst);
    tasklet_schedule(&t, cpu);
    softirq_vectors().do_softirq(cpu);

    // Desabilitado: nunca invocado, segue agendado
    if ST_TASKLET_HITS.load(Ordering::SeqCst) != before || !t.is_scheduled() {
        return TestResult::Failed;
    }

    t.enable();
    softirq_vectors().do_softirq(cpu);

    if ST_TASKLET_HITS.load(Ordering::SeqCst) == before + 1 && !t.is_scheduled() {
        TestResult::Passed
    } else {
        TestResult::Failed
    }
}

fn st_kill_clears() -> TestResult {
    if tasklet_init().is_err() {
        return TestResult::Skipped;
    }
    let cpu = CpuId::new(29);
    let t = Tasklet::new(st_hit, 0);

    tasklet_kill(&t, cpu);
    if t.is_scheduled() {
        return TestResult::Failed;
    }

    let before = ST_TASKLET_HITS.load(Ordering::SeqCst);
    tasklet_schedule(&t, cpu);
    softirq_vectors().do_softirq(cpu);

    if ST_TASKLET_HITS.load(Ordering::SeqCst) == before + 1 {
        TestResult::Passed
    } else {
        TestResult::Failed
    }
}
