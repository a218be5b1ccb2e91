//! Arquivo: legacy.rs
//!
//! Propósito: Shim de compatibilidade com o modelo antigo de bottom halves.
//! Cada slot legado é um tasklet de alta prioridade que embrulha uma rotina
//! `fn()` sem argumentos; TODOS os bottom halves do sistema são serializados
//! por um único try-lock global.
//!
//! Detalhes de Implementação:
//! - Sob contenda do lock global o slot se re-marca e tenta no próximo pass
//!   de dispatch, em vez de esperar (o dispatch não pode dormir).
//! - Rodar um slot marcado cuja rotina foi removida é bug logado, não erro.

//! Bottom halves serializados (camada legada)

use alloc::sync::Arc;

use spin::{Mutex, RwLock};

use crate::smp::cpu::CpuId;
use crate::sys::error::Errno;
use crate::tasklet::{tasklet_hi_schedule, tasklet_init, tasklet_kill, Tasklet};

/// Número de slots legados.
pub const NR_BHS: usize = 32;

/// Rotina de um bottom half.
pub type BhFn = fn();

// Rotinas e tasklets dos slots. Ordem de aquisição: BH_BASE antes de
// BH_TASKS, sempre.
static BH_BASE: RwLock<[Option<BhFn>; NR_BHS]> = RwLock::new([None; NR_BHS]);
static BH_TASKS: RwLock<[Option<Arc<Tasklet>>; NR_BHS]> = RwLock::new([const { None }; NR_BHS]);

// No máximo um bottom half rodando no sistema inteiro
static GLOBAL_BH_LOCK: Mutex<()> = Mutex::new(());

/// Registra a rotina de um slot legado.
///
/// Inicializa o subsistema de tasklets se ainda não foi feito.
pub fn init_bh(nr: usize, routine: BhFn) -> Result<(), Errno> {
    if nr >= NR_BHS {
        return Err(Errno::EINVAL);
    }

    tasklet_init()?;

    let mut base = BH_BASE.write();
    if base[nr].is_some() {
        return Err(Errno::EBUSY);
    }
    base[nr] = Some(routine);
    BH_TASKS.write()[nr] = Some(Tasklet::new(bh_action, nr));

    crate::kinfo!("(BH) slot registrado=", nr);
    Ok(())
}

/// Remove a rotina de um slot legado.
///
/// Espera uma execução em andamento terminar e impede novas (via kill do
/// tasklet do slot) antes de liberar. As restrições de contexto de
/// `tasklet_kill` se aplicam.
pub fn remove_bh(nr: usize, cpu: CpuId) -> Result<(), Errno> {
    if nr >= NR_BHS {
        return Err(Errno::EINVAL);
    }

    let task = BH_TASKS.read()[nr].clone();
    let task = match task {
        Some(t) => t,
        None => return Err(Errno::ENOENT),
    };

    tasklet_kill(&task, cpu);

    let mut base = BH_BASE.write();
    base[nr] = None;
    BH_TASKS.write()[nr] = None;

    crate::kinfo!("(BH) slot removido=", nr);
    Ok(())
}

/// Marca um slot legado para execução na CPU indicada.
///
/// Nunca reporta erro: marcar um slot vazio rende um aviso e segue.
pub fn mark_bh(nr: usize, cpu: CpuId) {
    if nr >= NR_BHS {
        crate::kwarn!("(BH) mark com slot inválido=", nr);
        return;
    }

    let task = BH_TASKS.read()[nr].clone();
    match task {
        Some(t) => tasklet_hi_schedule(&t, cpu),
        None => crate::kwarn!("(BH) mark em slot vazio=", nr),
    }
}

// Corpo comum dos tasklets de slot: serializa e despacha para a rotina
fn bh_action(cpu: CpuId, nr: usize) {
    let guard = GLOBAL_BH_LOCK.try_lock();
    let _guard = match guard {
        Some(g) => g,
        None => {
            // Outro bottom half rodando em algum lugar: devolve para a
            // fila e tenta no próximo pass
            mark_bh(nr, cpu);
            return;
        }
    };

    let routine = BH_BASE.read()[nr];
    match routine {
        Some(f) => f(),
        None => crate::kerror!("(BH) slot removido ainda marcado=", nr),
    }
}
