// =============================================================================
// LOGGING - ZERO OVERHEAD
// =============================================================================
//
// Sistema de logging do Cinder com custo ZERO em release.
//
// ARQUITETURA:
// Este sistema foi projetado para ser completamente removível em release:
// - Usa features do Cargo para compile-time filtering
// - Com feature "no_logs", TODOS os macros viram expressões vazias
// - SEM core::fmt - Apenas strings literais e valores hex
// - SEM alocação - Escreve direto no sink instalado
//
// NÍVEIS DE LOG (do mais crítico ao menos):
// - ERROR: Erros fatais ou críticos
// - WARN:  Situações suspeitas mas recuperáveis
// - INFO:  Fluxo normal de execução
// - DEBUG: Informações de debugging
// - TRACE: Detalhes extremos (cada operação)
//
// COMO USAR:
//   kinfo!("(SoftIRQ) Inicializando...");     // Apenas string
//   kinfo!("(SoftIRQ) Pending=", mask);       // String + hex
//   klog!("Classe=", nr, " CPU=", cpu);       // Múltiplos valores
//
// =============================================================================

// =============================================================================
// PREFIXOS COM CORES ANSI
// =============================================================================
//
// Cores ANSI para terminais que suportam (como o QEMU serial console).
// Cada prefixo inclui: código de cor + texto + reset de cor.
//

pub const P_ERROR: &str = "\x1b[1;31m[ERRO]\x1b[0m ";
pub const P_WARN: &str = "\x1b[1;33m[WARN]\x1b[0m ";
pub const P_INFO: &str = "\x1b[32m[INFO]\x1b[0m ";
pub const P_DEBUG: &str = "\x1b[36m[DEBG]\x1b[0m ";
pub const P_TRACE: &str = "\x1b[35m[TRAC]\x1b[0m ";

// =============================================================================
// MACROS DE LOG - NÍVEL ERROR
// =============================================================================
//
// kerror! - Sempre ativo (exceto com no_logs)
// Usado para erros de lógica interna detectados em runtime.
//

#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! kerror {
    // Apenas string literal
    ($msg:expr) => {{
        $crate::core::sink::emit_str($crate::core::logging::P_ERROR);
        $crate::core::sink::emit_str($msg);
        $crate::core::sink::emit_nl();
    }};
    // String + valor hex
    ($msg:expr, $val:expr) => {{
        $crate::core::sink::emit_str($crate::core::logging::P_ERROR);
        $crate::core::sink::emit_str($msg);
        $crate::core::sink::emit_hex($val as u64);
        $crate::core::sink::emit_nl();
    }};
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! kerror {
    ($($t:tt)*) => {{}};
}

// =============================================================================
// MACROS DE LOG - NÍVEL WARN
// =============================================================================
//
// kwarn! - Ativo exceto com no_logs
// Usado para situações suspeitas mas recuperáveis (ex: misuse de API).
//

#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! kwarn {
    ($msg:expr) => {{
        $crate::core::sink::emit_str($crate::core::logging::P_WARN);
        $crate::core::sink::emit_str($msg);
        $crate::core::sink::emit_nl();
    }};
    ($msg:expr, $val:expr) => {{
        $crate::core::sink::emit_str($crate::core::logging::P_WARN);
        $crate::core::sink::emit_str($msg);
        $crate::core::sink::emit_hex($val as u64);
        $crate::core::sink::emit_nl();
    }};
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! kwarn {
    ($($t:tt)*) => {{}};
}

// =============================================================================
// MACROS DE LOG - NÍVEL INFO
// =============================================================================
//
// kinfo! - Ativo com log_info, log_debug ou log_trace
// Usado para eventos importantes do fluxo normal.
//

#[cfg(any(feature = "log_info", feature = "log_debug", feature = "log_trace"))]
#[macro_export]
macro_rules! kinfo {
    ($msg:expr) => {{
        $crate::core::sink::emit_str($crate::core::logging::P_INFO);
        $crate::core::sink::emit_str($msg);
        $crate::core::sink::emit_nl();
    }};
    ($msg:expr, $val:expr) => {{
        $crate::core::sink::emit_str($crate::core::logging::P_INFO);
        $crate::core::sink::emit_str($msg);
        $crate::core::sink::emit_hex($val as u64);
        $crate::core::sink::emit_nl();
    }};
}

#[cfg(not(any(feature = "log_info", feature = "log_debug", feature = "log_trace")))]
#[macro_export]
macro_rules! kinfo {
    ($($t:tt)*) => {{}};
}

// =============================================================================
// MACROS DE LOG - NÍVEL DEBUG
// =============================================================================
//
// kdebug! - Ativo com log_debug ou log_trace
//

#[cfg(any(feature = "log_debug", feature = "log_trace"))]
#[macro_export]
macro_rules! kdebug {
    ($msg:expr) => {{
        $crate::core::sink::emit_str($crate::core::logging::P_DEBUG);
        $crate::core::sink::emit_str($msg);
        $crate::core::sink::emit_nl();
    }};
    ($msg:expr, $val:expr) => {{
        $crate::core::sink::emit_str($crate::core::logging::P_DEBUG);
        $crate::core::sink::emit_str($msg);
        $crate::core::sink::emit_hex($val as u64);
        $crate::core::sink::emit_nl();
    }};
}

#[cfg(not(any(feature = "log_debug", feature = "log_trace")))]
#[macro_export]
macro_rules! kdebug {
    ($($t:tt)*) => {{}};
}

// =============================================================================
// MACROS DE LOG - NÍVEL TRACE
// =============================================================================
//
// ktrace! - Ativo apenas com log_trace
// Usado para detalhes extremos de cada operação.
//

#[cfg(feature = "log_trace")]
#[macro_export]
macro_rules! ktrace {
    ($msg:expr) => {{
        $crate::core::sink::emit_str($crate::core::logging::P_TRACE);
        $crate::core::sink::emit_str($msg);
        $crate::core::sink::emit_nl();
    }};
    ($msg:expr, $val:expr) => {{
        $crate::core::sink::emit_str($crate::core::logging::P_TRACE);
        $crate::core::sink::emit_str($msg);
        $crate::core::sink::emit_hex($val as u64);
        $crate::core::sink::emit_nl();
    }};
}

#[cfg(not(feature = "log_trace"))]
#[macro_export]
macro_rules! ktrace {
    ($($t:tt)*) => {{}};
}

// =============================================================================
// MACROS AUXILIARES
// =============================================================================

/// klog! - Log genérico sem prefixo de nível.
///
/// Útil para construir logs complexos com múltiplos valores.
///
/// # Uso
/// ```ignore
/// klog!("Mask=", mask);                    // String + hex
/// klog!("Classe=", nr, " CPU=", cpu);      // Múltiplos
/// ```
#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! klog {
    // Apenas string
    ($msg:expr) => {{
        $crate::core::sink::emit_str($msg);
    }};
    // String + hex
    ($msg:expr, $val:expr) => {{
        $crate::core::sink::emit_str($msg);
        $crate::core::sink::emit_hex($val as u64);
    }};
    // String + hex + string
    ($msg1:expr, $val:expr, $msg2:expr) => {{
        $crate::core::sink::emit_str($msg1);
        $crate::core::sink::emit_hex($val as u64);
        $crate::core::sink::emit_str($msg2);
    }};
    // String + hex + string + hex
    ($msg1:expr, $val1:expr, $msg2:expr, $val2:expr) => {{
        $crate::core::sink::emit_str($msg1);
        $crate::core::sink::emit_hex($val1 as u64);
        $crate::core::sink::emit_str($msg2);
        $crate::core::sink::emit_hex($val2 as u64);
    }};
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! klog {
    ($($t:tt)*) => {{}};
}

/// knl! - Emite apenas newline.
#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! knl {
    () => {{
        $crate::core::sink::emit_nl();
    }};
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! knl {
    () => {{}};
}

// =============================================================================
// MACROS DE STATUS (OK/FAIL)
// =============================================================================

/// kok! - Log de sucesso (prefixo verde [OK]).
#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! kok {
    ($msg:expr) => {{
        $crate::core::sink::emit_str("\x1b[32m[OK]\x1b[0m ");
        $crate::core::sink::emit_str($msg);
        $crate::core::sink::emit_nl();
    }};
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! kok {
    ($($t:tt)*) => {{}};
}

/// kfail! - Log de falha (prefixo vermelho [FAIL]).
#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! kfail {
    ($msg:expr) => {{
        $crate::core::sink::emit_str("\x1b[1;31m[FAIL]\x1b[0m ");
        $crate::core::sink::emit_str($msg);
        $crate::core::sink::emit_nl();
    }};
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! kfail {
    ($($t:tt)*) => {{}};
}
