//! # Standard Error Codes (Errno)
//!
//! Define os códigos de erro retornados pelas operações de registro.
//! Baseado no padrão POSIX para compatibilidade com ferramentas existentes.
//!
//! Apenas as APIs de registro (handler de classe, slot de bottom half)
//! retornam erros. Misuse das primitivas de despacho segue a política do
//! kernel original: print de diagnóstico e continuação best-effort, nunca
//! um código de erro.

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Errno {
    ENOENT = 2,  // No such entry (slot vazio)
    EBUSY = 16,  // Resource busy (classe/slot já registrado)
    EINVAL = 22, // Invalid argument (índice fora do intervalo)
}

impl Errno {
    /// Nome estático do código, para o caminho de log sem core::fmt.
    pub fn name(self) -> &'static str {
        match self {
            Errno::ENOENT => "ENOENT",
            Errno::EBUSY => "EBUSY",
            Errno::EINVAL => "EINVAL",
        }
    }

    pub fn as_isize(self) -> isize {
        -(self as i32) as isize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errno_values_follow_posix() {
        assert_eq!(Errno::ENOENT as i32, 2);
        assert_eq!(Errno::EBUSY as i32, 16);
        assert_eq!(Errno::EINVAL as i32, 22);
    }

    #[test]
    fn test_errno_as_isize_is_negative() {
        assert_eq!(Errno::EINVAL.as_isize(), -22);
        assert_eq!(Errno::EBUSY.as_isize(), -16);
    }
}
