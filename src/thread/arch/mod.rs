//! Architecture-specific context-switch primitives (§6 host collaborators).
//! The rest of the runtime only ever calls through this module's functions
//! — nothing outside `arch` knows a calling convention or a register name.

#[cfg(target_arch = "x86_64")]
mod x86_64;

#[cfg(target_arch = "x86_64")]
pub(crate) use self::x86_64::{reset_stack_top, seed_stack, switch, switch_initial};
