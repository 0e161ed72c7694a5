//! Access to model-specific registers.

use core::arch::asm;

use crate::cpuid::{execute_cpuid, supports_cpuid};

/// Returns `true` if this processor implements the RDMSR and WRMSR
/// instructions.
pub fn supports_msr() -> bool {
    if !supports_cpuid() {
        return false;
    }

    // SAFETY:
    //
    // CPUID is implemented on this processor.
    let registers = unsafe { execute_cpuid(1, 0) };

    // CPUID.1:EDX bit 5 advertises MSR support.
    (registers.edx >> 5) & 1 == 1
}

/// Executes RDMSR for the model-specific register selected by
/// `register_index` and returns its 64-bit contents.
///
/// The selector is pointer-sized at this boundary and is passed through
/// unmasked; the instruction itself consumes only ECX. No validation is
/// performed on the index.
///
/// # Safety
///
/// The RDMSR instruction must be implemented on the executing processor (see
/// [`supports_msr`]), the calling context must execute at a privilege level
/// permitted to read MSRs, and `register_index` must select a register whose
/// read is defined on this processor. Violating any of these raises a
/// processor fault that this function does not catch.
pub unsafe fn execute_rdmsr(register_index: usize) -> u64 {
    debug_assert!(supports_msr());

    let low: u32;
    let high: u32;

    #[cfg(target_arch = "x86")]
    // SAFETY:
    //
    // The caller guarantees that this RDMSR execution is defined, and it
    // writes only EAX and EDX.
    unsafe {
        asm!(
            "rdmsr",
            in("ecx") register_index,
            lateout("eax") low,
            lateout("edx") high,
            options(nostack, nomem, preserves_flags)
        )
    }
    #[cfg(target_arch = "x86_64")]
    // SAFETY:
    //
    // The caller guarantees that this RDMSR execution is defined, and it
    // writes only EAX and EDX.
    unsafe {
        asm!(
            "rdmsr",
            in("rcx") register_index,
            lateout("eax") low,
            lateout("edx") high,
            options(nostack, nomem, preserves_flags)
        )
    }

    (u64::from(high) << 32) | u64::from(low)
}

#[cfg(test)]
mod test {
    use super::supports_msr;

    #[test]
    fn msr_is_advertised_on_test_hosts() {
        // Every 64-bit processor advertises MSR support; the probe itself
        // only executes CPUID and is safe at any privilege level.
        assert!(supports_msr());
    }
}
