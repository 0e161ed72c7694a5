//! Access to fields of the current virtual-machine control structure.

use core::arch::asm;

use crate::cpuid::{execute_cpuid, supports_cpuid};

/// Returns `true` if this processor advertises VMX operation.
///
/// This probe reports instruction availability only; whether VMX operation is
/// enabled and a VMCS is current on this logical processor is a property of
/// the execution context, not of the processor.
pub fn supports_vmx() -> bool {
    if !supports_cpuid() {
        return false;
    }

    // SAFETY:
    //
    // CPUID is implemented on this processor.
    let registers = unsafe { execute_cpuid(1, 0) };

    // CPUID.1:ECX bit 5 advertises VMX support.
    (registers.ecx >> 5) & 1 == 1
}

/// Executes VMREAD for the VMCS field selected by `field_encoding` and
/// returns the low 32 bits of the read value.
///
/// The encoding is pointer-sized at this boundary and is passed through
/// unmasked. No validation is performed on it.
///
/// # Safety
///
/// The executing logical processor must be in VMX operation with a current
/// (active and loaded) VMCS, and `field_encoding` must select a readable
/// field of that structure. Otherwise the instruction's outcome is
/// processor-defined (an invalid-opcode fault outside VMX operation, or a
/// VMfail indication left in RFLAGS) and is not caught or translated by this
/// function.
#[expect(clippy::cast_possible_truncation)]
pub unsafe fn execute_vmread(field_encoding: usize) -> u32 {
    debug_assert!(supports_vmx());

    let value: usize;

    // SAFETY:
    //
    // The caller guarantees that a current VMCS exists and that this VMREAD
    // execution is defined; the instruction writes only the destination
    // register and the arithmetic flags.
    unsafe {
        asm!(
            "vmread {value}, {field}",
            field = in(reg) field_encoding,
            value = lateout(reg) value,
            options(nostack, nomem)
        )
    }

    value as u32
}

#[cfg(test)]
mod test {
    use super::supports_vmx;
    use crate::cpuid::{execute_cpuid, supports_cpuid};

    #[test]
    fn vmx_probe_matches_raw_feature_bit() {
        assert!(supports_cpuid());

        // SAFETY:
        //
        // Every processor capable of running the test harness implements
        // CPUID.
        let registers = unsafe { execute_cpuid(1, 0) };

        assert_eq!(supports_vmx(), (registers.ecx >> 5) & 1 == 1);
    }
}
