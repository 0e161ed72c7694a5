//! Access to the CPUID instruction.

use core::arch::asm;

/// Output registers produced by one execution of the CPUID instruction.
///
/// All four fields are populated together from a single instruction execution;
/// a partially populated record cannot be observed.
#[derive(Clone, Copy, Debug, Hash, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct CpuidRegisters {
    /// Contents of EAX after the instruction retired.
    pub eax: u32,
    /// Contents of EBX after the instruction retired.
    pub ebx: u32,
    /// Contents of ECX after the instruction retired.
    pub ecx: u32,
    /// Contents of EDX after the instruction retired.
    pub edx: u32,
}

/// Returns `true` if this processor implements the CPUID instruction.
///
/// Probes by toggling the ID bit of EFLAGS, which only sticks when CPUID is
/// implemented.
pub fn supports_cpuid() -> bool {
    #[cfg(target_arch = "x86")]
    let toggled: u32;
    #[cfg(target_arch = "x86")]
    // SAFETY:
    //
    // Flipping the ID flag and reading it back has no effect beyond EFLAGS.
    unsafe {
        asm!(
            "pushfd",
            "pop {current}",
            "mov {saved}, {current}",
            "xor {current}, 0x200000",
            "push {current}",
            "popfd",
            "pushfd",
            "pop {current}",
            "xor {current}, {saved}",
            current = lateout(reg) toggled,
            saved = lateout(reg) _,
        )
    }

    #[cfg(target_arch = "x86_64")]
    let toggled: u64;
    #[cfg(target_arch = "x86_64")]
    // SAFETY:
    //
    // Flipping the ID flag and reading it back has no effect beyond RFLAGS.
    unsafe {
        asm!(
            "pushfq",
            "pop {current}",
            "mov {saved}, {current}",
            "xor {current}, 0x200000",
            "push {current}",
            "popfq",
            "pushfq",
            "pop {current}",
            "xor {current}, {saved}",
            current = lateout(reg) toggled,
            saved = lateout(reg) _,
        )
    }

    toggled & 0x20_0000 != 0
}

/// Executes CPUID with `leaf` in EAX and `subleaf` in ECX, returning all four
/// output registers exactly as the processor produced them.
///
/// Neither selector is validated. A leaf the processor does not implement
/// yields whatever output the processor defines for it (typically zeroed or
/// reserved values), which the caller must interpret. Leaves that ignore the
/// subleaf selector accept any value there; callers conventionally pass zero.
///
/// # Safety
///
/// The CPUID instruction must be implemented on the executing processor; see
/// [`supports_cpuid`].
pub unsafe fn execute_cpuid(leaf: u32, subleaf: u32) -> CpuidRegisters {
    debug_assert!(supports_cpuid());

    let eax: u32;
    let ebx: u32;
    let ecx: u32;
    let edx: u32;

    // EBX/RBX is reserved by LLVM, so the instruction's EBX output travels
    // through a scratch register.
    #[cfg(target_arch = "x86")]
    // SAFETY:
    //
    // CPUID is implemented on this processor and writes only the four output
    // registers.
    unsafe {
        asm!(
            "mov {scratch}, ebx",
            "cpuid",
            "xchg {scratch}, ebx",
            scratch = lateout(reg) ebx,
            inout("eax") leaf => eax,
            inout("ecx") subleaf => ecx,
            lateout("edx") edx,
            options(nostack, nomem, preserves_flags)
        )
    }
    #[cfg(target_arch = "x86_64")]
    // SAFETY:
    //
    // CPUID is implemented on this processor and writes only the four output
    // registers.
    unsafe {
        asm!(
            "mov {scratch:r}, rbx",
            "cpuid",
            "xchg {scratch:r}, rbx",
            scratch = lateout(reg) ebx,
            inout("eax") leaf => eax,
            inout("ecx") subleaf => ecx,
            lateout("edx") edx,
            options(nostack, nomem, preserves_flags)
        )
    }

    CpuidRegisters { eax, ebx, ecx, edx }
}

#[cfg(test)]
mod test {
    use super::{CpuidRegisters, execute_cpuid, supports_cpuid};

    #[test]
    fn cpuid_is_implemented_on_test_hosts() {
        assert!(supports_cpuid());
    }

    #[test]
    fn basic_leaf_reports_range_and_vendor() {
        // SAFETY:
        //
        // Every processor capable of running the test harness implements
        // CPUID.
        let registers = unsafe { execute_cpuid(0, 0) };

        // EAX holds the highest supported basic leaf, which has been at least
        // 1 on every processor since CPUID was introduced.
        assert!(registers.eax >= 1);

        // EBX/EDX/ECX encode the 12-byte vendor identification string.
        assert_ne!(registers.ebx, 0);
        assert_ne!(registers.edx, 0);
        assert_ne!(registers.ecx, 0);
    }

    #[test]
    fn identical_inputs_produce_identical_records() {
        // SAFETY:
        //
        // Every processor capable of running the test harness implements
        // CPUID.
        let first = unsafe { execute_cpuid(0, 0) };
        // SAFETY:
        //
        // Every processor capable of running the test harness implements
        // CPUID.
        let second = unsafe { execute_cpuid(0, 0) };

        // Leaf 0 output depends on no mutable processor state.
        assert_eq!(first, second);
    }

    #[test]
    fn unimplemented_leaf_still_yields_a_full_record() {
        // Leaves in the 0x4FFFxxxx range are not defined by any vendor, so
        // the processor returns defined-but-meaningless output rather than
        // faulting.
        //
        // SAFETY:
        //
        // Every processor capable of running the test harness implements
        // CPUID.
        let registers = unsafe { execute_cpuid(0x4FFF_FFFF, 0) };
        let _: CpuidRegisters = registers;
    }
}
