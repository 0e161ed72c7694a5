//! Implementations of the individual reports.

use anyhow::{Result, ensure};
use pal::{
    cpuid::{CpuidRegisters, execute_cpuid, supports_cpuid},
    msr::{execute_rdmsr, supports_msr},
    vmcs::supports_vmx,
};

/// Prints the processor vendor identification string and the highest
/// supported basic leaf.
///
/// # Errors
///
/// Returns an error if the processor does not implement CPUID.
pub fn vendor() -> Result<()> {
    let registers = basic_leaf()?;

    let vendor = vendor_string(registers);
    println!("vendor: {}", String::from_utf8_lossy(&vendor));
    println!("highest basic leaf: {:#010X}", registers.eax);

    Ok(())
}

/// Prints the four output registers for the given (leaf, subleaf) pair.
///
/// # Errors
///
/// Returns an error if the processor does not implement CPUID.
pub fn leaf(leaf: u32, subleaf: u32) -> Result<()> {
    ensure!(supports_cpuid(), "this processor does not implement CPUID");

    // SAFETY:
    //
    // CPUID is implemented on this processor.
    let registers = unsafe { execute_cpuid(leaf, subleaf) };

    println!("leaf {leaf:#010X} subleaf {subleaf:#010X}");
    println!("  eax: {:#010X}", registers.eax);
    println!("  ebx: {:#010X}", registers.ebx);
    println!("  ecx: {:#010X}", registers.ecx);
    println!("  edx: {:#010X}", registers.edx);

    Ok(())
}

/// Prints whether CPUID, MSR access, and VMX operation are advertised.
///
/// # Errors
///
/// This report cannot fail; missing support is part of its output.
pub fn virtualization() -> Result<()> {
    println!("cpuid: {}", advertised(supports_cpuid()));
    println!("msr:   {}", advertised(supports_msr()));
    println!("vmx:   {}", advertised(supports_vmx()));

    Ok(())
}

/// Reads the model-specific register selected by `register_index` and prints
/// its contents.
///
/// Reading an MSR is only defined in a ring-0 execution context; at lower
/// privilege the processor faults and this process is terminated, which is
/// the documented contract of the access layer.
///
/// # Errors
///
/// Returns an error if the processor does not implement RDMSR.
pub fn msr(register_index: usize) -> Result<()> {
    ensure!(supports_msr(), "this processor does not implement RDMSR");

    // SAFETY:
    //
    // RDMSR is implemented on this processor. Sufficient privilege and a
    // defined register index are asserted by the user invoking this
    // subcommand; a violation faults instead of returning a wrong value.
    let value = unsafe { execute_rdmsr(register_index) };

    println!("msr {register_index:#010X}: {value:#018X}");

    Ok(())
}

/// Executes the basic identification leaf.
fn basic_leaf() -> Result<CpuidRegisters> {
    ensure!(supports_cpuid(), "this processor does not implement CPUID");

    // SAFETY:
    //
    // CPUID is implemented on this processor.
    Ok(unsafe { execute_cpuid(0, 0) })
}

/// Decodes the 12-byte vendor identification string from the output of the
/// basic identification leaf.
///
/// The string is stored across EBX, EDX, and ECX, in that order, four little
/// endian bytes per register.
fn vendor_string(registers: CpuidRegisters) -> [u8; 12] {
    let mut bytes = [0; 12];

    bytes[..4].copy_from_slice(&registers.ebx.to_le_bytes());
    bytes[4..8].copy_from_slice(&registers.edx.to_le_bytes());
    bytes[8..].copy_from_slice(&registers.ecx.to_le_bytes());

    bytes
}

/// Renders a support bit for display.
fn advertised(supported: bool) -> &'static str {
    if supported { "advertised" } else { "not advertised" }
}

#[cfg(test)]
mod test {
    use pal::cpuid::CpuidRegisters;

    use super::vendor_string;

    #[test]
    fn intel_vendor_registers_decode() {
        let registers = CpuidRegisters {
            eax: 0x16,
            ebx: 0x756E_6547,
            ecx: 0x6C65_746E,
            edx: 0x4965_6E69,
        };

        assert_eq!(&vendor_string(registers), b"GenuineIntel");
    }

    #[test]
    fn amd_vendor_registers_decode() {
        let registers = CpuidRegisters {
            eax: 0x10,
            ebx: 0x6874_7541,
            ecx: 0x444D_4163,
            edx: 0x6974_6E65,
        };

        assert_eq!(&vendor_string(registers), b"AuthenticAMD");
    }

    #[test]
    fn live_vendor_string_is_ascii() {
        let registers = super::basic_leaf().expect("CPUID is available on test hosts");

        let vendor = vendor_string(registers);
        assert!(vendor.iter().all(u8::is_ascii));
    }
}
