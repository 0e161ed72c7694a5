//! Typed access to privileged x86 instructions.
//!
//! Each function in this crate issues exactly one instruction and returns its
//! output registers verbatim. No input validation, retrying, or error
//! translation is performed by design: the crate is a transparent pass-through,
//! and hardware preconditions (instruction availability, privilege level, an
//! active VMCS) are expressed only through each function's safety contract.
//! A fault raised by the processor for a violated precondition propagates to
//! the surrounding execution environment unmediated.

#![no_std]

pub mod cpuid;
pub mod msr;
pub mod vmcs;
