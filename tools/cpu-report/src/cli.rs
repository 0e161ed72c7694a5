//! Command line parsing and [`Action`] construction.

use clap::{Arg, Command};

/// The report to produce.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Action {
    /// Decode the vendor identification string and highest basic leaf.
    Vendor,
    /// Dump the output registers of an arbitrary (leaf, subleaf) pair.
    Leaf {
        /// Primary CPUID selector, placed in EAX.
        leaf: u32,
        /// Secondary CPUID selector, placed in ECX.
        subleaf: u32,
    },
    /// Report advertised CPUID, MSR, and VMX support.
    Virtualization,
    /// Read a model-specific register.
    Msr {
        /// Selector of the register to read.
        register_index: usize,
    },
}

/// Parses `cpu-report`'s arguments to construct an [`Action`].
pub fn get_action() -> Action {
    let matches = command_parser().get_matches();

    let Some((subcommand_name, subcommand_matches)) = matches.subcommand() else {
        unreachable!("subcommand is required");
    };
    match subcommand_name {
        "vendor" => Action::Vendor,
        "leaf" => {
            let leaf = subcommand_matches
                .get_one::<u32>("leaf")
                .copied()
                .unwrap_or_else(|| unreachable!("`leaf` is a required argument"));
            let subleaf = subcommand_matches
                .get_one::<u32>("subleaf")
                .copied()
                .unwrap_or_else(|| unreachable!("`subleaf` has a default value"));

            Action::Leaf { leaf, subleaf }
        }
        "virtualization" => Action::Virtualization,
        "msr" => {
            let register_index = subcommand_matches
                .get_one::<usize>("index")
                .copied()
                .unwrap_or_else(|| unreachable!("`index` is a required argument"));

            Action::Msr { register_index }
        }
        _ => unreachable!("unexpected subcommand: {subcommand_name:?}"),
    }
}

/// Returns the command parser for all [`Action`]s.
fn command_parser() -> Command {
    let leaf = Arg::new("leaf")
        .value_parser(parse_u32_selector)
        .required(true)
        .help("CPUID leaf, decimal or 0x-prefixed hexadecimal");

    let subleaf = Arg::new("subleaf")
        .value_parser(parse_u32_selector)
        .default_value("0")
        .help("CPUID subleaf, decimal or 0x-prefixed hexadecimal");

    let index = Arg::new("index")
        .value_parser(parse_index)
        .required(true)
        .help("MSR selector, decimal or 0x-prefixed hexadecimal");

    Command::new("cpu-report")
        .about("Reports processor identification and virtualization support")
        .subcommand(Command::new("vendor").about("Decodes the processor vendor identification"))
        .subcommand(
            Command::new("leaf")
                .about("Dumps the output registers of a CPUID leaf")
                .arg(leaf)
                .arg(subleaf),
        )
        .subcommand(
            Command::new("virtualization")
                .about("Reports advertised CPUID, MSR, and VMX support"),
        )
        .subcommand(
            Command::new("msr")
                .about("Reads a model-specific register (requires a ring-0 execution context)")
                .arg(index),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
}

/// Parses a 32-bit selector written in decimal or 0x-prefixed hexadecimal.
fn parse_u32_selector(text: &str) -> Result<u32, String> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => text.parse(),
    };

    parsed.map_err(|_| format!("invalid 32-bit selector: {text:?}"))
}

/// Parses a pointer-sized selector written in decimal or 0x-prefixed
/// hexadecimal.
fn parse_index(text: &str) -> Result<usize, String> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16),
        None => text.parse(),
    };

    parsed.map_err(|_| format!("invalid register selector: {text:?}"))
}

#[cfg(test)]
mod test {
    use super::{parse_index, parse_u32_selector};

    #[test]
    fn selectors_parse_in_both_bases() {
        assert_eq!(parse_u32_selector("0"), Ok(0));
        assert_eq!(parse_u32_selector("0x8000001E"), Ok(0x8000_001E));
        assert_eq!(parse_u32_selector("4294967295"), Ok(u32::MAX));

        assert_eq!(parse_index("0X3A"), Ok(0x3A));
        assert_eq!(parse_index("58"), Ok(58));
    }

    #[test]
    fn malformed_selectors_are_rejected() {
        assert!(parse_u32_selector("").is_err());
        assert!(parse_u32_selector("0x").is_err());
        assert!(parse_u32_selector("leaf").is_err());
        assert!(parse_u32_selector("0x1_0000_0000").is_err());

        assert!(parse_index("-1").is_err());
        assert!(parse_index("0xZZ").is_err());
    }
}
