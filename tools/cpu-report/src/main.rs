//! Diagnostic tool reporting processor identification, feature leaves, and
//! virtualization support through the `pal` instruction access layer.

use anyhow::Result;

use crate::cli::Action;

mod cli;
mod report;

fn main() -> Result<()> {
    match cli::get_action() {
        Action::Vendor => report::vendor(),
        Action::Leaf { leaf, subleaf } => report::leaf(leaf, subleaf),
        Action::Virtualization => report::virtualization(),
        Action::Msr { register_index } => report::msr(register_index),
    }
}
