//! Diagnostics for recoverable data problems.
//!
//! Structural parse failures abort a load; everything else (a loot entry
//! that does not validate, a malformed trade coefficient) is collected here
//! and reported together. Used by both `ltx check` and `ltx loot`.

mod diagnostic;

pub use diagnostic::{Diagnostic, Severity, ValidationResult};

use crate::output::{plural, Printer};
use crate::project::Project;

/// Collect every recoverable problem in a loaded project.
pub fn validate_project(project: &Project) -> ValidationResult {
    let mut result = ValidationResult::new();
    result.merge(project.warnings().clone());
    result.merge(project.collect_loot().1);
    result
}

/// Print diagnostics to stderr, followed by a summary line.
pub fn print_diagnostics(printer: &Printer, result: &ValidationResult) {
    for d in result.iter() {
        let label = printer.severity(&d.severity.to_string(), d.severity == Severity::Error);
        eprintln!("  {}[{}]: {}", label, d.code, d);
        if let Some(help) = &d.help {
            eprintln!("    help: {}", help);
        }
    }

    let errors = result.error_count();
    let warnings = result.warning_count();

    if errors > 0 {
        printer.error(
            "Failed",
            &format!(
                "{}, {}",
                plural(errors, "error", "errors"),
                plural(warnings, "warning", "warnings")
            ),
        );
    } else if warnings > 0 {
        printer.warning("Checked", &plural(warnings, "warning", "warnings"));
    } else {
        printer.success("Checked", "no problems found");
    }
}
