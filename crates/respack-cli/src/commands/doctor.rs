use super::{json_pretty, CommandError, EXIT_FAILURE, EXIT_SUCCESS};
use console::Style;
use respack_compiler::{check_compiler_prereqs, format_missing, COMPILER_NAMES};
use respack_store::BuildLayout;
use std::path::Path;

pub fn run(compiler: &str, aapt_path: Option<&Path>, json_output: bool) -> Result<u8, CommandError> {
    let mut checks: Vec<Check> = Vec::new();
    let mut all_pass = true;

    check_compiler(compiler, aapt_path, &mut checks, &mut all_pass);
    check_scratch(&mut checks, &mut all_pass);

    print_results(&checks, all_pass, json_output)
}

fn check_compiler(compiler: &str, aapt_path: Option<&Path>, checks: &mut Vec<Check>, all_pass: &mut bool) {
    if !COMPILER_NAMES.contains(&compiler) {
        *all_pass = false;
        checks.push(Check::fail(
            "compiler_backend",
            &format!(
                "Unknown compiler backend '{compiler}' (expected one of: {})",
                COMPILER_NAMES.join(", ")
            ),
        ));
        return;
    }
    checks.push(Check::pass(
        "compiler_backend",
        &format!("Compiler backend '{compiler}' is known"),
    ));

    let missing = check_compiler_prereqs(compiler, aapt_path);
    if missing.is_empty() {
        checks.push(Check::pass("compiler_prereqs", "Compiler prerequisites satisfied"));
    } else {
        *all_pass = false;
        checks.push(Check::fail("compiler_prereqs", &format_missing(&missing)));
    }
}

fn check_scratch(checks: &mut Vec<Check>, all_pass: &mut bool) {
    let result = BuildLayout::temporary().and_then(|layout| {
        layout.initialize()?;
        Ok(layout.root().parent().map(Path::to_path_buf))
    });
    match result {
        Ok(Some(parent)) => checks.push(Check::pass(
            "scratch_dir",
            &format!("Scratch directory writable under {}", parent.display()),
        )),
        Ok(None) => checks.push(Check::pass("scratch_dir", "Scratch directory writable")),
        Err(e) => {
            *all_pass = false;
            checks.push(Check::fail(
                "scratch_dir",
                &format!("Cannot create scratch directory: {e}"),
            ));
        }
    }
}

fn print_results(checks: &[Check], all_pass: bool, json_output: bool) -> Result<u8, CommandError> {
    if json_output {
        let json = serde_json::json!({
            "healthy": all_pass,
            "checks": checks.iter().map(|c| serde_json::json!({
                "name": c.name,
                "status": c.status,
                "message": c.message,
            })).collect::<Vec<_>>(),
        });
        println!("{}", json_pretty(&json)?);
    } else {
        println!("respack doctor\n");
        for check in checks {
            let icon = match check.status {
                "pass" => Style::new().green().apply_to("✓"),
                "fail" => Style::new().red().apply_to("✗"),
                _ => Style::new().dim().apply_to("ℹ"),
            };
            println!("  {icon} {}", check.message);
        }
        println!();
        if all_pass {
            println!("All checks passed.");
        } else {
            println!("Some checks failed. See above for details.");
        }
    }
    Ok(if all_pass { EXIT_SUCCESS } else { EXIT_FAILURE })
}

struct Check {
    name: &'static str,
    status: &'static str,
    message: String,
}

impl Check {
    fn pass(name: &'static str, message: &str) -> Self {
        Self {
            name,
            status: "pass",
            message: message.to_owned(),
        }
    }

    fn fail(name: &'static str, message: &str) -> Self {
        Self {
            name,
            status: "fail",
            message: message.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_backend_fails() {
        let mut checks = Vec::new();
        let mut all_pass = true;
        check_compiler("aapt9", None, &mut checks, &mut all_pass);
        assert!(!all_pass);
        assert_eq!(checks.len(), 1);
        assert_eq!(checks[0].status, "fail");
        assert!(checks[0].message.contains("aapt9"));
    }

    #[test]
    fn mock_backend_passes() {
        let mut checks = Vec::new();
        let mut all_pass = true;
        check_compiler("mock", None, &mut checks, &mut all_pass);
        assert!(all_pass);
        assert!(checks.iter().all(|c| c.status == "pass"));
    }

    #[test]
    fn aapt_without_path_fails() {
        let mut checks = Vec::new();
        let mut all_pass = true;
        check_compiler("aapt", None, &mut checks, &mut all_pass);
        assert!(!all_pass);
        assert_eq!(checks[1].name, "compiler_prereqs");
    }

    #[test]
    fn scratch_dir_is_writable() {
        let mut checks = Vec::new();
        let mut all_pass = true;
        check_scratch(&mut checks, &mut all_pass);
        assert!(all_pass, "{}", checks[0].message);
    }
}
