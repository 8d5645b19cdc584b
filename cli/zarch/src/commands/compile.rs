//! `zarch compile` — build a native launcher for a SwiftFlow file.
//!
//! There is no native SwiftFlow compiler yet. This generates a small C
//! wrapper that shells out to the `swift` interpreter, compiles it with
//! gcc, and removes the wrapper source.

use std::path::Path;
use std::process::Command;

use anyhow::{bail, Context, Result};

pub fn run(file: &str) -> Result<()> {
    let source = Path::new(file);
    if !source.is_file() {
        bail!("file not found: {file}");
    }

    println!("Compiling {file}");

    let stem = file.strip_suffix(".swf").unwrap_or(file);
    let wrapper_path = format!("{stem}.c");
    std::fs::write(&wrapper_path, wrapper_source(file)).context("writing C wrapper")?;

    let status = Command::new("gcc")
        .args(["-o", stem, &wrapper_path, "-O2"])
        .status()
        .context("running gcc")?;
    if !status.success() {
        bail!("gcc failed with {status}");
    }

    std::fs::remove_file(&wrapper_path)?;

    println!("Executable: {stem}");
    println!("note: the launcher runs the file through the swift interpreter");
    Ok(())
}

/// A launcher that delegates to the interpreter.
fn wrapper_source(swift_file: &str) -> String {
    format!(
        r#"#include <stdio.h>
#include <stdlib.h>
#include <string.h>

int main(int argc, char *argv[]) {{
    char command[1024];

    snprintf(command, sizeof(command), "swift %s", "{swift_file}");

    return system(command);
}}
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapper_invokes_the_interpreter_on_the_file() {
        let source = wrapper_source("main.swf");
        assert!(source.contains(r#""swift %s", "main.swf""#));
        assert!(source.contains("int main(int argc, char *argv[])"));
    }

    #[test]
    fn missing_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.swf");
        let result = run(missing.to_str().unwrap());
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("file not found"));
    }
}
