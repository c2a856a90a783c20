//! Stub `qpdf` scripts.

use std::path::{Path, PathBuf};

/// Copies the input to the output and answers `--version`.
pub const COPY_TOOL: &str = r#"#!/bin/sh
if [ "$1" = "--version" ]; then
  echo "qpdf version 11.9.0"
  exit 0
fi
if [ "$1" != "--decrypt" ]; then
  echo "unexpected arguments: $*" >&2
  exit 2
fi
cp "$2" "$3"
"#;

/// Rejects every document, the way qpdf rejects a non-PDF.
pub const REJECTING_TOOL: &str = r#"#!/bin/sh
echo "$2: not a PDF file" >&2
exit 2
"#;

/// Emulates metadata stripping: drops every line containing "/Author".
pub const STRIPPING_TOOL: &str = r#"#!/bin/sh
grep -v "/Author" "$2" > "$3"
exit 0
"#;

/// Normalizes by copying, and replaces the target with the job file.
pub const REDACT_TOOL: &str = r#"#!/bin/sh
case "$1" in
  --version)
    echo "qpdf version 11.9.0"
    ;;
  --normalize-content=y)
    shift 3
    cp "$1" "$2"
    ;;
  --job-json-file=*)
    job="${1#--job-json-file=}"
    cat "$job" > "$3"
    ;;
  *)
    echo "unexpected arguments: $*" >&2
    exit 2
    ;;
esac
"#;

/// Normalizes fine, then fails the job step.
pub const FAILING_JOB_TOOL: &str = r#"#!/bin/sh
case "$1" in
  --normalize-content=y)
    shift 3
    cp "$1" "$2"
    ;;
  *)
    echo "redact: unknown step type" >&2
    exit 2
    ;;
esac
"#;

/// Write an executable shell script into `dir` and return its path.
pub fn write_stub_tool(dir: &Path, name: &str, script: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, script).expect("Failed to write stub tool");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("Failed to make stub tool executable");
    }
    path
}
