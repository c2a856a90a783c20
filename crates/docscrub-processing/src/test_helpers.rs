//! Stub tools and scratch inspection shared by the unit tests.

use std::path::{Path, PathBuf};

/// Copies the input to the output, like `qpdf --decrypt` on an unencrypted file.
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

/// Writes nothing and fails the way qpdf does on a damaged file.
pub const FAILING_TOOL: &str = r#"#!/bin/sh
echo "$2: not a PDF file" >&2
exit 2
"#;

/// Writes a partial output and then fails, leaving a file behind for cleanup.
pub const PARTIAL_OUTPUT_TOOL: &str = r#"#!/bin/sh
echo "partial" > "$3"
echo "write error" >&2
exit 2
"#;

/// Never finishes within a test timeout.
pub const SLOW_TOOL: &str = r#"#!/bin/sh
sleep 30
"#;

/// Records its arguments and the job file, then rewrites the target in place.
/// Handles both the normalize and the job invocation of the redaction pipeline.
pub const REDACT_TOOL: &str = r#"#!/bin/sh
case "$1" in
  --normalize-content=y)
    shift 3
    cp "$1" "$2"
    ;;
  --job-json-file=*)
    job="${1#--job-json-file=}"
    target="$3"
    cat "$job" > "$target"
    ;;
  *)
    echo "unexpected arguments: $*" >&2
    exit 2
    ;;
esac
"#;

/// Leaves the kept original and an abandoned rewrite beside the target, then
/// exits 3 the way qpdf does when a run only produced warnings.
pub const REDACT_WITH_WARNINGS_TOOL: &str = r#"#!/bin/sh
case "$1" in
  --normalize-content=y)
    shift 3
    cp "$1" "$2"
    ;;
  --job-json-file=*)
    target="$3"
    cp "$target" "$target.~qpdf-temp#"
    mv "$target" "$target.~qpdf-orig"
    cat "${1#--job-json-file=}" > "$target"
    echo "qpdf: operation succeeded with warnings" >&2
    exit 3
    ;;
esac
"#;

/// Write an executable shell script into `dir` and return its path.
pub fn write_stub_tool(dir: &Path, name: &str, script: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, script).unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }
    path
}

/// Everything currently in the scratch directory.
pub fn scratch_entries(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect()
}
