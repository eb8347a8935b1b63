//! SVG rendering via the external GraphViz `dot` engine
//!
//! The engine is an optional collaborator: its absence is a reported,
//! non-fatal condition, never a crash.

use std::io::{self, Write};
use std::process::{Command, Stdio};

/// Errors for SVG rendering
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Graph layout engine `dot` not found; install graphviz to render SVG")]
    EngineUnavailable,

    #[error("Graph layout engine failed: {0}")]
    EngineFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Render DOT source to SVG by piping it through `dot -Tsvg`.
pub fn render_svg(dot_source: &str) -> Result<String, RenderError> {
    let mut child = match Command::new("dot")
        .arg("-Tsvg")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(RenderError::EngineUnavailable)
        }
        Err(err) => return Err(RenderError::Io(err)),
    };

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(dot_source.as_bytes())?;
    }

    let output = child.wait_with_output()?;
    if !output.status.success() {
        return Err(RenderError::EngineFailed(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
