//! Renderer sinks for compiled diagrams.
//!
//! Mermaid turns the text into pixels; this module only hands the text over,
//! either as `.mmd` files, as standalone HTML pages that load Mermaid, or on a
//! stream. Each pane is written independently so one failure cannot suppress
//! the other.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::session::{Event, Pane, PaneId, ViewState};

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

const MERMAID_MODULE: &str = "https://cdn.jsdelivr.net/npm/mermaid@10/dist/mermaid.esm.min.mjs";

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to write diagram: {0}")]
    Stream(#[from] io::Error),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Raw Mermaid text.
    #[default]
    Mmd,
    /// Standalone HTML page that renders the diagram with Mermaid.
    Html,
}

impl OutputFormat {
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Mmd => "mmd",
            Self::Html => "html",
        }
    }
}

pub trait Renderer {
    /// Hand one compiled diagram to the renderer.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if the diagram could not be delivered.
    fn render(&mut self, pane: PaneId, diagram: &str) -> Result<(), RenderError>;
}

// =============================================================================
// DIRECTORY
// =============================================================================

/// Writes `<pane>.<ext>` files into a directory, creating it on demand.
pub struct DirectoryRenderer {
    dir: PathBuf,
    format: OutputFormat,
}

impl DirectoryRenderer {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self { dir: dir.into(), format }
    }

    #[must_use]
    pub fn path_for(&self, pane: PaneId) -> PathBuf {
        self.dir.join(format!("{}.{}", pane.name(), self.format.extension()))
    }
}

impl Renderer for DirectoryRenderer {
    fn render(&mut self, pane: PaneId, diagram: &str) -> Result<(), RenderError> {
        let path = self.path_for(pane);
        let contents = match self.format {
            OutputFormat::Mmd => diagram.to_owned(),
            OutputFormat::Html => html_page(pane.name(), diagram),
        };
        fs::create_dir_all(&self.dir)
            .and_then(|()| fs::write(&path, contents))
            .map_err(|source| RenderError::Write { path: path.clone(), source })?;
        tracing::info!(path = %path.display(), "diagram written");
        Ok(())
    }
}

// =============================================================================
// STREAM
// =============================================================================

/// Writes each diagram to a stream under a `%% <pane>` comment line.
pub struct StreamRenderer<W: Write> {
    out: W,
}

impl<W: Write> StreamRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Renderer for StreamRenderer<W> {
    fn render(&mut self, pane: PaneId, diagram: &str) -> Result<(), RenderError> {
        writeln!(self.out, "%% {}", pane.name())?;
        self.out.write_all(diagram.as_bytes())?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}

// =============================================================================
// HTML
// =============================================================================

/// Wrap a diagram in a standalone page. Mermaid reads the text content of the
/// `pre.mermaid` block, so the diagram is HTML-escaped.
#[must_use]
pub fn html_page(title: &str, diagram: &str) -> String {
    let title = escape_html(title);
    let body = escape_html(diagram);
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n</head>\n<body>\n\
         <pre class=\"mermaid\">\n{body}</pre>\n\
         <script type=\"module\">\nimport mermaid from \"{MERMAID_MODULE}\";\nmermaid.initialize({{ startOnLoad: true }});\n</script>\n\
         </body>\n</html>\n"
    )
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

// =============================================================================
// PANES
// =============================================================================

/// Render every pane that holds a diagram. A failing pane becomes
/// [`Pane::Failed`]; the remaining panes are still rendered.
pub fn render_panes(mut state: ViewState, renderer: &mut dyn Renderer) -> ViewState {
    for pane in PaneId::ALL {
        let Pane::Diagram(diagram) = state.pane(pane) else {
            continue;
        };
        if let Err(e) = renderer.render(pane, diagram) {
            tracing::warn!(pane = pane.name(), error = %e, "diagram render failed");
            (state, _) = state.handle(Event::RenderFailed { pane, message: e.to_string() });
        }
    }
    state
}
