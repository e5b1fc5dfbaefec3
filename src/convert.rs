//! Markup-to-document conversion collaborator.
//!
//! Conversion runs once per version as an external process. The canonical
//! source link rides along as traceability metadata, and every stored
//! document is guaranteed to end with it so the scanner can recover
//! identity without a sidecar index.

use std::io::Write;
use std::process::{Command, Stdio};

use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ConvertError {
    #[error("failed to spawn converter {cmd}: {source}")]
    Spawn {
        cmd: String,
        #[source]
        source: std::io::Error,
    },

    #[error("converter i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("converter exited with status {status}: {stderr}")]
    Failed { status: i32, stderr: String },

    #[error("converter produced non-UTF-8 output: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Converts remote markup into the stored document text.
pub trait Converter {
    fn convert(&self, markup: &str, canonical_url: &str) -> Result<String, ConvertError>;
}

/// External-process converter: markup on stdin, document on stdout.
///
/// `{url}` in an argument is replaced by the canonical source link.
pub struct CommandConverter {
    program: String,
    args: Vec<String>,
}

impl CommandConverter {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// The default converter: pandoc, storage-format HTML to GitHub markdown.
    pub fn pandoc() -> Self {
        Self::new(
            "pandoc",
            ["-f", "html", "-t", "gfm", "--metadata=source:{url}"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
    }
}

impl Converter for CommandConverter {
    fn convert(&self, markup: &str, canonical_url: &str) -> Result<String, ConvertError> {
        let args: Vec<String> = self
            .args
            .iter()
            .map(|a| a.replace("{url}", canonical_url))
            .collect();
        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ConvertError::Spawn {
                cmd: self.program.clone(),
                source: e,
            })?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(markup.as_bytes())?;
        }
        let out = child.wait_with_output()?;
        if !out.status.success() {
            return Err(ConvertError::Failed {
                status: out.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
            });
        }
        Ok(String::from_utf8(out.stdout)?)
    }
}

/// Ensure the document ends with its canonical source link.
///
/// Converters that already emit the link (pandoc metadata, say) pass
/// through untouched; anything else gets a footer appended.
pub fn with_source_footer(body: &str, canonical_url: &str) -> String {
    if body.lines().any(|line| line.contains(canonical_url)) {
        return body.to_string();
    }
    let mut out = body.trim_end().to_string();
    if !out.is_empty() {
        out.push_str("\n\n");
    }
    out.push_str(&format!("[source]({canonical_url})\n"));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://wiki.test/pages/7";

    #[test]
    fn footer_is_appended_once() {
        let with = with_source_footer("hello\n", URL);
        assert!(with.ends_with(&format!("[source]({URL})\n")));
        // Already present: untouched.
        assert_eq!(with_source_footer(&with, URL), with);
    }

    #[test]
    fn footer_alone_for_empty_body() {
        assert_eq!(with_source_footer("", URL), format!("[source]({URL})\n"));
    }

    #[test]
    fn command_converter_pipes_through_process() {
        // `cat` is a faithful identity converter on any unix box.
        let converter = CommandConverter::new("cat", vec![]);
        let out = converter.convert("<p>body</p>", URL).unwrap();
        assert_eq!(out, "<p>body</p>");
    }

    #[test]
    fn command_converter_surfaces_failure() {
        let converter = CommandConverter::new("false", vec![]);
        assert!(matches!(
            converter.convert("x", URL),
            Err(ConvertError::Failed { .. })
        ));
    }
}
