//! Default OCR capability: the `tesseract` command-line engine.

use std::io::{self, ErrorKind, Write};
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use std::thread;

use crate::error::CapabilityError;

use super::backend::{Bitmap, CapabilityResult, TextRecognizer};

/// Runs `tesseract stdin stdout` on each page image.
///
/// A missing executable is reported as [`CapabilityError::Unavailable`], so
/// the orchestrator abandons the OCR pass instead of failing every page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TesseractCommand {
    program: PathBuf,
    languages: String,
    page_segmentation: Option<u8>,
}

impl TesseractCommand {
    /// Use `tesseract` from `PATH` with English.
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("tesseract"),
            languages: "eng".to_string(),
            page_segmentation: None,
        }
    }

    /// Use a specific executable.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Set language(s) for OCR (e.g., "eng", "eng+fra").
    pub fn with_languages(mut self, languages: impl Into<String>) -> Self {
        self.languages = languages.into();
        self
    }

    /// Set the page segmentation mode (`--psm`).
    pub fn with_page_segmentation(mut self, mode: u8) -> Self {
        self.page_segmentation = Some(mode);
        self
    }

    fn command(&self, dpi: u32) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg("stdin")
            .arg("stdout")
            .arg("-l")
            .arg(&self.languages)
            .arg("--dpi")
            .arg(dpi.to_string());
        if let Some(mode) = self.page_segmentation {
            command.arg("--psm").arg(mode.to_string());
        }
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        command
    }
}

impl Default for TesseractCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl TextRecognizer for TesseractCommand {
    fn recognize_text(&self, bitmap: &Bitmap) -> CapabilityResult<String> {
        if bitmap.is_empty() {
            return Ok(String::new());
        }

        let mut child = self.command(bitmap.dpi).spawn().map_err(|e| match e.kind() {
            ErrorKind::NotFound | ErrorKind::PermissionDenied => CapabilityError::Unavailable(
                format!("cannot run {}: {}", self.program.display(), e),
            ),
            _ => CapabilityError::Failed(format!("cannot start OCR engine: {}", e)),
        })?;

        // Feed the image from another thread so a chatty engine cannot
        // block on a full stdout pipe while we are still writing.
        let stdin = child.stdin.take();
        let (written, output) = thread::scope(|scope| {
            let writer = scope.spawn(move || match stdin {
                Some(mut stdin) => stdin.write_all(&bitmap.png),
                None => Ok(()),
            });
            let output = child.wait_with_output();
            (writer.join(), output)
        });

        engine_result(written, output)
    }
}

/// Combine the stdin writer's outcome with the engine's exit.
///
/// A failed exit reports the engine's stderr. A clean exit only counts when
/// the whole image reached the engine.
fn engine_result(
    written: thread::Result<io::Result<()>>,
    output: io::Result<Output>,
) -> CapabilityResult<String> {
    let output =
        output.map_err(|e| CapabilityError::Failed(format!("OCR engine I/O: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CapabilityError::Failed(format!(
            "OCR engine exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    match written {
        Ok(Ok(())) => Ok(String::from_utf8_lossy(&output.stdout).into_owned()),
        Ok(Err(e)) => Err(CapabilityError::Failed(format!(
            "cannot send image to OCR engine: {}",
            e
        ))),
        Err(_) => Err(CapabilityError::Failed(
            "OCR input writer panicked".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bitmap() -> Bitmap {
        Bitmap {
            png: vec![0x89, b'P', b'N', b'G'],
            width: 1,
            height: 1,
            dpi: 200,
        }
    }

    #[test]
    fn test_command_arguments() {
        let command = TesseractCommand::new()
            .with_languages("eng+fra")
            .with_page_segmentation(6)
            .command(300);
        let args: Vec<String> = command
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            vec!["stdin", "stdout", "-l", "eng+fra", "--dpi", "300", "--psm", "6"]
        );
    }

    #[test]
    fn test_missing_engine_is_unavailable() {
        let ocr = TesseractCommand::new().with_program("/nonexistent/pdfsheet-tesseract");
        let err = ocr.recognize_text(&bitmap()).unwrap_err();
        assert!(matches!(err, CapabilityError::Unavailable(_)));
        assert!(err.is_document_level());
    }

    #[test]
    fn test_empty_bitmap_skips_engine() {
        let ocr = TesseractCommand::new().with_program("/nonexistent/pdfsheet-tesseract");
        let empty = Bitmap {
            png: Vec::new(),
            width: 0,
            height: 0,
            dpi: 200,
        };
        assert_eq!(ocr.recognize_text(&empty).unwrap(), "");
    }

    #[cfg(unix)]
    fn exited(code: i32, stdout: &str, stderr: &str) -> io::Result<Output> {
        use std::os::unix::process::ExitStatusExt;

        Ok(Output {
            status: std::process::ExitStatus::from_raw(code << 8),
            stdout: stdout.as_bytes().to_vec(),
            stderr: stderr.as_bytes().to_vec(),
        })
    }

    #[cfg(unix)]
    #[test]
    fn test_clean_exit_returns_stdout() {
        let text = engine_result(Ok(Ok(())), exited(0, "Hello\n", "")).unwrap();
        assert_eq!(text, "Hello\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_unsent_image_fails_despite_clean_exit() {
        let broken = io::Error::new(ErrorKind::BrokenPipe, "pipe closed");
        let err = engine_result(Ok(Err(broken)), exited(0, "partial", "")).unwrap_err();
        assert_eq!(
            err,
            CapabilityError::Failed("cannot send image to OCR engine: pipe closed".to_string())
        );
        assert!(!err.is_document_level());
    }

    #[cfg(unix)]
    #[test]
    fn test_panicked_writer_fails_despite_clean_exit() {
        let err = engine_result(Err(Box::new("boom")), exited(0, "partial", "")).unwrap_err();
        assert!(matches!(err, CapabilityError::Failed(ref m) if m.contains("panicked")));
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_exit_reports_stderr() {
        let broken = io::Error::new(ErrorKind::BrokenPipe, "pipe closed");
        let err = engine_result(Ok(Err(broken)), exited(1, "", " bad image \n")).unwrap_err();
        assert!(matches!(err, CapabilityError::Failed(ref m) if m.ends_with(": bad image")));
    }
}
