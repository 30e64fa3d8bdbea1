use std::fs;
use std::io::Write;
use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use planview_logging::{pv_debug, pv_warn};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard write failed: {0}")]
    Write(String),
    #[error("copy command failed: {0}")]
    CopyCommand(String),
}

/// Which route carried the text to the clipboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyPath {
    Native,
    Legacy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScratchId(u64);

/// Clipboard capabilities of the host surface. The legacy route stages the
/// text in an off-screen scratch field, selects it and runs the copy command.
pub trait ClipboardHost {
    fn has_native_write(&self) -> bool;
    fn write_native(&mut self, text: &str) -> Result<(), ClipboardError>;
    fn insert_scratch(&mut self, text: &str) -> ScratchId;
    fn select_all(&mut self, field: ScratchId);
    fn exec_copy(&mut self) -> Result<(), ClipboardError>;
    fn remove_scratch(&mut self, field: ScratchId);
}

/// Scratch field that is removed from the host when dropped.
struct ScratchField<'a> {
    host: &'a mut dyn ClipboardHost,
    id: ScratchId,
}

impl<'a> ScratchField<'a> {
    fn insert(host: &'a mut dyn ClipboardHost, text: &str) -> Self {
        let id = host.insert_scratch(text);
        Self { host, id }
    }

    fn copy(&mut self) -> Result<(), ClipboardError> {
        self.host.select_all(self.id);
        self.host.exec_copy()
    }
}

impl Drop for ScratchField<'_> {
    fn drop(&mut self) {
        self.host.remove_scratch(self.id);
    }
}

/// Places `text` on the clipboard, preferring the native capability.
pub fn export_text(host: &mut dyn ClipboardHost, text: &str) -> Result<CopyPath, ClipboardError> {
    if host.has_native_write() {
        host.write_native(text)?;
        return Ok(CopyPath::Native);
    }

    let mut field = ScratchField::insert(host, text);
    field.copy()?;
    Ok(CopyPath::Legacy)
}

/// Terminal host: OSC 52 when the terminal can take it, otherwise the copy
/// command writes the selected scratch text to a fallback file.
pub struct TerminalClipboard<W: Write> {
    out: W,
    native: bool,
    fallback_path: PathBuf,
    fields: Vec<(ScratchId, String)>,
    selection: Option<ScratchId>,
    next_id: u64,
}

impl<W: Write> TerminalClipboard<W> {
    pub fn new(out: W, native: bool, fallback_path: PathBuf) -> Self {
        Self {
            out,
            native,
            fallback_path,
            fields: Vec::new(),
            selection: None,
            next_id: 0,
        }
    }

    #[cfg(test)]
    fn scratch_fields(&self) -> usize {
        self.fields.len()
    }
}

impl<W: Write> ClipboardHost for TerminalClipboard<W> {
    fn has_native_write(&self) -> bool {
        self.native
    }

    fn write_native(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.out
            .write_all(osc52_sequence(text).as_bytes())
            .and_then(|()| self.out.flush())
            .map_err(|err| ClipboardError::Write(err.to_string()))
    }

    fn insert_scratch(&mut self, text: &str) -> ScratchId {
        let id = ScratchId(self.next_id);
        self.next_id += 1;
        self.fields.push((id, text.to_string()));
        id
    }

    fn select_all(&mut self, field: ScratchId) {
        self.selection = Some(field);
    }

    fn exec_copy(&mut self) -> Result<(), ClipboardError> {
        let selected = self
            .selection
            .and_then(|id| self.fields.iter().find(|(field, _)| *field == id))
            .map(|(_, text)| text.as_str())
            .ok_or_else(|| ClipboardError::CopyCommand("nothing selected".to_string()))?;

        fs::write(&self.fallback_path, selected).map_err(|err| {
            pv_warn!("Copy to {:?} failed: {}", self.fallback_path, err);
            ClipboardError::CopyCommand(err.to_string())
        })?;
        pv_debug!("Copied {} bytes to {:?}", selected.len(), self.fallback_path);
        Ok(())
    }

    fn remove_scratch(&mut self, field: ScratchId) {
        self.fields.retain(|(id, _)| *id != field);
        if self.selection == Some(field) {
            self.selection = None;
        }
    }
}

fn osc52_sequence(text: &str) -> String {
    let encoded = STANDARD.encode(text.as_bytes());
    format!("\x1b]52;c;{encoded}\x1b\\")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_write_emits_osc52() {
        let mut host = TerminalClipboard::new(Vec::new(), true, PathBuf::from("unused"));
        let path = export_text(&mut host, "a\tb").unwrap();
        assert_eq!(path, CopyPath::Native);
        assert_eq!(host.out, b"\x1b]52;c;YQli\x1b\\".to_vec());
        assert_eq!(host.scratch_fields(), 0);
    }

    #[test]
    fn legacy_copy_writes_fallback_and_removes_field() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("clipboard.txt");
        let mut host = TerminalClipboard::new(Vec::new(), false, target.clone());

        let path = export_text(&mut host, "2024-03-01\tana").unwrap();

        assert_eq!(path, CopyPath::Legacy);
        assert_eq!(fs::read_to_string(&target).unwrap(), "2024-03-01\tana");
        assert_eq!(host.scratch_fields(), 0);
        assert!(host.out.is_empty());
    }

    #[test]
    fn failed_copy_command_leaves_no_scratch_field() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("missing").join("clipboard.txt");
        let mut host = TerminalClipboard::new(Vec::new(), false, target);

        let err = export_text(&mut host, "text").unwrap_err();

        assert!(matches!(err, ClipboardError::CopyCommand(_)));
        assert_eq!(host.scratch_fields(), 0);
        assert_eq!(host.selection, None);
    }

    struct RecordingHost {
        calls: Vec<&'static str>,
        live: usize,
    }

    impl ClipboardHost for RecordingHost {
        fn has_native_write(&self) -> bool {
            false
        }
        fn write_native(&mut self, _text: &str) -> Result<(), ClipboardError> {
            unreachable!("no native capability")
        }
        fn insert_scratch(&mut self, _text: &str) -> ScratchId {
            self.calls.push("insert");
            self.live += 1;
            ScratchId(7)
        }
        fn select_all(&mut self, _field: ScratchId) {
            self.calls.push("select");
        }
        fn exec_copy(&mut self) -> Result<(), ClipboardError> {
            self.calls.push("copy");
            Ok(())
        }
        fn remove_scratch(&mut self, field: ScratchId) {
            assert_eq!(field, ScratchId(7));
            self.calls.push("remove");
            self.live -= 1;
        }
    }

    #[test]
    fn legacy_route_runs_steps_in_order() {
        let mut host = RecordingHost {
            calls: Vec::new(),
            live: 0,
        };
        export_text(&mut host, "x").unwrap();
        assert_eq!(host.calls, vec!["insert", "select", "copy", "remove"]);
        assert_eq!(host.live, 0);
    }
}
