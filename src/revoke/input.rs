//! Line-based input for the interactive menu

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::error::{LendloopError, Result};

/// Source of menu answers. `Ok(None)` means the user closed the input (EOF or Ctrl+C).
pub trait LineSource {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// Terminal input through rustyline; dropping it restores the terminal
pub struct EditorLineSource {
    editor: DefaultEditor,
}

impl EditorLineSource {
    pub fn new() -> Result<Self> {
        let editor = DefaultEditor::new().map_err(|e| LendloopError::Input(e.to_string()))?;
        Ok(Self { editor })
    }
}

impl LineSource for EditorLineSource {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(Some(line)),
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => Ok(None),
            Err(e) => Err(LendloopError::Input(format!("readline error: {e}"))),
        }
    }
}
