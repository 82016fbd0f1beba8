use clap::CommandFactory;
use clap_complete::{generate, Shell};
use std::io::{self, Write};

use crate::presentation::cli::Cli;

/// Handler for the hidden completion command
pub struct CompletionCommand {
    pub shell: Shell,
}

impl CompletionCommand {
    pub fn new(shell: Shell) -> Self {
        Self { shell }
    }

    /// Print the completion script for `gctl` to stdout
    pub fn execute(&self) {
        self.write_to(&mut io::stdout());
    }

    fn write_to(&self, out: &mut dyn Write) {
        let mut command = Cli::command();
        generate(self.shell, &mut command, "gctl", out);
    }
}
