// External loaders: an executable file under the project root that reads
// the module source on stdin and writes the transformed source to stdout

use crate::core::interfaces::{Loader, LoaderContext};
use anyhow::{bail, Context};
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

pub const OPTIONS_ENV: &str = "TINYPACK_LOADER_OPTIONS";
pub const RESOURCE_ENV: &str = "TINYPACK_RESOURCE_PATH";

pub struct CommandLoader {
    reference: String,
    program: PathBuf,
}

impl CommandLoader {
    pub fn new(reference: impl Into<String>, program: PathBuf) -> Self {
        Self {
            reference: reference.into(),
            program,
        }
    }
}

impl Loader for CommandLoader {
    fn name(&self) -> &str {
        &self.reference
    }

    fn run(&self, source: String, context: &LoaderContext) -> anyhow::Result<String> {
        let mut child = Command::new(&self.program)
            .current_dir(&context.root)
            .env(OPTIONS_ENV, serde_json::to_string(&context.options)?)
            .env(RESOURCE_ENV, &context.resource_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to start {}", self.program.display()))?;

        let mut stdin = child.stdin.take().context("loader stdin unavailable")?;

        // Feed stdin from a scoped thread so a chatty loader cannot fill its
        // stdout pipe while we are still writing
        let output = std::thread::scope(|scope| {
            let writer = scope.spawn(move || stdin.write_all(source.as_bytes()));
            let output = child.wait_with_output();
            let written = writer.join();
            (output, written)
        });

        let (output, written) = output;
        let output = output.context("failed to wait for loader")?;
        if !output.status.success() {
            bail!(
                "exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        match written {
            Ok(Ok(())) => {}
            // A loader may legitimately exit without reading all input
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
            Ok(Err(e)) => return Err(e).context("failed to write module source to loader"),
            Err(_) => bail!("loader stdin writer panicked"),
        }

        String::from_utf8(output.stdout).context("loader produced non UTF-8 output")
    }
}
