//! Entity store backed by the external command-line tools.

use std::process::{Command, Stdio};

use crate::config::Settings;
use crate::error::TopoSyncError;

use super::{EntityStore, ImportOutcome, PRODUCER_UNIQUE_CLAIM};

/// Runs the `entities`, `prepopulate` and `import-gtfs` tools.
///
/// Arguments are handed to the process as-is, without a shell, so titles
/// and URLs need no quoting. Every invocation blocks until the tool exits.
#[derive(Clone, Debug)]
pub struct CommandStore {
    entities: String,
    prepopulate: String,
    import_gtfs: String,
    common_args: Vec<String>,
}

impl CommandStore {
    pub fn new(settings: &Settings) -> Self {
        Self {
            entities: settings.programs.entities.clone(),
            prepopulate: settings.programs.prepopulate.clone(),
            import_gtfs: settings.programs.import_gtfs.clone(),
            common_args: settings.common_args(),
        }
    }

    fn full_args(&self, args: Vec<String>) -> Vec<String> {
        let mut full = args;
        full.extend(self.common_args.iter().cloned());
        full
    }

    /// Run a tool, capturing its output. Any failure is fatal.
    fn capture(&self, program: &str, args: Vec<String>) -> Result<String, TopoSyncError> {
        let args = self.full_args(args);
        let command = render_command(program, &args);
        tracing::info!("running {command}");

        let output = Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| TopoSyncError::CommandSpawn {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(TopoSyncError::CommandFailed {
                command,
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Run a tool with inherited stdio and return its exit code.
    fn run_inherited(
        &self,
        program: &str,
        args: Vec<String>,
    ) -> Result<(String, Option<i32>), TopoSyncError> {
        let args = self.full_args(args);
        let command = render_command(program, &args);
        tracing::info!("running {command}");

        let status = Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .status()
            .map_err(|source| TopoSyncError::CommandSpawn {
                command: command.clone(),
                source,
            })?;

        Ok((command, status.code()))
    }
}

impl EntityStore for CommandStore {
    fn prepopulate(&mut self) -> Result<(), TopoSyncError> {
        let (command, status) = self.run_inherited(&self.prepopulate, Vec::new())?;
        if status != Some(0) {
            return Err(TopoSyncError::CommandFailed {
                command,
                status,
                stderr: String::new(),
            });
        }
        Ok(())
    }

    fn search_by_claim(&mut self, property: &str, value: &str) -> Result<String, TopoSyncError> {
        let args = vec![
            "search".to_string(),
            "--claim".to_string(),
            format!("{property}=<{value}>"),
        ];
        self.capture(&self.entities, args)
    }

    fn create_property(&mut self, name: &str) -> Result<String, TopoSyncError> {
        let args = vec![
            "create".to_string(),
            name.to_string(),
            "--type".to_string(),
            "urlproperty".to_string(),
        ];
        self.capture(&self.entities, args)
    }

    fn create_producer(
        &mut self,
        title: &str,
        property: &str,
        url: &str,
    ) -> Result<String, TopoSyncError> {
        let args = vec![
            "create".to_string(),
            title.to_string(),
            "--type".to_string(),
            "item".to_string(),
            "--unique-claim".to_string(),
            PRODUCER_UNIQUE_CLAIM.to_string(),
            "--claim".to_string(),
            format!("{property}={url}"),
        ];
        self.capture(&self.entities, args)
    }

    fn import_gtfs(
        &mut self,
        url: &str,
        producer: &str,
        override_existing: bool,
    ) -> Result<ImportOutcome, TopoSyncError> {
        let mut args = vec![
            "--input-gtfs".to_string(),
            url.to_string(),
            "--producer".to_string(),
            producer.to_string(),
        ];
        if override_existing {
            args.push("--override-existing".to_string());
        }

        let (command, status) = self.run_inherited(&self.import_gtfs, args)?;
        Ok(ImportOutcome { command, status })
    }
}

/// Render a command line for logs and failure records.
///
/// Arguments containing whitespace or quotes are double-quoted.
pub fn render_command(program: &str, args: &[String]) -> String {
    let mut rendered = program.to_string();
    for arg in args {
        rendered.push(' ');
        if arg.is_empty() || arg.contains(|c: char| c.is_whitespace() || c == '"') {
            rendered.push('"');
            rendered.push_str(&arg.replace('"', "\\\""));
            rendered.push('"');
        } else {
            rendered.push_str(arg);
        }
    }
    rendered
}
