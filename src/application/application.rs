use std::io::{self, BufRead, Write};
use std::path::Path;

use arborfs::config::{Seed, SeedError};
use arborfs::filesystem::VirtualFilesystem;
use arborfs::shell::{Outcome, Shell};
use snafu::Snafu;
use snafu::prelude::*;
use tracing::{debug, info, warn};

use crate::application::RuntimeConfig;

pub struct Application;

/// What a single line did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Continue,
    Failed,
    Exit,
}

impl Application {
    pub async fn run(app_config: impl Into<RuntimeConfig>) -> Result<(), ApplicationError> {
        let app_config: RuntimeConfig = app_config.into();
        colored::control::set_override(app_config.color);

        let filesystem = match &app_config.seed {
            Some(path) => Seed::read(path)
                .await
                .and_then(|seed| seed.build())
                .context(SeedSnafu)?,
            None => VirtualFilesystem::new(),
        };
        debug!("Starting in {}", filesystem.pwd());
        let mut shell = Shell::new(filesystem, app_config.color);

        match &app_config.script {
            Some(path) => {
                let script = Self::read_script(path).await?;
                let mut stdout = io::stdout().lock();
                let mut stderr = io::stderr().lock();
                let failures = Self::run_script(&mut shell, &script, &mut stdout, &mut stderr)
                    .context(OutputSnafu)?;
                ensure!(failures == 0, ScriptFailedSnafu { failures });
            }
            None => {
                let mut stdout = io::stdout().lock();
                let mut stderr = io::stderr().lock();
                let stdin = io::stdin().lock();
                Self::run_interactive(&mut shell, stdin, &mut stdout, &mut stderr)
                    .context(OutputSnafu)?;
            }
        }

        Ok(())
    }

    async fn read_script(path: &Path) -> Result<String, ApplicationError> {
        info!("Running script {}", path.display());
        let bytes = compio::fs::read(path).await.context(ScriptReadSnafu {
            path: path.display().to_string(),
        })?;
        String::from_utf8(bytes).context(ScriptEncodingSnafu {
            path: path.display().to_string(),
        })
    }

    /// Runs every line of `script`, stopping early on `exit`. Returns how many
    /// lines failed.
    fn run_script(
        shell: &mut Shell,
        script: &str,
        out: &mut impl Write,
        err: &mut impl Write,
    ) -> io::Result<usize> {
        let mut failures = 0;
        for (number, line) in script.lines().enumerate() {
            match Self::step(shell, line, out, err)? {
                Step::Continue => {}
                Step::Failed => {
                    warn!("Line {} failed: {}", number + 1, line.trim());
                    failures += 1;
                }
                Step::Exit => break,
            }
        }
        Ok(failures)
    }

    fn run_interactive(
        shell: &mut Shell,
        input: impl BufRead,
        out: &mut impl Write,
        err: &mut impl Write,
    ) -> io::Result<()> {
        let mut lines = input.lines();
        loop {
            write!(out, "{}", shell.prompt())?;
            out.flush()?;

            let Some(line) = lines.next().transpose()? else {
                writeln!(out)?;
                return Ok(());
            };
            if Self::step(shell, &line, out, err)? == Step::Exit {
                return Ok(());
            }
        }
    }

    fn step(
        shell: &mut Shell,
        line: &str,
        out: &mut impl Write,
        err: &mut impl Write,
    ) -> io::Result<Step> {
        match shell.execute(line) {
            Ok(Outcome::Output(text)) => {
                if !text.is_empty() {
                    writeln!(out, "{text}")?;
                }
                Ok(Step::Continue)
            }
            Ok(Outcome::Silent) => Ok(Step::Continue),
            Ok(Outcome::Exit) => Ok(Step::Exit),
            Err(error) => {
                writeln!(err, "{}", shell.renderer().error(&error.to_string()))?;
                Ok(Step::Failed)
            }
        }
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered while seeding the filesystem"))]
    SeedError { source: SeedError },
    #[snafu(display("Failed to read the script: {}", path))]
    ScriptReadError { path: String, source: io::Error },
    #[snafu(display("Script is not valid UTF-8: {}", path))]
    ScriptEncodingError {
        path: String,
        source: std::string::FromUtf8Error,
    },
    #[snafu(display("Failed to write to the terminal"))]
    OutputError { source: io::Error },
    #[snafu(display("{} command(s) in the script failed", failures))]
    ScriptFailedError { failures: usize },
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use tempfile::NamedTempFile;

    use super::*;

    fn shell() -> Shell {
        Shell::new(VirtualFilesystem::new(), false)
    }

    fn script(shell: &mut Shell, script: &str) -> (usize, String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let failures = Application::run_script(shell, script, &mut out, &mut err).unwrap();
        (
            failures,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn script_prints_results_in_order() {
        let mut shell = shell();
        let (failures, out, err) = script(
            &mut shell,
            "# build a small tree\nmkdir docs\ncat > docs/a.txt hello\ncat docs/a.txt\nls\n",
        );
        assert_eq!(failures, 0);
        assert_eq!(out, "hello\ndocs/\n");
        assert_eq!(err, "");
    }

    #[test]
    fn script_counts_failures_and_keeps_going() {
        let mut shell = shell();
        let (failures, out, err) = script(&mut shell, "cd nowhere\nfrobnicate\nmkdir a\nls\n");
        assert_eq!(failures, 2);
        assert_eq!(out, "a/\n");
        assert_eq!(err.lines().count(), 2);
    }

    #[test]
    fn script_stops_at_exit() {
        let mut shell = shell();
        let (failures, _, _) = script(&mut shell, "mkdir a\nexit\nmkdir b\n");
        assert_eq!(failures, 0);
        assert_eq!(shell.filesystem().ls(None).unwrap().len(), 1);
    }

    #[test]
    fn interactive_session_prompts_until_eof() {
        let mut shell = shell();
        let mut out = Vec::new();
        let mut err = Vec::new();
        let input = Cursor::new("mkdir a\ncd a\nrm missing\n");

        Application::run_interactive(&mut shell, input, &mut out, &mut err).unwrap();

        let out = String::from_utf8(out).unwrap();
        assert_eq!(out, "/ $ / $ /a\n/a $ /a $ \n");
        assert!(!err.is_empty());
        assert_eq!(shell.filesystem().pwd(), "/a");
    }

    #[test]
    fn interactive_session_ends_on_exit() {
        let mut shell = shell();
        let mut out = Vec::new();
        let mut err = Vec::new();
        let input = Cursor::new("exit\nmkdir never\n");

        Application::run_interactive(&mut shell, input, &mut out, &mut err).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "/ $ ");
        assert!(shell.filesystem().ls(None).unwrap().is_empty());
    }

    #[compio::test]
    async fn failing_script_reports_count() {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        write!(file, "mkdir a\nrmdir b\n").expect("Failed to write to temp file");

        let config = RuntimeConfig {
            script: Some(file.path().to_path_buf()),
            seed: None,
            color: false,
        };
        let result = Application::run(config).await;
        assert!(matches!(
            result,
            Err(ApplicationError::ScriptFailedError { failures: 1 })
        ));
    }

    #[compio::test]
    async fn missing_script_is_a_read_error() {
        let config = RuntimeConfig {
            script: Some("nonexistent-script.txt".into()),
            seed: None,
            color: false,
        };
        let result = Application::run(config).await;
        assert!(matches!(
            result,
            Err(ApplicationError::ScriptReadError { .. })
        ));
    }

    #[compio::test]
    async fn script_with_invalid_utf8_is_rejected() {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(b"mkdir \xff\xfe\n")
            .expect("Failed to write to temp file");

        let config = RuntimeConfig {
            script: Some(file.path().to_path_buf()),
            seed: None,
            color: false,
        };
        let result = Application::run(config).await;
        assert!(matches!(
            result,
            Err(ApplicationError::ScriptEncodingError { .. })
        ));
    }
}
