use {
    crate::{Error, StandardJsonInput, StandardJsonOutput},
    std::{
        path::{Path, PathBuf},
        process::Stdio,
    },
    tokio::{io::AsyncWriteExt, process::Command},
};

/// A `solc` binary.
#[derive(Debug, Clone)]
pub struct Solc {
    binary: PathBuf,
}

/// Result of a successful compilation.
#[derive(Debug, Clone)]
pub struct Compilation {
    /// The output document exactly as the compiler produced it.
    pub raw: serde_json::Value,
    pub output: StandardJsonOutput,
}

impl Solc {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Returns the semantic version of the compiler, e.g. `0.8.0`.
    pub async fn version(&self) -> Result<String, Error> {
        let output = Command::new(&self.binary)
            .arg("--version")
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| self.spawn_error(source))?;
        if !output.status.success() {
            return Err(self.process_error(output.status, &output.stderr));
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_version(&stdout).ok_or_else(|| Error::UnknownVersion(stdout.trim().to_string()))
    }

    /// Fails unless the compiler reports exactly `expected`. A leading `v`
    /// is ignored.
    pub async fn ensure_version(&self, expected: &str) -> Result<(), Error> {
        let expected = expected.trim().trim_start_matches('v');
        let actual = self.version().await?;
        if actual != expected {
            return Err(Error::VersionMismatch {
                expected: expected.to_string(),
                actual,
            });
        }
        tracing::debug!(version = %actual, "compiler version matches");
        Ok(())
    }

    /// Runs the compiler on `input`. Fails if the compiler reports any
    /// error diagnostic.
    pub async fn compile(&self, input: &StandardJsonInput) -> Result<Compilation, Error> {
        let stdin = serde_json::to_vec(input)?;
        let mut child = Command::new(&self.binary)
            .arg("--standard-json")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| self.spawn_error(source))?;

        let mut pipe = child
            .stdin
            .take()
            .ok_or_else(|| self.spawn_error(std::io::ErrorKind::BrokenPipe.into()))?;
        let write = async move {
            pipe.write_all(&stdin).await?;
            // Closing stdin signals the end of the input document.
            drop(pipe);
            Ok::<_, std::io::Error>(())
        };
        let (written, output) = tokio::join!(write, child.wait_with_output());
        let output = output.map_err(|source| self.spawn_error(source))?;
        if !output.status.success() {
            return Err(self.process_error(output.status, &output.stderr));
        }
        written.map_err(|source| self.spawn_error(source))?;

        let raw: serde_json::Value = serde_json::from_slice(&output.stdout)?;
        let parsed: StandardJsonOutput = serde_json::from_value(raw.clone())?;
        parsed.ensure_success()?;
        tracing::debug!(
            sources = parsed.sources.len(),
            contracts = parsed.contracts.values().map(|c| c.len()).sum::<usize>(),
            "compiled"
        );
        Ok(Compilation {
            raw,
            output: parsed,
        })
    }

    fn spawn_error(&self, source: std::io::Error) -> Error {
        Error::Spawn {
            binary: self.binary.clone(),
            source,
        }
    }

    fn process_error(&self, status: std::process::ExitStatus, stderr: &[u8]) -> Error {
        Error::Process {
            binary: self.binary.clone(),
            status,
            stderr: String::from_utf8_lossy(stderr).trim().to_string(),
        }
    }
}

/// Extracts `0.8.0` from output like
/// `solc, the solidity compiler commandline interface\nVersion: 0.8.0+commit.c7dfd78e.Linux.g++`.
fn parse_version(output: &str) -> Option<String> {
    let line = output
        .lines()
        .find_map(|line| line.trim().strip_prefix("Version:"))?;
    let version = line.trim().split(['+', '-']).next()?;
    let is_semver = version.split('.').count() == 3
        && version
            .split('.')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()));
    is_semver.then(|| version.to_string())
}
