use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use tokio::process::Command;

use super::{MetadataGenerator, MetadataOutcome};
use crate::Result;

/// Generates metadata with `python setup.py egg_info`
#[derive(Debug, Clone)]
pub struct EggInfoGenerator {
    python: String,
    timeout: Duration,
}

impl EggInfoGenerator {
    pub fn new(python: impl Into<String>, timeout: Duration) -> Self {
        Self {
            python: python.into(),
            timeout,
        }
    }
}

#[async_trait]
impl MetadataGenerator for EggInfoGenerator {
    async fn generate(&self, source_dir: &Path) -> Result<MetadataOutcome> {
        let dist = source_dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        if !source_dir.join("setup.py").is_file() {
            debug!("egg_info skipped for {}: no setup.py", dist);
            return Ok(MetadataOutcome::Failed {
                reason: "no setup.py".to_string(),
            });
        }

        let child = Command::new(&self.python)
            .arg("setup.py")
            .arg("egg_info")
            .current_dir(source_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(self.timeout, child).await {
            Ok(output) => output?,
            Err(_) => {
                debug!("egg_info timed out for {}", dist);
                return Ok(MetadataOutcome::Failed {
                    reason: format!("timed out after {}s", self.timeout.as_secs()),
                });
            }
        };

        if output.status.success() {
            return Ok(MetadataOutcome::Generated);
        }

        debug!("egg_info failed for {}", dist);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let reason = stderr
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .map(|line| line.trim().to_string())
            .unwrap_or_else(|| output.status.to_string());
        Ok(MetadataOutcome::Failed { reason })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_setup_py() {
        let temp = TempDir::new().unwrap();
        let generator = EggInfoGenerator::new("python3", Duration::from_secs(5));

        let outcome = generator.generate(temp.path()).await.unwrap();
        assert_eq!(
            outcome,
            MetadataOutcome::Failed {
                reason: "no setup.py".to_string()
            }
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_interpreter() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("setup.py"), "").unwrap();
        // `false` ignores its arguments and exits non-zero
        let generator = EggInfoGenerator::new("false", Duration::from_secs(5));

        let outcome = generator.generate(temp.path()).await.unwrap();
        assert!(matches!(outcome, MetadataOutcome::Failed { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_succeeding_interpreter() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("setup.py"), "").unwrap();
        let generator = EggInfoGenerator::new("true", Duration::from_secs(5));

        let outcome = generator.generate(temp.path()).await.unwrap();
        assert_eq!(outcome, MetadataOutcome::Generated);
    }

    #[tokio::test]
    async fn test_missing_interpreter_is_an_error() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("setup.py"), "").unwrap();
        let generator =
            EggInfoGenerator::new("pydeps-no-such-python-binary", Duration::from_secs(5));

        assert!(generator.generate(temp.path()).await.is_err());
    }
}
