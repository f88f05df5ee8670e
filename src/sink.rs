// ABOUTME: Result sink persisting captured command output to named files.
// ABOUTME: One plain-text file per name, overwritten on every run.

use std::path::{Path, PathBuf};

use crate::object::ObjectRef;

/// Name of the file a job's followed logs are written to.
///
/// Namespaces cannot contain `.`, so jobs sharing a name in different
/// namespaces never share a file.
pub fn job_log_name(job: &ObjectRef) -> String {
    format!("job-{}.{}.log", job.namespace(), job.name())
}

/// Writes captured output into a directory.
#[derive(Debug, Clone)]
pub struct OutputSink {
    dir: PathBuf,
}

impl OutputSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path a file of the given name is written to. Path separators in the
    /// name are flattened so a file can never escape the sink directory.
    pub fn path_for(&self, name: &str) -> PathBuf {
        let flat: String = name
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect();
        self.dir.join(flat)
    }

    /// Write `contents` to the named file, replacing any previous run's output.
    pub async fn write(&self, name: &str, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.path_for(name);
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(&path, contents).await?;
        tracing::debug!(path = %path.display(), bytes = contents.len(), "wrote command output");
        Ok(path)
    }
}

impl Default for OutputSink {
    fn default() -> Self {
        Self::new(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_log_name_is_qualified_by_namespace() {
        let batch = ObjectRef::new("Job", "migrate", Some("batch"));
        let unscoped = ObjectRef::new("Job", "migrate", None);

        assert_eq!(job_log_name(&batch), "job-batch.migrate.log");
        assert_eq!(job_log_name(&unscoped), "job-default.migrate.log");
    }

    #[test]
    fn path_for_flattens_separators() {
        let sink = OutputSink::new("/tmp/out");
        assert_eq!(
            sink.path_for("../etc/passwd"),
            PathBuf::from("/tmp/out/.._etc_passwd")
        );
    }

    #[tokio::test]
    async fn write_creates_directory_and_overwrites() {
        let temp = tempfile::tempdir().unwrap();
        let sink = OutputSink::new(temp.path().join("logs"));

        let path = sink.write("job-a.log", "first run").await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first run");

        sink.write("job-a.log", "second").await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
    }
}
