//! Invoking the MAME executable to get listings.
//!
//! One call, one response: run, wait, parse stdout. The async variants
//! offload the whole subprocess-and-parse to a worker thread so a calling
//! event loop is never blocked.

use std::path::PathBuf;
use std::process::Command;

use mamescope_xml::machine::parse_machines;
use mamescope_xml::softlist::parse_software_list;
use mamescope_xml::{MachineRecord, SoftwareListRecord};

use crate::error::Error;
use crate::settings::MameSettings;

/// Handle on the configured MAME executable.
#[derive(Debug, Clone)]
pub struct MameExecutable {
    path: PathBuf,
}

impl MameExecutable {
    pub fn new(settings: &MameSettings) -> Self {
        Self {
            path: settings.mame_executable_path.clone(),
        }
    }

    fn run(&self, args: &[&str]) -> Result<Vec<u8>, Error> {
        let output = Command::new(&self.path).args(args).output()?;
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            return Err(Error::Subprocess {
                status: output.status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }
        if !stderr.is_empty() {
            log::info!("{}", stderr.trim());
        }
        Ok(output.stdout)
    }

    /// `-listxml` for one machine (plus its referenced devices), or the
    /// whole listing when `basename` is `None`.
    pub fn listxml(&self, basename: Option<&str>) -> Result<Vec<MachineRecord>, Error> {
        let mut args = vec!["-listxml"];
        if let Some(basename) = basename {
            args.push(basename);
        }
        let stdout = self.run(&args)?;
        Ok(parse_machines(stdout.as_slice())?)
    }

    pub async fn listxml_async(
        &self,
        basename: Option<&str>,
    ) -> Result<Vec<MachineRecord>, Error> {
        let this = self.clone();
        let basename = basename.map(str::to_string);
        spawn_blocking(move || this.listxml(basename.as_deref())).await
    }

    /// `-getsoftlist` for one software list.
    pub fn getsoftlist(&self, name: &str) -> Result<SoftwareListRecord, Error> {
        let stdout = self.run(&["-getsoftlist", name])?;
        Ok(parse_software_list(stdout.as_slice())?)
    }

    pub async fn getsoftlist_async(&self, name: &str) -> Result<SoftwareListRecord, Error> {
        let this = self.clone();
        let name = name.to_string();
        spawn_blocking(move || this.getsoftlist(&name)).await
    }
}

/// Offload a blocking operation, propagating panics and mapping task
/// cancellation into an error.
pub(crate) async fn spawn_blocking<T, F>(f: F) -> Result<T, Error>
where
    F: FnOnce() -> Result<T, Error> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result,
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(e) => Err(Error::other(format!("blocking task failed: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_mame(dir: &std::path::Path, script: &str) -> MameSettings {
        use std::io::Write;
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("mame");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "#!/bin/sh\n{script}").unwrap();
        let mut perms = file.metadata().unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();

        MameSettings {
            mame_executable_path: path,
            ..Default::default()
        }
    }

    #[test]
    fn test_listxml_parses_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let settings = fake_mame(
            dir.path(),
            r#"echo '<mame><machine name="puckman"><description>Puck Man</description></machine></mame>'"#,
        );
        let machines = MameExecutable::new(&settings).listxml(None).unwrap();
        assert_eq!(machines.len(), 1);
        assert_eq!(machines[0].basename, "puckman");
    }

    #[test]
    fn test_nonzero_exit_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let settings = fake_mame(dir.path(), "echo 'unknown system' >&2\nexit 1");
        let result = MameExecutable::new(&settings).listxml(Some("nonsense"));
        match result {
            Err(Error::Subprocess { stderr, .. }) => assert!(stderr.contains("unknown system")),
            other => panic!("expected subprocess error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_listxml_async_matches_sync() {
        let dir = tempfile::tempdir().unwrap();
        let settings = fake_mame(
            dir.path(),
            r#"echo '<mame><machine name="puckman"><description>Puck Man</description></machine></mame>'"#,
        );
        let executable = MameExecutable::new(&settings);
        let sync_result = executable.listxml(None).unwrap();
        let async_result = executable.listxml_async(None).await.unwrap();
        assert_eq!(sync_result.len(), async_result.len());
        assert_eq!(sync_result[0].basename, async_result[0].basename);
    }
}
