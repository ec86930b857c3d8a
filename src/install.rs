//! Installing and removing the PNG compressor.
//!
//! Only prebuilt Linux x86_64 releases are supported. The installer
//! downloads a pinned `oxipng` release archive, unpacks it into a
//! temporary directory, moves the binary into the install directory
//! (`/usr/local/bin` by default), and checks that it runs.

use std::fs::{self, File};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::process::Command;

use flate2::read::GzDecoder;
use reqwest::blocking::Client;
use tar::Archive;
use tempfile::TempDir;

use crate::error::VidshotError;
use crate::tools::{run_captured, stderr_text};

/// Pinned compressor release.
pub const OXIPNG_VERSION: &str = "9.1.2";

/// Name of the compressor executable.
pub const BINARY_NAME: &str = "oxipng";

/// Default install directory.
pub const DEFAULT_INSTALL_DIR: &str = "/usr/local/bin";

/// Release archive URL for the pinned version.
pub fn release_url() -> String {
    format!(
        "https://github.com/shssoichiro/oxipng/releases/download/v{OXIPNG_VERSION}/oxipng-{OXIPNG_VERSION}-x86_64-unknown-linux-gnu.tar.gz"
    )
}

/// Reject any platform other than Linux on x86_64.
pub fn check_platform(os: &str, arch: &str) -> Result<(), VidshotError> {
    if os != "linux" {
        return Err(VidshotError::UnsupportedPlatform(
            "the oxipng installer only supports Linux".to_string(),
        ));
    }
    match arch {
        "x86_64" => Ok(()),
        "aarch64" => Err(VidshotError::UnsupportedPlatform(
            "ARM (aarch64) is not supported by the oxipng installer".to_string(),
        )),
        other => Err(VidshotError::UnsupportedPlatform(format!(
            "no oxipng build available for the {other} architecture"
        ))),
    }
}

/// What [`Installer::uninstall`] found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UninstallOutcome {
    /// The binary was removed from this path.
    Removed(PathBuf),
    /// Nothing was installed at this path.
    NotInstalled(PathBuf),
}

/// A milestone of [`Installer::install`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallStep {
    /// The release download is starting.
    Downloading {
        /// Archive URL.
        url: String,
    },
    /// The archive is on disk.
    Downloaded {
        /// Archive size in bytes.
        bytes: u64,
    },
}

/// Installs the compressor into a binary directory.
#[derive(Debug, Clone)]
pub struct Installer {
    install_dir: PathBuf,
    release_url: String,
    client: Option<Client>,
}

impl Default for Installer {
    fn default() -> Self {
        Self::new(DEFAULT_INSTALL_DIR)
    }
}

impl Installer {
    /// Create an installer targeting `install_dir`.
    pub fn new(install_dir: impl Into<PathBuf>) -> Self {
        Self {
            install_dir: install_dir.into(),
            release_url: release_url(),
            client: None,
        }
    }

    /// Download the archive from `url` instead of the pinned release.
    #[must_use]
    pub fn with_release_url(mut self, url: impl Into<String>) -> Self {
        self.release_url = url.into();
        self
    }

    /// Download through an existing HTTP client.
    #[must_use]
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Where the binary is (or would be) installed.
    pub fn binary_path(&self) -> PathBuf {
        self.install_dir.join(BINARY_NAME)
    }

    /// Download, unpack, and install the release, calling `on_step` as
    /// the download starts and ends.
    ///
    /// Returns the output of `oxipng --version`.
    ///
    /// # Errors
    ///
    /// Fails before touching anything on an unsupported platform, and on
    /// any download, unpack, move, or verification error.
    pub fn install(&self, mut on_step: impl FnMut(InstallStep)) -> Result<String, VidshotError> {
        check_platform(std::env::consts::OS, std::env::consts::ARCH)?;

        let scratch = TempDir::new()?;
        let archive = scratch.path().join("oxipng.tar.gz");
        on_step(InstallStep::Downloading {
            url: self.release_url.clone(),
        });
        let bytes = self.download(&archive)?;
        on_step(InstallStep::Downloaded { bytes });
        self.install_from_archive(&archive)
    }

    /// Install from an already downloaded `.tar.gz` release archive.
    pub fn install_from_archive(&self, archive: &Path) -> Result<String, VidshotError> {
        let scratch = TempDir::new()?;
        let extract_dir = scratch.path().join("extracted");
        fs::create_dir_all(&extract_dir)?;

        let file = File::open(archive)?;
        Archive::new(GzDecoder::new(file))
            .unpack(&extract_dir)
            .map_err(|error| VidshotError::ArchiveError(format!("unpacking failed: {error}")))?;

        let binary = find_binary(&extract_dir, BINARY_NAME)?.ok_or_else(|| {
            VidshotError::ArchiveError(format!("no {BINARY_NAME} executable in the archive"))
        })?;

        let target = self.binary_path();
        fs::create_dir_all(&self.install_dir)
            .and_then(|()| move_file(&binary, &target))
            .and_then(|()| make_executable(&target))
            .map_err(|error| VidshotError::InstallFailed(format!("{}: {error}", target.display())))?;
        log::debug!("Installed {} to {}", BINARY_NAME, target.display());

        verify(&target)
    }

    /// Remove the installed binary, if any.
    pub fn uninstall(&self) -> Result<UninstallOutcome, VidshotError> {
        let target = self.binary_path();
        match fs::remove_file(&target) {
            Ok(()) => Ok(UninstallOutcome::Removed(target)),
            Err(error) if error.kind() == ErrorKind::NotFound => {
                Ok(UninstallOutcome::NotInstalled(target))
            }
            Err(error) => Err(VidshotError::InstallFailed(format!(
                "could not remove {}: {error}",
                target.display()
            ))),
        }
    }
}

impl Installer {
    fn download(&self, destination: &Path) -> Result<u64, VidshotError> {
        let url = &self.release_url;
        let failed = |reason: String| VidshotError::DownloadFailed {
            url: url.clone(),
            reason,
        };

        let client = match &self.client {
            Some(client) => client.clone(),
            None => Client::builder().build()?,
        };
        let mut response = client
            .get(url)
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(|error| failed(error.to_string()))?;

        let mut file = File::create(destination)?;
        response
            .copy_to(&mut file)
            .map_err(|error| failed(error.to_string()))
    }
}

/// Depth-first search for a regular file called `name` under `directory`.
fn find_binary(directory: &Path, name: &str) -> io::Result<Option<PathBuf>> {
    let mut subdirectories = Vec::new();
    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        if file_type.is_file() && entry.file_name() == name {
            return Ok(Some(entry.path()));
        }
        if file_type.is_dir() {
            subdirectories.push(entry.path());
        }
    }

    for subdirectory in subdirectories {
        if let Some(found) = find_binary(&subdirectory, name)? {
            return Ok(Some(found));
        }
    }
    Ok(None)
}

/// Rename, falling back to copy + remove across filesystems.
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to)?;
    fs::remove_file(from)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}

fn verify(binary: &Path) -> Result<String, VidshotError> {
    let output = run_captured(Command::new(binary).arg("--version"))
        .map_err(|error| VidshotError::InstallFailed(format!("version check failed: {error}")))?;
    if !output.status.success() {
        return Err(VidshotError::InstallFailed(format!(
            "version check failed: {}",
            stderr_text(&output)
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
