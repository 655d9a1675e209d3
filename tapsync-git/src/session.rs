//! Ephemeral signing session.
//!
//! The armored secret key is written into a private temporary GnuPG home and
//! imported there, so the host keyring is never touched. Every git command
//! that may sign must carry [`SigningSession::env`]. The directory lives until
//! the session is dropped or [`SigningSession::close`]d; either way the
//! `gpg-agent` started for that home is stopped first.

use std::fmt;
use std::path::Path;

use tempfile::TempDir;

use crate::error::{io_err, GitError};
use crate::runner::{CommandRunner, CommandSpec};

const KEY_FILE: &str = "signing-key.asc";

pub struct SigningSession<'r> {
    runner: &'r dyn CommandRunner,
    /// `None` once closed.
    home: Option<TempDir>,
    fingerprint: String,
}

impl fmt::Debug for SigningSession<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningSession")
            .field("home", &self.home.as_ref().map(TempDir::path))
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}

impl<'r> SigningSession<'r> {
    /// Import `armored_key` into a fresh GnuPG home and identify its fingerprint.
    pub fn import(runner: &'r dyn CommandRunner, armored_key: &str) -> Result<Self, GitError> {
        if !armored_key.contains("BEGIN PGP PRIVATE KEY BLOCK") {
            return Err(GitError::Signing(
                "key material is not an armored PGP private key".to_string(),
            ));
        }

        let home = tempfile::Builder::new()
            .prefix("tapsync-gnupg-")
            .tempdir()
            .map_err(|e| io_err(std::env::temp_dir(), e))?;
        set_private_permissions(home.path(), 0o700)?;

        let key_path = home.path().join(KEY_FILE);
        std::fs::write(&key_path, armored_key).map_err(|e| io_err(&key_path, e))?;
        set_private_permissions(&key_path, 0o600)?;

        // From here on, dropping the session also stops any agent the import started.
        let mut session = Self {
            runner,
            home: Some(home),
            fingerprint: String::new(),
        };
        let gnupg_home = session.gnupg_home().display().to_string();
        runner
            .run_checked(
                &CommandSpec::new("gpg")
                    .args(["--batch", "--yes", "--import"])
                    .arg(key_path.display().to_string())
                    .env("GNUPGHOME", gnupg_home.clone()),
            )
            .map_err(|e| GitError::Signing(format!("gpg import: {e}")))?;

        let listing = runner
            .run_checked(
                &CommandSpec::new("gpg")
                    .args(["--batch", "--with-colons", "--list-secret-keys"])
                    .env("GNUPGHOME", gnupg_home),
            )
            .map_err(|e| GitError::Signing(format!("gpg list: {e}")))?;

        session.fingerprint = parse_secret_fingerprint(&listing.stdout).ok_or_else(|| {
            GitError::Signing("imported key has no secret key fingerprint".to_string())
        })?;
        tracing::info!("imported signing key {}", session.fingerprint);
        Ok(session)
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn gnupg_home(&self) -> &Path {
        self.home
            .as_ref()
            .map(TempDir::path)
            .unwrap_or_else(|| Path::new(""))
    }

    /// `GNUPGHOME` assignment for child processes.
    pub fn env(&self) -> (String, String) {
        ("GNUPGHOME".to_string(), self.gnupg_home().display().to_string())
    }

    /// Stop the agent and remove the GnuPG home now instead of at drop.
    pub fn close(mut self) -> Result<(), GitError> {
        let Some(home) = self.home.take() else {
            return Ok(());
        };
        stop_agent(self.runner, home.path());
        let path = home.path().to_path_buf();
        home.close().map_err(|e| io_err(path, e))
    }
}

impl Drop for SigningSession<'_> {
    fn drop(&mut self) {
        if let Some(home) = &self.home {
            stop_agent(self.runner, home.path());
        }
    }
}

/// `gpgconf --kill gpg-agent` for the agent bound to `home`. Failure is only logged.
fn stop_agent(runner: &dyn CommandRunner, home: &Path) {
    let spec = CommandSpec::new("gpgconf")
        .args(["--kill", "gpg-agent"])
        .env("GNUPGHOME", home.display().to_string());
    if let Err(err) = runner.run_checked(&spec) {
        tracing::warn!("failed to stop gpg-agent for {}: {err}", home.display());
    }
}

/// Fingerprint of the first `sec` key in `gpg --with-colons` output.
pub fn parse_secret_fingerprint(colons: &str) -> Option<String> {
    let mut in_secret = false;
    for line in colons.lines() {
        let mut fields = line.split(':');
        match fields.next() {
            Some("sec") => in_secret = true,
            Some("ssb") | Some("pub") | Some("sub") => in_secret = false,
            Some("fpr") if in_secret => {
                return fields.nth(8).filter(|f| !f.is_empty()).map(str::to_string);
            }
            _ => {}
        }
    }
    None
}

#[cfg(unix)]
fn set_private_permissions(path: &Path, mode: u32) -> Result<(), GitError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
        .map_err(|e| io_err(path, e))
}

#[cfg(not(unix))]
fn set_private_permissions(_path: &Path, _mode: u32) -> Result<(), GitError> {
    Ok(())
}
