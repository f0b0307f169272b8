//! FTP implementation of [`Transfer`] on top of `suppaftp`.

use super::{Transfer, TransferOutcome};
use crate::config::TransferConfig;
use crate::models::FtpTarget;
use std::fs::File;
use std::io::{self, BufReader};
use std::net::ToSocketAddrs;
use std::path::Path;
use std::time::Duration;
use suppaftp::types::FileType;
use suppaftp::{FtpError, FtpStream};
use tracing::{error, info};

const ANONYMOUS_USER: &str = "anonymous";
const ANONYMOUS_PASSWORD: &str = "anonymous@";

#[derive(Debug, Clone)]
pub struct FtpTransfer {
    connect_timeout: Duration,
    io_timeout: Option<Duration>,
}

impl Default for FtpTransfer {
    fn default() -> Self {
        Self::from_config(&TransferConfig::default())
    }
}

impl FtpTransfer {
    pub fn new(connect_timeout: Duration, io_timeout: Option<Duration>) -> Self {
        Self {
            connect_timeout,
            io_timeout,
        }
    }

    pub fn from_config(config: &TransferConfig) -> Self {
        Self::new(
            Duration::from_secs(config.connect_timeout_secs),
            (config.io_timeout_secs > 0).then(|| Duration::from_secs(config.io_timeout_secs)),
        )
    }

    /// Open the control connection and log in.
    fn connect(&self, target: &FtpTarget) -> Result<FtpStream, FtpError> {
        let addr = (target.host.trim(), target.port)
            .to_socket_addrs()
            .map_err(FtpError::ConnectionError)?
            .next()
            .ok_or_else(|| {
                FtpError::ConnectionError(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("could not resolve {}", target.host),
                ))
            })?;

        let mut ftp = FtpStream::connect_timeout(addr, self.connect_timeout)?;
        // Data connections go to the control host, whatever address PASV names.
        ftp.set_passive_nat_workaround(true);
        ftp.get_ref()
            .set_read_timeout(self.io_timeout)
            .map_err(FtpError::ConnectionError)?;
        ftp.get_ref()
            .set_write_timeout(self.io_timeout)
            .map_err(FtpError::ConnectionError)?;

        let (user, password) = credentials(target);
        ftp.login(user, password)?;
        Ok(ftp)
    }

    fn probe(&self, target: &FtpTarget) -> Result<String, FtpError> {
        let mut ftp = self.connect(target)?;
        let cwd = ftp.pwd()?;
        ftp.quit()?;
        Ok(cwd)
    }

    fn store(&self, local_file: &Path, target: &FtpTarget) -> Result<u64, FtpError> {
        let remote_name = local_file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                FtpError::ConnectionError(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("{} has no file name", local_file.display()),
                ))
            })?;
        let mut reader = BufReader::new(File::open(local_file).map_err(FtpError::ConnectionError)?);

        let mut ftp = self.connect(target)?;
        ftp.transfer_type(FileType::Binary)?;
        let written = ftp.put_file(&remote_name, &mut reader)?;
        ftp.quit()?;
        Ok(written)
    }
}

/// Classic FTP client convention: no user means anonymous login.
fn credentials(target: &FtpTarget) -> (&str, &str) {
    if target.username.is_empty() || target.username == ANONYMOUS_USER {
        let password = if target.password.is_empty() {
            ANONYMOUS_PASSWORD
        } else {
            target.password.as_str()
        };
        (ANONYMOUS_USER, password)
    } else {
        (target.username.as_str(), target.password.as_str())
    }
}

impl Transfer for FtpTransfer {
    fn test_connection(&self, target: &FtpTarget) -> TransferOutcome {
        match self.probe(target) {
            Ok(cwd) => {
                info!("FTP connection to {}:{} ok (cwd {})", target.host, target.port, cwd);
                TransferOutcome::success("Connection successful")
            }
            Err(e) => {
                error!("FTP connection to {}:{} failed: {}", target.host, target.port, e);
                TransferOutcome::failure(format!("Connection error: {}", e))
            }
        }
    }

    fn upload(&self, local_file: &Path, target: &FtpTarget) -> TransferOutcome {
        match self.store(local_file, target) {
            Ok(bytes) => {
                info!(
                    "Uploaded {} ({} bytes) to {}:{}",
                    local_file.display(),
                    bytes,
                    target.host,
                    target.port
                );
                TransferOutcome::success("File uploaded to FTP server")
            }
            Err(e) => {
                error!("Upload of {} to {} failed: {}", local_file.display(), target.host, e);
                TransferOutcome::failure(format!("FTP upload error: {}", e))
            }
        }
    }
}
