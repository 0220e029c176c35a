//! Printer adapters for sending ESC/POS data
//!
//! Supports:
//! - Network printers (TCP port 9100)
//! - Device nodes and spool files (e.g. `/dev/usb/lp0`)
//! - Windows driver printers (via the Win32 spooler)
//! - In-memory capture

use crate::error::{PrintError, PrintResult};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{info, instrument};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Trait for printer adapters
///
/// A printer accepts one ordered byte payload per call. Failures are final for
/// that payload; adapters do not retry.
#[allow(async_fn_in_trait)]
pub trait Printer {
    /// Send raw ESC/POS data to the printer
    async fn print(&self, data: &[u8]) -> PrintResult<()>;
}

/// Network printer (TCP port 9100)
///
/// Most thermal printers support raw TCP printing on port 9100.
#[derive(Debug, Clone)]
pub struct NetworkPrinter {
    addr: SocketAddr,
    timeout: Duration,
}

impl NetworkPrinter {
    /// Create a new network printer
    pub fn new(host: &str, port: u16) -> PrintResult<Self> {
        Self::from_addr(&format!("{}:{}", host, port))
    }

    /// Create from a socket address string (e.g., "192.168.1.100:9100")
    pub fn from_addr(addr: &str) -> PrintResult<Self> {
        let addr: SocketAddr = addr
            .parse()
            .map_err(|_| PrintError::InvalidConfig(format!("Invalid address: {}", addr)))?;

        Ok(Self {
            addr,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Set connection timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the printer address
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

impl Printer for NetworkPrinter {
    #[instrument(skip(data), fields(addr = %self.addr, data_len = data.len()))]
    async fn print(&self, data: &[u8]) -> PrintResult<()> {
        info!("Connecting to printer");

        let mut stream = tokio::time::timeout(self.timeout, TcpStream::connect(self.addr))
            .await
            .map_err(|_| PrintError::Timeout(format!("Connection timeout: {}", self.addr)))?
            .map_err(|e| PrintError::Connection(format!("{}: {}", self.addr, e)))?;

        info!("Connected, sending {} bytes", data.len());

        stream.write_all(data).await.map_err(|e| {
            PrintError::Io(std::io::Error::new(
                e.kind(),
                format!("Write failed: {}", e),
            ))
        })?;

        stream.flush().await?;
        stream.shutdown().await?;

        info!("Print job sent successfully");
        Ok(())
    }
}

/// Printer reached through a device node or file path
///
/// The path is opened for each job and closed when the job is written.
/// Regular files are appended to, so a file path acts as a spool file.
#[derive(Debug, Clone)]
pub struct DevicePrinter {
    path: PathBuf,
    timeout: Duration,
}

impl DevicePrinter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set write timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn write_job(&self, data: &[u8]) -> PrintResult<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| PrintError::Offline(format!("{}: {}", self.path.display(), e)))?;

        file.write_all(data).await?;
        file.flush().await?;
        Ok(())
    }
}

impl Printer for DevicePrinter {
    #[instrument(skip(data), fields(path = %self.path.display(), data_len = data.len()))]
    async fn print(&self, data: &[u8]) -> PrintResult<()> {
        tokio::time::timeout(self.timeout, self.write_job(data))
            .await
            .map_err(|_| PrintError::Timeout(format!("Write timeout: {}", self.path.display())))??;

        info!("Print job written to device");
        Ok(())
    }
}

/// Printer that keeps every payload in memory
///
/// Useful for previews and tests.
#[derive(Debug, Default)]
pub struct MemoryPrinter {
    jobs: Mutex<Vec<Vec<u8>>>,
}

impl MemoryPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Payloads received so far, in order
    pub fn jobs(&self) -> Vec<Vec<u8>> {
        self.jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Printer for MemoryPrinter {
    async fn print(&self, data: &[u8]) -> PrintResult<()> {
        self.jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(data.to_vec());
        Ok(())
    }
}

/// Printer adapter chosen at runtime from [`crate::PrinterConfig`]
#[derive(Debug, Clone)]
pub enum ConfiguredPrinter {
    Network(NetworkPrinter),
    Device(DevicePrinter),
    #[cfg(windows)]
    Windows(WindowsPrinter),
}

impl Printer for ConfiguredPrinter {
    async fn print(&self, data: &[u8]) -> PrintResult<()> {
        match self {
            ConfiguredPrinter::Network(p) => p.print(data).await,
            ConfiguredPrinter::Device(p) => p.print(data).await,
            #[cfg(windows)]
            ConfiguredPrinter::Windows(p) => p.print(data).await,
        }
    }
}

/// Windows driver printer
///
/// Sends RAW jobs through the Win32 spooler.
#[cfg(windows)]
#[derive(Debug, Clone)]
pub struct WindowsPrinter {
    name: String,
    job_name: String,
}

#[cfg(windows)]
impl WindowsPrinter {
    /// Create a printer with a specific name
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            job_name: "ESC/POS document".to_string(),
        }
    }

    /// Set the document name shown in the spooler queue
    pub fn with_job_name(mut self, job_name: &str) -> Self {
        self.job_name = job_name.to_string();
        self
    }

    /// Get the printer name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Send raw ESC/POS data synchronously (for use from sync/blocking contexts)
    pub fn print_sync(&self, data: &[u8]) -> PrintResult<()> {
        let mut job = spool::SpoolJob::open(&self.name, &self.job_name)?;
        job.write(data)
    }
}

#[cfg(windows)]
impl Printer for WindowsPrinter {
    async fn print(&self, data: &[u8]) -> PrintResult<()> {
        // Windows printing is synchronous, run in blocking task
        let printer = self.clone();
        let data = data.to_vec();

        tokio::task::spawn_blocking(move || printer.print_sync(&data))
            .await
            .map_err(|e| PrintError::WindowsPrinter(format!("Task join failed: {}", e)))?
    }
}

#[cfg(windows)]
mod spool {
    use crate::error::{PrintError, PrintResult};
    use core::ffi::c_void;
    use windows::Win32::Graphics::Printing::{
        ClosePrinter, DOC_INFO_1W, EndDocPrinter, EndPagePrinter, OpenPrinterW, PRINTER_HANDLE,
        StartDocPrinterW, StartPagePrinter, WritePrinter,
    };
    use windows::core::{PCWSTR, PWSTR};

    fn to_wide(s: &str) -> Vec<u16> {
        s.encode_utf16().chain(std::iter::once(0)).collect()
    }

    /// An open RAW spooler job
    ///
    /// Dropping the job ends the page and document that were started and
    /// closes the printer handle.
    pub(super) struct SpoolJob {
        handle: PRINTER_HANDLE,
        doc_started: bool,
        page_started: bool,
    }

    impl SpoolJob {
        pub(super) fn open(name: &str, job_name: &str) -> PrintResult<Self> {
            let mut handle = PRINTER_HANDLE::default();
            let name_w = to_wide(name);

            unsafe {
                OpenPrinterW(PCWSTR::from_raw(name_w.as_ptr()), &mut handle, None)
                    .map_err(|_| PrintError::Offline(name.to_string()))?;
            }

            let mut job = Self {
                handle,
                doc_started: false,
                page_started: false,
            };

            let doc_name_w = to_wide(job_name);
            let datatype_w = to_wide("RAW");
            let doc_info = DOC_INFO_1W {
                pDocName: PWSTR(doc_name_w.as_ptr() as *mut _),
                pOutputFile: PWSTR::null(),
                pDatatype: PWSTR(datatype_w.as_ptr() as *mut _),
            };

            unsafe {
                if StartDocPrinterW(job.handle, 1, &doc_info as *const DOC_INFO_1W) == 0 {
                    return Err(PrintError::WindowsPrinter(
                        "StartDocPrinter failed".to_string(),
                    ));
                }
                job.doc_started = true;

                if !StartPagePrinter(job.handle).as_bool() {
                    return Err(PrintError::WindowsPrinter(
                        "StartPagePrinter failed".to_string(),
                    ));
                }
                job.page_started = true;
            }

            Ok(job)
        }

        pub(super) fn write(&mut self, data: &[u8]) -> PrintResult<()> {
            let mut written: u32 = 0;
            let ok = unsafe {
                WritePrinter(
                    self.handle,
                    data.as_ptr() as *const c_void,
                    data.len() as u32,
                    &mut written,
                )
            };

            if !ok.as_bool() {
                return Err(PrintError::WindowsPrinter(
                    "WritePrinter failed".to_string(),
                ));
            }

            if written != data.len() as u32 {
                return Err(PrintError::WindowsPrinter("Incomplete write".to_string()));
            }

            Ok(())
        }
    }

    impl Drop for SpoolJob {
        fn drop(&mut self) {
            unsafe {
                if self.page_started {
                    let _ = EndPagePrinter(self.handle);
                }
                if self.doc_started {
                    let _ = EndDocPrinter(self.handle);
                }
                let _ = ClosePrinter(self.handle);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_printer_new() {
        let printer = NetworkPrinter::new("192.168.1.100", 9100).unwrap();
        assert_eq!(printer.addr().port(), 9100);
    }

    #[test]
    fn test_network_printer_from_addr() {
        let printer = NetworkPrinter::from_addr("192.168.1.100:9100").unwrap();
        assert_eq!(printer.addr().port(), 9100);
    }

    #[test]
    fn test_invalid_addr() {
        let result = NetworkPrinter::from_addr("invalid");
        assert!(matches!(result, Err(PrintError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_memory_printer_keeps_jobs_in_order() {
        let printer = MemoryPrinter::new();
        printer.print(b"one").await.unwrap();
        printer.print(b"two").await.unwrap();
        assert_eq!(printer.jobs(), vec![b"one".to_vec(), b"two".to_vec()]);
    }
}
