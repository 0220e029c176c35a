//! Printer configuration
//!
//! # Environment variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | ESCPOS_LINE_WIDTH | 32 | Characters per line |
//! | ESCPOS_CODE_PAGE | PC437 | Code page the printer starts in |
//! | ESCPOS_PRINTER_ADDR | - | Network printer, e.g. `192.168.1.100:9100` |
//! | ESCPOS_DEVICE_PATH | - | Device node or spool file, e.g. `/dev/usb/lp0` |
//! | ESCPOS_PRINTER_NAME | - | Windows printer name |
//!
//! When more than one target is set, the address wins over the device path,
//! and the device path over the printer name.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::document::DEFAULT_LINE_WIDTH;
use crate::encoding::CodePage;
use crate::error::{PrintError, PrintResult};
use crate::printer::{ConfiguredPrinter, DevicePrinter, NetworkPrinter};

/// Where print jobs are sent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PrinterTarget {
    /// Raw TCP, `host:port`
    Network { addr: String },
    /// Device node or file
    Device { path: PathBuf },
    /// Windows spooler printer
    Windows { name: String },
}

/// Printer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinterConfig {
    /// Characters per line
    pub line_width: usize,
    /// Code page text is encoded with until a document selects another
    pub code_page: CodePage,
    pub target: Option<PrinterTarget>,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            line_width: DEFAULT_LINE_WIDTH,
            code_page: CodePage::default(),
            target: None,
        }
    }
}

impl PrinterConfig {
    /// Load configuration from environment variables
    ///
    /// Unset or unparsable values fall back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let line_width = lookup("ESCPOS_LINE_WIDTH")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_LINE_WIDTH);

        let code_page = match lookup("ESCPOS_CODE_PAGE") {
            Some(v) => v.parse().unwrap_or_else(|e| {
                warn!(error = %e, "Ignoring ESCPOS_CODE_PAGE");
                CodePage::default()
            }),
            None => CodePage::default(),
        };

        let target = if let Some(addr) = lookup("ESCPOS_PRINTER_ADDR") {
            Some(PrinterTarget::Network { addr })
        } else if let Some(path) = lookup("ESCPOS_DEVICE_PATH") {
            Some(PrinterTarget::Device { path: path.into() })
        } else {
            lookup("ESCPOS_PRINTER_NAME").map(|name| PrinterTarget::Windows { name })
        };

        Self {
            line_width,
            code_page,
            target,
        }
    }

    /// Parse configuration from JSON; missing fields use defaults
    pub fn from_json(json: &str) -> PrintResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| PrintError::InvalidConfig(format!("Invalid JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values no printer accepts
    pub fn validate(&self) -> PrintResult<()> {
        if self.line_width == 0 {
            return Err(PrintError::InvalidConfig(
                "line_width must be positive".to_string(),
            ));
        }

        match &self.target {
            Some(PrinterTarget::Network { addr }) if addr.trim().is_empty() => Err(
                PrintError::InvalidConfig("Empty printer address".to_string()),
            ),
            Some(PrinterTarget::Device { path }) if path.as_os_str().is_empty() => Err(
                PrintError::InvalidConfig("Empty device path".to_string()),
            ),
            Some(PrinterTarget::Windows { name }) if name.trim().is_empty() => Err(
                PrintError::InvalidConfig("Empty printer name".to_string()),
            ),
            _ => Ok(()),
        }
    }

    /// Create the printer adapter for the configured target
    pub fn open_printer(&self) -> PrintResult<ConfiguredPrinter> {
        self.validate()?;
        match &self.target {
            None => Err(PrintError::InvalidConfig(
                "No printer target configured".to_string(),
            )),
            Some(PrinterTarget::Network { addr }) => {
                Ok(ConfiguredPrinter::Network(NetworkPrinter::from_addr(addr)?))
            }
            Some(PrinterTarget::Device { path }) => {
                Ok(ConfiguredPrinter::Device(DevicePrinter::new(path.clone())))
            }
            #[cfg(windows)]
            Some(PrinterTarget::Windows { name }) => Ok(ConfiguredPrinter::Windows(
                crate::printer::WindowsPrinter::new(name),
            )),
            #[cfg(not(windows))]
            Some(PrinterTarget::Windows { name }) => Err(PrintError::InvalidConfig(format!(
                "Windows printer {} is not available on this platform",
                name
            ))),
        }
    }
}
