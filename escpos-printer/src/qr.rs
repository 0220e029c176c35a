//! QR code command block (`GS ( k`, cn = 49)
//!
//! A [`QrCode`] is lowered to its full command sequence at construction:
//! model (fn 165), module size (fn 167), error correction (fn 169),
//! store data (fn 180) and print (fn 181).

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::command::GS;

/// Largest value of the store-data length field (payload + 3 header bytes).
pub const MAX_STORE_LEN: usize = 7092;

/// Largest payload that fits in one store-data command.
pub const MAX_PAYLOAD: usize = MAX_STORE_LEN - 3;

/// QR symbol model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QrModel {
    Model1,
    #[default]
    Model2,
    Micro,
}

impl QrModel {
    pub const fn value(self) -> u8 {
        match self {
            QrModel::Model1 => 49,
            QrModel::Model2 => 50,
            QrModel::Micro => 51,
        }
    }
}

/// Error correction level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QrErrorCorrection {
    /// ~7% recovery
    #[default]
    L,
    /// ~15% recovery
    M,
    /// ~25% recovery
    Q,
    /// ~30% recovery
    H,
}

impl QrErrorCorrection {
    pub const fn value(self) -> u8 {
        match self {
            QrErrorCorrection::L => 48,
            QrErrorCorrection::M => 49,
            QrErrorCorrection::Q => 50,
            QrErrorCorrection::H => 51,
        }
    }
}

/// A finished QR code command block.
///
/// Payloads longer than [`MAX_PAYLOAD`] are cut silently; the length field
/// always describes the bytes actually stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrCode {
    data: Vec<u8>,
    dropped: usize,
}

impl QrCode {
    /// Build the command block.
    ///
    /// `module_size` is the dot size of one module; printers commonly accept
    /// 1-16 and the value is sent as-is.
    pub fn new(
        model: QrModel,
        module_size: u8,
        error_correction: QrErrorCorrection,
        payload: impl AsRef<[u8]>,
    ) -> Self {
        let payload = payload.as_ref();
        let stored = &payload[..payload.len().min(MAX_PAYLOAD)];
        let dropped = payload.len() - stored.len();
        if dropped > 0 {
            warn!(
                len = payload.len(),
                dropped, "QR payload exceeds store limit, truncating"
            );
        }

        let mut data = Vec::with_capacity(stored.len() + 40);

        // Function 165: Select model
        data.extend_from_slice(&[GS, b'(', b'k', 0x04, 0x00, 0x31, 0x41, model.value(), 0x00]);

        // Function 167: Set module size
        data.extend_from_slice(&[GS, b'(', b'k', 0x03, 0x00, 0x31, 0x43, module_size]);

        // Function 169: Set error correction
        data.extend_from_slice(&[
            GS,
            b'(',
            b'k',
            0x03,
            0x00,
            0x31,
            0x45,
            error_correction.value(),
        ]);

        // Function 180: Store data
        let len = stored.len() + 3;
        let p_l = (len & 0xFF) as u8;
        let p_h = ((len >> 8) & 0xFF) as u8;
        data.extend_from_slice(&[GS, b'(', b'k', p_l, p_h, 0x31, 0x50, 0x30]);
        data.extend_from_slice(stored);

        // Function 181: Print
        data.extend_from_slice(&[GS, b'(', b'k', 0x03, 0x00, 0x31, 0x51, 0x30]);

        Self { data, dropped }
    }

    /// Model 2, module size 6, level M
    pub fn model2(payload: impl AsRef<[u8]>) -> Self {
        Self::new(QrModel::Model2, 6, QrErrorCorrection::M, payload)
    }

    /// The complete command block
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Payload bytes dropped by truncation
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

impl AsRef<[u8]> for QrCode {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // model(9) + size(8) + level(8) + store header(8)
    const HEADER: usize = 33;
    const TRAILER: [u8; 8] = [0x1D, b'(', b'k', 0x03, 0x00, 0x31, 0x51, 0x30];

    fn store_len(qr: &QrCode) -> usize {
        let b = qr.as_bytes();
        b[28] as usize | (b[29] as usize) << 8
    }

    #[test]
    fn test_block_layout() {
        let qr = QrCode::new(QrModel::Micro, 8, QrErrorCorrection::H, b"hello");
        let expected: Vec<u8> = [
            &[0x1D, b'(', b'k', 0x04, 0x00, 0x31, 0x41, 51, 0x00][..],
            &[0x1D, b'(', b'k', 0x03, 0x00, 0x31, 0x43, 8][..],
            &[0x1D, b'(', b'k', 0x03, 0x00, 0x31, 0x45, 51][..],
            &[0x1D, b'(', b'k', 8, 0, 0x31, 0x50, 0x30][..],
            &b"hello"[..],
            &TRAILER[..],
        ]
        .concat();
        assert_eq!(qr.as_bytes(), &expected[..]);
        assert_eq!(qr.dropped(), 0);
    }

    #[test]
    fn test_model_and_level_values() {
        assert_eq!(QrModel::Model1.value(), 49);
        assert_eq!(QrModel::Model2.value(), 50);
        assert_eq!(QrErrorCorrection::L.value(), 48);
        assert_eq!(QrErrorCorrection::Q.value(), 50);
    }

    #[test]
    fn test_length_is_little_endian() {
        let qr = QrCode::model2(vec![b'x'; 300]);
        let b = qr.as_bytes();
        // 303 = 0x012F
        assert_eq!(b[28], 0x2F);
        assert_eq!(b[29], 0x01);
        assert_eq!(store_len(&qr), 303);
    }

    #[test]
    fn test_payload_at_limit_is_kept() {
        let qr = QrCode::model2(vec![b'a'; MAX_PAYLOAD]);
        assert_eq!(store_len(&qr), MAX_STORE_LEN);
        assert_eq!(qr.as_bytes().len(), HEADER + MAX_PAYLOAD + TRAILER.len());
        assert_eq!(qr.dropped(), 0);
    }

    #[test]
    fn test_oversized_payload_is_truncated() {
        let qr = QrCode::model2(vec![b'a'; 10_000]);
        assert_eq!(store_len(&qr), 7092);
        assert_eq!(qr.dropped(), 10_000 - MAX_PAYLOAD);
        assert_eq!(qr.as_bytes().len(), HEADER + MAX_PAYLOAD + TRAILER.len());
        assert!(qr.as_bytes().ends_with(&TRAILER));
    }

    #[test]
    fn test_empty_payload() {
        let qr = QrCode::model2(b"");
        assert_eq!(store_len(&qr), 3);
    }
}
