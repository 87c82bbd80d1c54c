//! Camera snapshot sensor record.
//!
//! A positioned camera produces an image plus an on-board temperature
//! reading. The record encodes to a fixed-layout big-endian frame:
//! latitude, longitude, altitude, temperature (8 bytes each), then a
//! 4-byte snapshot length and the snapshot bytes.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraSnapshot {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub temperature: f64,
    pub snapshot: Vec<u8>,
}

impl CameraSnapshot {
    pub fn new(
        latitude: f64,
        longitude: f64,
        altitude: f64,
        temperature: f64,
        snapshot: Vec<u8>,
    ) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
            temperature,
            snapshot,
        }
    }

    /// Encodes the record into its wire frame.
    pub fn encode(&self) -> Vec<u8> {
        let mut frame = Vec::with_capacity(8 * 4 + 4 + self.snapshot.len());
        frame.extend_from_slice(&self.latitude.to_be_bytes());
        frame.extend_from_slice(&self.longitude.to_be_bytes());
        frame.extend_from_slice(&self.altitude.to_be_bytes());
        frame.extend_from_slice(&self.temperature.to_be_bytes());
        frame.extend_from_slice(&(self.snapshot.len() as u32).to_be_bytes());
        frame.extend_from_slice(&self.snapshot);
        frame
    }

    /// Decodes a wire frame produced by [`encode`](Self::encode).
    pub fn decode(frame: &[u8]) -> Option<Self> {
        if frame.len() < 36 {
            return None;
        }
        let field = |i: usize| {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(&frame[i * 8..(i + 1) * 8]);
            f64::from_be_bytes(bytes)
        };
        let mut len_bytes = [0u8; 4];
        len_bytes.copy_from_slice(&frame[32..36]);
        let len = u32::from_be_bytes(len_bytes) as usize;
        if frame.len() != 36 + len {
            return None;
        }
        Some(Self {
            latitude: field(0),
            longitude: field(1),
            altitude: field(2),
            temperature: field(3),
            snapshot: frame[36..].to_vec(),
        })
    }
}

impl fmt::Display for CameraSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "camera at ({:.5}, {:.5}, {:.1}m): {} snapshot bytes, {:.1}°C",
            self.latitude,
            self.longitude,
            self.altitude,
            self.snapshot.len(),
            self.temperature
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_round_trip() {
        let record = CameraSnapshot::new(39.4699, -0.3763, 16.0, 21.5, vec![1, 2, 3, 4]);
        let decoded = CameraSnapshot::decode(&record.encode()).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn empty_snapshot_is_a_valid_frame() {
        let record = CameraSnapshot::new(0.0, 0.0, 0.0, -40.0, Vec::new());
        let frame = record.encode();
        assert_eq!(frame.len(), 36);
        assert_eq!(CameraSnapshot::decode(&frame).unwrap(), record);
    }

    #[test]
    fn truncated_frames_are_rejected() {
        let frame = CameraSnapshot::new(1.0, 2.0, 3.0, 4.0, vec![9; 10]).encode();
        assert!(CameraSnapshot::decode(&frame[..frame.len() - 1]).is_none());
        assert!(CameraSnapshot::decode(&frame[..20]).is_none());
    }
}
