//! Conversion results.

use serde::{Deserialize, Serialize};

/// The merged PDF plus what it took to produce it.
#[derive(Debug, Clone)]
pub struct ConversionOutput {
    /// One complete PDF document.
    pub pdf: Vec<u8>,
    pub stats: ConversionStats,
}

/// Counters and timings for one conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// `^XA` labels detected (0 when the document had none).
    pub labels: usize,
    /// Render requests issued.
    pub batches: usize,
    /// `^FO` commands moved by the column offset.
    pub shifted_commands: usize,
    pub input_bytes: usize,
    pub output_bytes: usize,
    /// Time spent waiting on the rendering service.
    pub render_duration_ms: u64,
    pub merge_duration_ms: u64,
    pub total_duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_serialise_with_field_names() {
        let stats = ConversionStats {
            labels: 120,
            batches: 3,
            ..Default::default()
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["labels"], 120);
        assert_eq!(json["batches"], 3);
        assert_eq!(json["shifted_commands"], 0);
    }
}
