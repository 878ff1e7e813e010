//! Batch payload codec: pure `batch -> bytes`, independent of the transport.

use serde::Serialize;

use crate::trajectory::Coordinate;

/// One flush worth of samples for one source. Callers guarantee `samples`
/// is non-empty before a batch reaches the wire; array order is the
/// chronological order the backend reconstructs.
#[derive(Debug, Clone, Serialize)]
pub struct LocationBatch {
    pub id: i64,
    #[serde(rename = "ubicaciones")]
    pub samples: Vec<Coordinate>,
}

impl LocationBatch {
    pub fn new(id: i64, samples: Vec<Coordinate>) -> Self {
        Self { id, samples }
    }

    pub fn encode(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

/// Legacy single-sample shape, kept for older backend deployments. A
/// degenerate one-sample batch.
#[derive(Debug, Clone, Serialize)]
pub struct SingleLocation {
    pub id: i64,
    #[serde(flatten)]
    pub position: Coordinate,
}

impl SingleLocation {
    pub fn new(id: i64, position: Coordinate) -> Self {
        Self { id, position }
    }

    pub fn encode(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_shape_matches_backend_schema() {
        let batch = LocationBatch::new(
            3,
            vec![
                Coordinate::new(-12.0498, -77.04),
                Coordinate::new(-12.0496, -77.0402),
            ],
        );
        let json = String::from_utf8(batch.encode().unwrap()).unwrap();
        assert_eq!(
            json,
            r#"{"id":3,"ubicaciones":[{"latitud":-12.0498,"longitud":-77.04},{"latitud":-12.0496,"longitud":-77.0402}]}"#
        );
    }

    #[test]
    fn singleton_shape_is_flat() {
        let single = SingleLocation::new(9, Coordinate::new(-12.05, -77.04));
        let json = String::from_utf8(single.encode().unwrap()).unwrap();
        assert_eq!(json, r#"{"id":9,"latitud":-12.05,"longitud":-77.04}"#);
    }
}
