use std::{fs, path::Path};

use serde::{Deserialize, de::Error as _};
use serde_json::Value;
use tracing::debug;

use crate::{error::Result, model::InputDataset};

/// Dataset file wrapper: `{version, type, is_batch, attributes, data}`.
#[derive(Debug, Deserialize)]
struct DatasetEnvelope {
    #[serde(default)]
    version: Option<String>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    is_batch: bool,
    data: InputDataset,
}

/// Parses a network dataset, with or without the file envelope.
pub fn network_from_str(text: &str) -> Result<InputDataset> {
    let value: Value = serde_json::from_str(text)?;
    if value.get("data").is_none() {
        return Ok(serde_json::from_value(value)?);
    }
    let envelope: DatasetEnvelope = serde_json::from_value(value)?;
    if let Some(kind) = envelope.kind.as_deref().filter(|k| *k != "input") {
        return Err(serde_json::Error::custom(format!("expected an input dataset, found '{kind}'")).into());
    }
    if envelope.is_batch {
        return Err(serde_json::Error::custom("batch datasets are not accepted as network input").into());
    }
    debug!(version = ?envelope.version, "network dataset envelope");
    Ok(envelope.data)
}

pub fn load_network_json(path: impl AsRef<Path>) -> Result<InputDataset> {
    let text = fs::read_to_string(path)?;
    network_from_str(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::PipelineError, model::LoadType};

    const DATA: &str = r#"{
        "node": [{"id": 1, "u_rated": 10500.0}, {"id": 2, "u_rated": 10500.0}],
        "line": [{"id": 3, "from_node": 1, "to_node": 2, "from_status": 1, "to_status": 1,
                  "r1": 0.25, "x1": 0.2, "c1": 1e-8, "tan1": 0.0, "i_n": 1000.0}],
        "sym_load": [{"id": 4, "node": 2, "status": 1, "type": 0, "p_specified": 1e6, "q_specified": 2e5}],
        "source": [{"id": 5, "node": 1, "status": 1, "u_ref": 1.0}]
    }"#;

    #[test]
    fn envelope_and_bare_data_agree() {
        let wrapped = format!(
            r#"{{"version": "1.0", "type": "input", "is_batch": false, "attributes": {{}}, "data": {DATA}}}"#
        );
        let bare = r#"{
            "node": [{"id": 1, "u_rated": 10500.0}],
            "source": [{"id": 5, "node": 1}]
        }"#;
        let net = network_from_str(&wrapped).unwrap();
        assert_eq!(net.node.len(), 2);
        assert_eq!(net.line[0].i_n, 1000.0);
        assert_eq!(net.sym_load[0].load_type, LoadType::ConstPower);
        let named = wrapped.replace(r#""type": 0"#, r#""type": "const_current""#);
        let net = network_from_str(&named).unwrap();
        assert_eq!(net.sym_load[0].load_type, LoadType::ConstCurrent);
        let bad = wrapped.replace(r#""type": 0"#, r#""type": 7"#);
        assert!(matches!(network_from_str(&bad), Err(PipelineError::Json(_))));

        let bare = network_from_str(bare).unwrap();
        assert_eq!(bare.source[0].u_ref, 1.0);
        assert_eq!(bare.source[0].status, 1);
        assert!(bare.line.is_empty());
    }

    #[test]
    fn batch_envelope_is_rejected() {
        let text = r#"{"version": "1.0", "type": "update", "is_batch": true, "attributes": {}, "data": {}}"#;
        assert!(matches!(network_from_str(text), Err(PipelineError::Json(_))));
        let text = r#"{"type": "input", "is_batch": true, "data": {}}"#;
        assert!(matches!(network_from_str(text), Err(PipelineError::Json(_))));
    }

    #[test]
    fn unsupported_element_kinds_are_rejected() {
        let bare = r#"{
            "node": [{"id": 1, "u_rated": 10500.0}, {"id": 2, "u_rated": 400.0}, {"id": 9, "u_rated": 400.0}],
            "transformer": [{"id": 6, "from_node": 1, "to_node": 2}],
            "line": [{"id": 7, "from_node": 2, "to_node": 9, "r1": 0.1, "x1": 0.05, "i_n": 500.0}],
            "sym_load": [{"id": 8, "node": 9, "p_specified": 1e4, "q_specified": 0.0}],
            "source": [{"id": 5, "node": 1}]
        }"#;
        let err = network_from_str(bare).unwrap_err();
        assert!(matches!(err, PipelineError::Json(_)));
        assert!(err.to_string().contains("transformer"));

        let wrapped = format!(r#"{{"type": "input", "is_batch": false, "data": {bare}}}"#);
        assert!(matches!(network_from_str(&wrapped), Err(PipelineError::Json(_))));
        let shunt = r#"{"node": [{"id": 1, "u_rated": 400.0}], "shunt": []}"#;
        assert!(matches!(network_from_str(shunt), Err(PipelineError::Json(_))));
    }
}
