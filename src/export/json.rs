use crate::error::ExportError;
use std::io::Write;
use std::path::Path;

/// Export any serializable data structure to a JSON file
pub fn export_json<T, P>(data: &T, output_path: P, pretty: bool) -> Result<(), ExportError>
where
    T: serde::Serialize + ?Sized,
    P: AsRef<Path>,
{
    let json_data = to_json_string(data, pretty)?;

    let mut file = std::fs::File::create(output_path)?;
    file.write_all(json_data.as_bytes())?;

    Ok(())
}

/// Serialize to a JSON string, pretty-printed or compact
pub fn to_json_string<T>(data: &T, pretty: bool) -> Result<String, ExportError>
where
    T: serde::Serialize + ?Sized,
{
    let result = if pretty {
        serde_json::to_string_pretty(data)
    } else {
        serde_json::to_string(data)
    };
    result.map_err(|e| ExportError::SerializationError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Split, SplitDistance};
    use tempfile::NamedTempFile;

    #[test]
    fn test_export_splits_json() {
        let splits = vec![Split {
            id: 1,
            distance: SplitDistance::Whole(1),
            pace_seconds_per_unit: Some(512.0),
            avg_heart_rate: Some(151),
            elevation_change: Some(41),
        }];

        let temp_file = NamedTempFile::new().unwrap();
        export_json(&splits, temp_file.path(), true).unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(content.contains("\"avg_heart_rate\": 151"));
        assert!(content.contains("\"kind\": \"whole\""));

        let parsed: Vec<Split> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed, splits);
    }

    #[test]
    fn test_export_compact_json_file() {
        let temp_file = NamedTempFile::new().unwrap();
        export_json(&vec![1, 2, 3], temp_file.path(), false).unwrap();
        assert_eq!(std::fs::read_to_string(temp_file.path()).unwrap(), "[1,2,3]");
    }

    #[test]
    fn test_compact_json() {
        let json = to_json_string(&vec![1, 2, 3], false).unwrap();
        assert_eq!(json, "[1,2,3]");
    }
}
