use std::path::Path;

use conform_domain::{NodeName, PluginExpectation, PluginName, ResultFormat};
use tracing::debug;

use crate::error::ConfigError;
use crate::raw::{RawPluginExpectation, RawRunConfig};
use crate::types::RunConfig;

/// Load a [`RunConfig`] from a YAML or JSON file, chosen by extension
/// (anything other than `.json` is parsed as YAML).
pub fn load_run_config(path: &Path) -> Result<RunConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        source: e,
    })?;

    let raw: RawRunConfig = if path.extension().and_then(|e| e.to_str()) == Some("json") {
        serde_json::from_str(&content).map_err(|e| ConfigError::JsonParse {
            path: path.display().to_string(),
            source: e,
        })?
    } else {
        serde_yaml::from_str(&content).map_err(|e| ConfigError::YamlParse {
            path: path.display().to_string(),
            source: e,
        })?
    };

    debug!(path = %path.display(), plugins = raw.plugins.len(), "loaded run config");
    convert_run_config(raw, path)
}

fn convert_run_config(raw: RawRunConfig, path: &Path) -> Result<RunConfig, ConfigError> {
    let plugins = raw
        .plugins
        .into_iter()
        .map(|p| convert_plugin_expectation(p, path))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RunConfig {
        run_id: raw.run_id,
        pod_name: raw.pod_name,
        pod_namespace: raw.pod_namespace,
        namespaces: raw.namespaces,
        plugins,
    })
}

fn convert_plugin_expectation(
    raw: RawPluginExpectation,
    path: &Path,
) -> Result<PluginExpectation, ConfigError> {
    let result_format = match raw.result_format.as_deref() {
        None => ResultFormat::Raw,
        Some("junit") => ResultFormat::Junit,
        Some("e2e") => ResultFormat::E2e,
        Some("gojson") => ResultFormat::Gojson,
        Some("raw") => ResultFormat::Raw,
        Some("manual") => ResultFormat::Manual,
        Some(other) => {
            return Err(ConfigError::Conversion {
                path: path.display().to_string(),
                message: format!("unknown result_format '{}'", other),
            })
        }
    };

    let node = match raw.node {
        Some(n) => NodeName::new(n),
        None => NodeName::global(),
    };

    Ok(PluginExpectation {
        plugin: PluginName::new(raw.plugin),
        node,
        result_format,
        result_files: raw.result_files,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_fixture(content: &str, ext: &str) -> tempfile::TempPath {
        let mut f = tempfile::Builder::new()
            .suffix(&format!(".{ext}"))
            .tempfile()
            .unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.into_temp_path()
    }

    #[test]
    fn loads_valid_yaml_fixture() {
        let path = write_fixture(
            r#"
pod_name: sonobuoy
pod_namespace: sonobuoy
namespaces: ["default"]
plugins:
  - plugin: e2e
    result_format: junit
  - plugin: systemd-logs
    node: node-1
"#,
            "yml",
        );
        let cfg = load_run_config(&path).expect("should load without error");
        assert_eq!(cfg.plugins.len(), 2);
        assert_eq!(cfg.plugins[0].node.as_str(), conform_domain::GLOBAL_NODE);
        assert!(cfg.plugins[1].is_per_node());
    }

    #[test]
    fn loads_valid_json_fixture() {
        let path = write_fixture(
            r#"{"pod_name":"sonobuoy","pod_namespace":"sonobuoy","plugins":[{"plugin":"e2e"}]}"#,
            "json",
        );
        let cfg = load_run_config(&path).expect("should load without error");
        assert_eq!(cfg.plugins.len(), 1);
    }

    #[test]
    fn missing_file_returns_error() {
        let path = Path::new("/nonexistent/path/does/not/exist.yaml");
        assert!(load_run_config(path).is_err());
    }

    #[test]
    fn unknown_result_format_rejected() {
        let path = write_fixture(
            r#"
pod_name: sonobuoy
pod_namespace: sonobuoy
plugins:
  - plugin: e2e
    result_format: bogus
"#,
            "yml",
        );
        assert!(load_run_config(&path).is_err());
    }
}
