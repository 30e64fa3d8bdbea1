use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use planview_core::{PanZoomConfig, Size, ViewerSettings};
use planview_logging::{pv_info, pv_warn};
use planview_remote::RemoteSettings;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::logging::LogDestination;

const DEFAULT_CONFIG_FILENAME: &str = "planview.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Everything the host reads at startup. Missing fields take their defaults,
/// so a config file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub server_url: String,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub wheel_sensitivity: f64,
    pub copy_feedback_ms: u64,
    pub container_width: u32,
    pub container_height: u32,
    pub snapshot_path: PathBuf,
    /// Offer OSC 52 as the native clipboard when stdout is a terminal.
    pub native_clipboard: bool,
    /// Target of the legacy copy command when no native clipboard is offered.
    pub clipboard_fallback: PathBuf,
    pub log_destination: LogDestination,
    pub log_file: PathBuf,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        let remote = RemoteSettings::default();
        let viewer = ViewerSettings::default();
        Self {
            server_url: remote.base_url,
            connect_timeout_ms: remote.connect_timeout.as_millis() as u64,
            request_timeout_ms: remote.request_timeout.as_millis() as u64,
            min_zoom: viewer.pan_zoom.min_zoom,
            max_zoom: viewer.pan_zoom.max_zoom,
            wheel_sensitivity: viewer.pan_zoom.wheel_sensitivity,
            copy_feedback_ms: viewer.copy_feedback_delay.as_millis() as u64,
            container_width: viewer.container.width as u32,
            container_height: viewer.container.height as u32,
            snapshot_path: PathBuf::from("planview.html"),
            native_clipboard: true,
            clipboard_fallback: PathBuf::from("planview-clipboard.txt"),
            log_destination: LogDestination::File,
            log_file: PathBuf::from("./planview.log"),
        }
    }
}

impl ViewerConfig {
    pub fn viewer_settings(&self) -> ViewerSettings {
        ViewerSettings {
            pan_zoom: PanZoomConfig {
                min_zoom: self.min_zoom,
                max_zoom: self.max_zoom,
                wheel_sensitivity: self.wheel_sensitivity,
                ..PanZoomConfig::default()
            },
            copy_feedback_delay: Duration::from_millis(self.copy_feedback_ms),
            container: Size::new(
                f64::from(self.container_width),
                f64::from(self.container_height),
            ),
        }
    }

    pub fn remote_settings(&self) -> RemoteSettings {
        RemoteSettings {
            base_url: self.server_url.clone(),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
        }
    }
}

/// Loads the configuration. An explicit path must exist; the default file is
/// optional and its absence yields the defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<ViewerConfig, ConfigError> {
    let (path, required) = match explicit {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILENAME), false),
    };

    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound && !required => {
            return Ok(ViewerConfig::default());
        }
        Err(source) => return Err(ConfigError::Read { path, source }),
    };

    let mut config: ViewerConfig =
        ron::from_str(&content).map_err(|err| ConfigError::Parse {
            path: path.clone(),
            message: err.to_string(),
        })?;

    let defaults = ViewerConfig::default();
    if !valid_zoom_range(config.min_zoom, config.max_zoom) {
        pv_warn!(
            "Ignoring zoom range {}..{} from {:?}",
            config.min_zoom,
            config.max_zoom,
            path
        );
        config.min_zoom = defaults.min_zoom;
        config.max_zoom = defaults.max_zoom;
    }
    if !(config.wheel_sensitivity.is_finite() && config.wheel_sensitivity > 0.0) {
        pv_warn!(
            "Ignoring wheel sensitivity {} from {:?}",
            config.wheel_sensitivity,
            path
        );
        config.wheel_sensitivity = defaults.wheel_sensitivity;
    }

    pv_info!("Loaded configuration from {:?}", path);
    Ok(config)
}

/// The minimum must allow an overview (below 1) and sit under the maximum.
fn valid_zoom_range(min: f64, max: f64) -> bool {
    min.is_finite() && max.is_finite() && 0.0 < min && min < 1.0 && min < max
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_viewer_and_remote_defaults() {
        let config = ViewerConfig::default();
        assert_eq!(config.viewer_settings(), ViewerSettings::default());
        let remote = config.remote_settings();
        assert_eq!(remote.base_url, RemoteSettings::default().base_url);
        assert_eq!(remote.request_timeout, Duration::from_secs(120));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viewer.ron");
        fs::write(
            &path,
            r#"(server_url: "http://planner.local:8080/", copy_feedback_ms: 500)"#,
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.server_url, "http://planner.local:8080/");
        assert_eq!(config.copy_feedback_ms, 500);
        assert_eq!(config.max_zoom, 7.0);
        assert_eq!(config.log_destination, LogDestination::File);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(&dir.path().join("absent.ron"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viewer.ron");
        fs::write(&path, "(server_url: 42").unwrap();
        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    fn load_str(content: &str) -> ViewerConfig {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viewer.ron");
        fs::write(&path, content).unwrap();
        load_config(Some(&path)).unwrap()
    }

    #[test]
    fn invalid_zoom_ranges_fall_back() {
        for content in [
            "(min_zoom: 5.0, max_zoom: 2.0)",
            "(min_zoom: NaN)",
            "(max_zoom: NaN)",
            "(max_zoom: inf)",
            "(min_zoom: 0.0)",
            "(min_zoom: -0.5)",
            "(min_zoom: 1.0, max_zoom: 9.0)",
            "(min_zoom: 0.5, max_zoom: 0.5)",
        ] {
            let config = load_str(content);
            assert_eq!((config.min_zoom, config.max_zoom), (0.1, 7.0), "{content}");
        }
    }

    #[test]
    fn valid_zoom_range_is_kept() {
        let config = load_str("(min_zoom: 0.25, max_zoom: 4.0)");
        assert_eq!((config.min_zoom, config.max_zoom), (0.25, 4.0));
    }

    #[test]
    fn invalid_wheel_sensitivity_falls_back() {
        for content in [
            "(wheel_sensitivity: NaN)",
            "(wheel_sensitivity: inf)",
            "(wheel_sensitivity: 0.0)",
            "(wheel_sensitivity: -0.2)",
        ] {
            assert_eq!(load_str(content).wheel_sensitivity, 0.5, "{content}");
        }
    }

    #[test]
    fn fallback_settings_survive_wheel_zoom() {
        let config = load_str("(min_zoom: NaN, wheel_sensitivity: NaN)");
        let mut handle = planview_core::PanZoomHandle::new(
            config.viewer_settings().pan_zoom,
            Size::new(100.0, 50.0),
            Size::new(800.0, 400.0),
        );
        handle.zoom_at(1, (0.0, 0.0));
        assert_eq!(handle.zoom(), 1.5);
    }
}
