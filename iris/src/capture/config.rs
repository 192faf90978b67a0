//! Capture configuration.

use std::path::{Path, PathBuf};

use common::FileFormat;
use serde::{Deserialize, Serialize};

use crate::camera::FocalTarget;
use crate::error::{Error, Result};
use crate::image::ImageDesc;
use crate::sampling::SamplingMode;

/// Output image size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn desc(&self) -> ImageDesc {
        ImageDesc::new(self.width, self.height)
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

/// Everything that parameterizes one depth-of-field capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub sampling: SamplingMode,
    /// Number of aperture samples requested (N). Each accepted sample is weighted 1/N.
    pub samples: u32,
    pub resolution: Resolution,
    /// Aperture as an f-number, typically 0.1 to 32.
    pub aperture: f32,
    pub focus: FocalTarget,
    /// Sensor size in millimetres.
    pub sensor_size: f32,
    /// Bypass the post-process stack while sampling and apply it once to the result.
    pub retain_post_processing: bool,
    pub output_path: PathBuf,
    /// Seed for random sampling; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sampling: SamplingMode::Hammersley,
            samples: 2048,
            resolution: Resolution::default(),
            aperture: 2.8,
            focus: FocalTarget::Distance(1.0),
            sensor_size: 36.0,
            retain_post_processing: false,
            output_path: PathBuf::from("render.png"),
            seed: None,
        }
    }
}

impl CaptureConfig {
    /// Loads a YAML or JSON config, chosen by file extension.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config_error = |message: String| Error::Config {
            path: path.to_path_buf(),
            message,
        };

        let format = FileFormat::from_path(path).map_err(|e| config_error(e.to_string()))?;
        let text = std::fs::read_to_string(path).map_err(|e| config_error(e.to_string()))?;
        let config: CaptureConfig =
            common::deserialize(&text, format).map_err(|e| config_error(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Writes the config as YAML or JSON, chosen by file extension.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let config_error = |message: String| Error::Config {
            path: path.to_path_buf(),
            message,
        };

        let format = FileFormat::from_path(path).map_err(|e| config_error(e.to_string()))?;
        let text = common::serialize(self, format).map_err(|e| config_error(e.to_string()))?;
        std::fs::write(path, text).map_err(|source| Error::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.samples == 0 {
            return Err(Error::InvalidConfiguration(
                "sample count must be positive".to_string(),
            ));
        }
        if self.resolution.width == 0 || self.resolution.height == 0 {
            return Err(Error::InvalidConfiguration(format!(
                "resolution must be positive, got {}x{}",
                self.resolution.width, self.resolution.height
            )));
        }
        if !(self.aperture.is_finite() && self.aperture > 0.0) {
            return Err(Error::InvalidConfiguration(format!(
                "aperture must be a positive f-number, got {}",
                self.aperture
            )));
        }
        if !(self.sensor_size.is_finite() && self.sensor_size > 0.0) {
            return Err(Error::InvalidConfiguration(format!(
                "sensor size must be positive, got {}",
                self.sensor_size
            )));
        }
        match self.focus {
            FocalTarget::Distance(d) if !(d.is_finite() && d > 0.0) => {
                return Err(Error::InvalidConfiguration(format!(
                    "focal distance must be positive, got {}",
                    d
                )));
            }
            FocalTarget::Point(p) if !p.is_finite() => {
                return Err(Error::InvalidConfiguration(format!(
                    "focal point must be finite, got {}",
                    p
                )));
            }
            _ => {}
        }

        Ok(())
    }

    /// Weight applied to every accepted sample.
    pub fn sample_weight(&self) -> f32 {
        1.0 / self.samples as f32
    }
}

#[cfg(test)]
mod tests {
    use common::test_utils::test_output_path;
    use glam::Vec3;

    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = CaptureConfig::default();
        config.validate().unwrap();
        assert_eq!(config.samples, 2048);
        assert_eq!(config.sampling, SamplingMode::Hammersley);
        assert_eq!(config.resolution, Resolution::new(1920, 1080));
        assert_eq!(config.aperture, 2.8);
    }

    #[test]
    fn test_rejects_zero_samples() {
        let config = CaptureConfig {
            samples: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_rejects_empty_resolution() {
        for resolution in [Resolution::new(0, 10), Resolution::new(10, 0)] {
            let config = CaptureConfig {
                resolution,
                ..Default::default()
            };
            assert!(matches!(
                config.validate(),
                Err(Error::InvalidConfiguration(_))
            ));
        }
    }

    #[test]
    fn test_rejects_bad_lens_values() {
        let bad = [
            CaptureConfig {
                aperture: 0.0,
                ..Default::default()
            },
            CaptureConfig {
                aperture: f32::NAN,
                ..Default::default()
            },
            CaptureConfig {
                sensor_size: -1.0,
                ..Default::default()
            },
            CaptureConfig {
                focus: FocalTarget::Distance(0.0),
                ..Default::default()
            },
            CaptureConfig {
                focus: FocalTarget::Point(Vec3::new(f32::INFINITY, 0.0, 0.0)),
                ..Default::default()
            },
        ];
        for config in bad {
            assert!(
                matches!(config.validate(), Err(Error::InvalidConfiguration(_))),
                "{:?}",
                config
            );
        }
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: CaptureConfig = serde_json::from_str(
            r#"{ "samples": 16, "sampling": "random", "focus": { "point": [0.0, 1.0, 4.0] } }"#,
        )
        .unwrap();

        assert_eq!(config.samples, 16);
        assert_eq!(config.sampling, SamplingMode::Random);
        assert_eq!(config.focus, FocalTarget::Point(Vec3::new(0.0, 1.0, 4.0)));
        assert_eq!(config.resolution, Resolution::default());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let config = CaptureConfig {
            samples: 64,
            resolution: Resolution::new(320, 200),
            focus: FocalTarget::Distance(3.5),
            seed: Some(9),
            ..Default::default()
        };

        for name in ["iris/capture_config.yaml", "iris/capture_config.json"] {
            let path = test_output_path(name);
            config.save(&path).unwrap();
            assert_eq!(CaptureConfig::load(&path).unwrap(), config);
        }
    }

    #[test]
    fn test_load_rejects_unknown_extension() {
        let result = CaptureConfig::load("capture.toml");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
