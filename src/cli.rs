use crate::config::ConfigOverrides;
use anyhow::{anyhow, bail, Context, Result};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CliOverrides {
    config: Option<PathBuf>,
    frames: Option<u32>,
    frame_ms: Option<f64>,
    gravity: Option<f32>,
    shapes: Option<u32>,
    verbose: Option<bool>,
}

impl CliOverrides {
    pub fn parse_from_env() -> Result<Self> {
        Self::parse(env::args())
    }

    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut overrides = CliOverrides::default();
        let mut iter = args.into_iter();
        let _ = iter.next(); // skip program name if present
        while let Some(raw_flag) = iter.next() {
            let flag = raw_flag.as_ref();
            let Some(key) = flag.strip_prefix("--") else {
                bail!("Unexpected argument '{flag}'. Flags take the form --name value.");
            };
            let value =
                iter.next().ok_or_else(|| anyhow!("Expected a value after '{flag}'"))?.as_ref().to_string();
            match key {
                "config" => overrides.config = Some(PathBuf::from(value)),
                "frames" => {
                    overrides.frames =
                        Some(value.parse::<u32>().with_context(|| format!("Invalid frames '{value}'"))?);
                }
                "frame-ms" => {
                    let ms = value.parse::<f64>().with_context(|| format!("Invalid frame-ms '{value}'"))?;
                    if !(ms.is_finite() && ms > 0.0) {
                        bail!("frame-ms must be a positive number, got '{value}'");
                    }
                    overrides.frame_ms = Some(ms);
                }
                "gravity" => {
                    let gravity =
                        value.parse::<f32>().with_context(|| format!("Invalid gravity '{value}'"))?;
                    if !gravity.is_finite() {
                        bail!("gravity must be finite, got '{value}'");
                    }
                    overrides.gravity = Some(gravity);
                }
                "shapes" => {
                    overrides.shapes =
                        Some(value.parse::<u32>().with_context(|| format!("Invalid shapes '{value}'"))?);
                }
                "verbose" => overrides.verbose = Some(parse_bool_flag("verbose", &value)?),
                _ => bail!(
                    "Unknown flag '{flag}'. Supported flags: --config, --frames, --frame-ms, --gravity, --shapes, --verbose."
                ),
            }
        }
        Ok(overrides)
    }

    pub fn config_path(&self) -> Option<&PathBuf> {
        self.config.as_ref()
    }

    pub fn frames(&self) -> Option<u32> {
        self.frames
    }

    pub fn frame_ms(&self) -> Option<f64> {
        self.frame_ms
    }

    pub fn verbose(&self) -> bool {
        self.verbose.unwrap_or(false)
    }

    pub fn config_overrides(&self) -> ConfigOverrides {
        ConfigOverrides { gravity: self.gravity, shape_count: self.shapes }
    }
}

fn parse_bool_flag(flag: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" => Ok(false),
        other => bail!("Invalid {flag} value '{other}'. Use on/off or true/false."),
    }
}
