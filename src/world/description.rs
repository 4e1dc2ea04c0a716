//! The JSON scene description.
//!
//! Deserialization covers the field shapes; `validate` covers the semantic
//! constraints serde cannot express (bbox arity, curb stride, building
//! outline size). Every failure is an [`Error::Config`]; a scene that
//! fails here cannot be rendered meaningfully, so loading aborts.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDescription {
    /// Min corner (x, y, z) then max corner (x, y, z).
    pub bbox: Vec<f32>,
    pub track: TrackDescription,
    #[serde(default)]
    pub trees: Vec<TreeDescription>,
    #[serde(default)]
    pub buildings: Vec<BuildingDescription>,
    #[serde(rename = "startPYR")]
    pub start_pyr: [f32; 3],
    pub start_position: [f32; 3],
    pub photo_position: [f32; 3],
    pub observer_position: [f32; 3],
    pub weather: WeatherDescription,
    #[serde(default)]
    pub lamps: Vec<LampDescription>,
    pub lamp_intensity: [f32; 3],
    /// Optional OBJ file for the car body; a built-in wedge body is used
    /// when absent.
    #[serde(default)]
    pub car_model: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackDescription {
    /// Flat (x, y, z) triples along the left curb.
    pub left_curb: Vec<f32>,
    /// Flat (x, y, z) triples along the right curb, paired with the left.
    pub right_curb: Vec<f32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TreeDescription {
    pub height: f32,
    pub position: [f32; 3],
}

#[derive(Debug, Clone, Deserialize)]
pub struct BuildingDescription {
    /// Sixteen floats: four corners as (x, y, z, roof height).
    pub outline: Vec<f32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherDescription {
    pub sun_light_direction: [f32; 3],
    pub sun_intensity: [f32; 3],
}

#[derive(Debug, Clone, Deserialize)]
pub struct LampDescription {
    pub position: [f32; 3],
    pub height: f32,
}

impl SceneDescription {
    /// Reads and validates a scene description file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Parses and validates a scene description from JSON text.
    pub fn parse(text: &str) -> Result<Self> {
        let description: SceneDescription =
            serde_json::from_str(text).map_err(|e| Error::config(e.to_string()))?;
        description.validate()?;
        Ok(description)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.bbox.len() != 6 {
            return Err(Error::config(format!(
                "bbox must hold 6 floats, found {}",
                self.bbox.len()
            )));
        }
        if self.track.left_curb.is_empty() || self.track.right_curb.is_empty() {
            return Err(Error::config("track curbs must not be empty"));
        }
        for (name, curb) in [
            ("leftCurb", &self.track.left_curb),
            ("rightCurb", &self.track.right_curb),
        ] {
            if curb.len() % 3 != 0 {
                return Err(Error::config(format!(
                    "track.{name} length {} is not a multiple of 3",
                    curb.len()
                )));
            }
        }
        for (i, building) in self.buildings.iter().enumerate() {
            if building.outline.len() != 16 {
                return Err(Error::config(format!(
                    "buildings[{i}].outline must hold 16 floats, found {}",
                    building.outline.len()
                )));
            }
        }
        Ok(())
    }
}
