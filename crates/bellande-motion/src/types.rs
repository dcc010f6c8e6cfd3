//! Request types
//!
//! Inputs arrive as JSON text on the command line. States and poses travel as
//! plain JSON arrays, noise parameters as an object.

use crate::errors::MotionError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const DEFAULT_SIGMA: f64 = 0.1;
pub const DEFAULT_SEARCH_RADIUS: f64 = 50.0;
pub const DEFAULT_SAMPLE_POINTS: u32 = 20;

/// Authorization key the public API accepts for open-source clients
pub const API_AUTHORIZATION_KEY: &str = "bellande_web_api_opensource";

fn parse_components<const N: usize>(
    label: &str,
    layout: &str,
    input: &str,
) -> Result<[f64; N], MotionError> {
    let value: Value = serde_json::from_str(input)?;
    let invalid = || {
        MotionError::InvalidInput(format!(
            "{} must have {} components {}",
            label, N, layout
        ))
    };

    let items = value.as_array().ok_or_else(invalid)?;
    if items.len() != N {
        return Err(invalid());
    }

    let mut out = [0.0; N];
    for (slot, item) in out.iter_mut().zip(items) {
        let number = item.as_f64().filter(|n| n.is_finite()).ok_or_else(|| {
            MotionError::InvalidInput(format!("{} components must be finite numbers", label))
        })?;
        *slot = number;
    }
    Ok(out)
}

/// `[x, y, heading, weight]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(into = "[f64; 4]")]
pub struct ParticleState {
    pub x: f64,
    pub y: f64,
    pub heading: f64,
    pub weight: f64,
}

impl ParticleState {
    pub fn from_json(input: &str) -> Result<Self, MotionError> {
        let [x, y, heading, weight] =
            parse_components::<4>("Particle state", "[x, y, heading, weight]", input)?;
        Ok(Self {
            x,
            y,
            heading,
            weight,
        })
    }
}

impl From<ParticleState> for [f64; 4] {
    fn from(state: ParticleState) -> Self {
        [state.x, state.y, state.heading, state.weight]
    }
}

/// `[x, y, heading]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(into = "[f64; 3]")]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub heading: f64,
}

impl Pose {
    pub fn from_json(label: &str, input: &str) -> Result<Self, MotionError> {
        let [x, y, heading] = parse_components::<3>(label, "[x, y, heading]", input)?;
        Ok(Self { x, y, heading })
    }
}

impl From<Pose> for [f64; 3] {
    fn from(pose: Pose) -> Self {
        [pose.x, pose.y, pose.heading]
    }
}

/// Motion noise; missing fields take [`DEFAULT_SIGMA`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseParams {
    pub trans_sigma: f64,
    pub rot_sigma: f64,
    pub head_sigma: f64,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            trans_sigma: DEFAULT_SIGMA,
            rot_sigma: DEFAULT_SIGMA,
            head_sigma: DEFAULT_SIGMA,
        }
    }
}

impl NoiseParams {
    pub fn from_json(input: &str) -> Result<Self, MotionError> {
        let params: NoiseParams = serde_json::from_str(input)?;
        for (name, sigma) in [
            ("trans_sigma", params.trans_sigma),
            ("rot_sigma", params.rot_sigma),
            ("head_sigma", params.head_sigma),
        ] {
            if !sigma.is_finite() || sigma < 0.0 {
                return Err(MotionError::InvalidInput(format!(
                    "{} must be a non-negative number",
                    name
                )));
            }
        }
        Ok(params)
    }
}

/// One motion-probability query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MotionRequest {
    pub particle_state: ParticleState,
    pub previous_pose: Pose,
    pub current_pose: Pose,
    pub noise_params: NoiseParams,
    pub search_radius: f64,
    pub sample_points: u32,
}

impl MotionRequest {
    /// Build a request from the raw JSON arguments
    pub fn from_json_args(
        particle_state: &str,
        previous_pose: &str,
        current_pose: &str,
        noise_params: Option<&str>,
        search_radius: f64,
        sample_points: u32,
    ) -> Result<Self, MotionError> {
        let request = Self {
            particle_state: ParticleState::from_json(particle_state)?,
            previous_pose: Pose::from_json("Previous pose", previous_pose)?,
            current_pose: Pose::from_json("Current pose", current_pose)?,
            noise_params: noise_params
                .map(NoiseParams::from_json)
                .transpose()?
                .unwrap_or_default(),
            search_radius,
            sample_points,
        };
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<(), MotionError> {
        if !self.search_radius.is_finite() || self.search_radius <= 0.0 {
            return Err(MotionError::InvalidInput(
                "Search radius must be a positive number".to_string(),
            ));
        }
        if self.sample_points == 0 {
            return Err(MotionError::InvalidInput(
                "Sample points must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Body sent to the API: the request plus the auth block
    pub fn api_payload(&self) -> Result<Value, MotionError> {
        let mut payload = serde_json::to_value(self)?;
        if let Some(object) = payload.as_object_mut() {
            object.insert(
                "auth".to_string(),
                json!({ "authorization_key": API_AUTHORIZATION_KEY }),
            );
        }
        Ok(payload)
    }
}
