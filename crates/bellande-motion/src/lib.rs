//! Bellande Motion Probability client
//!
//! Validates particle and pose inputs, then either posts them to the hosted
//! Bellande API (or a local deployment of it) or hands them to a local
//! `Bellande_Motion_Probability` executable. The probability model itself
//! runs on the other side of those interfaces.

pub mod client;
pub mod errors;
pub mod executable;
pub mod types;

pub use client::{HttpTransport, MotionClient, ReqwestTransport};
pub use errors::MotionError;
pub use types::{MotionRequest, NoiseParams, ParticleState, Pose};
