//! Live microphone capture for notevox.
//!
//! The controller owns the recording session: it acquires the exclusive
//! microphone handle, reads encoded chunks, decodes them (serialized per
//! session), and feeds the segmenter. Everything platform-specific sits
//! behind the `Microphone` trait.

pub mod controller;
#[cfg(feature = "cpal-audio")]
pub mod cpal_mic;
pub mod microphone;

pub use controller::{CaptureController, CaptureState};
#[cfg(feature = "cpal-audio")]
pub use cpal_mic::CpalMicrophone;
pub use microphone::{Microphone, MockMicrophone};
