//! Image captioning with a locally stored BLIP model.
//!
//! [`BlipCaptioner`] wraps the candle BLIP implementation and generates one
//! caption per image. [`CaptionService`] serializes access to the single
//! model instance so the rest of the application can stay async.

pub mod blip;
pub mod service;

pub use blip::{load_image, BlipCaptioner};
pub use service::{CaptionService, Captioner};
