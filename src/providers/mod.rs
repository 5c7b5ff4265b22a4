//! External services, one module per vendor. Each implements
//! [`Provider`](crate::dispatch::Provider) for every capability it serves.

pub mod gemini;
pub mod libretranslate;
pub mod lingva;
pub mod mymemory;
pub mod openai;
pub mod openweather;
pub mod overpass;
pub mod prompts;
