// Translation module for relay → Gemini request conversion
// Author: kelexine (https://github.com/kelexine)

pub mod request;

pub use request::{translate_messages, translate_request};
