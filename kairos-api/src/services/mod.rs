//! Service modules for the room analysis pipelines
//!
//! - Stub detection and layout analysis
//! - Vibe tag lookup and suggestion rules
//! - Upload storage
//! - External model (Gemini) and shopping search (SerpAPI) clients

pub mod detection;
pub mod gemini_client;
pub mod shopping_client;
pub mod suggestions;
pub mod upload;
pub mod vibe;

pub use detection::{analyze_layout, process_image};
pub use gemini_client::{GeminiClient, GeminiError};
pub use shopping_client::{ShoppingClient, ShoppingError};
pub use suggestions::{fixed_suggestions, generate_suggestions};
pub use upload::{sanitize_filename, save_temp_upload, save_upload, UploadedImage};
pub use vibe::parse_vibe;
