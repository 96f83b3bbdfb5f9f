//! HTTP clients for the third-party ML services.

pub mod groq;
pub mod hugging_face;
pub mod text_embeddings;
