pub mod cache;
pub mod merger;
pub mod partial;
pub mod posting;
pub mod reader;
pub mod writer;
