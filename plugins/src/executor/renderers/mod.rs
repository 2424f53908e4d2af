mod json;
mod text;

pub use json::JsonRendererPlugin;
pub use text::TextRendererPlugin;
