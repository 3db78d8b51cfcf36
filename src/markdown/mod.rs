// Markdown module - restricted-dialect rendering and TOC extraction
mod renderer;
mod toc;

pub use renderer::render;
pub use toc::{TocEntry, build_toc};

#[cfg(test)]
mod tests;
