//! Rendering module: semantic trees become DOCX packages.

mod docx;
mod letterhead;
mod xml;

#[cfg(test)]
pub(crate) use docx::test_support;

pub use docx::DocxRenderer;
