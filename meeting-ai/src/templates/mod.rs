//! Template store implementations.

mod file;
mod memory;

pub use file::FileTemplateStore;
pub use memory::MemoryTemplateStore;
