pub mod atomic_writer;
pub mod json_file_gateway;
pub mod memory_gateway;

pub use atomic_writer::AtomicWriter;
pub use json_file_gateway::{JsonEnvelope, JsonFileGateway, FORMAT_VERSION};
pub use memory_gateway::MemoryGateway;
