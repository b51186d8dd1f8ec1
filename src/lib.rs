pub mod command;
pub mod pipeline;
pub mod utils;

pub use pipeline::ok_target;
pub use pipeline::MakefilePipeline;
pub use pipeline::PipelineError;
pub use pipeline::PipelineRunner;
