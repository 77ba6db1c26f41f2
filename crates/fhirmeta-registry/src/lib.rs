pub mod error;
pub mod ig;
pub mod operation_config;
pub mod registry;

pub use error::{RegistryError, Result};
pub use ig::{ImplementationGuide, TerminologyBundle, TerminologySink};
pub use operation_config::{OperationConfig, OperationParameterConfig};
pub use registry::ConformanceRegistry;
