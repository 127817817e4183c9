pub mod backend;
pub mod compiler;
pub mod framework;
pub mod learner;
pub mod metadata;
pub mod native;
pub mod params;
pub mod tensor;

pub use backend::*;
pub use compiler::*;
pub use framework::*;
pub use learner::*;
pub use metadata::*;
pub use native::*;
pub use params::*;
pub use tensor::*;
