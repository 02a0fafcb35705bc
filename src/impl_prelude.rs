pub use gl;
pub use gl::types::*;
pub use gl::Gles2;

pub use crate::context::{Context, SharedContext};
pub use crate::error::{GlesError, GlesResult};
pub use crate::platform::Platform;
pub use crate::provider::FunctionProvider;
