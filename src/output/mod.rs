pub mod naming;

pub use naming::{enhanced_name, resolve_target, strip_extension, with_extension, Target, ENHANCE_SUFFIX};
