pub mod describe;
pub mod text;
pub mod type_code;

pub use describe::{FALLBACK_DESCRIPTION, describe};
pub use text::{is_blank, is_space, normalize};
pub use type_code::{Axis, TypeCode, TypeCodeError, assemble};
