mod decode;
mod encode;
mod value;

pub use decode::decode;
pub use encode::encode;
pub use value::Value;
