pub mod channels;
pub mod partition;
pub mod texture;
