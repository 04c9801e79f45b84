pub mod deviation;
pub mod scale;
