pub mod epub;
pub mod speed;
