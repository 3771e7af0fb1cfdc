pub mod rayon;
pub mod single;
