pub mod admission;
pub mod matching;
