pub mod matcher;
pub mod normalize;
pub mod phonetic;
pub mod scorers;
pub mod similarity;
