pub mod citation;
pub mod dataset;
pub mod normalize;
pub mod safety;
pub mod verse;
