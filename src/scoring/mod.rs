pub mod scorer;
pub mod weighting;
