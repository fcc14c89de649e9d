pub mod episode;
pub mod observation;
pub mod reward;
