pub mod experiment;
pub mod generate;
pub mod reference;
