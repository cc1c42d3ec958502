use thiserror::Error;

#[derive(Error, Debug)]
pub enum PriceIndexError {
    #[error("Price samples are not strictly increasing in time at position {0}")]
    UnorderedSamples(usize),
}
