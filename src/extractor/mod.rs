pub mod json;
pub mod path;
pub mod validated;

/// Gives access to the value an extractor has extracted.
pub trait Extractor {
    type Extracted;

    fn extracted(&self) -> &Self::Extracted;
}
