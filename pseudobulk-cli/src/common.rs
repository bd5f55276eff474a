pub use log::{info, warn};

pub use pseudobulk_core::aggregate::{aggregate, AggregateConfig};
pub use pseudobulk_core::normalize::AggregateOutput;
pub use pseudobulk_core::scale::ScaleType;
