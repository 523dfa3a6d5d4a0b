pub mod etl;
pub mod formatter;
pub mod pipeline;
pub mod values;

pub use crate::domain::model::{CompactStats, Dataset, Record, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
