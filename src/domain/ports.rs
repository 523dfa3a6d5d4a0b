use crate::core::formatter::FormatMode;
use crate::domain::model::{Dataset, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn columns(&self) -> &[String];
    fn delimiter(&self) -> u8;
    fn keep_original(&self) -> bool;
    fn format_mode(&self) -> FormatMode;
    fn output_formats(&self) -> &[String];
    fn output_stem(&self) -> &str;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Dataset>;
    async fn transform(&self, data: Dataset) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<Vec<String>>;
}
