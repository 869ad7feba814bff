use chrono::Utc;
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::external::SheetSink;
use crate::models::SubmissionForm;

#[derive(Clone)]
pub struct SubmissionService {
    sink: Arc<dyn SheetSink>,
    max_file_bytes: usize,
}

impl SubmissionService {
    pub fn new(sink: Arc<dyn SheetSink>, max_file_bytes: usize) -> Self {
        Self {
            sink,
            max_file_bytes,
        }
    }

    pub fn max_file_bytes(&self) -> usize {
        self.max_file_bytes
    }

    /// 校验必需文件后转发到表格端点
    pub async fn submit(&self, form: SubmissionForm) -> AppResult<()> {
        let missing = form.missing_required();
        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().map(|f| f.as_str()).collect();
            return Err(AppError::ValidationError(format!(
                "Required files missing: {}",
                names.join(", ")
            )));
        }

        let payload = form.to_payload(Utc::now());
        self.sink.forward(&payload).await?;

        log::info!(
            "Admission form forwarded with {} attachment(s)",
            form.files.len()
        );
        Ok(())
    }
}
