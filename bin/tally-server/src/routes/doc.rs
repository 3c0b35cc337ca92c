use utoipa::OpenApi;

use crate::routes::{health, tasks};

#[derive(OpenApi)]
#[openapi(info(
    title = "tally-server",
    description = "Requested-vs-received discrepancy reports for uploaded spreadsheets",
    version = "0.1.0"
))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(tasks::TasksApi::openapi());
    root.merge(health::HealthApi::openapi());
    root
}
