use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportModel {
    pub reported_user_id: Uuid,
    pub response_id: Option<Uuid>,
    #[validate(length(min = 1, max = 500, message = "Reason must be 1 to 500 characters"))]
    pub reason: String,
}
