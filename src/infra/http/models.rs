use serde::{Deserialize, Serialize};

pub const CODE_SUCCESS: &str = "00";

#[derive(Debug, Deserialize, Serialize)]
pub struct ProductCreateRequest {
    pub name: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ProductUpdateRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct CreatedData {
    pub id: i64,
}

/// Uniform response envelope carried by every REST reply.
#[derive(Debug, Serialize)]
pub struct BaseResponse<T: Serialize> {
    pub response_code: &'static str,
    pub response_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> BaseResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            response_code: CODE_SUCCESS,
            response_message: "Success".to_string(),
            data: Some(data),
        }
    }
}

impl BaseResponse<()> {
    pub fn success_empty() -> Self {
        Self {
            response_code: CODE_SUCCESS,
            response_message: "Success".to_string(),
            data: None,
        }
    }

    pub fn error(response_code: &'static str, response_message: impl Into<String>) -> Self {
        Self {
            response_code,
            response_message: response_message.into(),
            data: None,
        }
    }
}
