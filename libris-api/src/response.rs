use crate::Error;

/// Envelope every backend REST endpoint answers with.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> ApiResponse<T> {
        ApiResponse {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn into_result(self) -> Result<T, Error> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            (true, None) => Err(Error::Server(String::from(
                "successful response carried no data",
            ))),
            (false, _) => Err(Error::Server(
                self.message.unwrap_or_else(|| String::from("unknown server error")),
            )),
        }
    }
}
