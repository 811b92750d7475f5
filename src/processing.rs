use std::time::Duration;

use tokio::time;

/// How long the mock backend takes to answer.
pub const PROCESSING_DELAY: Duration = Duration::from_millis(1500);

/// What the processing backend answers with. Both arms of the result carry
/// one of these; the status code mirrors an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingResponse {
    pub status: u16,
    pub message: String,
}

/// Strategy for submitting the current batch of images for processing.
/// `Ok` is a successful response, `Err` a failed one.
pub trait ProcessingService {
    fn submit(&mut self) -> Result<ProcessingResponse, ProcessingResponse>;
}

/// Stand-in backend that alternates between success and failure on each
/// call, starting with success.
#[derive(Debug)]
pub struct MockProcessing {
    succeed_next: bool,
}

impl MockProcessing {
    pub fn new() -> Self {
        MockProcessing { succeed_next: true }
    }
}

impl Default for MockProcessing {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingService for MockProcessing {
    fn submit(&mut self) -> Result<ProcessingResponse, ProcessingResponse> {
        let succeed = self.succeed_next;
        self.succeed_next = !self.succeed_next;

        if succeed {
            Ok(ProcessingResponse {
                status: 200,
                message: "Images processed successfully!".to_string(),
            })
        } else {
            Err(ProcessingResponse {
                status: 500,
                message: "Server error while processing images.".to_string(),
            })
        }
    }
}

/// Hold a decided outcome for the backend's usual response time before
/// handing it back to the caller.
pub async fn deliver(
    outcome: Result<ProcessingResponse, ProcessingResponse>,
) -> Result<ProcessingResponse, ProcessingResponse> {
    time::sleep(PROCESSING_DELAY).await;
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcomes_alternate_starting_with_success() {
        let mut service = MockProcessing::new();

        let first = service.submit().unwrap();
        assert_eq!(first.status, 200);
        assert_eq!(first.message, "Images processed successfully!");

        let second = service.submit().unwrap_err();
        assert_eq!(second.status, 500);
        assert_eq!(second.message, "Server error while processing images.");

        assert_eq!(service.submit().unwrap().status, 200);
    }

    #[test]
    fn test_custom_services_plug_in() {
        struct AlwaysFails;

        impl ProcessingService for AlwaysFails {
            fn submit(&mut self) -> Result<ProcessingResponse, ProcessingResponse> {
                Err(ProcessingResponse {
                    status: 503,
                    message: "down".into(),
                })
            }
        }

        let mut service: Box<dyn ProcessingService> = Box::new(AlwaysFails);
        assert_eq!(service.submit().unwrap_err().status, 503);
    }
}
