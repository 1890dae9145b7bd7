use retro_domain::{CommandOutcome, RejectReason};
use serde::Serialize;

#[derive(Serialize)]
pub struct CliResponse<T: Serialize> {
    pub success: bool,
    pub api_version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// What a mutating command did to the board
#[derive(Serialize)]
pub struct MutationReport<T: Serialize> {
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<RejectReason>,
    pub revision: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
}

impl<T: Serialize> MutationReport<T> {
    pub fn new(outcome: CommandOutcome, revision: u64, result: Option<T>) -> Self {
        let (label, reason) = match outcome {
            CommandOutcome::Applied => ("applied", None),
            CommandOutcome::Unchanged => ("unchanged", None),
            CommandOutcome::Rejected(reason) => ("rejected", Some(reason)),
        };
        Self {
            outcome: label,
            reason,
            revision,
            result,
        }
    }
}

pub fn output_success<T: Serialize>(data: T) {
    let response = CliResponse {
        success: true,
        api_version: env!("CARGO_PKG_VERSION"),
        data: Some(data),
        error: None,
    };
    match serde_json::to_string(&response) {
        Ok(json) => println!("{}", json),
        Err(e) => output_error(&format!("Failed to encode response: {}", e)),
    }
}

/// Report a mutation. Rejections exit non-zero with the reason code as the
/// error.
pub fn output_mutation<T: Serialize>(outcome: CommandOutcome, revision: u64, result: Option<T>) {
    if let CommandOutcome::Rejected(reason) = outcome {
        output_error(&format!("Rejected: {}", reason));
    }
    output_success(MutationReport::new(outcome, revision, result));
}

/// Outputs an error response to stderr and terminates the process with
/// exit code 1.
pub fn output_error(message: &str) -> ! {
    let response: CliResponse<()> = CliResponse {
        success: false,
        api_version: env!("CARGO_PKG_VERSION"),
        data: None,
        error: Some(message.to_string()),
    };
    let json = serde_json::to_string(&response)
        .unwrap_or_else(|_| format!("{{\"success\":false,\"error\":{:?}}}", message));
    eprintln!("{}", json);
    std::process::exit(1);
}
