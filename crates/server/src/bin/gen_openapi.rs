use std::process::ExitCode;

use server::openapi::ApiDoc;
use utoipa::OpenApi;

/// Print the OpenAPI document as pretty JSON.
fn main() -> ExitCode {
    match ApiDoc::openapi().to_pretty_json() {
        Ok(spec) => {
            println!("{spec}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("failed to serialize OpenAPI spec: {e}");
            ExitCode::FAILURE
        }
    }
}
