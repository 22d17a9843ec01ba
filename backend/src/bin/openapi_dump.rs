//! Print the DFDS.io OpenAPI document as pretty JSON on stdout.

use std::io::Write;

use color_eyre::eyre::{Result, WrapErr};
use dfds_backend::ApiDoc;
use utoipa::OpenApi;

fn main() -> Result<()> {
    color_eyre::install()?;
    let document = ApiDoc::openapi()
        .to_pretty_json()
        .wrap_err("serialise OpenAPI document")?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{document}").wrap_err("write OpenAPI document")?;
    Ok(())
}
