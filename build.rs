use anyhow::Result;
use vergen::EmitBuilder;

// Short git sha and build date end up in `--version` of both binaries.
fn main() -> Result<()> {
    EmitBuilder::builder()
        .build_date()
        .git_sha(true)
        .emit()?;
    Ok(())
}
