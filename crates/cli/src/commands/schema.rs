use anyhow::Result;
use kiln_core::configs::build::build_config_schema;

pub fn execute() -> Result<()> {
    println!("{}", build_config_schema()?);
    Ok(())
}
