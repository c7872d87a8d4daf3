//! Check-config command - prints the effective configuration

pub fn run() -> anyhow::Result<()> {
    let config = super::load_config()?;
    println!("{}", config);
    Ok(())
}
