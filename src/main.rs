fn main() -> anyhow::Result<()> {
    toastline::run()?;
    Ok(())
}
