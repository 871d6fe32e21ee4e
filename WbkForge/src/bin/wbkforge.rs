fn main() -> anyhow::Result<()> {
    wbkforge::cli::run_cli()
}
