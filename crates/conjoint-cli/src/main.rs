fn main() -> anyhow::Result<()> {
    conjoint_cli::init_tracing();

    let matches = conjoint_cli::cli().get_matches();
    let stdout = std::io::stdout();
    conjoint_cli::run(&matches, &mut stdout.lock())
}
