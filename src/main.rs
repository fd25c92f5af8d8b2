use anime_sentinel::run;

fn main() -> anyhow::Result<()> {
    // Every stage is a strictly sequential request loop.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run())
}
