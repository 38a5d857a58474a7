use std::io;

use cl_caps::ClError;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_target(false)
        .format_timestamp(None)
        .init();

    // 1. OpenCL-Symbole zur Laufzeit auflösen, ohne Treiber kein Bericht
    let cl = cl_caps::init().map_err(ClError::from)?;

    #[cfg(feature = "metrics")]
    let cl = &cl_caps::metrics::Timed::new(cl);

    // 2. Plattformen und Geräte nach stdout
    let mut out = io::stdout().lock();
    let result = cl_caps::report(cl, &mut out);

    #[cfg(feature = "metrics")]
    cl_caps::metrics::summary();

    result?;
    Ok(())
}
