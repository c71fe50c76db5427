//! Host-side helper: builds the wasm bundle into `static/pkg`, serves the
//! static site locally, and (if requested and available) exposes it via ngrok.

#[cfg(not(target_arch = "wasm32"))]
mod serve {
    use std::path::PathBuf;
    use std::process::{Command, Stdio};

    use anyhow::{bail, Context, Result};
    use clap::Parser;
    use tracing_subscriber::EnvFilter;

    #[derive(Parser, Debug)]
    #[command(name = "shaderbg-serve", version, about = "Build and serve the background site")]
    pub struct Cli {
        /// Port for the local HTTP server.
        #[arg(long, default_value_t = 8000)]
        pub port: u16,

        /// Directory served as the site root; the wasm package lands in `<dir>/pkg`.
        #[arg(long, value_name = "DIR", default_value = "static")]
        pub static_dir: PathBuf,

        /// Serve whatever is already built instead of running wasm-pack.
        #[arg(long)]
        pub skip_build: bool,

        /// Start an ngrok tunnel to the local server.
        #[arg(long)]
        pub tunnel: bool,
    }

    fn init_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }

    fn build_wasm(static_dir: &std::path::Path) -> Result<()> {
        tracing::info!("building wasm package");
        let out_dir = static_dir.join("pkg");
        let status = Command::new("wasm-pack")
            .args(["build", "--release", "--target", "web", "--out-dir"])
            .arg(&out_dir)
            .status()
            .context("wasm-pack not found in PATH (https://rustwasm.github.io/wasm-pack/)")?;
        if !status.success() {
            bail!("wasm-pack finished with {status}");
        }
        Ok(())
    }

    pub fn run() -> Result<()> {
        init_tracing();
        let cli = Cli::parse();

        if cli.skip_build {
            tracing::warn!("skipping wasm build; the site may serve stale artifacts");
        } else {
            build_wasm(&cli.static_dir)?;
        }

        tracing::info!(port = cli.port, dir = %cli.static_dir.display(), "serving site");
        let mut server = Command::new("python3")
            .args(["-m", "http.server", &cli.port.to_string(), "--directory"])
            .arg(&cli.static_dir)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .context("failed to start http server (python3)")?;
        println!("http://127.0.0.1:{}", cli.port);

        let mut tunnel = None;
        if cli.tunnel {
            match Command::new("ngrok")
                .args(["http", &cli.port.to_string()])
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .spawn()
            {
                Ok(child) => {
                    tracing::info!("ngrok tunnel starting");
                    tunnel = Some(child);
                }
                Err(err) => tracing::warn!(error = %err, "ngrok unavailable; serving locally only"),
            }
        }

        let status = server.wait().context("http server wait failed")?;
        if let Some(mut child) = tunnel {
            let _ = child.kill();
        }
        if !status.success() {
            bail!("http server exited with {status}");
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    serve::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {}
