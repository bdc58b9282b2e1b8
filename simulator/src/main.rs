use anyhow::Context;
use clap::{Parser, ValueEnum};
use echocore::session::cancel_pair;
use echocore::View;
use gui_bridge::GuiBridge;
use log::{info, warn};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::{Runner, WorkflowConfig};

mod advisory;
mod generator;
mod gui_bridge;
mod workflow;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    /// Frame-stepped walk over both views, combined into one EF
    Biplane,
    /// Real-time tracking of a single view
    Continuous,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ViewArg {
    A4c,
    A2c,
}

impl From<ViewArg> for View {
    fn from(arg: ViewArg) -> Self {
        match arg {
            ViewArg::A4c => View::A4c,
            ViewArg::A2c => View::A2c,
        }
    }
}

#[derive(Parser)]
#[command(author, version, about = "Echo motion workflow driver")]
struct Args {
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = Mode::Biplane)]
    mode: Mode,
    /// View tracked in continuous mode
    #[arg(long, value_enum, default_value_t = ViewArg::A4c)]
    view: ViewArg,
    /// Display callbacks to run in continuous mode
    #[arg(long, default_value_t = 90)]
    ticks: usize,
    #[arg(long, default_value_t = 30.0)]
    fps: f64,
    /// Length of the synthetic clips in seconds
    #[arg(long, default_value_t = 3.0)]
    duration: f64,
    #[arg(long, default_value_t = 72.0)]
    heart_rate: f32,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Advisory service endpoint; overrides the workflow file
    #[arg(long)]
    advisory: Option<String>,
    /// Where to write the JSON report; overrides the workflow file
    #[arg(long)]
    report: Option<PathBuf>,
    /// Keep the HTTP bridge alive after the analysis
    #[arg(long, default_value_t = false)]
    serve: bool,
    #[arg(long, default_value = "127.0.0.1:9000")]
    bind: SocketAddr,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut workflow_config = if let Some(path) = args.workflow.as_ref() {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::from_args(args.fps, args.duration, args.heart_rate, args.seed)
    };
    if args.advisory.is_some() {
        workflow_config.advisory_endpoint = args.advisory.clone();
    }
    if args.report.is_some() {
        workflow_config.report_path = args.report.clone();
    }

    let runner = Runner::new(workflow_config);
    let mut gui_bridge = GuiBridge::new();
    if args.serve {
        gui_bridge.serve(args.bind);
    }

    let runtime = TokioBuilder::new_current_thread()
        .enable_all()
        .build()
        .context("creating workflow runtime")?;

    runtime.block_on(async {
        let (cancel_handle, mut cancel) = cancel_pair();
        tokio::spawn(async move {
            if signal::ctrl_c().await.is_ok() {
                warn!("interrupt received, cancelling analysis");
                cancel_handle.cancel();
            }
        });

        let result = match args.mode {
            Mode::Biplane => runner.run_biplane(&mut gui_bridge, &cancel).await?,
            Mode::Continuous => {
                runner
                    .run_continuous(args.view.into(), args.ticks, &mut gui_bridge, &mut cancel)
                    .await?
            }
        };

        for metrics in &result.per_view {
            println!(
                "{}: EF {:.1}%  peak strain {:.1}%  HR {}  samples {}",
                metrics.view,
                metrics.ejection_fraction,
                metrics.peak_strain,
                metrics
                    .heart_rate_bpm
                    .map_or_else(|| "n/a".to_string(), |bpm| format!("{:.0} bpm", bpm)),
                metrics.samples
            );
        }
        println!(
            "EF {:.1}%  GLS {:.1}%",
            result.ejection_fraction,
            result.global_strain()
        );

        let advisory = runner.advise(&result).await?;
        if let Some(note) = advisory.as_ref() {
            println!("[{:?}] {} -> {}", note.severity, note.observation, note.recommendation);
        }

        if let Some(path) = runner.config().report_path.clone() {
            runner.report(result, advisory).write_to(&path)?;
            info!("report written to {}", path.display());
        }
        gui_bridge.publish_status("Workflow results ready.");

        if args.serve {
            gui_bridge.publish_status("HTTP bridge running (Ctrl+C to stop)...");
            cancel.cancelled().await;
        }
        Ok::<(), anyhow::Error>(())
    })?;

    Ok(())
}
