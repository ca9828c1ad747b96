//! `weave route`: load, route, and write a design.
//!
//! 1. Load `weave.toml` (or defaults) and the timing calibration
//! 2. Load the device and the placed design
//! 3. Route with `weave_route::route_design`
//! 4. Render diagnostics
//! 5. On success write the routed design and the optional timing log

use std::path::PathBuf;

use weave_config::RouterConfig;
use weave_diagnostics::{
    Diagnostic, DiagnosticRenderer, DiagnosticSink, JsonRenderer, Severity, TerminalRenderer,
};
use weave_route::route_design;

use crate::{GlobalArgs, ReportFormat, RouteArgs};

/// Runs the `weave route` command.
///
/// Returns exit code 0 after the routed design is written. A fatal routing
/// error is returned after its diagnostics are rendered; nothing is written.
pub fn run(args: &RouteArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let mut config = match &global.config {
        Some(path) => weave_config::load_config(path)?,
        None => RouterConfig::default(),
    };
    if args.discard_existing {
        config.router.discard_existing = true;
    }
    let calibration = weave_config::load_calibration(&args.calibration)?;
    let device = weave_device::load_device(&args.device)?;
    let mut design = weave_design::load_design(&args.design)?;

    if !global.quiet {
        eprintln!(
            "    Routing {} ({} nets) on {}",
            design.name,
            design.nets.len(),
            device.name
        );
    }

    let sink = DiagnosticSink::new();
    let result = route_design(&mut design, &device, &config, &calibration, &sink);
    render(&sink.take_all(), args.format, global);
    let report = result?;

    weave_design::save_design(&design, &args.output)?;
    let timing_log: Option<PathBuf> = args.timing_log.clone().or(config.log.timing_log);
    if let Some(path) = &timing_log {
        report.log.save(path)?;
    }

    if !global.quiet {
        eprintln!(
            "    Finished {} net(s), {} PIP(s) in {} iteration(s), {} warning(s)",
            report.routed_nets,
            report.pip_count,
            report.iterations,
            sink.count(Severity::Warning)
        );
        if let Some(path) = &timing_log {
            eprintln!("    Timing log {}", path.display());
        }
    }
    Ok(0)
}

fn render(diagnostics: &[Diagnostic], format: ReportFormat, global: &GlobalArgs) {
    let shown = diagnostics.iter().filter(|d| match d.severity {
        Severity::Error => true,
        Severity::Warning => !global.quiet,
        Severity::Note => global.verbose && !global.quiet,
    });
    match format {
        ReportFormat::Text => {
            let renderer = TerminalRenderer::new(global.color);
            for diag in shown {
                eprint!("{}", renderer.render(diag));
            }
        }
        ReportFormat::Json => {
            for diag in shown {
                print!("{}", JsonRenderer.render(diag));
            }
        }
    }
}
