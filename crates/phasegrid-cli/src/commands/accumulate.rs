use crate::cli::AccumulateArgs;
use crate::config::FileConfig;
use crate::error::{CliError, Result};
use crate::{output, trajectory};
use phasegrid::core::kernels::KernelRegistry;
use phasegrid::core::models::sample::ParticleSample;
use phasegrid::engine::accumulator::{AccumulationController, FrameContext};
use phasegrid::engine::source::MemorySource;
use tracing::info;

pub fn run(args: &AccumulateArgs) -> Result<()> {
    let file_config = FileConfig::load(&args.config)?;
    let engine_config = file_config.to_engine_config()?;
    let origin_atom = file_config.grid.origin_atom;

    let registry = KernelRegistry::with_defaults();
    let mut controller = AccumulationController::new(engine_config, &registry)?;

    let frames = trajectory::read_frames(&args.input)?;
    if frames.is_empty() {
        return Err(CliError::Argument(format!(
            "trajectory '{}' contains no frames",
            args.input.display()
        )));
    }
    info!(
        "Accumulating {} frames from '{}'",
        frames.len(),
        args.input.display()
    );

    let mut source = MemorySource::new();
    for frame in &frames {
        let origin = *frame.positions.get(origin_atom).ok_or_else(|| {
            CliError::Argument(format!(
                "origin atom {} out of range for a frame of {} atoms",
                origin_atom,
                frame.positions.len()
            ))
        })?;
        source.replace(
            frame
                .values
                .iter()
                .zip(&frame.positions)
                .map(|(&value, &position)| ParticleSample::new(value, position))
                .collect(),
        );
        controller.process_frame(&FrameContext::new(frame.step, origin, frame.cell), &mut source)?;
    }

    output::write_grid(&args.output, controller.grid(), &controller.config().axes)?;
    // The run produces one field, so the whole trajectory forms a single
    // reporting window; under the memoryless policy the window closes here.
    controller.finish_block();
    println!("✅ Field written to '{}'", args.output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const CONFIG: &str = r#"
        [grid]
        axes = "x"
        nbins = [10]
        bandwidth = [0.2]
        mode = "density"

        [[grid.confine]]
        axis = "x"
        lower = 0.0
        upper = 10.0
    "#;

    // One atom sitting exactly at the center of bin 5, plus the origin atom.
    const TRAJ: &str = "\
2
box: 20.0 20.0 20.0
O 0.0 0.0 0.0 0.0
Ar 5.5 0.0 0.0 1.0
";

    fn setup(dir: &TempDir) -> AccumulateArgs {
        let config = dir.path().join("grid.toml");
        let input = dir.path().join("traj.xyz");
        std::fs::write(&config, CONFIG).unwrap();
        std::fs::write(&input, TRAJ).unwrap();
        AccumulateArgs {
            input,
            output: dir.path().join("field.dat"),
            config,
        }
    }

    #[test]
    fn end_to_end_accumulation_writes_the_field() {
        let dir = TempDir::new().unwrap();
        let args = setup(&dir);
        run(&args).unwrap();

        let content = std::fs::read_to_string(&args.output).unwrap();
        assert!(content.contains("# norm=1.000000"));
        let rows: Vec<&str> = content.lines().filter(|l| !l.starts_with('#')).collect();
        assert_eq!(rows.len(), 10);
    }

    #[test]
    fn memoryless_run_is_one_window_spanning_all_frames() {
        let dir = TempDir::new().unwrap();
        let mut args = setup(&dir);
        let config = dir.path().join("memoryless.toml");
        std::fs::write(
            &config,
            CONFIG.replace("mode = \"density\"", "mode = \"density\"\nmemory = \"memoryless\""),
        )
        .unwrap();
        let traj = format!("{TRAJ}{TRAJ}");
        std::fs::write(&args.input, traj).unwrap();
        args.config = config;
        run(&args).unwrap();

        // No block boundary passes before the output, so both frames land in
        // the single reported window.
        let content = std::fs::read_to_string(&args.output).unwrap();
        assert!(content.contains("# norm=2.000000"));
    }

    #[test]
    fn missing_origin_atom_is_reported() {
        let dir = TempDir::new().unwrap();
        let mut args = setup(&dir);
        let config = dir.path().join("bad.toml");
        std::fs::write(&config, CONFIG.replace("mode = \"density\"", "mode = \"density\"\norigin-atom = 9")).unwrap();
        args.config = config;
        let err = run(&args).unwrap_err();
        assert!(matches!(err, CliError::Argument(_)));
    }

    #[test]
    fn missing_trajectory_file_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let mut args = setup(&dir);
        args.input = PathBuf::from(dir.path().join("nope.xyz"));
        let err = run(&args).unwrap_err();
        assert!(matches!(err, CliError::FileParsing { .. }));
    }
}
