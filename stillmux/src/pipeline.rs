use std::{
    fmt, io,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use sm_frames::{load_frames, Background, FrameOptions, FrameSourceError};
use sm_mp4::{InputError, Mp4Writer, MuxError, SampleTable};
use tempfile::NamedTempFile;
use tracing::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Stage {
    Collecting,
    TableBuilt,
    Written,
    Done,
}

impl Stage {
    fn fail(self, source: impl Into<PipelineError>) -> StageError {
        StageError {
            stage: self,
            source: source.into(),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Collecting => "collecting frames",
            Stage::TableBuilt => "building sample table",
            Stage::Written => "writing container",
            Stage::Done => "done",
        };

        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Frames(#[from] FrameSourceError),

    #[error(transparent)]
    Mux(#[from] MuxError),

    #[error("output file: {0}")]
    Output(#[from] io::Error),
}

#[derive(Debug, thiserror::Error)]
#[error("{stage} failed")]
pub struct StageError {
    pub stage: Stage,
    #[source]
    pub source: PipelineError,
}

#[derive(Clone, Debug)]
pub struct MuxConfig {
    pub frames_dir: PathBuf,
    pub output: PathBuf,
    pub fps: u32,
    pub background: Background,
}

impl MuxConfig {
    pub fn new(
        frames_dir: PathBuf,
        output: PathBuf,
        fps: u32,
        background: Background,
    ) -> Result<Self, InputError> {
        if fps == 0 {
            return Err(InputError::InvalidFrameRate(fps));
        }

        Ok(MuxConfig {
            frames_dir,
            output,
            fps,
            background,
        })
    }
}

#[derive(Clone, Debug)]
pub struct RunReport {
    pub output: PathBuf,
    pub frames: u32,
    pub bytes: u64,
    pub duration_secs: f64,
    pub elapsed: Duration,
}

/// Collects the frames, builds the sample table and writes the container.
///
/// The container is written to a temporary file beside `config.output` and
/// only renamed into place once it is complete, so a failed run never
/// leaves a file at the output path.
pub fn run(config: &MuxConfig) -> Result<RunReport, StageError> {
    let started = Instant::now();

    let mut stage = Stage::Collecting;
    info!(%stage, dir = %config.frames_dir.display());

    let options = FrameOptions {
        background: config.background,
    };
    let frames = load_frames(&config.frames_dir, &options).map_err(|e| stage.fail(e))?;

    stage = Stage::TableBuilt;
    info!(%stage, frames = frames.len(), fps = config.fps);

    let table = SampleTable::for_container(&frames, config.fps).map_err(|e| stage.fail(e))?;

    stage = Stage::Written;
    info!(%stage, output = %config.output.display());

    let bytes = write_output(&config.output, |sink| {
        Mp4Writer::new(sink).write(&frames, &table)
    })
    .map_err(|e| stage.fail(e))?;

    stage = Stage::Done;

    let report = RunReport {
        output: config.output.clone(),
        frames: table.sample_count(),
        bytes,
        duration_secs: table.duration_secs(),
        elapsed: started.elapsed(),
    };

    info!(
        %stage,
        frames = report.frames,
        bytes = report.bytes,
        duration_secs = report.duration_secs,
        elapsed = ?report.elapsed
    );

    Ok(report)
}

fn write_output<F>(output: &Path, write: F) -> Result<u64, PipelineError>
where
    F: FnOnce(&mut BufWriter<&mut std::fs::File>) -> Result<u64, MuxError>,
{
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    debug!(path = %tmp.path().display(), "created temporary output");

    let bytes = {
        let mut sink = BufWriter::new(tmp.as_file_mut());
        let bytes = write(&mut sink)?;
        sink.flush()?;
        bytes
    };

    tmp.as_file().sync_all()?;
    tmp.persist(output).map_err(io::Error::from)?;

    Ok(bytes)
}
