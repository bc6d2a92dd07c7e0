use anyhow::{bail, Context, Result};
use posenet_decode::{
    pose::{constants::NUM_EDGES, NUM_KEYPOINTS},
    Decoder, DecoderConfig, InputGeometry, ModelOutputs, PoseSet, TensorView,
};
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    time::Instant,
};
use structopt::StructOpt;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;

#[derive(structopt::StructOpt)]
struct Opt {
    /// Keypoint heatmaps: raw little-endian f32 with shape [1, 17, H, W].
    #[structopt(long)]
    heatmaps: PathBuf,

    /// Short range offsets: raw little-endian f32 with shape [1, 34, H, W].
    #[structopt(long)]
    offsets: PathBuf,

    /// Forward displacements: raw little-endian f32 with shape [1, 32, H, W].
    #[structopt(long)]
    displacement_fwd: PathBuf,

    /// Backward displacements: raw little-endian f32 with shape [1, 32, H, W].
    #[structopt(long)]
    displacement_bwd: PathBuf,

    /// The width of the source image.
    #[structopt(short = "W", long)]
    image_width: usize,

    /// The height of the source image.
    #[structopt(short = "H", long)]
    image_height: usize,

    /// Only print keypoints scoring above this.
    #[structopt(short, long, default_value = "0.5")]
    keypoint_threshold: f32,

    #[structopt(short, long, default_value = "info", env = "RUST_LOG")]
    log_level: tracing_subscriber::filter::EnvFilter,

    #[structopt(flatten)]
    decoder: DecoderConfig,
}

fn read_f32_tensor(path: &Path) -> Result<Vec<f32>> {
    let bytes =
        fs::read(path).with_context(|| format!("failed reading tensor {}", path.display()))?;
    if bytes.len() % 4 != 0 {
        bail!(
            "tensor {} has {} bytes, which is not a whole number of f32 values",
            path.display(),
            bytes.len()
        );
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

fn view<'a>(
    name: &'static str,
    data: &'a [f32],
    channels: usize,
    (height, width): (usize, usize),
) -> Result<TensorView<'a>> {
    TensorView::from_slice(name, data, (channels, height, width))
        .with_context(|| format!("failed viewing {} tensor", name))
}

fn print_poses(poses: &PoseSet, threshold: f32) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for (i, pose) in poses.iter().enumerate() {
        writeln!(out, "pose {}: score {:.3}", i, pose.score)?;
        for keypoint in pose.visible_keypoints(threshold) {
            writeln!(
                out,
                "  {:<14} x {:>8.1}  y {:>8.1}  score {:.3}",
                keypoint.kind,
                keypoint.point.x(),
                keypoint.point.y(),
                keypoint.score
            )?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let opt = Opt::from_args();

    tracing::subscriber::set_global_default(
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(opt.log_level),
    )?;

    let geometry = InputGeometry::for_image(
        opt.image_width,
        opt.image_height,
        opt.decoder.output_stride,
    )
    .context("failed computing model input geometry")?;
    let grid = (geometry.grid_height, geometry.grid_width);

    info!(
        message = "computed model geometry",
        input_width = geometry.input_width,
        input_height = geometry.input_height,
        grid_width = grid.1,
        grid_height = grid.0,
    );

    let heatmaps = read_f32_tensor(&opt.heatmaps)?;
    let offsets = read_f32_tensor(&opt.offsets)?;
    let displacements_fwd = read_f32_tensor(&opt.displacement_fwd)?;
    let displacements_bwd = read_f32_tensor(&opt.displacement_bwd)?;

    let outputs = ModelOutputs::new(
        view("heatmaps", &heatmaps, NUM_KEYPOINTS, grid)?,
        view("offsets", &offsets, 2 * NUM_KEYPOINTS, grid)?,
        view("displacement_fwd", &displacements_fwd, 2 * NUM_EDGES, grid)?,
        view("displacement_bwd", &displacements_bwd, 2 * NUM_EDGES, grid)?,
    )
    .context("model outputs do not fit together")?;

    let decoder = Decoder::new(opt.decoder).context("failed constructing decoder")?;
    let scale = geometry.scale().context("failed computing scale")?;

    let start = Instant::now();
    let poses = decoder
        .decode(&outputs, scale)
        .context("failed decoding poses")?;
    info!(poses = poses.len(), elapsed = ?start.elapsed(), "decoded poses");

    print_poses(&poses, opt.keypoint_threshold).context("failed writing poses")
}
