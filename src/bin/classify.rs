use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::debug;

use cifar_convnet::data::load_rgb_planar;
use cifar_convnet::math::argmax;
use cifar_convnet::ConvNet;

/// Classifies image files with a model written by `cifar-convnet`.
#[derive(Parser, Debug)]
#[command(name = "classify", version, about)]
struct ClassifyArgs {
    /// Trained model file.
    #[arg(short, long, default_value = "output.model")]
    model: PathBuf,
    /// Images to classify (PNG, JPEG, BMP or GIF).
    #[arg(required = true)]
    images: Vec<PathBuf>,
}

fn main() -> Result<()> {
    pretty_env_logger::init();
    let args = ClassifyArgs::parse();

    let network = ConvNet::load_json(&args.model)
        .with_context(|| format!("failed to load model {}", args.model.display()))?;
    let (width, height) = network.image_size();
    debug!("loaded {:?}, images resized to {}x{}", network.spec, width, height);

    for path in &args.images {
        let input = load_rgb_planar(path, width, height)?;
        let probs = network.predict(&input, 1);
        let best = argmax(&probs);
        println!("{}: {} ({:.3})", path.display(), network.metadata.label(best), probs[best]);
    }
    Ok(())
}
