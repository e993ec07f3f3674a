use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use oicr_data::{
    GenericDataset, MinibatchConfig, MinibatchInit, MinibatchIter, RandomAccessDataset, Roidb,
};
use prettytable::{cell, row, Table};
use rand::{rngs::StdRng, SeedableRng};
use std::{
    env,
    path::{Path, PathBuf},
};

#[derive(Debug, Clone, Parser)]
/// Inspect roidb files and the minibatches built from them.
enum Opts {
    Info {
        /// roidb JSON file
        roidb_file: PathBuf,
    },
    Minibatch {
        /// configuration file
        config_file: PathBuf,
        /// roidb JSON file
        roidb_file: PathBuf,
        /// number of minibatches to build
        #[clap(long, default_value = "1")]
        count: usize,
        /// random seed
        #[clap(long)]
        seed: Option<u64>,
        /// saliency map directory, enables saliency masking
        #[clap(long)]
        saliency_dir: Option<PathBuf>,
        /// append horizontally flipped records
        #[clap(long)]
        flipped: bool,
    },
}

fn main() -> Result<()> {
    if env::var_os("RUST_LOG").is_none() {
        env::set_var("RUST_LOG", "info");
    }
    pretty_env_logger::init();

    match Opts::parse() {
        Opts::Info { roidb_file } => info(roidb_file)?,
        Opts::Minibatch {
            config_file,
            roidb_file,
            count,
            seed,
            saliency_dir,
            flipped,
        } => minibatch(config_file, roidb_file, count, seed, saliency_dir, flipped)?,
    }

    Ok(())
}

fn info(roidb_file: impl AsRef<Path>) -> Result<()> {
    let roidb = Roidb::open(roidb_file)?;
    let records = roidb.records();

    let num_boxes: Vec<_> = records.iter().map(|record| record.num_boxes()).collect();
    let total_boxes: usize = num_boxes.iter().sum();
    let min_boxes = num_boxes.iter().copied().min().unwrap_or(0);
    let max_boxes = num_boxes.iter().copied().max().unwrap_or(0);
    let num_empty = num_boxes.iter().filter(|&&count| count == 0).count();
    let num_flagged = records
        .iter()
        .filter(|record| record.flags.is_some())
        .count();

    let mut table = Table::new();
    table.add_row(row!["records", roidb.num_records()]);
    table.add_row(row!["classes", roidb.num_classes()]);
    table.add_row(row!["proposals", total_boxes]);
    table.add_row(row![
        "proposals per record",
        format!(
            "min {}, max {}, mean {:.1}",
            min_boxes,
            max_boxes,
            total_boxes as f64 / records.len() as f64
        )
    ]);
    table.add_row(row!["records without proposals", num_empty]);
    table.add_row(row!["records with flags", num_flagged]);
    table.printstd();

    Ok(())
}

fn minibatch(
    config_file: impl AsRef<Path>,
    roidb_file: impl AsRef<Path>,
    count: usize,
    seed: Option<u64>,
    saliency_dir: Option<PathBuf>,
    flipped: bool,
) -> Result<()> {
    let config_file = config_file.as_ref();
    let config = MinibatchConfig::open(config_file)
        .with_context(|| format!("failed to load config file '{}'", config_file.display()))?;

    let mut roidb = Roidb::open(roidb_file)?;
    if flipped {
        roidb.append_flipped()?;
    }
    if let Some(dir) = &saliency_dir {
        roidb.set_saliency_dir(dir);
    }

    let builder = MinibatchInit {
        config,
        saliency_masked: saliency_dir.is_some(),
    }
    .build()?;
    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut table = Table::new();
    table.add_row(row!["index", "name", "shape"]);

    let mut iter = MinibatchIter::new(&roidb, &builder, rng);
    let mut num_built = 0;
    for (index, blob) in (&mut iter).take(count).enumerate() {
        let blob = blob?;
        num_built += 1;

        blob.into_named().into_iter().for_each(|(name, array)| {
            table.add_row(row![index, name, format!("{:?}", array.shape())]);
        });
    }
    info!("built {} minibatches in {} epochs", num_built, iter.epoch());

    table.printstd();
    Ok(())
}
