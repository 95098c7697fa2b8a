use anyhow::Result;
use clap::Parser;
use grid_dataset::{
    config::{Config, FeaturePreset},
    pipeline::{extract_features, label_images, ExtractionOptions, LabelingOptions},
    CellFeatureExtractor, GridIndexer,
};
use log::LevelFilter;
use prettytable::{cell, row, Table};
use std::{env, path::PathBuf};

#[derive(Debug, Clone, Parser)]
enum Opts {
    /// Assign grid labels to raw images from detector output.
    Label {
        /// configuration file
        #[clap(long)]
        config: Option<PathBuf>,
        /// directory of raw images
        #[clap(long, default_value = "raw_images")]
        image_dir: PathBuf,
        /// detector output CSV file
        #[clap(long)]
        detections: PathBuf,
        /// label table to upsert into
        #[clap(long, default_value = "labels.csv")]
        labels: PathBuf,
        /// write accepted images resized to the canonical size into this directory
        #[clap(long)]
        export_dir: Option<PathBuf>,
    },
    /// Compute per-cell features of labeled images.
    Extract {
        /// configuration file
        #[clap(long)]
        config: Option<PathBuf>,
        /// directory of normalized images
        #[clap(long, default_value = "processed_images")]
        image_dir: PathBuf,
        /// label table
        #[clap(long, default_value = "labels.csv")]
        labels: PathBuf,
        /// output feature table
        #[clap(long, default_value = "features.csv")]
        output: PathBuf,
        /// override the feature parameters by a preset
        #[clap(long)]
        preset: Option<FeaturePreset>,
    },
    /// Print the grid and the feature layout.
    Info {
        /// configuration file
        #[clap(long)]
        config: Option<PathBuf>,
        /// override the feature parameters by a preset
        #[clap(long)]
        preset: Option<FeaturePreset>,
    },
}

fn main() -> Result<()> {
    init_logger();

    match Opts::parse() {
        Opts::Label {
            config,
            image_dir,
            detections,
            labels,
            export_dir,
        } => {
            let config = load_config(config, None)?;
            label_images(
                &config,
                &LabelingOptions {
                    image_dir,
                    detections,
                    label_table: labels,
                    export_dir,
                },
            )?;
        }
        Opts::Extract {
            config,
            image_dir,
            labels,
            output,
            preset,
        } => {
            let config = load_config(config, preset)?;
            extract_features(
                &config,
                &ExtractionOptions {
                    image_dir,
                    label_table: labels,
                    output,
                },
            )?;
        }
        Opts::Info { config, preset } => {
            let config = load_config(config, preset)?;
            info(&config)?;
        }
    }

    Ok(())
}

fn init_logger() {
    let mut builder = pretty_env_logger::formatted_builder();
    match env::var("RUST_LOG") {
        Ok(filters) => {
            builder.parse_filters(&filters);
        }
        Err(_) => {
            builder.filter_level(LevelFilter::Info);
        }
    }
    builder.init();
}

fn load_config(path: Option<PathBuf>, preset: Option<FeaturePreset>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::open(path)?,
        None => Config::default(),
    };
    let config = match preset {
        Some(preset) => config.with_preset(preset),
        None => config,
    };
    config.validate()?;
    Ok(config)
}

fn info(config: &Config) -> Result<()> {
    let canonical_size = config.canonical_size.hw();
    let grid = GridIndexer::new(canonical_size);
    let cell_size = grid.cell_size();
    let extractor = CellFeatureExtractor::new(&config.feature_config())?;
    let layout = extractor.layout(cell_size);

    // print grid information
    {
        let mut table = Table::new();
        table.add_row(row!["canonical size", "grid", "cell size", "preset"]);
        table.add_row(row![
            canonical_size,
            format!("{}x{}", GridIndexer::COLS, GridIndexer::ROWS),
            cell_size,
            config
                .features
                .preset()
                .map(|preset| preset.to_string())
                .unwrap_or_else(|| "custom".to_string()),
        ]);
        table.printstd();
    }

    // print feature layout
    {
        let mut table = Table::new();
        table.add_row(row!["group", "columns", "first", "last"]);

        layout.groups().iter().for_each(|group| {
            table.add_row(row![
                group.kind,
                group.columns.len(),
                group.columns.first().map(|name| name.as_str()).unwrap_or(""),
                group.columns.last().map(|name| name.as_str()).unwrap_or(""),
            ]);
        });
        table.add_row(row!["total", layout.len(), "", ""]);

        table.printstd();
    }

    Ok(())
}
