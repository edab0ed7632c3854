/*
 * Copyright © 2026, the gaez_imagery authors. All rights reserved.
 *
 * This software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

use std::path::PathBuf;

use lazy_static::lazy_static;
use structopt::StructOpt;
use tracing_subscriber::EnvFilter;

use gaez_imagery::{
    host::{import_raster, LogHost},
    load_config, op_failed,
    wcs::{CoverageRequest, WcsClient},
    GaezConfig, Result,
};

#[derive(StructOpt)]
#[structopt(about = "GAEZ WCS download tool")]
struct CliOpts {
    #[structopt(help = "filename of GAEZ service config file", short, long, default_value = "config/gaez.ron")]
    gaez_config: String,

    #[structopt(help = "print the WCS capabilities document and exit", long)]
    capabilities: bool,

    #[structopt(help = "print the coverage description document and exit", long)]
    describe: bool,

    #[structopt(help = "coverage identifier (e.g. \"res05_Suitability and Attainable Yield Symbology\")", short, long)]
    coverage: String,

    #[structopt(help = "bounding box minX,minY,maxX,maxY in CRS units", short, long,
                default_value = "-180,-90,180,90", allow_hyphen_values = true)]
    bbox: String,

    #[structopt(help = "coordinate reference system", long, default_value = "EPSG:4326")]
    crs: String,

    #[structopt(help = "output resolution in CRS units per pixel", short, long, default_value = "0.08333333")]
    resolution: String,

    #[structopt(help = "output image format", short, long, default_value = "GeoTIFF")]
    format: String,

    #[structopt(help = "register the downloaded file as a raster layer", long)]
    register: bool,

    #[structopt(help = "pathname of the output raster file")]
    output_path: Option<PathBuf>,
}

lazy_static! {
    static ref ARGS: CliOpts = CliOpts::from_args();
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let conf: GaezConfig = load_config(&ARGS.gaez_config)?;
    let client = WcsClient::new(&conf, &ARGS.coverage);

    if ARGS.capabilities {
        println!("{}", client.get_capabilities().await?);
        return Ok(());
    }
    if ARGS.describe {
        println!("{}", client.describe_coverage().await?);
        return Ok(());
    }

    let output_path = ARGS.output_path.as_ref().ok_or_else(|| op_failed("need an output path"))?;
    let cov = CoverageRequest {
        format: ARGS.format.clone(),
        bbox: ARGS.bbox.clone(),
        crs: ARGS.crs.clone(),
        resolution: ARGS.resolution.clone(),
    };

    let path = client.get_coverage(cov, output_path).await?;
    println!("coverage {} saved successfully", path.display());

    if ARGS.register {
        let mut host = LogHost;
        if !import_raster(&mut host, &path)? {
            eprintln!("invalid raster layer {}", path.display());
        }
    }

    Ok(())
}
