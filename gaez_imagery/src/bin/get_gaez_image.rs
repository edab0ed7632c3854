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
    load_config, ExportOutcome, ExportRequest, GaezConfig, GaezImageClient, ImageFormat,
    ResponseFormat, Result,
};

#[derive(StructOpt)]
#[structopt(about = "GAEZ image server download tool")]
struct CliOpts {
    #[structopt(help = "filename of GAEZ service config file", short, long, default_value = "config/gaez.ron")]
    gaez_config: String,

    #[structopt(help = "override the exported raster format of the request", long)]
    format: Option<ImageFormat>,

    #[structopt(help = "override the response envelope format of the request {json|image|kmz|html}", long)]
    response_format: Option<ResponseFormat>,

    #[structopt(help = "register the downloaded file as a raster layer", short, long)]
    register: bool,

    #[structopt(help = "filename of the ExportRequest config file")]
    request: String,

    #[structopt(help = "pathname of the output raster file")]
    output_path: PathBuf,
}

lazy_static! {
    static ref ARGS: CliOpts = CliOpts::from_args();
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let conf: GaezConfig = load_config(&ARGS.gaez_config)?;
    let mut request: ExportRequest = load_config(&ARGS.request)?;
    if let Some(format) = ARGS.format {
        request.format = Some(format);
    }
    if let Some(f) = ARGS.response_format {
        request.f = Some(f);
    }

    let client = GaezImageClient::new(conf);
    match client.download_image(&request, &ARGS.output_path).await? {
        ExportOutcome::Saved(path) => {
            println!("image {} saved successfully", path.display());

            if ARGS.register {
                let mut host = LogHost;
                if !import_raster(&mut host, &path)? {
                    eprintln!("invalid raster layer {}", path.display());
                }
            }
        }
        ExportOutcome::Document(text) => {
            println!("{text}");
        }
    }

    Ok(())
}
