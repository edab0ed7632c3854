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

//! OGC WCS transport variant for the GAEZ services. The WCSServer endpoint sits next
//! to the REST one and serves the same imagery through GetCapabilities /
//! DescribeCoverage / GetCoverage requests.
//!
//! Note that mosaic and rendering rules are IGNORED by the remote WCS implementation -
//! a coverage request only carries format, bbox, CRS and resolution.

use std::path::{Path, PathBuf};

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::{op_failed, Result};
use crate::{write_file, GaezConfig};

pub const WCS_VERSION: &str = "1.0.0";

/// how much of a failed response body we echo into the error message
const ERR_EXCERPT_LEN: usize = 100;

/// the GetCoverage payload parameters
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct CoverageRequest {
    /// output image format (e.g. "GeoTIFF")
    pub format: String,

    /// comma separated minX,minY,maxX,maxY in CRS units
    pub bbox: String,

    /// coordinate reference system (e.g. "EPSG:4326")
    pub crs: String,

    /// output resolution in CRS units per pixel
    pub resolution: String,
}

#[derive(Clone, Debug)]
pub enum WcsOperation {
    GetCapabilities,
    DescribeCoverage,
    GetCoverage(CoverageRequest),
}

impl WcsOperation {
    pub fn request_name(&self) -> &'static str {
        match self {
            WcsOperation::GetCapabilities => "GetCapabilities",
            WcsOperation::DescribeCoverage => "DescribeCoverage",
            WcsOperation::GetCoverage(_) => "GetCoverage",
        }
    }
}

pub type WcsParams = Vec<(&'static str, String)>;

/// assemble the flat WCS parameter set: the fixed SERVICE/VERSION/COVERAGE triple,
/// the REQUEST selector and - for GetCoverage - the payload keys
pub fn assemble_wcs_params(coverage_id: &str, op: &WcsOperation) -> WcsParams {
    let mut params: WcsParams = vec![
        ("SERVICE", "WCS".to_string()),
        ("VERSION", WCS_VERSION.to_string()),
        ("COVERAGE", coverage_id.to_string()),
        ("REQUEST", op.request_name().to_string()),
    ];

    if let WcsOperation::GetCoverage(cov) = op {
        params.push(("FORMAT", cov.format.clone()));
        params.push(("BBOX", cov.bbox.clone()));
        params.push(("CRS", cov.crs.clone()));
        params.push(("RESOLUTION", cov.resolution.clone()));
    }

    params
}

/// client for the WCSServer endpoint of one GAEZ service
pub struct WcsClient {
    base_url: String,
    coverage_id: String,
    client: Client,
}

impl WcsClient {
    pub fn new(config: &GaezConfig, coverage_id: impl ToString) -> Self {
        WcsClient {
            base_url: config.wcs_url(),
            coverage_id: coverage_id.to_string(),
            client: Client::new(),
        }
    }

    async fn send(&self, op: &WcsOperation) -> Result<Vec<u8>> {
        let params = assemble_wcs_params(&self.coverage_id, op);
        debug!("GET {} {}", self.base_url, op.request_name());

        let response = self.client.get(&self.base_url).query(&params).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if status != StatusCode::OK {
            let excerpt = String::from_utf8_lossy(&body[..body.len().min(ERR_EXCERPT_LEN)]).to_string();
            return Err(op_failed(format!(
                "failed to send {} request to WCS server - code ({}): {}",
                op.request_name(), status.as_str(), excerpt
            )));
        }

        info!("received valid response from GAEZ WCS server ({} bytes)", body.len());
        Ok(body.to_vec())
    }

    /// service capabilities document, XML text returned verbatim
    pub async fn get_capabilities(&self) -> Result<String> {
        let body = self.send(&WcsOperation::GetCapabilities).await?;
        Ok(String::from_utf8_lossy(&body).to_string())
    }

    /// coverage description document, XML text returned verbatim
    pub async fn describe_coverage(&self) -> Result<String> {
        let body = self.send(&WcsOperation::DescribeCoverage).await?;
        Ok(String::from_utf8_lossy(&body).to_string())
    }

    /// retrieve a coverage and write it to `path`. A write failure fails the operation
    pub async fn get_coverage(&self, cov: CoverageRequest, path: &Path) -> Result<PathBuf> {
        let body = self.send(&WcsOperation::GetCoverage(cov)).await?;
        write_file(path, &body)?;
        info!("coverage {} saved successfully", path.display());
        Ok(path.to_path_buf())
    }
}
