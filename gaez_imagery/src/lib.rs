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
#![allow(unused)]
#![doc = include_str!("../doc/gaez_imagery.md")]

use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
    str::FromStr,
};

use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};

pub mod host;
pub mod wcs;

mod errors;
pub use errors::*;

/* #region themes and configuration *********************************************************************/

/// the six GAEZ v4 data themes and their ImageServer service identifiers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GaezTheme {
    LandAndWaterResources,
    AgroClimaticResources,
    AgroClimaticPotentialYield,
    SuitabilityAndAttainableYield,
    ActualYieldsAndProduction,
    YieldAndProductionGaps,
}

impl GaezTheme {
    pub fn service_id(&self) -> &'static str {
        match *self {
            GaezTheme::LandAndWaterResources => "LR",
            GaezTheme::AgroClimaticResources => "res01",
            GaezTheme::AgroClimaticPotentialYield => "res02",
            GaezTheme::SuitabilityAndAttainableYield => "res05",
            GaezTheme::ActualYieldsAndProduction => "res06",
            GaezTheme::YieldAndProductionGaps => "res07",
        }
    }

    pub fn for_service_id(id: &str) -> Option<GaezTheme> {
        match id {
            "LR" => Some(GaezTheme::LandAndWaterResources),
            "res01" => Some(GaezTheme::AgroClimaticResources),
            "res02" => Some(GaezTheme::AgroClimaticPotentialYield),
            "res05" => Some(GaezTheme::SuitabilityAndAttainableYield),
            "res06" => Some(GaezTheme::ActualYieldsAndProduction),
            "res07" => Some(GaezTheme::YieldAndProductionGaps),
            _ => None,
        }
    }

    pub fn description(&self) -> &'static str {
        match *self {
            GaezTheme::LandAndWaterResources => "Theme 1: Land and Water Resources",
            GaezTheme::AgroClimaticResources => "Theme 2: Agro-climatic Resources",
            GaezTheme::AgroClimaticPotentialYield => "Theme 3: Agro-climatic Potential Yield",
            GaezTheme::SuitabilityAndAttainableYield => "Theme 4: Suitability and Attainable Yield",
            GaezTheme::ActualYieldsAndProduction => "Theme 5: Actual Yields and Production",
            GaezTheme::YieldAndProductionGaps => "Theme 6: Yield and Production Gaps",
        }
    }
}

/// general GAEZ server parameters. This replaces the edit-and-run constants of the
/// original scripts - all run parameters are passed in explicitly, nothing is ambient
#[derive(Clone, Serialize, Deserialize, Debug)]
#[serde(default)]
pub struct GaezConfig {
    /// server URL up to (not including) the service path (e.g. https://gaez-services.fao.org/server)
    pub server_url: String,

    /// theme service identifier (e.g. "res05")
    pub service: String,

    /// bodies below this length are re-checked as error envelopes before we accept them as image data.
    /// Best-effort heuristic - a legitimate image smaller than this is indistinguishable from an error
    pub min_image_len: u64,
}

impl Default for GaezConfig {
    fn default() -> Self {
        GaezConfig {
            server_url: "https://gaez-services.fao.org/server".to_string(),
            service: GaezTheme::SuitabilityAndAttainableYield.service_id().to_string(),
            min_image_len: 1000,
        }
    }
}

impl GaezConfig {
    pub fn for_theme(theme: GaezTheme) -> Self {
        GaezConfig {
            service: theme.service_id().to_string(),
            ..Self::default()
        }
    }

    pub fn export_url(&self) -> String {
        format!("{}/rest/services/{}/ImageServer/exportImage", self.server_url, self.service)
    }

    pub fn query_url(&self) -> String {
        format!("{}/rest/services/{}/ImageServer/query", self.server_url, self.service)
    }

    pub fn wcs_url(&self) -> String {
        format!("{}/services/{}/ImageServer/WCSServer", self.server_url, self.service)
    }
}

/// load a RON config value from an explicit path
pub fn load_config<C>(path: impl AsRef<Path>) -> Result<C>
where
    C: DeserializeOwned,
{
    let path = path.as_ref();
    let data = std::fs::read_to_string(path)
        .map_err(|e| config_error(format!("failed to read config {path:?}: {e}")))?;
    ron::from_str(&data).map_err(|e| config_error(format!("failed to parse config {path:?}: {e}")))
}

/* #endregion themes and configuration */

/* #region mosaic and rendering rules *******************************************************************/

/// the tile selection filter of a mosaic rule - either an ordered list of predicates
/// with conjunction semantics, or one pre-joined predicate string
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum WhereClause {
    Joined(String),
    Predicates(Vec<String>),
}

impl WhereClause {
    /// flatten into a single boolean-expression string: `(p1) AND (p2) AND .. AND (pn)`.
    /// A pre-joined string is passed through unchanged - we do not validate or normalize
    /// predicate content (note the server does care about trailing whitespace in compared literals)
    pub fn compile(&self) -> String {
        match self {
            WhereClause::Joined(clause) => clause.clone(),
            WhereClause::Predicates(predicates) => {
                let mut clause = String::new();
                for (i, predicate) in predicates.iter().enumerate() {
                    if i > 0 {
                        clause.push_str(" AND ");
                    }
                    clause.push('(');
                    clause.push_str(predicate);
                    clause.push(')');
                }
                clause
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            WhereClause::Joined(clause) => clause.is_empty(),
            WhereClause::Predicates(predicates) => predicates.is_empty(),
        }
    }
}

impl Default for WhereClause {
    fn default() -> Self {
        WhereClause::Joined(String::new())
    }
}

/// server-side instruction for selecting/combining overlapping raster tiles.
/// Field order matters - it is the key order of the emitted JSON
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MosaicRule {
    pub mosaic_method: String,

    #[serde(rename = "where")]
    pub where_clause: WhereClause,

    pub sort_field: String,
    pub ascending: bool,
    pub mosaic_operation: String,
}

impl Default for MosaicRule {
    fn default() -> Self {
        MosaicRule {
            mosaic_method: "esriMosaicNorthwest".to_string(),
            where_clause: WhereClause::default(),
            sort_field: String::new(),
            ascending: true,
            mosaic_operation: "MT_FIRST".to_string(),
        }
    }
}

impl MosaicRule {
    /// normalized copy whose `where` is a single pre-joined string
    pub fn compiled(&self) -> MosaicRule {
        MosaicRule {
            where_clause: WhereClause::Joined(self.where_clause.compile()),
            ..self.clone()
        }
    }

    /// compact JSON text as embedded in the outgoing parameter set. The emitted
    /// `where` is always a single string
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.compiled())?)
    }
}

/// server-side instruction naming the symbology/processing function applied before export.
/// Opaque pass-through, serialized to compact JSON
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RenderingRule {
    pub raster_function: String,
}

impl RenderingRule {
    pub fn new(raster_function: impl ToString) -> Self {
        RenderingRule { raster_function: raster_function.to_string() }
    }
}

/* #endregion mosaic and rendering rules */

/* #region export requests ******************************************************************************/

/// the raster formats the image server can export
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    JpgPng, Png, Png8, Png24, Jpg, Bmp, Gif, Tiff, Png32, Bip, Bsq, Lerc,
}

impl ImageFormat {
    pub fn as_str(&self) -> &'static str {
        match *self {
            ImageFormat::JpgPng => "jpgpng",
            ImageFormat::Png => "png",
            ImageFormat::Png8 => "png8",
            ImageFormat::Png24 => "png24",
            ImageFormat::Jpg => "jpg",
            ImageFormat::Bmp => "bmp",
            ImageFormat::Gif => "gif",
            ImageFormat::Tiff => "tiff",
            ImageFormat::Png32 => "png32",
            ImageFormat::Bip => "bip",
            ImageFormat::Bsq => "bsq",
            ImageFormat::Lerc => "lerc",
        }
    }

    pub fn for_name(name: &str) -> Option<ImageFormat> {
        match name {
            "jpgpng" => Some(ImageFormat::JpgPng),
            "png" => Some(ImageFormat::Png),
            "png8" => Some(ImageFormat::Png8),
            "png24" => Some(ImageFormat::Png24),
            "jpg" => Some(ImageFormat::Jpg),
            "bmp" => Some(ImageFormat::Bmp),
            "gif" => Some(ImageFormat::Gif),
            "tiff" => Some(ImageFormat::Tiff),
            "png32" => Some(ImageFormat::Png32),
            "bip" => Some(ImageFormat::Bip),
            "bsq" => Some(ImageFormat::Bsq),
            "lerc" => Some(ImageFormat::Lerc),
            _ => None,
        }
    }
}

impl FromStr for ImageFormat {
    type Err = GaezError;

    fn from_str(s: &str) -> Result<Self> {
        Self::for_name(s).ok_or_else(|| GaezError::InvalidImageFormat(s.to_string()))
    }
}

/// the response envelope format ('f' parameter). 'image' streams raw bytes, 'json'
/// returns metadata with an href to the rendered image, 'html'/'kmz' are documents
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    Json, Image, Kmz, Html,
}

impl ResponseFormat {
    pub fn as_str(&self) -> &'static str {
        match *self {
            ResponseFormat::Json => "json",
            ResponseFormat::Image => "image",
            ResponseFormat::Kmz => "kmz",
            ResponseFormat::Html => "html",
        }
    }

    pub fn for_name(name: &str) -> Option<ResponseFormat> {
        match name {
            "json" => Some(ResponseFormat::Json),
            "image" => Some(ResponseFormat::Image),
            "kmz" => Some(ResponseFormat::Kmz),
            "html" => Some(ResponseFormat::Html),
            _ => None,
        }
    }
}

impl FromStr for ResponseFormat {
    type Err = GaezError;

    fn from_str(s: &str) -> Result<Self> {
        Self::for_name(s).ok_or_else(|| GaezError::InvalidResponseFormat(s.to_string()))
    }
}

/// the flat string parameter set an assembled request turns into. Order is emission
/// order, which keeps the outgoing query string reproducible
pub type ExportParams = Vec<(&'static str, String)>;

/// everything a caller may ask the exportImage endpoint for. Every field is
/// independently optional - absence means the parameter is omitted from the
/// outgoing request, never that a default is substituted
#[derive(Clone, Serialize, Deserialize, Debug, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportRequest {
    pub rendering_rule: Option<RenderingRule>,
    pub mosaic_rule: Option<MosaicRule>,
    pub band_ids: Option<String>,

    #[serde(rename = "imageSR")]
    pub image_sr: Option<String>,

    #[serde(rename = "bboxSR")]
    pub bbox_sr: Option<String>,

    /// exported raster format
    pub format: Option<ImageFormat>,

    /// response envelope format
    pub f: Option<ResponseFormat>,

    /// comma separated minX,minY,maxX,maxY in bboxSR units
    pub bbox: Option<String>,

    /// output size as "width,height" in pixels
    pub size: Option<String>,
}

impl ExportRequest {
    /// assemble the flat parameter set for the exportImage request. Rule objects are
    /// serialized to compact JSON, with the mosaic `where` compiled to a single string
    /// first. Absent fields do not show up in the output
    pub fn assemble(&self) -> Result<ExportParams> {
        let mut params: ExportParams = Vec::new();

        if let Some(rule) = &self.rendering_rule {
            params.push(("renderingRule", serde_json::to_string(rule)?));
        }
        if let Some(rule) = &self.mosaic_rule {
            params.push(("mosaicRule", rule.to_json()?));
        }
        if let Some(band_ids) = &self.band_ids {
            params.push(("bandIds", band_ids.clone()));
        }
        if let Some(image_sr) = &self.image_sr {
            params.push(("imageSR", image_sr.clone()));
        }
        if let Some(bbox_sr) = &self.bbox_sr {
            params.push(("bboxSR", bbox_sr.clone()));
        }
        if let Some(format) = &self.format {
            params.push(("format", format.as_str().to_string()));
        }
        if let Some(f) = &self.f {
            params.push(("f", f.as_str().to_string()));
        }
        if let Some(bbox) = &self.bbox {
            params.push(("bbox", bbox.clone()));
        }
        if let Some(size) = &self.size {
            params.push(("size", size.clone()));
        }

        Ok(params)
    }
}

/// attribute table query against the ImageServer `query` endpoint
/// (e.g. to list the distinct crops a service covers)
#[derive(Clone, Serialize, Deserialize, Debug, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct QueryRequest {
    #[serde(rename = "where")]
    pub where_clause: Option<WhereClause>,

    pub out_fields: Option<String>,
    pub return_geometry: Option<bool>,
    pub return_distinct_values: Option<bool>,
    pub return_count_only: Option<bool>,
    pub f: Option<ResponseFormat>,
}

impl QueryRequest {
    pub fn assemble(&self) -> ExportParams {
        let mut params: ExportParams = Vec::new();

        if let Some(where_clause) = &self.where_clause {
            params.push(("where", where_clause.compile()));
        }
        if let Some(out_fields) = &self.out_fields {
            params.push(("outFields", out_fields.clone()));
        }
        if let Some(v) = self.return_geometry {
            params.push(("returnGeometry", v.to_string()));
        }
        if let Some(v) = self.return_distinct_values {
            params.push(("returnDistinctValues", v.to_string()));
        }
        if let Some(v) = self.return_count_only {
            params.push(("returnCountOnly", v.to_string()));
        }
        if let Some(f) = &self.f {
            params.push(("f", f.as_str().to_string()));
        }

        params
    }
}

/* #endregion export requests */

/* #region image server client **************************************************************************/

/// what a completed download produced
#[derive(Debug)]
pub enum ExportOutcome {
    /// raster bytes written to this path
    Saved(PathBuf),
    /// document body (f=html) returned verbatim
    Document(String),
}

/// client for one GAEZ ImageServer service. Requests are strictly sequential -
/// one GET, then the optional href follow-up, then the file write
pub struct GaezImageClient {
    config: GaezConfig,
    client: Client,
}

impl GaezImageClient {
    pub fn new(config: GaezConfig) -> Self {
        GaezImageClient { config, client: Client::new() }
    }

    pub fn for_theme(theme: GaezTheme) -> Self {
        Self::new(GaezConfig::for_theme(theme))
    }

    pub fn config(&self) -> &GaezConfig {
        &self.config
    }

    /// issue the exportImage GET and return the raw body. Fails on non-200, with
    /// the service error envelope decoded if the body carries one
    pub async fn export_image(&self, request: &ExportRequest) -> Result<Vec<u8>> {
        let params = request.assemble()?;
        let url = self.config.export_url();
        debug!("GET {} with {} parameters", url, params.len());

        let response = self.client.get(&url).query(&params).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if status != StatusCode::OK {
            return Err(service_error(status, &body));
        }

        info!("received valid response from GAEZ image server ({} bytes)", body.len());
        Ok(body.to_vec())
    }

    /// query the service attribute table (metadata about the available rasters)
    pub async fn query(&self, request: &QueryRequest) -> Result<JsonValue> {
        let params = request.assemble();
        let response = self.client.get(&self.config.query_url()).query(&params).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if status != StatusCode::OK {
            return Err(service_error(status, &body));
        }

        Ok(serde_json::from_slice(&body)?)
    }

    /// run one export and dispatch on the response envelope format:
    /// f=image/kmz writes the body to `path`, f=json follows the contained href
    /// with a second GET and writes that body, f=html returns the document text.
    /// A write failure fails the whole operation
    pub async fn download_image(&self, request: &ExportRequest, path: &Path) -> Result<ExportOutcome> {
        let f = request.f.ok_or_else(|| op_failed("export request has no response format (f)"))?;

        let body = self.export_image(request).await?;
        if body.is_empty() {
            return Err(no_data("no content returned from server - check your parameters"));
        }
        if (body.len() as u64) < self.config.min_image_len {
            // tiny bodies are more often error envelopes than legitimate images
            if let Some(err) = error_from_envelope(&body) {
                return Err(err);
            }
            warn!("response is only {} bytes but not an error envelope, keeping it", body.len());
        }

        match f {
            ResponseFormat::Image | ResponseFormat::Kmz => {
                write_file(path, &body)?;
                info!("image {} saved successfully", path.display());
                Ok(ExportOutcome::Saved(path.to_path_buf()))
            }
            ResponseFormat::Json => {
                let meta: JsonValue = serde_json::from_slice(&body)?;
                let href = meta
                    .get("href")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| no_data("no 'href' field in JSON response"))?;
                info!("image URL: {}", href);

                let len = self.download_href(href, path).await?;
                info!("image {} saved successfully ({} bytes)", path.display(), len);
                Ok(ExportOutcome::Saved(path.to_path_buf()))
            }
            ResponseFormat::Html => Ok(ExportOutcome::Document(String::from_utf8_lossy(&body).to_string())),
        }
    }

    /// follow the href of a JSON envelope. No retry - a failed secondary fetch is terminal
    async fn download_href(&self, url: &str, path: &Path) -> Result<u64> {
        let mut response = self.client.get(url).send().await?;
        if response.status() != StatusCode::OK {
            return Err(op_failed(format!(
                "failed to download image from URL {} - status {}", url, response.status().as_str()
            )));
        }

        let mut file = File::create(path)?;
        let mut len: u64 = 0;
        while let Some(chunk) = response.chunk().await? {
            len += chunk.len() as u64;
            file.write_all(&chunk)?;
        }
        file.flush()?;

        Ok(len)
    }
}

/// write a complete response body to `path`
pub fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.flush()?;
    Ok(())
}

/* #endregion image server client */
