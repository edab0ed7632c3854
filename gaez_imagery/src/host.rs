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

//! capability interface towards a GIS host application (e.g. QGIS) that can turn a
//! downloaded raster file into a registered map layer. The client itself never depends
//! on this - callers compose with it after the file is written.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::errors::Result;

/// a GIS host that can construct raster layers from files and register them
/// in its active project. Validity checking is the host's responsibility
pub trait RasterHost {
    type Layer;

    fn load_raster(&self, path: &Path) -> Result<Self::Layer>;
    fn is_valid(&self, layer: &Self::Layer) -> bool;
    fn register_in_active_project(&mut self, layer: Self::Layer) -> Result<()>;
}

/// load a written raster file into the host's active project.
/// Returns false if the host rejects the layer as invalid
pub fn import_raster<H>(host: &mut H, path: &Path) -> Result<bool>
where
    H: RasterHost,
{
    let layer = host.load_raster(path)?;
    if host.is_valid(&layer) {
        host.register_in_active_project(layer)?;
        Ok(true)
    } else {
        Ok(false)
    }
}

/// stand-in host for the CLI tools, which have no GIS instance to talk to.
/// It accepts any existing non-empty file and just logs the registration
pub struct LogHost;

impl RasterHost for LogHost {
    type Layer = PathBuf;

    fn load_raster(&self, path: &Path) -> Result<PathBuf> {
        Ok(path.to_path_buf())
    }

    fn is_valid(&self, layer: &PathBuf) -> bool {
        std::fs::metadata(layer).map(|m| m.is_file() && m.len() > 0).unwrap_or(false)
    }

    fn register_in_active_project(&mut self, layer: PathBuf) -> Result<()> {
        info!("raster layer {} registered in active project", layer.display());
        Ok(())
    }
}
