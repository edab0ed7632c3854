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

use std::io::Write;

use gaez_imagery::host::{import_raster, LogHost, RasterHost};
use gaez_imagery::*;

#[test]
fn test_theme_service_ids() {
    use GaezTheme::*;

    let themes = [
        LandAndWaterResources, AgroClimaticResources, AgroClimaticPotentialYield,
        SuitabilityAndAttainableYield, ActualYieldsAndProduction, YieldAndProductionGaps,
    ];
    for theme in themes {
        assert_eq!(GaezTheme::for_service_id(theme.service_id()), Some(theme));
    }
    assert_eq!(SuitabilityAndAttainableYield.service_id(), "res05");
    assert!(GaezTheme::for_service_id("res99").is_none());
}

#[test]
fn test_default_config_urls() {
    let conf = GaezConfig::default();
    assert_eq!(
        conf.export_url(),
        "https://gaez-services.fao.org/server/rest/services/res05/ImageServer/exportImage"
    );
    assert_eq!(
        conf.query_url(),
        "https://gaez-services.fao.org/server/rest/services/res05/ImageServer/query"
    );
}

#[test]
fn test_load_gaez_config() {
    let conf: GaezConfig = load_config("config/gaez.ron").unwrap();
    assert_eq!(conf.service, "res05");
    assert_eq!(conf.min_image_len, 1000);
}

#[test]
fn test_load_export_request_config() {
    // the shipped worked example has to parse and assemble
    let request: ExportRequest = load_config("config/wheat_rainfed.ron").unwrap();

    assert_eq!(request.format, Some(ImageFormat::Tiff));
    assert_eq!(request.f, Some(ResponseFormat::Image));

    let rule = request.mosaic_rule.as_ref().unwrap();
    let clause = rule.where_clause.compile();
    assert!(clause.starts_with("(UPPER(sub_theme_name) = 'AGRO-ECOLOGICAL ATTAINABLE YIELD ')"));
    assert!(clause.ends_with("(UPPER(water_supply) = 'RAINFED')"));
    assert_eq!(clause.matches(" AND ").count(), 3);

    let params = request.assemble().unwrap();
    let keys: Vec<&str> = params.iter().map(|(k, _)| *k).collect();
    assert_eq!(
        keys,
        vec!["renderingRule", "mosaicRule", "bandIds", "imageSR", "bboxSR", "format", "f", "bbox", "size"]
    );
}

#[test]
fn test_load_query_config() {
    let request: QueryRequest = load_config("config/crop_query.ron").unwrap();
    assert_eq!(request.out_fields.as_deref(), Some("crop"));
    assert_eq!(request.return_distinct_values, Some(true));
}

#[test]
fn test_load_config_missing_file() {
    let result: Result<GaezConfig> = load_config("config/no_such.ron");
    assert!(matches!(result, Err(GaezError::ConfigError(_))));
}

#[test]
fn test_write_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("body.tif");

    let body = b"II*\x00fake tiff bytes";
    write_file(&path, body).unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), body);
}

#[test]
fn test_import_raster() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("layer.tif");
    write_file(&path, b"II*\x00fake tiff bytes").unwrap();

    let mut host = LogHost;
    assert!(import_raster(&mut host, &path).unwrap());

    // an empty file is not a valid layer
    let empty = dir.path().join("empty.tif");
    write_file(&empty, b"").unwrap();
    assert!(!import_raster(&mut host, &empty).unwrap());
}
