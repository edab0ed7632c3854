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

use gaez_imagery::*;
use serde_json::Value as JsonValue;

// run with "cargo test test_compile -- --nocapture"

#[test]
fn test_compile_predicate_list() {
    let clause = WhereClause::Predicates(vec![
        "UPPER(crop) = 'WHEAT'".to_string(),
        "UPPER(water_supply) = 'RAINFED'".to_string(),
    ]);
    assert_eq!(
        clause.compile(),
        "(UPPER(crop) = 'WHEAT') AND (UPPER(water_supply) = 'RAINFED')"
    );

    let three = WhereClause::Predicates(vec!["p1".to_string(), "p2".to_string(), "p3".to_string()]);
    assert_eq!(three.compile(), "(p1) AND (p2) AND (p3)");
}

#[test]
fn test_compile_single_predicate() {
    let clause = WhereClause::Predicates(vec!["p1".to_string()]);
    assert_eq!(clause.compile(), "(p1)"); // no leading/trailing AND
}

#[test]
fn test_compile_empty() {
    let clause = WhereClause::Predicates(Vec::new());
    assert_eq!(clause.compile(), "");
    assert!(clause.is_empty());
}

#[test]
fn test_compile_joined_passthrough() {
    let joined = "(p1) AND (p2)".to_string();
    let clause = WhereClause::Joined(joined.clone());
    assert_eq!(clause.compile(), joined);

    // idempotent under re-application
    let recompiled = WhereClause::Joined(clause.compile()).compile();
    assert_eq!(recompiled, joined);
}

#[test]
fn test_assemble_minimal_request() {
    let request = ExportRequest {
        bbox: Some("-180,-90,180,90".to_string()),
        size: Some("4000,2000".to_string()),
        format: Some(ImageFormat::Tiff),
        ..ExportRequest::default()
    };

    let params = request.assemble().unwrap();
    assert_eq!(
        params,
        vec![
            ("format", "tiff".to_string()),
            ("bbox", "-180,-90,180,90".to_string()),
            ("size", "4000,2000".to_string()),
        ]
    );
}

#[test]
fn test_assemble_empty_request() {
    // absent fields never produce parameters
    let params = ExportRequest::default().assemble().unwrap();
    assert!(params.is_empty());
}

#[test]
fn test_assemble_rule_serialization() {
    let request = ExportRequest {
        rendering_rule: Some(RenderingRule::new("Suitability and Attainable Yield Symbology")),
        mosaic_rule: Some(MosaicRule {
            where_clause: WhereClause::Predicates(vec![
                "UPPER(crop) = 'WHEAT'".to_string(),
                "UPPER(water_supply) = 'RAINFED'".to_string(),
            ]),
            ..MosaicRule::default()
        }),
        f: Some(ResponseFormat::Image),
        ..ExportRequest::default()
    };

    let params = request.assemble().unwrap();
    let keys: Vec<&str> = params.iter().map(|(k, _)| *k).collect();
    assert_eq!(keys, vec!["renderingRule", "mosaicRule", "f"]);

    assert_eq!(
        params[0].1,
        r#"{"rasterFunction":"Suitability and Attainable Yield Symbology"}"#
    );

    // deterministic key order and a compiled single-string where
    assert_eq!(
        params[1].1,
        concat!(
            r#"{"mosaicMethod":"esriMosaicNorthwest","#,
            r#""where":"(UPPER(crop) = 'WHEAT') AND (UPPER(water_supply) = 'RAINFED')","#,
            r#""sortField":"","ascending":true,"mosaicOperation":"MT_FIRST"}"#
        )
    );

    // parsing the JSON back yields the input rule with where normalized
    let parsed: MosaicRule = serde_json::from_str(&params[1].1).unwrap();
    assert_eq!(parsed, request.mosaic_rule.as_ref().unwrap().compiled());
}

#[test]
fn test_mosaic_rule_compiled_is_stable() {
    let rule = MosaicRule {
        where_clause: WhereClause::Predicates(vec!["p1".to_string(), "p2".to_string()]),
        ..MosaicRule::default()
    };

    let compiled = rule.compiled();
    assert_eq!(compiled.where_clause, WhereClause::Joined("(p1) AND (p2)".to_string()));
    assert_eq!(compiled.compiled(), compiled); // recompiling changes nothing
}

#[test]
fn test_assemble_spatial_references() {
    let request = ExportRequest {
        band_ids: Some("".to_string()),
        image_sr: Some("4326".to_string()),
        bbox_sr: Some("4326".to_string()),
        ..ExportRequest::default()
    };

    let params = request.assemble().unwrap();
    assert_eq!(
        params,
        vec![
            ("bandIds", "".to_string()),
            ("imageSR", "4326".to_string()),
            ("bboxSR", "4326".to_string()),
        ]
    );
}

#[test]
fn test_assemble_query_request() {
    let request = QueryRequest {
        out_fields: Some("crop".to_string()),
        return_geometry: Some(false),
        return_distinct_values: Some(true),
        return_count_only: Some(false),
        f: Some(ResponseFormat::Json),
        ..QueryRequest::default()
    };

    let params = request.assemble();
    assert_eq!(
        params,
        vec![
            ("outFields", "crop".to_string()),
            ("returnGeometry", "false".to_string()),
            ("returnDistinctValues", "true".to_string()),
            ("returnCountOnly", "false".to_string()),
            ("f", "json".to_string()),
        ]
    );
}

#[test]
fn test_query_request_where_is_compiled() {
    let request = QueryRequest {
        where_clause: Some(WhereClause::Predicates(vec![
            "UPPER(crop) = 'WHEAT'".to_string(),
        ])),
        ..QueryRequest::default()
    };

    let params = request.assemble();
    assert_eq!(params, vec![("where", "(UPPER(crop) = 'WHEAT')".to_string())]);
}
