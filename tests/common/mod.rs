//! 集成测试共用的数据与辅助函数

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use housing_predictor::config::Config;
use housing_predictor::inference::{InferencePipeline, ServingContext};
use housing_predictor::server::http::app;
use housing_predictor::storage::LocalArtifactStore;
use housing_predictor::training;
use housing_predictor::Result;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

pub const ZIPCODES: [i64; 3] = [98118, 98028, 98001];

const DEMOGRAPHICS: &str = "\
ppltn_qty,urbn_ppltn_qty,zipcode,medn_hshld_incm_amt
41000,41000,98118,52000
20000,19500,98028,81000
31000,30000,98001,66000
";

const SALES_HEADER: &str = "id,date,price,bedrooms,bathrooms,sqft_living,sqft_lot,floors,waterfront,view,condition,grade,sqft_above,sqft_basement,yr_built,yr_renovated,zipcode,lat,long,sqft_living15,sqft_lot15";

/// 写入销售和人口统计 CSV，并返回指向临时目录的配置
pub fn write_fixtures(dir: &Path) -> Config {
    let demographics = dir.join("zipcode_demographics.csv");
    std::fs::write(&demographics, DEMOGRAPHICS).unwrap();

    let mut sales = format!("{}\n", SALES_HEADER);
    for i in 0..60i64 {
        let zipcode = ZIPCODES[(i % 3) as usize];
        let sqft_living = 900 + i * 37;
        let sqft_basement = (i % 3) * 200;
        let grade = 6 + i % 4;
        let price = 150 * sqft_living + 20_000 * grade + (i % 3) * 35_000;
        sales.push_str(&format!(
            "{},20140{}01T000000,{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{:.4},{:.3},{},{}\n",
            7_000_000 + i,
            1 + i % 9,
            price,
            2 + i % 4,
            1.0 + (i % 3) as f64 * 0.5,
            sqft_living,
            4000 + (i * 113) % 3000,
            1 + i % 2,
            i64::from(i % 10 == 0),
            i % 5,
            3 + i % 3,
            grade,
            sqft_living - sqft_basement,
            sqft_basement,
            1950 + i,
            if i % 7 == 0 { 2000 } else { 0 },
            zipcode,
            47.5 + i as f64 * 0.003,
            -122.3 + i as f64 * 0.002,
            1500 + i * 10,
            5000 + i * 20,
        ));
    }
    let sales_path = dir.join("kc_house_data.csv");
    std::fs::write(&sales_path, sales).unwrap();

    let mut config = Config::default();
    config.data.sales_path = sales_path;
    config.data.demographics_path = demographics;
    config.artifacts.output_dir = dir.join("model");
    config.artifacts.registry_root = dir.join("registry");
    config
}

/// 训练并写出本地产物，然后构建服务上下文
pub async fn serving_context(config: &Config) -> Result<ServingContext> {
    let store = LocalArtifactStore::new(&config.artifacts.output_dir);
    training::run(config, &store).await?;
    ServingContext::build(config, &store).await
}

/// 训练并构建完整的 HTTP 应用
pub async fn serving_app(config: &Config) -> Router {
    let context = serving_context(config).await.unwrap();
    app(InferencePipeline::new(Arc::new(context)))
}

/// 发送 JSON 请求，返回状态码和响应体
pub async fn post_json(app: &Router, uri: &str, body: &Value) -> (StatusCode, Value) {
    post_raw(app, uri, serde_json::to_string(body).unwrap()).await
}

pub async fn post_raw(app: &Router, uri: &str, body: String) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    read_response(response).await
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    read_response(response).await
}

async fn read_response(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

pub fn typical_house() -> Value {
    json!({
        "bedrooms": 3,
        "bathrooms": 2,
        "sqft_living": 2000,
        "sqft_lot": 5000,
        "floors": 2,
        "sqft_above": 1500,
        "sqft_basement": 500,
        "zipcode": 98118,
        "waterfront": 0,
        "view": 3,
        "condition": 5,
        "grade": 7,
        "yr_built": 1980,
        "yr_renovated": 0,
        "lat": 47.5112,
        "long": -122.257,
        "sqft_living15": 1890,
        "sqft_lot15": 4750
    })
}

pub fn waterfront_house() -> Value {
    json!({
        "bedrooms": 2,
        "bathrooms": 1,
        "sqft_living": 1200,
        "sqft_lot": 6000,
        "floors": 1,
        "sqft_above": 1200,
        "sqft_basement": 0,
        "zipcode": 98028,
        "waterfront": 1,
        "view": 4,
        "condition": 3,
        "grade": 9,
        "yr_built": 1960,
        "yr_renovated": 2005,
        "lat": 47.7379,
        "long": -122.233,
        "sqft_living15": 2020,
        "sqft_lot15": 7460
    })
}
