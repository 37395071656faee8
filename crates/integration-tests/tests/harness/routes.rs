//! A small order service with handlers in every style

use std::collections::HashMap;

use axum::extract::{Path, Query};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use faultline_core::{BadRequest, Fault, UpstreamFailure, validate_query_parameter};
use faultline_server::{FaultResponse, HandlerResult, ValidJson, ValidQuery, collect_json};
use futures_util::stream;
use http::StatusCode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct Order {
    id: u32,
    express: bool,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    customer: String,
    express: bool,
    status: Status,
    lines: Vec<Line>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Open,
    OnHold,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Line {
    sku: String,
    qty: u32,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Paging {
    page: u32,
    size: Option<u32>,
}

pub fn router() -> Router {
    Router::new()
        .route("/blocking/orders", get(list_orders).post(create_order))
        .route("/blocking/orders/{id}", get(order_by_id))
        .route("/blocking/search", get(search))
        .route("/reactive/orders/{id}", get(reactive_order))
        .route("/reactive/orders", get(reactive_orders))
        .route("/annotated/orders", get(annotated_list).post(annotated_create))
}

async fn list_orders() -> HandlerResult<Json<Vec<Order>>> {
    Ok(Json(vec![Order { id: 1, express: false }]))
}

async fn create_order() -> HandlerResult<Json<Order>> {
    Err(Fault::duplicate("order 9 already exists").into())
}

async fn order_by_id(Path(id): Path<u32>) -> HandlerResult<Json<Order>> {
    match id {
        1 => Ok(Json(Order { id, express: true })),
        2 => Err(Fault::not_found(format!("order {id} does not exist")).into()),
        3 => Err(anyhow::anyhow!("connection refused: db:5432").context("loading order 3").into()),
        4 => Err(UpstreamFailure::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "503 Service Unavailable from GET http://inventory/items/4",
            Some("{\"error\":\"maintenance\"}".to_owned()),
        )
        .into()),
        5 => Err(UpstreamFailure::new(
            StatusCode::NOT_FOUND,
            "404 Not Found from GET http://customers/5",
            None,
        )
        .into()),
        6 => Err(BadRequest::new("page size 500 exceeds 100").with_description("Invalid paging").into()),
        _ => Err(Fault::resource_not_found(format!("no resource for {id}")).into()),
    }
}

async fn search(Query(params): Query<HashMap<String, String>>) -> HandlerResult<Json<Vec<Order>>> {
    let tenant = validate_query_parameter(params.get("tenant").map(String::as_str), "tenant", "[a-z]{3,8}", true)?;
    let _page = validate_query_parameter(params.get("page").map(String::as_str), "page", r"\d+", false)?;

    match tenant {
        Some("acme") => Ok(Json(Vec::new())),
        _ => Err(Fault::forbidden("tenant is not served here").into()),
    }
}

async fn reactive_order(Path(id): Path<u32>) -> Response {
    if id == 1 {
        Json(Order { id, express: false }).into_response()
    } else {
        FaultResponse::new(Fault::unauthorized(format!("token cannot read order {id}"))).into_response()
    }
}

async fn reactive_orders() -> Response {
    let orders = stream::iter(vec![
        Ok(Order { id: 1, express: false }),
        Err(Fault::internal("inventory stream closed unexpectedly")),
        Ok(Order { id: 2, express: true }),
    ]);
    collect_json(orders).await
}

async fn annotated_create(ValidJson(order): ValidJson<NewOrder>) -> Json<NewOrder> {
    Json(order)
}

async fn annotated_list(ValidQuery(paging): ValidQuery<Paging>) -> Json<Paging> {
    Json(paging)
}
