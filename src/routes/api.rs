use actix_web::{HttpRequest, HttpResponse, Responder, get, web};
use serde_json::json;

use crate::dto::api::ListResponse;
use crate::list::controller::ListQueryStateController;
use crate::list::url::HistoryNavigator;
use crate::models::config::ServerConfig;
use crate::repository::GraphqlRepository;
use crate::services::products::{PRODUCTS_PATH, load_products, product_list_schema};
use crate::services::{QueryCaches, ServiceError};

/// JSON page of products for the same query string the HTML list accepts.
#[get("/v1/products")]
pub async fn api_v1_products(
    req: HttpRequest,
    repo: web::Data<GraphqlRepository>,
    caches: web::Data<QueryCaches>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    let controller = ListQueryStateController::mount(
        product_list_schema(server_config.default_page_size, server_config.max_page_size),
        HistoryNavigator::new(PRODUCTS_PATH, req.query_string()),
    );
    let options = controller.query_options();

    match load_products(repo.get_ref(), &caches.products, &options).await {
        Ok(loaded) => HttpResponse::Ok().json(ListResponse {
            state: controller.filters(),
            options: &options,
            page: loaded.value,
            error: loaded.error,
        }),
        Err(ServiceError::NotFound) => HttpResponse::NotFound().finish(),
        Err(err) => {
            log::error!("Failed to list products: {err}");
            HttpResponse::BadGateway().json(json!({ "error": err.to_string() }))
        }
    }
}
