use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use actix_web_flash_messages::Level;

use catalog_console::models::config::ServerConfig;
use catalog_console::routes::alert_level_to_str;
use catalog_console::routes::products::{apply_product_filters, clear_product_filters};

fn server_config() -> ServerConfig {
    ServerConfig {
        domain: "localhost".into(),
        address: "127.0.0.1".into(),
        port: 8080,
        templates_dir: "templates/**/*".into(),
        secret: "s".repeat(64),
        admin_api_url: "http://localhost:3000/admin-api".into(),
        admin_api_token: None,
        cache_stale_secs: 30,
        cache_max_entries: 16,
        default_page_size: 10,
        max_page_size: 100,
    }
}

fn location(response: &actix_web::dev::ServiceResponse) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[core::prelude::v1::test]
fn test_alert_level_to_str_mappings() {
    assert_eq!(alert_level_to_str(&Level::Error), "danger");
    assert_eq!(alert_level_to_str(&Level::Warning), "warning");
    assert_eq!(alert_level_to_str(&Level::Success), "success");
    assert_eq!(alert_level_to_str(&Level::Info), "info");
    assert_eq!(alert_level_to_str(&Level::Debug), "info");
}

#[actix_web::test]
async fn filter_form_redirects_to_canonical_url() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(server_config()))
            .service(apply_product_filters),
    )
    .await;

    let request = test::TestRequest::post()
        .uri("/products/filters?page=3&sort=name:asc&utm_source=mail")
        .insert_header((header::CONTENT_TYPE, "application/x-www-form-urlencoded"))
        .set_payload("q=shoe&enabled=false&categories=4&categories=7&pageSize=10")
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        "/products?categories=4%2C7&enabled=false&q=shoe&sort=name%3Aasc&utm_source=mail"
    );
}

#[actix_web::test]
async fn clearing_filters_keeps_sorting_and_page_size() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(server_config()))
            .service(clear_product_filters),
    )
    .await;

    let request = test::TestRequest::post()
        .uri("/products/filters/clear?q=shoe&enabled=true&page=2&pageSize=25&sort=name:desc")
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/products?pageSize=25&sort=name%3Adesc");
}
