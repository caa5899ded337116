//! Admin console for a product catalog served by a remote GraphQL admin API.
//!
//! The `data` feature carries the list-state core, the query cache and the
//! repository ports; `server` adds the Actix-web console on top.

pub mod domain;
pub mod error_conversions;
pub mod forms;
pub mod list;
pub mod models;
pub mod query;
pub mod repository;

#[cfg(feature = "server")]
pub mod dto;
#[cfg(feature = "server")]
pub mod pagination;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "server")]
pub mod services;

#[cfg(feature = "server")]
pub use server::run;

#[cfg(feature = "server")]
mod server {
    use actix_cors::Cors;
    use actix_files::Files;
    use actix_web::cookie::Key;
    use actix_web::{App, HttpServer, middleware, web};
    use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};
    use tera::Tera;

    use crate::models::config::ServerConfig;
    use crate::repository::GraphqlRepository;
    use crate::routes::api::api_v1_products;
    use crate::routes::products::{
        apply_product_filters, bulk_products, clear_product_filters, create_product,
        delete_product, duplicate_product, new_product, save_product, save_product_assets,
        show_product, show_products, toggle_product,
    };
    use crate::routes::redirect;
    use crate::routes::variants::{
        apply_variant_filters, bulk_variants, create_variants, delete_variant, save_variant,
        show_variants, toggle_variant,
    };
    use crate::services::QueryCaches;

    /// Builds and runs the Actix-Web HTTP server using the provided configuration.
    pub async fn run(server_config: ServerConfig) -> std::io::Result<()> {
        let repo = GraphqlRepository::new(
            server_config.admin_api_url.clone(),
            server_config.admin_api_token.clone(),
        );

        // One cache for all workers so invalidation is seen everywhere.
        let caches = web::Data::new(QueryCaches::new(
            server_config.cache_stale_time(),
            server_config.cache_max_entries,
        ));

        let secret_key = Key::from(server_config.secret.as_bytes());
        let message_store = CookieMessageStore::builder(secret_key).build();
        let message_framework = FlashMessagesFramework::builder(message_store).build();

        let tera = Tera::new(&server_config.templates_dir)
            .map_err(|e| std::io::Error::other(format!("Template parsing error(s): {e}")))?;

        let bind_address = (server_config.address.clone(), server_config.port);

        HttpServer::new(move || {
            App::new()
                .wrap(Cors::permissive())
                .wrap(message_framework.clone())
                .wrap(middleware::Compress::default())
                .wrap(middleware::Logger::default())
                .service(Files::new("/assets", "./assets"))
                .service(web::scope("/api").service(api_v1_products))
                .route("/", web::get().to(|| async { redirect("/products") }))
                .service(show_products)
                .service(apply_product_filters)
                .service(clear_product_filters)
                .service(bulk_products)
                // Registered before `/products/{product_id}` so "new" is not taken for an id.
                .service(new_product)
                .service(create_product)
                .service(show_product)
                .service(save_product)
                .service(save_product_assets)
                .service(toggle_product)
                .service(delete_product)
                .service(duplicate_product)
                .service(show_variants)
                .service(apply_variant_filters)
                .service(create_variants)
                .service(bulk_variants)
                .service(toggle_variant)
                .service(delete_variant)
                .service(save_variant)
                .app_data(web::Data::new(tera.clone()))
                .app_data(web::Data::new(repo.clone()))
                .app_data(caches.clone())
                .app_data(web::Data::new(server_config.clone()))
        })
        .bind(bind_address)?
        .run()
        .await
    }
}
