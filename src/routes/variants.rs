use actix_web::{HttpRequest, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::domain::types::{ProductId, VariantId};
use crate::dto::list::ListView;
use crate::dto::products::CategoryOption;
use crate::dto::variants::{VariantRow, VariantsPageData};
use crate::forms::from_body;
use crate::forms::list::ListFilterForm;
use crate::forms::product::ToggleEnabledForm;
use crate::forms::variant::{
    CreateVariantsForm, VariantBulkActionForm, VariantForm, VariantTarget,
};
use crate::list::controller::ListQueryStateController;
use crate::list::page::PageResult;
use crate::list::url::HistoryNavigator;
use crate::models::config::ServerConfig;
use crate::repository::GraphqlRepository;
use crate::routes::{
    base_context, flash_bulk_outcome, flash_service_error, redirect, render_template, with_query,
};
use crate::services::facets::category_options_or_empty;
use crate::services::products::{PRODUCTS_PATH, get_product};
use crate::services::variants::{self, variant_list_schema, variants_path};
use crate::services::{QueryCaches, ServiceError};

fn list_controller(
    config: &ServerConfig,
    product_id: &ProductId,
    query: &str,
) -> ListQueryStateController<HistoryNavigator> {
    ListQueryStateController::mount(
        variant_list_schema(config.default_page_size, config.max_page_size),
        HistoryNavigator::new(variants_path(product_id), query),
    )
}

/// Product id from the path or the posted form, and the variant list to return to.
fn resolve_target(body: &[u8], req: &HttpRequest) -> Result<(ProductId, String), ServiceError> {
    let target: VariantTarget = from_body(body)?;
    let product_id = target.product_id()?;
    let location = with_query(&variants_path(&product_id), req.query_string());
    Ok((product_id, location))
}

#[get("/products/{product_id}/variants")]
pub async fn show_variants(
    req: HttpRequest,
    product_id: web::Path<String>,
    repo: web::Data<GraphqlRepository>,
    caches: web::Data<QueryCaches>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let product = match ProductId::new(product_id.as_str()) {
        Ok(id) => get_product(repo.get_ref(), &id).await,
        Err(err) => Err(ServiceError::from(err)),
    };
    let product = match product {
        Ok(product) => product,
        Err(err) => {
            flash_service_error("Loading the variants", &err);
            return redirect(PRODUCTS_PATH);
        }
    };

    let controller = list_controller(&server_config, &product.id, req.query_string());
    let options = controller.query_options();
    let (page, error) =
        match variants::load_variants(repo.get_ref(), &caches.variants, &product.id, &options)
            .await
        {
            Ok(loaded) => (loaded.value, loaded.error),
            Err(err) => (PageResult::empty(), Some(err.to_string())),
        };
    let view = ListView::new(&controller, page, error).map_items(VariantRow::from);
    let facet_values = category_options_or_empty(repo.get_ref(), &caches.facets).await;

    let mut context = base_context(&flash_messages, "products");
    context.insert("list", &view);
    context.insert("categories", &CategoryOption::from_values(&facet_values, &[]));
    context.insert("query", req.query_string());
    context.insert(
        "page",
        &VariantsPageData {
            product_id: product.id,
            product_name: product.name,
        },
    );

    render_template(&tera, "variants/index.html", &context)
}

#[post("/products/{product_id}/variants/filters")]
pub async fn apply_variant_filters(
    req: HttpRequest,
    product_id: web::Path<String>,
    body: web::Bytes,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    let Ok(product_id) = ProductId::new(product_id.as_str()) else {
        FlashMessage::error("Invalid product id.").send();
        return redirect(PRODUCTS_PATH);
    };

    let mut controller = list_controller(&server_config, &product_id, req.query_string());
    match from_body::<ListFilterForm>(&body) {
        Ok(form) => {
            let patch = form.to_patch(controller.schema());
            controller.set_filters(patch);
        }
        Err(err) => {
            log::error!("Failed to decode filter form: {err}");
            FlashMessage::error("Could not read the filter form.").send();
        }
    }
    redirect(&controller.navigator().location())
}

#[post("/variants/{variant_id}/enabled")]
pub async fn toggle_variant(
    req: HttpRequest,
    variant_id: web::Path<String>,
    body: web::Bytes,
    repo: web::Data<GraphqlRepository>,
    caches: web::Data<QueryCaches>,
) -> impl Responder {
    let (product_id, location) = match resolve_target(&body, &req) {
        Ok(target) => target,
        Err(err) => {
            flash_service_error("Changing the variant status", &err);
            return redirect(PRODUCTS_PATH);
        }
    };

    let result = match (
        VariantId::new(variant_id.as_str()),
        from_body::<ToggleEnabledForm>(&body),
    ) {
        (Ok(id), Ok(form)) => variants::set_variant_enabled(
            repo.get_ref(),
            &caches.variants,
            &product_id,
            &id,
            form.enabled,
        )
        .await
        .map(|()| form.enabled),
        (Err(err), _) => Err(ServiceError::from(err)),
        (_, Err(err)) => Err(ServiceError::from(err)),
    };

    match result {
        Ok(true) => FlashMessage::success("Variant enabled.").send(),
        Ok(false) => FlashMessage::success("Variant disabled.").send(),
        Err(err) => flash_service_error("Changing the variant status", &err),
    }
    redirect(&location)
}

#[post("/variants/{variant_id}")]
pub async fn save_variant(
    req: HttpRequest,
    variant_id: web::Path<String>,
    body: web::Bytes,
    repo: web::Data<GraphqlRepository>,
    caches: web::Data<QueryCaches>,
) -> impl Responder {
    let (product_id, location) = match resolve_target(&body, &req) {
        Ok(target) => target,
        Err(err) => {
            flash_service_error("Saving the variant", &err);
            return redirect(PRODUCTS_PATH);
        }
    };

    let result = match (
        VariantId::new(variant_id.as_str()),
        from_body::<VariantForm>(&body),
    ) {
        (Ok(id), Ok(form)) => {
            variants::update_variant(repo.get_ref(), &caches.variants, &product_id, &id, &form)
                .await
        }
        (Err(err), _) => Err(ServiceError::from(err)),
        (_, Err(err)) => Err(ServiceError::from(err)),
    };

    match result {
        Ok(()) => FlashMessage::success("Variant saved.").send(),
        Err(err) => flash_service_error("Saving the variant", &err),
    }
    redirect(&location)
}

#[post("/products/{product_id}/variants/new")]
pub async fn create_variants(
    req: HttpRequest,
    product_id: web::Path<String>,
    body: web::Bytes,
    repo: web::Data<GraphqlRepository>,
    caches: web::Data<QueryCaches>,
) -> impl Responder {
    let Ok(product_id) = ProductId::new(product_id.as_str()) else {
        FlashMessage::error("Invalid product id.").send();
        return redirect(PRODUCTS_PATH);
    };
    let location = with_query(&variants_path(&product_id), req.query_string());

    let result = match from_body::<CreateVariantsForm>(&body) {
        Ok(form) => {
            variants::create_variants(repo.get_ref(), &caches.variants, &product_id, &form).await
        }
        Err(err) => Err(ServiceError::from(err)),
    };

    match result {
        Ok(1) => FlashMessage::success("Variant created.").send(),
        Ok(count) => FlashMessage::success(format!("{count} variants created.")).send(),
        Err(err) => flash_service_error("Creating variants", &err),
    }
    redirect(&location)
}

#[post("/variants/{variant_id}/delete")]
pub async fn delete_variant(
    req: HttpRequest,
    variant_id: web::Path<String>,
    body: web::Bytes,
    repo: web::Data<GraphqlRepository>,
    caches: web::Data<QueryCaches>,
) -> impl Responder {
    let (product_id, location) = match resolve_target(&body, &req) {
        Ok(target) => target,
        Err(err) => {
            flash_service_error("Deleting the variant", &err);
            return redirect(PRODUCTS_PATH);
        }
    };

    let result = match VariantId::new(variant_id.as_str()) {
        Ok(id) => {
            variants::delete_variant(repo.get_ref(), &caches.variants, &product_id, &id).await
        }
        Err(err) => Err(ServiceError::from(err)),
    };

    match result {
        Ok(()) => FlashMessage::success("Variant deleted.").send(),
        Err(err) => flash_service_error("Deleting the variant", &err),
    }
    redirect(&location)
}

#[post("/products/{product_id}/variants/bulk")]
pub async fn bulk_variants(
    req: HttpRequest,
    product_id: web::Path<String>,
    body: web::Bytes,
    repo: web::Data<GraphqlRepository>,
    caches: web::Data<QueryCaches>,
) -> impl Responder {
    let Ok(product_id) = ProductId::new(product_id.as_str()) else {
        FlashMessage::error("Invalid product id.").send();
        return redirect(PRODUCTS_PATH);
    };
    let location = with_query(&variants_path(&product_id), req.query_string());

    let form: VariantBulkActionForm = match from_body(&body) {
        Ok(form) => form,
        Err(err) => {
            log::error!("Failed to decode variant bulk action form: {err}");
            FlashMessage::error("Could not read the selection.").send();
            return redirect(&location);
        }
    };

    match variants::apply_variant_bulk_action(
        repo.get_ref(),
        &caches.variants,
        &product_id,
        &form,
    )
    .await
    {
        Ok(outcome) => flash_bulk_outcome(outcome, "variants"),
        Err(err) => flash_service_error("Bulk action", &err),
    }
    redirect(&location)
}
