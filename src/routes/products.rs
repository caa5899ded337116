use actix_web::{HttpRequest, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::domain::types::ProductId;
use crate::dto::list::ListView;
use crate::dto::products::{CategoryOption, ProductPageData, ProductRow};
use crate::forms::from_body;
use crate::forms::list::ListFilterForm;
use crate::forms::product::{BulkActionForm, ProductAssetsForm, ProductForm, ToggleEnabledForm};
use crate::list::controller::ListQueryStateController;
use crate::list::page::PageResult;
use crate::list::url::HistoryNavigator;
use crate::models::config::ServerConfig;
use crate::repository::GraphqlRepository;
use crate::routes::{
    base_context, flash_bulk_outcome, flash_service_error, redirect, render_template,
};
use crate::services::{QueryCaches, ServiceError};
use crate::services::facets::category_options_or_empty;
use crate::services::products::{self, PRODUCTS_PATH, product_list_schema};

fn list_controller(
    config: &ServerConfig,
    req: &HttpRequest,
) -> ListQueryStateController<HistoryNavigator> {
    ListQueryStateController::mount(
        product_list_schema(config.default_page_size, config.max_page_size),
        HistoryNavigator::new(PRODUCTS_PATH, req.query_string()),
    )
}

/// List URL the request came from; mutations redirect back to it.
fn list_location(req: &HttpRequest) -> String {
    HistoryNavigator::new(PRODUCTS_PATH, req.query_string()).location()
}

fn parse_id(raw: &str) -> Option<ProductId> {
    match ProductId::new(raw) {
        Ok(id) => Some(id),
        Err(err) => {
            log::error!("Invalid product id {raw:?}: {err}");
            FlashMessage::error("Invalid product id.").send();
            None
        }
    }
}

#[get("/products")]
pub async fn show_products(
    req: HttpRequest,
    repo: web::Data<GraphqlRepository>,
    caches: web::Data<QueryCaches>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let controller = list_controller(&server_config, &req);
    let options = controller.query_options();

    let (page, error) =
        match products::load_products(repo.get_ref(), &caches.products, &options).await {
            Ok(loaded) => (loaded.value, loaded.error),
            Err(err) => (PageResult::empty(), Some(err.to_string())),
        };
    let view = ListView::new(&controller, page, error).map_items(ProductRow::from);

    let selected = view
        .filter_values
        .get("categories")
        .cloned()
        .unwrap_or_default();
    let facet_values = category_options_or_empty(repo.get_ref(), &caches.facets).await;

    let mut context = base_context(&flash_messages, "products");
    context.insert("list", &view);
    context.insert("query", req.query_string());
    context.insert(
        "categories",
        &CategoryOption::from_values(&facet_values, &selected),
    );

    render_template(&tera, "products/index.html", &context)
}

#[post("/products/filters")]
pub async fn apply_product_filters(
    req: HttpRequest,
    body: web::Bytes,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    let mut controller = list_controller(&server_config, &req);
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

#[post("/products/filters/clear")]
pub async fn clear_product_filters(
    req: HttpRequest,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    let mut controller = list_controller(&server_config, &req);
    controller.clear_all();
    redirect(&controller.navigator().location())
}

#[get("/products/new")]
pub async fn new_product(
    repo: web::Data<GraphqlRepository>,
    caches: web::Data<QueryCaches>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let facet_values = category_options_or_empty(repo.get_ref(), &caches.facets).await;

    let mut context = base_context(&flash_messages, "products");
    context.insert("categories", &CategoryOption::from_values(&facet_values, &[]));

    render_template(&tera, "products/new.html", &context)
}

#[post("/products/new")]
pub async fn create_product(
    body: web::Bytes,
    repo: web::Data<GraphqlRepository>,
    caches: web::Data<QueryCaches>,
) -> impl Responder {
    let form: ProductForm = match from_body(&body) {
        Ok(form) => form,
        Err(err) => {
            log::error!("Failed to decode product form: {err}");
            FlashMessage::error("Could not read the product form.").send();
            return redirect("/products/new");
        }
    };

    match products::create_product(repo.get_ref(), &caches.products, &form).await {
        Ok(id) => {
            FlashMessage::success(format!("Product \"{}\" created.", form.name.trim())).send();
            redirect(&format!("{PRODUCTS_PATH}/{id}"))
        }
        Err(err) => {
            flash_service_error("Creating the product", &err);
            redirect("/products/new")
        }
    }
}

#[get("/products/{product_id}")]
pub async fn show_product(
    product_id: web::Path<String>,
    repo: web::Data<GraphqlRepository>,
    caches: web::Data<QueryCaches>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let Some(id) = parse_id(&product_id) else {
        return redirect(PRODUCTS_PATH);
    };

    let product = match products::get_product(repo.get_ref(), &id).await {
        Ok(product) => product,
        Err(err) => {
            flash_service_error("Loading the product", &err);
            return redirect(PRODUCTS_PATH);
        }
    };
    let facet_values = category_options_or_empty(repo.get_ref(), &caches.facets).await;

    let mut context = base_context(&flash_messages, "products");
    let page = ProductPageData::new(product, &facet_values);
    context.insert("product", &page.product);
    context.insert("categories", &page.categories);

    render_template(&tera, "products/detail.html", &context)
}

#[post("/products/{product_id}")]
pub async fn save_product(
    product_id: web::Path<String>,
    body: web::Bytes,
    repo: web::Data<GraphqlRepository>,
    caches: web::Data<QueryCaches>,
) -> impl Responder {
    let Some(id) = parse_id(&product_id) else {
        return redirect(PRODUCTS_PATH);
    };
    let detail = format!("{PRODUCTS_PATH}/{id}");

    let form: ProductForm = match from_body(&body) {
        Ok(form) => form,
        Err(err) => {
            log::error!("Failed to decode product form: {err}");
            FlashMessage::error("Could not read the product form.").send();
            return redirect(&detail);
        }
    };

    match products::update_product(repo.get_ref(), &caches.products, &id, &form).await {
        Ok(()) => FlashMessage::success("Product saved.").send(),
        Err(err) => flash_service_error("Saving the product", &err),
    }
    redirect(&detail)
}

#[post("/products/{product_id}/assets")]
pub async fn save_product_assets(
    product_id: web::Path<String>,
    body: web::Bytes,
    repo: web::Data<GraphqlRepository>,
    caches: web::Data<QueryCaches>,
) -> impl Responder {
    let Some(id) = parse_id(&product_id) else {
        return redirect(PRODUCTS_PATH);
    };
    let detail = format!("{PRODUCTS_PATH}/{id}");

    let result = match from_body::<ProductAssetsForm>(&body) {
        Ok(form) => {
            products::set_product_assets(repo.get_ref(), &caches.products, &id, &form).await
        }
        Err(err) => Err(ServiceError::from(err)),
    };
    match result {
        Ok(()) => FlashMessage::success("Assets saved.").send(),
        Err(err) => flash_service_error("Saving the assets", &err),
    }
    redirect(&detail)
}

#[post("/products/{product_id}/enabled")]
pub async fn toggle_product(
    req: HttpRequest,
    product_id: web::Path<String>,
    web::Form(form): web::Form<ToggleEnabledForm>,
    repo: web::Data<GraphqlRepository>,
    caches: web::Data<QueryCaches>,
) -> impl Responder {
    let location = list_location(&req);
    let Some(id) = parse_id(&product_id) else {
        return redirect(&location);
    };

    match products::set_product_enabled(repo.get_ref(), &caches.products, &id, form.enabled).await
    {
        Ok(()) if form.enabled => FlashMessage::success("Product enabled.").send(),
        Ok(()) => FlashMessage::success("Product disabled.").send(),
        Err(err) => flash_service_error("Changing the product status", &err),
    }
    redirect(&location)
}

#[post("/products/{product_id}/delete")]
pub async fn delete_product(
    req: HttpRequest,
    product_id: web::Path<String>,
    repo: web::Data<GraphqlRepository>,
    caches: web::Data<QueryCaches>,
) -> impl Responder {
    let location = list_location(&req);
    let Some(id) = parse_id(&product_id) else {
        return redirect(&location);
    };

    match products::delete_product(repo.get_ref(), &caches.products, &id).await {
        Ok(()) => FlashMessage::success("Product deleted.").send(),
        Err(err) => flash_service_error("Deleting the product", &err),
    }
    redirect(&location)
}

#[post("/products/{product_id}/duplicate")]
pub async fn duplicate_product(
    req: HttpRequest,
    product_id: web::Path<String>,
    repo: web::Data<GraphqlRepository>,
    caches: web::Data<QueryCaches>,
) -> impl Responder {
    let location = list_location(&req);
    let Some(id) = parse_id(&product_id) else {
        return redirect(&location);
    };

    match products::duplicate_product(repo.get_ref(), &caches.products, &id).await {
        Ok(new_id) => {
            FlashMessage::success("Product duplicated.").send();
            redirect(&format!("{PRODUCTS_PATH}/{new_id}"))
        }
        Err(err) => {
            flash_service_error("Duplicating the product", &err);
            redirect(&location)
        }
    }
}

#[post("/products/bulk")]
pub async fn bulk_products(
    req: HttpRequest,
    body: web::Bytes,
    repo: web::Data<GraphqlRepository>,
    caches: web::Data<QueryCaches>,
) -> impl Responder {
    let location = list_location(&req);
    let form: BulkActionForm = match from_body(&body) {
        Ok(form) => form,
        Err(err) => {
            log::error!("Failed to decode bulk action form: {err}");
            FlashMessage::error("Could not read the selection.").send();
            return redirect(&location);
        }
    };

    match products::apply_bulk_action(repo.get_ref(), &caches.products, &form).await {
        Ok(outcome) => flash_bulk_outcome(outcome, "products"),
        Err(err) => flash_service_error("Bulk action", &err),
    }
    redirect(&location)
}
