//! HTTP handlers of the console and the helpers they share.

use actix_web::HttpResponse;
use actix_web::http::header;
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages, Level};
use tera::{Context, Tera};

use crate::services::{BatchSummary, BulkOutcome, ServiceError};

pub mod api;
pub mod products;
pub mod variants;

/// Bootstrap alert class for a flash message level.
pub fn alert_level_to_str(level: &Level) -> &'static str {
    match level {
        Level::Error => "danger",
        Level::Warning => "warning",
        Level::Success => "success",
        _ => "info",
    }
}

/// Context carrying the flash messages and the active navigation entry.
pub fn base_context(flash_messages: &IncomingFlashMessages, current_page: &str) -> Context {
    let alerts = flash_messages
        .iter()
        .map(|f| (f.content(), alert_level_to_str(&f.level())))
        .collect::<Vec<_>>();

    let mut context = Context::new();
    context.insert("alerts", &alerts);
    context.insert("current_page", current_page);
    context
}

pub fn render_template(tera: &Tera, template: &str, context: &Context) -> HttpResponse {
    match tera.render(template, context) {
        Ok(body) => HttpResponse::Ok().content_type("text/html").body(body),
        Err(err) => {
            log::error!("Failed to render template '{template}': {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Turns a failed mutation into a toast.
pub fn flash_service_error(action: &str, err: &ServiceError) {
    let message = match err {
        ServiceError::NotFound => format!("{action} failed: not found."),
        ServiceError::Form(message) | ServiceError::TypeConstraint(message) => {
            format!("Please check the form: {message}")
        }
        ServiceError::Rejected(message) => format!("{action} failed: {message}"),
        ServiceError::Remote(message) => format!("{action} failed: {message}"),
    };
    FlashMessage::error(message).send();
}

/// Reports a bulk action: one toast for the rows that went through, one per refusal.
pub fn flash_bulk_outcome(outcome: BulkOutcome, entities: &str) {
    let (summary, verb) = match outcome {
        BulkOutcome::Updated(count) => {
            FlashMessage::success(format!("{count} {entities} updated.")).send();
            return;
        }
        BulkOutcome::Deleted(summary) => (summary, "deleted"),
        BulkOutcome::Duplicated(summary) => (summary, "duplicated"),
    };
    let BatchSummary {
        succeeded,
        failures,
    } = summary;
    if succeeded > 0 {
        FlashMessage::success(format!("{succeeded} {entities} {verb}.")).send();
    }
    for message in failures {
        FlashMessage::error(message).send();
    }
}

/// `path` with the query string of the current request appended.
pub fn with_query(path: &str, query: &str) -> String {
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{query}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_sets_location() {
        let response = redirect("/products?page=2");
        assert_eq!(response.status(), actix_web::http::StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/products?page=2"
        );
    }

    #[test]
    fn query_is_appended_only_when_present() {
        assert_eq!(with_query("/products", ""), "/products");
        assert_eq!(with_query("/products", "q=shoe"), "/products?q=shoe");
    }
}
