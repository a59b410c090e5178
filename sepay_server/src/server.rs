use std::{future::Future, pin::Pin, time::Duration};

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use sepay_engine::{
    events::{EventHandlers, EventHooks, EventProducers},
    OrderFlowApi,
    SqliteDatabase,
};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    middleware::ApiKeyMiddlewareFactory,
    routes::{
        health,
        index,
        sepay_webhook_get,
        CheckPaymentStatusRoute,
        CreateOrderRoute,
        OrderByIdRoute,
        OrderPageRoute,
        SepayWebhookRoute,
    },
};

const EVENT_BUFFER_SIZE: usize = 25;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, config.max_db_connections)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let handlers = EventHandlers::new(EVENT_BUFFER_SIZE, create_event_hooks());
    let producers = handlers.producers();
    handlers.start_handlers();
    let srv = create_server_instance(config, db, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

/// The hooks that run when the payment engine emits an event. For now, paid orders are simply logged.
pub fn create_event_hooks() -> EventHooks {
    let mut hooks = EventHooks::default();
    hooks.on_order_paid(|ev| {
        Box::pin(async move {
            info!(
                "🛍️ Order {} ({}, {}) was paid by a {} transfer. Bank reference: {}",
                ev.order.id,
                ev.order.name,
                ev.order.total,
                ev.transaction.gateway,
                ev.transaction.reference_number.as_deref().unwrap_or("none")
            );
        }) as Pin<Box<dyn Future<Output = ()> + Send>>
    });
    hooks
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let (host, port) = (config.host.clone(), config.port);
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone(), producers.clone())
            .with_product_name(config.product_name.as_str())
            .with_amount_tolerance(config.amount_tolerance);
        let api_scope = web::scope("/api")
            .service(CreateOrderRoute::<SqliteDatabase>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new())
            .service(CheckPaymentStatusRoute::<SqliteDatabase>::new())
            .service(SepayWebhookRoute::<SqliteDatabase>::new(ApiKeyMiddlewareFactory::new(
                config.sepay_api_key.clone(),
            )))
            .service(sepay_webhook_get);
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("spg::access_log"))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(config.payment_page.clone()))
            .service(health)
            .service(index)
            .service(OrderPageRoute::<SqliteDatabase>::new())
            .service(api_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}
