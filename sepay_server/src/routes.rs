//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests:
//! ```nocompile
//!     fn my_handler() -> impl Responder {
//!         std::thread::sleep(Duration::from_secs(5)); // <-- Bad practice! Will cause the current worker thread to
//! hang!
//!     }
//! ```
//! For this reason, any long, non-cpu-bound operation (e.g. I/O, database operations, etc.) should be expressed as
//! futures or asynchronous functions. Async handlers get executed concurrently by worker threads and thus don’t block
//! execution:
//!
//! ```nocompile
//!     async fn my_handler() -> impl Responder {
//!         tokio::time::sleep(Duration::from_secs(5)).await; // <-- Ok. Worker thread will handle other requests here
//!     }
//! ```
use actix_web::{get, http::StatusCode, web, HttpResponse, Responder};
use log::*;
use sepay_engine::{
    db_types::OrderId,
    traits::{PaymentGatewayDatabase, PaymentGatewayError},
    OrderFlowApi,
    ReconciliationResult,
};
use serde_json::json;
use spg_common::Vnd;

use crate::{
    config::PaymentPageConfig,
    data_objects::{
        NewOrderRequest,
        NewOrderResponse,
        OrderResponse,
        PaymentStatusRequest,
        PaymentStatusResponse,
        SePayWebhookData,
    },
    errors::{ServerError, INVALID_ORDER_ID, INVALID_TOTAL, MISSING_WEBHOOK_FIELDS, ORDER_NOT_FOUND},
    pages,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $bounds:ty, guarded by $guard:ty) => {
        paste::paste! { pub struct [<$name:camel Route>]<A>(core::marker::PhantomData<fn() -> A>, $guard);}
        paste::paste! { impl<A> [<$name:camel Route>]<A> {
            pub fn new(guard: $guard) -> Self {
                Self(core::marker::PhantomData::<fn() -> A>, guard)
            }
        }}
        paste::paste! { impl<A> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<A>
        where
            A: $bounds + 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<A>)
                    .wrap(self.1);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(create_order => Post "/orders" impl PaymentGatewayDatabase);
/// Route handler for creating a new order.
///
/// The body is a JSON object with a single `total` field, holding the order total in dong, either as a number or as
/// a numeric string. The order is created as `Unpaid`.
pub async fn create_order<B: PaymentGatewayDatabase>(
    body: web::Bytes,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Received new order request");
    let total = serde_json::from_slice::<NewOrderRequest>(&body)
        .map_err(|e| debug!("💻️ Could not deserialize new order request. {e}"))
        .ok()
        .and_then(|req| req.total)
        .filter(Vnd::is_positive)
        .ok_or_else(|| ServerError::InvalidRequestBody(INVALID_TOTAL.into()))?;
    let order = api.create_order(total).await.map_err(|e| match e {
        PaymentGatewayError::InvalidAmount(_) => ServerError::InvalidRequestBody(INVALID_TOTAL.into()),
        e => {
            error!("💻️ Could not create order. {e}");
            ServerError::BackendError(format!("Cannot insert record to database: {e}"))
        },
    })?;
    Ok(HttpResponse::Ok().json(NewOrderResponse::new(order)))
}

route!(order_by_id => Get "/orders/{id}" impl PaymentGatewayDatabase);
pub async fn order_by_id<B: PaymentGatewayDatabase>(
    path: web::Path<String>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let path = path.into_inner();
    let order_id = match path.parse::<OrderId>() {
        Ok(order_id) => order_id,
        // A well-formed number, but no order has an id below 1
        Err(_) if path.trim().parse::<i64>().is_ok() => {
            return Err(ServerError::NoRecordFound(ORDER_NOT_FOUND.into()));
        },
        Err(e) => {
            debug!("💻️ {e}");
            return Err(ServerError::InvalidRequestPath(INVALID_ORDER_ID.into()));
        },
    };
    trace!("💻️ Fetching order {order_id}");
    let order = api
        .fetch_order(order_id)
        .await
        .map_err(|e| {
            error!("💻️ Could not fetch order {order_id}. {e}");
            ServerError::from(e)
        })?
        .ok_or_else(|| ServerError::NoRecordFound(ORDER_NOT_FOUND.into()))?;
    Ok(HttpResponse::Ok().json(OrderResponse::new(order)))
}

//----------------------------------------------   Payment status  ----------------------------------------------------
route!(check_payment_status => Post "/check-payment-status" impl PaymentGatewayDatabase);
/// Route handler for the payment page's status polling.
///
/// Every failure, whatever its cause, reports the status as `order_not_found`, with an appropriate status code.
pub async fn check_payment_status<B: PaymentGatewayDatabase>(
    body: web::Bytes,
    api: web::Data<OrderFlowApi<B>>,
) -> HttpResponse {
    let order_id = serde_json::from_slice::<PaymentStatusRequest>(&body).ok().and_then(|req| req.order_id);
    let Some(order_id) = order_id else {
        debug!("💻️ Payment status request did not contain a valid order id");
        return order_not_found(StatusCode::BAD_REQUEST);
    };
    match api.payment_status(order_id).await {
        Ok(Some(status)) => HttpResponse::Ok().json(PaymentStatusResponse::from(status)),
        Ok(None) => order_not_found(StatusCode::NOT_FOUND),
        Err(e) => {
            error!("💻️ Could not fetch the payment status for order {order_id}. {e}");
            order_not_found(StatusCode::INTERNAL_SERVER_ERROR)
        },
    }
}

fn order_not_found(status: StatusCode) -> HttpResponse {
    HttpResponse::build(status).json(PaymentStatusResponse::order_not_found())
}

//----------------------------------------------   Webhook  ----------------------------------------------------
route!(sepay_webhook => Post "/sepay-webhook" impl PaymentGatewayDatabase, guarded by crate::middleware::ApiKeyMiddlewareFactory);
/// Route handler for the SePay webhook.
///
/// SePay calls this for every transaction on the merchant's account. The transaction is always recorded. If the
/// transfer description quotes the reference of an unpaid order, and the amount matches, the order is marked as paid.
///
/// Calls are authenticated by [`crate::middleware::ApiKeyMiddlewareFactory`].
pub async fn sepay_webhook<B: PaymentGatewayDatabase>(
    body: web::Bytes,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Received SePay webhook call");
    let transaction = serde_json::from_slice::<SePayWebhookData>(&body)
        .map_err(|e| debug!("💻️ Could not deserialize webhook payload. {e}"))
        .ok()
        .and_then(SePayWebhookData::into_new_transaction)
        .ok_or_else(|| ServerError::InvalidRequestBody(MISSING_WEBHOOK_FIELDS.into()))?;
    let transaction = api.record_transaction(transaction).await.map_err(|e| {
        error!("💻️ Could not record webhook transaction. {e}");
        ServerError::BackendError(format!("Cannot insert record to database: {e}"))
    })?;
    let transaction_id = transaction.id;
    let result = api.reconcile_transaction(transaction).await.map_err(|e| {
        error!("💻️ Could not settle an order with transaction #{transaction_id}. {e}");
        ServerError::BackendError(format!("Cannot update order: {e}"))
    })?;
    match result {
        ReconciliationResult::Paid { order, transaction } => {
            info!("💻️ Order {} paid by transaction #{}", order.id, transaction.id);
            Ok(HttpResponse::Ok().json(json!({ "success": true })))
        },
        ReconciliationResult::NoOrderReference { .. } => {
            Err(ServerError::InvalidRequestBody("Order not found. Order_id: null".into()))
        },
        ReconciliationResult::OrderNotPayable { order_id, .. } => {
            Err(ServerError::NoRecordFound(format!("Order not found. Order_id: {}", order_id.value())))
        },
    }
}

#[get("/sepay-webhook")]
pub async fn sepay_webhook_get() -> impl Responder {
    HttpResponse::MethodNotAllowed().json(json!({ "message": "Method not allowed" }))
}

//----------------------------------------------   Pages  ----------------------------------------------------
#[get("/")]
pub async fn index() -> impl Responder {
    HttpResponse::Ok().content_type("text/html; charset=utf-8").body(pages::render_index())
}

route!(order_page => Get "/order/{id}" impl PaymentGatewayDatabase);
/// The payment page for an order. Shows the transfer instructions while the order is unpaid, and polls for a change
/// in payment status.
pub async fn order_page<B: PaymentGatewayDatabase>(
    path: web::Path<String>,
    api: web::Data<OrderFlowApi<B>>,
    config: web::Data<PaymentPageConfig>,
) -> HttpResponse {
    let order = match path.into_inner().parse::<OrderId>() {
        Ok(order_id) => api.fetch_order(order_id).await.unwrap_or_else(|e| {
            error!("💻️ Could not fetch order {order_id}. {e}");
            None
        }),
        Err(_) => None,
    };
    match order {
        Some(order) => {
            HttpResponse::Ok().content_type("text/html; charset=utf-8").body(pages::render_order_page(&order, &config))
        },
        None => HttpResponse::NotFound().content_type("text/html; charset=utf-8").body(pages::render_not_found()),
    }
}
