//! Request handler definitions
//!
//! Define each route and its handler here. Handlers only translate between HTTP and the engine APIs. Anything with
//! logic in it belongs in `kropkart_payment_engine`.
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Database and gateway calls are all async, so a slow gateway only
//! holds up the request that is waiting on it.
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use kropkart_payment_engine::{
    db_types::GatewayOrderId,
    order_objects::{CheckoutRequest, NewListingRequest, VerifyPaymentRequest, WebhookOutcome},
    traits::{ListingManagement, MarketplaceDatabase, OrderManagement, PaymentGateway},
    CheckoutApi,
    ListingApi,
    OrderLookupApi,
    ReconciliationApi,
    VerificationApi,
};
use log::*;

use crate::{
    config::ServerOptions,
    data_objects::{JsonResponse, VerificationResponse},
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
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

//----------------------------------------------   Checkout  ----------------------------------------------------
route!(create_order => Post "/orders" impl MarketplaceDatabase, PaymentGateway);
/// Creates an order intent with the payment gateway and records the order locally.
///
/// The response body is the gateway order intent. The buyer's client opens the gateway checkout with its `id`.
pub async fn create_order<B, G>(
    body: web::Json<CheckoutRequest>,
    api: web::Data<CheckoutApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: MarketplaceDatabase,
    G: PaymentGateway,
{
    let request = body.into_inner();
    debug!("💻️ Checkout request for {} by {}", request.amount, request.buyer_id);
    let intent = api.create_order(request).await.map_err(|e| {
        debug!("💻️ Checkout failed. {e}");
        ServerError::from(e)
    })?;
    Ok(HttpResponse::Ok().json(intent))
}

//----------------------------------------------   Verify  ----------------------------------------------------
route!(verify_payment => Post "/payments/verify" impl OrderManagement);
/// Verifies a payment confirmation from the buyer's client.
///
/// Responds with 400 for a bad signature, 404 for an unknown order and 409 if the order has already been confirmed
/// with a different payment.
pub async fn verify_payment<B: OrderManagement>(
    body: web::Json<VerifyPaymentRequest>,
    api: web::Data<VerificationApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let request = body.into_inner();
    trace!("💻️ Verification request for order {}", request.gateway_order_id);
    let outcome = api.verify_payment(request).await?;
    debug!("💻️ {outcome}");
    Ok(HttpResponse::Ok().json(VerificationResponse::from(outcome)))
}

//----------------------------------------------   Webhook  ----------------------------------------------------
route!(webhook => Post "/webhook" impl OrderManagement);
/// Receives payment notifications from the gateway.
///
/// The body is taken as raw bytes, since the signature covers the exact bytes that were sent. Any delivery with a
/// valid signature is acknowledged with a 200, unless it could not be stored, in which case a 500 makes the gateway
/// try again later.
pub async fn webhook<B: OrderManagement>(
    req: HttpRequest,
    body: web::Bytes,
    api: web::Data<ReconciliationApi<B>>,
    options: web::Data<ServerOptions>,
) -> Result<HttpResponse, ServerError> {
    trace!("🪝️ Received webhook request: {}", req.uri());
    let signature = req.headers().get(options.webhook_signature_header.as_str()).and_then(|v| v.to_str().ok());
    let outcome = api.process_webhook(&body, signature).await?;
    let response = match outcome {
        WebhookOutcome::Ignored(reason) => {
            info!("🪝️ Webhook acknowledged but ignored. {reason}");
            JsonResponse::failure(reason)
        },
        outcome => {
            info!("🪝️ {outcome}");
            JsonResponse::success(outcome)
        },
    };
    Ok(HttpResponse::Ok().json(response))
}

//----------------------------------------------   Listings  ----------------------------------------------------
route!(create_listing => Post "/listings" impl ListingManagement);
pub async fn create_listing<B: ListingManagement>(
    body: web::Json<NewListingRequest>,
    api: web::Data<ListingApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let listing = api.create_listing(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(listing))
}

route!(listing_by_id => Get "/listings/{id}" impl ListingManagement);
pub async fn listing_by_id<B: ListingManagement>(
    path: web::Path<i64>,
    api: web::Data<ListingApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    trace!("💻️ Fetching listing #{id}");
    let listing = api.fetch_listing(id).await?;
    Ok(HttpResponse::Ok().json(listing))
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(order_by_id => Get "/orders/{gateway_order_id}" impl OrderManagement);
/// Returns the order and its full transition history.
pub async fn order_by_id<B: OrderManagement>(
    path: web::Path<String>,
    api: web::Data<OrderLookupApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = GatewayOrderId::from(path.into_inner());
    trace!("💻️ Fetching order {id}");
    let order = api.fetch_order(&id).await?;
    Ok(HttpResponse::Ok().json(order))
}
